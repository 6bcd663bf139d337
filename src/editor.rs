use crate::template::vocabulary::VariableVocabulary;
use crate::template::{canonical_text, parse_segments, Segment};

/// A second `insert_variable` call for the same token inside this window is
/// treated as an accidental double-fire and suppressed.
pub const DUPLICATE_INSERT_WINDOW_MS: i64 = 500;

/// One editable unit of the surface. Cursor positions are gaps between
/// units, so a chip can never be entered or split by character edits.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Unit {
    Ch(char),
    Chip(String),
}

/// Pure in-memory state for the variable token editor: a mix of free text
/// and atomic variable chips over a single canonical template string.
///
/// Every mutating operation reports whether the canonical value changed so
/// the owning screen can run its change callback. No operation returns an
/// error; positions that cannot be resolved fall back to end-of-content.
#[derive(Debug, Clone, Default)]
pub struct EditorState {
    units: Vec<Unit>,
    cursor: usize,
    anchor: Option<usize>,
    focused: bool,
    remembered: Option<usize>,
    last_insert: Option<(String, i64)>,
}

impl EditorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the editor for an existing template value and selects the
    /// whole content, so the first keystrokes are a clean overwrite.
    pub fn open(value: &str, vocabulary: &VariableVocabulary) -> Self {
        let mut editor = Self::new();
        editor.set_value(value, vocabulary);
        editor.focus();
        editor.select_all();
        editor
    }

    /// Re-parses the surface from a canonical string. The cursor survives
    /// re-renders that do not change the value; otherwise it is clamped and
    /// any selection is dropped.
    pub fn set_value(&mut self, value: &str, vocabulary: &VariableVocabulary) -> bool {
        let changed = self.canonical_text() != value;
        self.units = units_from_segments(parse_segments(value, vocabulary));
        if changed {
            self.anchor = None;
        }
        self.cursor = self.cursor.min(self.units.len());
        self.remembered = self.remembered.map(|pos| pos.min(self.units.len()));
        changed
    }

    /// The canonical plain-string value derived from the current state. Safe
    /// to call at any moment, e.g. right before a save.
    pub fn canonical_text(&self) -> String {
        let mut value = String::new();
        for unit in &self.units {
            match unit {
                Unit::Ch(ch) => value.push(*ch),
                Unit::Chip(name) => {
                    value.push('{');
                    value.push_str(name);
                    value.push('}');
                }
            }
        }
        value
    }

    /// The current visual representation: adjacent characters merged into
    /// text segments, chips kept atomic.
    pub fn segments(&self) -> Vec<Segment> {
        let mut segments: Vec<Segment> = Vec::new();
        for unit in &self.units {
            match unit {
                Unit::Ch(ch) => match segments.last_mut() {
                    Some(Segment::Text(text)) => text.push(*ch),
                    _ => segments.push(Segment::Text(ch.to_string())),
                },
                Unit::Chip(name) => segments.push(Segment::Chip(name.clone())),
            }
        }
        segments
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn chip_count(&self) -> usize {
        self.units
            .iter()
            .filter(|unit| matches!(unit, Unit::Chip(_)))
            .count()
    }

    /// Normalized selection range, when a non-empty selection is active.
    pub fn selection(&self) -> Option<(usize, usize)> {
        let anchor = self.anchor?;
        if anchor == self.cursor {
            return None;
        }
        Some((anchor.min(self.cursor), anchor.max(self.cursor)))
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn focus(&mut self) {
        self.focused = true;
    }

    /// Losing focus remembers the cursor so a palette insertion can land
    /// where the user left off.
    pub fn blur(&mut self) {
        self.focused = false;
        self.remembered = Some(self.cursor);
    }

    pub fn select_all(&mut self) {
        self.anchor = Some(0);
        self.cursor = self.units.len();
    }

    pub fn move_left(&mut self) {
        if let Some((start, _)) = self.selection() {
            self.cursor = start;
        } else {
            self.cursor = self.cursor.saturating_sub(1);
        }
        self.anchor = None;
    }

    pub fn move_right(&mut self) {
        if let Some((_, end)) = self.selection() {
            self.cursor = end;
        } else {
            self.cursor = (self.cursor + 1).min(self.units.len());
        }
        self.anchor = None;
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
        self.anchor = None;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.units.len();
        self.anchor = None;
    }

    pub fn insert_char(&mut self, ch: char) -> bool {
        self.delete_selection();
        self.units.insert(self.cursor, Unit::Ch(ch));
        self.cursor += 1;
        true
    }

    /// Paste path: payloads are always plain text (any rich representation
    /// was discarded upstream) and replace the active selection.
    pub fn insert_text(&mut self, text: &str) -> bool {
        if text.is_empty() {
            return self.delete_selection();
        }
        self.delete_selection();
        for ch in text.chars() {
            self.units.insert(self.cursor, Unit::Ch(ch));
            self.cursor += 1;
        }
        true
    }

    /// Backspace. With the cursor immediately after a chip this removes the
    /// whole chip in one step, never partial characters of its label.
    pub fn backspace(&mut self) -> bool {
        if self.delete_selection() {
            return true;
        }
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        self.units.remove(self.cursor);
        true
    }

    pub fn delete_forward(&mut self) -> bool {
        if self.delete_selection() {
            return true;
        }
        if self.cursor >= self.units.len() {
            return false;
        }
        self.units.remove(self.cursor);
        true
    }

    /// Inserts a chip for `name` at the cursor, at the remembered position
    /// when the surface is blurred, or at the end as last resort. A repeat
    /// of the same token within [`DUPLICATE_INSERT_WINDOW_MS`] is a no-op;
    /// deliberate re-insertion later or elsewhere is fully supported. The
    /// cursor lands right after the new chip and that position becomes the
    /// new remembered position.
    pub fn insert_variable(&mut self, name: &str, now_ms: i64) -> bool {
        if let Some((last_name, at)) = &self.last_insert {
            if last_name == name && now_ms.saturating_sub(*at) < DUPLICATE_INSERT_WINDOW_MS {
                return false;
            }
        }
        let position = if self.focused {
            self.delete_selection();
            self.cursor
        } else {
            self.anchor = None;
            self.remembered.unwrap_or(self.units.len())
        }
        .min(self.units.len());

        self.units.insert(position, Unit::Chip(name.to_string()));
        self.cursor = position + 1;
        self.remembered = Some(self.cursor);
        self.last_insert = Some((name.to_string(), now_ms));
        true
    }

    /// Removes exactly the `instance`-th chip (0-based, in content order),
    /// the operation behind a chip's own delete affordance.
    pub fn delete_chip(&mut self, instance: usize) -> bool {
        let Some(index) = self
            .units
            .iter()
            .enumerate()
            .filter(|(_, unit)| matches!(unit, Unit::Chip(_)))
            .map(|(index, _)| index)
            .nth(instance)
        else {
            return false;
        };
        self.units.remove(index);
        self.anchor = None;
        if self.cursor > index {
            self.cursor -= 1;
        }
        self.remembered = self.remembered.map(|pos| {
            if pos > index {
                pos - 1
            } else {
                pos
            }
        });
        true
    }

    /// The chip instance whose unit sits immediately before the cursor, if
    /// any. Drives keyboard access to the delete affordance.
    pub fn chip_before_cursor(&self) -> Option<usize> {
        if self.cursor == 0 {
            return None;
        }
        match self.units.get(self.cursor - 1) {
            Some(Unit::Chip(_)) => Some(
                self.units[..self.cursor - 1]
                    .iter()
                    .filter(|unit| matches!(unit, Unit::Chip(_)))
                    .count(),
            ),
            _ => None,
        }
    }

    fn delete_selection(&mut self) -> bool {
        let Some((start, end)) = self.selection() else {
            self.anchor = None;
            return false;
        };
        self.units.drain(start..end);
        self.cursor = start;
        self.anchor = None;
        true
    }
}

fn units_from_segments(segments: Vec<Segment>) -> Vec<Unit> {
    let mut units = Vec::new();
    for segment in segments {
        match segment {
            Segment::Text(text) => units.extend(text.chars().map(Unit::Ch)),
            Segment::Chip(name) => units.push(Unit::Chip(name)),
        }
    }
    units
}

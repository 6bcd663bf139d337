use crate::editor::EditorState;
use crate::template::vocabulary::VariableVocabulary;
use crate::template::Segment;
use crate::tui::main_panel_block;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Wrap};
use ratatui::Terminal;
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorFocus {
    Surface,
    Palette,
}

/// State for one template editing session: the editor surface plus the
/// variable palette fed by the step's vocabulary.
#[derive(Debug)]
pub struct TemplateScreenState {
    pub step_name: String,
    pub editor: EditorState,
    pub vocabulary: VariableVocabulary,
    pub palette: Vec<String>,
    pub palette_selected: usize,
    pub focus: EditorFocus,
}

impl TemplateScreenState {
    pub fn new(step_name: String, template: &str, vocabulary: VariableVocabulary) -> Self {
        let editor = EditorState::open(template, &vocabulary);
        let palette = vocabulary.names().map(str::to_string).collect();
        Self {
            step_name,
            editor,
            vocabulary,
            palette,
            palette_selected: 0,
            focus: EditorFocus::Surface,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateAction {
    InsertChar(char),
    Paste(String),
    Newline,
    Backspace,
    DeleteForward,
    DeleteChip,
    Left,
    Right,
    Home,
    End,
    SelectAll,
    SwitchFocus,
    PaletteUp,
    PaletteDown,
    InsertSelected,
    Apply,
    Cancel,
}

/// Maps a terminal event onto an editor action. Paste events carry plain
/// text only; any rich payload was already flattened by the terminal.
pub fn template_action_for_event(ev: &Event, focus: EditorFocus) -> Option<TemplateAction> {
    if let Event::Paste(text) = ev {
        return Some(TemplateAction::Paste(text.clone()));
    }
    let Event::Key(key) = ev else {
        return None;
    };
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('s') => Some(TemplateAction::Apply),
            KeyCode::Char('a') => Some(TemplateAction::SelectAll),
            KeyCode::Char('d') => Some(TemplateAction::DeleteChip),
            KeyCode::Char('c') => Some(TemplateAction::Cancel),
            _ => None,
        };
    }
    match key.code {
        KeyCode::Esc => Some(TemplateAction::Cancel),
        KeyCode::Tab => Some(TemplateAction::SwitchFocus),
        _ => match focus {
            EditorFocus::Surface => match key.code {
                KeyCode::Enter | KeyCode::Char('\n') | KeyCode::Char('\r') => {
                    Some(TemplateAction::Newline)
                }
                KeyCode::Backspace => Some(TemplateAction::Backspace),
                KeyCode::Delete => Some(TemplateAction::DeleteForward),
                KeyCode::Left => Some(TemplateAction::Left),
                KeyCode::Right => Some(TemplateAction::Right),
                KeyCode::Home => Some(TemplateAction::Home),
                KeyCode::End => Some(TemplateAction::End),
                KeyCode::Char(ch) => Some(TemplateAction::InsertChar(ch)),
                _ => None,
            },
            EditorFocus::Palette => match key.code {
                KeyCode::Up => Some(TemplateAction::PaletteUp),
                KeyCode::Down => Some(TemplateAction::PaletteDown),
                KeyCode::Enter | KeyCode::Char('\n') | KeyCode::Char('\r') => {
                    Some(TemplateAction::InsertSelected)
                }
                _ => None,
            },
        },
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateExit {
    Apply(String),
    Cancel,
}

pub fn apply_template_action(
    state: &mut TemplateScreenState,
    action: TemplateAction,
    now_ms: i64,
) -> Option<TemplateExit> {
    match action {
        TemplateAction::InsertChar(ch) => {
            state.editor.insert_char(ch);
        }
        TemplateAction::Paste(text) => {
            state.editor.insert_text(&text);
            // pasted text may spell out known tokens; re-parse so they
            // materialize as chips
            let canonical = state.editor.canonical_text();
            state.editor.set_value(&canonical, &state.vocabulary);
        }
        TemplateAction::Newline => {
            state.editor.insert_char('\n');
        }
        TemplateAction::Backspace => {
            state.editor.backspace();
        }
        TemplateAction::DeleteForward => {
            state.editor.delete_forward();
        }
        TemplateAction::DeleteChip => {
            if let Some(instance) = state.editor.chip_before_cursor() {
                state.editor.delete_chip(instance);
            }
        }
        TemplateAction::Left => state.editor.move_left(),
        TemplateAction::Right => state.editor.move_right(),
        TemplateAction::Home => state.editor.move_home(),
        TemplateAction::End => state.editor.move_end(),
        TemplateAction::SelectAll => state.editor.select_all(),
        TemplateAction::SwitchFocus => match state.focus {
            EditorFocus::Surface => {
                state.editor.blur();
                state.focus = EditorFocus::Palette;
            }
            EditorFocus::Palette => {
                state.editor.focus();
                state.focus = EditorFocus::Surface;
            }
        },
        TemplateAction::PaletteUp => {
            state.palette_selected = state.palette_selected.saturating_sub(1);
        }
        TemplateAction::PaletteDown => {
            state.palette_selected =
                (state.palette_selected + 1).min(state.palette.len().saturating_sub(1));
        }
        TemplateAction::InsertSelected => {
            if let Some(name) = state.palette.get(state.palette_selected).cloned() {
                state.editor.insert_variable(&name, now_ms);
            }
        }
        TemplateAction::Apply => {
            return Some(TemplateExit::Apply(state.editor.canonical_text()));
        }
        TemplateAction::Cancel => return Some(TemplateExit::Cancel),
    }
    None
}

fn chip_label(name: &str) -> String {
    format!(" {name} × ")
}

/// Renders the segment list as display lines: chips as highlighted atomic
/// spans with a display-only delete glyph, free text verbatim, and a
/// software cursor. Newlines in the canonical value break lines.
pub fn render_template_lines(
    segments: &[Segment],
    cursor: usize,
    selection: Option<(usize, usize)>,
) -> Vec<Line<'static>> {
    let chip_style = Style::default().fg(Color::Black).bg(Color::Cyan);
    let cursor_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let selected = |unit: usize| selection.is_some_and(|(start, end)| unit >= start && unit < end);
    let apply_selection = |style: Style, unit: usize| {
        if selected(unit) {
            style.add_modifier(Modifier::REVERSED)
        } else {
            style
        }
    };

    let mut lines: Vec<Line<'static>> = Vec::new();
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut unit = 0usize;
    for segment in segments {
        match segment {
            Segment::Text(text) => {
                for ch in text.chars() {
                    if unit == cursor {
                        spans.push(Span::styled("│", cursor_style));
                    }
                    if ch == '\n' {
                        lines.push(Line::from(std::mem::take(&mut spans)));
                    } else {
                        spans.push(Span::styled(
                            ch.to_string(),
                            apply_selection(Style::default(), unit),
                        ));
                    }
                    unit += 1;
                }
            }
            Segment::Chip(name) => {
                if unit == cursor {
                    spans.push(Span::styled("│", cursor_style));
                }
                spans.push(Span::styled(
                    chip_label(name),
                    apply_selection(chip_style, unit),
                ));
                unit += 1;
            }
        }
    }
    if unit == cursor {
        spans.push(Span::styled("│", cursor_style));
    }
    lines.push(Line::from(spans));
    lines
}

fn draw_template_screen(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    state: &TemplateScreenState,
) -> Result<(), String> {
    terminal
        .draw(|frame| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3),
                    Constraint::Min(6),
                    Constraint::Length(4),
                ])
                .split(frame.area());
            let header = Paragraph::new(Line::from(Span::styled(
                format!("Template - step `{}`", state.step_name),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )))
            .block(Block::default().borders(Borders::ALL));
            frame.render_widget(header, chunks[0]);

            let body = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
                .split(chunks[1]);

            let surface_title = if state.focus == EditorFocus::Surface {
                "Template (editing)"
            } else {
                "Template"
            };
            let lines = render_template_lines(
                &state.editor.segments(),
                state.editor.cursor(),
                state.editor.selection(),
            );
            let surface = Paragraph::new(lines)
                .wrap(Wrap { trim: false })
                .block(main_panel_block().title(surface_title));
            frame.render_widget(surface, body[0]);

            let palette_title = if state.focus == EditorFocus::Palette {
                "Variables (insert with Enter)"
            } else {
                "Variables"
            };
            let items: Vec<ListItem> = state
                .palette
                .iter()
                .enumerate()
                .map(|(idx, name)| {
                    let mut item = ListItem::new(Line::from(Span::raw(format!("{{{name}}}"))));
                    if idx == state.palette_selected && state.focus == EditorFocus::Palette {
                        item = item.style(
                            Style::default()
                                .fg(Color::Yellow)
                                .add_modifier(Modifier::BOLD),
                        );
                    }
                    item
                })
                .collect();
            frame.render_widget(
                List::new(items).block(Block::default().borders(Borders::ALL).title(palette_title)),
                body[1],
            );

            let footer = Paragraph::new(vec![
                Line::from(
                    "type to edit · tab palette · ctrl-a select all · ctrl-d delete chip · ctrl-s apply · esc cancel",
                ),
                Line::from(format!(
                    "{} chip(s), {} variable(s) available",
                    state.editor.chip_count(),
                    state.palette.len()
                )),
            ])
            .block(Block::default().borders(Borders::ALL));
            frame.render_widget(footer, chunks[2]);
        })
        .map_err(|e| format!("failed to render template screen: {e}"))?;
    Ok(())
}

pub(crate) fn run_template_tui(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    state: &mut TemplateScreenState,
) -> Result<Option<String>, String> {
    loop {
        draw_template_screen(terminal, state)?;
        let ev = event::read().map_err(|e| format!("failed to read template input: {e}"))?;
        let Some(action) = template_action_for_event(&ev, state.focus) else {
            continue;
        };
        let now_ms = chrono::Utc::now().timestamp_millis();
        match apply_template_action(state, action, now_ms) {
            Some(TemplateExit::Apply(template)) => return Ok(Some(template)),
            Some(TemplateExit::Cancel) => return Ok(None),
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocabulary() -> VariableVocabulary {
        let mut vocabulary = VariableVocabulary::new();
        vocabulary.insert_step_output("wyckoff");
        vocabulary.insert_tool("Market Data");
        vocabulary
    }

    #[test]
    fn opening_selects_all_so_typing_overwrites() {
        let mut state = TemplateScreenState::new(
            "merge".to_string(),
            "old text",
            vocabulary(),
        );
        apply_template_action(&mut state, TemplateAction::InsertChar('n'), 0);
        assert_eq!(state.editor.canonical_text(), "n");
    }

    #[test]
    fn palette_insert_routes_through_duplicate_suppression() {
        let mut state = TemplateScreenState::new("merge".to_string(), "", vocabulary());
        apply_template_action(&mut state, TemplateAction::SwitchFocus, 0);
        apply_template_action(&mut state, TemplateAction::InsertSelected, 1_000);
        apply_template_action(&mut state, TemplateAction::InsertSelected, 1_200);
        assert_eq!(state.editor.chip_count(), 1);
        apply_template_action(&mut state, TemplateAction::InsertSelected, 2_000);
        assert_eq!(state.editor.chip_count(), 2);
    }

    #[test]
    fn apply_returns_the_canonical_template() {
        let mut state = TemplateScreenState::new("merge".to_string(), "", vocabulary());
        apply_template_action(&mut state, TemplateAction::InsertChar('a'), 0);
        apply_template_action(&mut state, TemplateAction::SwitchFocus, 0);
        apply_template_action(&mut state, TemplateAction::PaletteDown, 0);
        apply_template_action(&mut state, TemplateAction::InsertSelected, 0);
        let exit = apply_template_action(&mut state, TemplateAction::Apply, 0);
        let Some(TemplateExit::Apply(template)) = exit else {
            panic!("expected apply exit");
        };
        assert!(template.starts_with('a'));
        assert!(template.contains('{') && template.ends_with('}'));
    }

    #[test]
    fn paste_is_plain_text_insertion() {
        let mut state = TemplateScreenState::new("merge".to_string(), "seed", vocabulary());
        apply_template_action(
            &mut state,
            TemplateAction::Paste("<b>rich</b>".to_string()),
            0,
        );
        assert_eq!(state.editor.canonical_text(), "<b>rich</b>");
    }

    #[test]
    fn chip_labels_show_delete_glyph_but_canonical_text_does_not() {
        let mut state = TemplateScreenState::new(
            "merge".to_string(),
            "use {wyckoff_output}",
            vocabulary(),
        );
        state.editor.move_end();
        let lines = render_template_lines(
            &state.editor.segments(),
            state.editor.cursor(),
            state.editor.selection(),
        );
        let rendered: String = lines
            .iter()
            .flat_map(|line| line.spans.iter())
            .map(|span| span.content.clone().into_owned())
            .collect();
        assert!(rendered.contains("wyckoff_output ×"));
        assert!(!state.editor.canonical_text().contains('×'));
    }

    #[test]
    fn switch_focus_blurs_and_refocuses_the_surface() {
        let mut state = TemplateScreenState::new("merge".to_string(), "ab", vocabulary());
        apply_template_action(&mut state, TemplateAction::End, 0);
        apply_template_action(&mut state, TemplateAction::SwitchFocus, 0);
        assert!(!state.editor.is_focused());
        apply_template_action(&mut state, TemplateAction::InsertSelected, 0);
        assert_eq!(state.editor.canonical_text(), "ab{market_data}");
        apply_template_action(&mut state, TemplateAction::SwitchFocus, 0);
        assert!(state.editor.is_focused());
    }
}

use crate::shared::slug::slugify_tool_name;
use std::collections::BTreeMap;

pub const STEP_OUTPUT_SUFFIX: &str = "_output";

/// How a known variable resolves at execution time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariableKind {
    /// `{<step_name>_output}`: the textual output of a prior pipeline step.
    StepOutput { step_name: String },
    /// A variable bound to an external configured tool, named by slugifying
    /// the tool's display name. Not subject to step-ordering rules.
    Tool,
}

/// The set of currently-valid variable names offered to the editor. Unknown
/// `{...}` text in a template is never an error; it simply falls outside
/// this set and renders as literal text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableVocabulary {
    entries: BTreeMap<String, VariableKind>,
}

pub fn step_output_variable(step_name: &str) -> String {
    format!("{step_name}{STEP_OUTPUT_SUFFIX}")
}

impl VariableVocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the `<step_name>_output` variable for a pipeline step.
    pub fn insert_step_output(&mut self, step_name: &str) {
        self.entries.insert(
            step_output_variable(step_name),
            VariableKind::StepOutput {
                step_name: step_name.to_string(),
            },
        );
    }

    /// Registers a tool variable from the tool's display name. Display names
    /// that slugify to nothing are skipped.
    pub fn insert_tool(&mut self, display_name: &str) {
        let slug = slugify_tool_name(display_name);
        if !slug.is_empty() {
            self.entries.insert(slug, VariableKind::Tool);
        }
    }

    #[cfg(test)]
    pub(crate) fn insert_raw(&mut self, name: &str) {
        self.entries.insert(name.to_string(), VariableKind::Tool);
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Membership test for a brace-wrapped token such as `{wyckoff_output}`.
    pub fn contains_token(&self, token: &str) -> bool {
        token
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
            .is_some_and(|name| self.contains_name(name))
    }

    pub fn kind_of(&self, name: &str) -> Option<&VariableKind> {
        self.entries.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

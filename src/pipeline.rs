use crate::shared::errors::FlowError;
use crate::template::vocabulary::VariableVocabulary;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

pub mod reorder;
pub mod validate;

fn validate_step_name_value(value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Err("step name must be non-empty".to_string());
    }
    if value
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
    {
        return Ok(());
    }
    Err("step name must use only ASCII letters, digits or '_'".to_string())
}

/// Unique name of a pipeline step. Constrained to identifier characters so
/// `{<step_name>_output}` is always a well-formed template token.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct StepName(String);

impl StepName {
    pub fn parse(raw: &str) -> Result<Self, String> {
        validate_step_name_value(raw)?;
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StepName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::borrow::Borrow<str> for StepName {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<String> for StepName {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl<'de> Deserialize<'de> for StepName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(|err| D::Error::custom(format!("invalid step name `{raw}`: {err}")))
    }
}

/// One pipeline step as persisted in the configuration blob. Execution
/// parameters beyond the template (model, temperature, max_tokens and
/// anything in `extra`) are round-tripped untouched; this tool never
/// interprets them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepConfig {
    pub step_name: StepName,
    pub order: u32,
    #[serde(default)]
    pub user_prompt_template: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl StepConfig {
    pub fn new(step_name: StepName, order: u32) -> Self {
        Self {
            step_name,
            order,
            user_prompt_template: String::new(),
            model: None,
            temperature: None,
            max_tokens: None,
            extra: BTreeMap::new(),
        }
    }
}

/// The whole step sequence, owned by the editing screen as transient state
/// and serialized as one blob on explicit save.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub steps: Vec<StepConfig>,
}

impl PipelineConfig {
    /// Restores the invariant that `order` is the 1-based array position.
    pub fn renumber(&mut self) {
        for (index, step) in self.steps.iter_mut().enumerate() {
            step.order = index as u32 + 1;
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        let mut seen = HashSet::new();
        for step in &self.steps {
            if !seen.insert(step.step_name.as_str()) {
                return Err(format!("duplicate step name `{}`", step.step_name));
            }
        }
        for (index, step) in self.steps.iter().enumerate() {
            let expected = index as u32 + 1;
            if step.order != expected {
                return Err(format!(
                    "step `{}` has order {} but sits at position {expected}",
                    step.step_name, step.order
                ));
            }
        }
        Ok(())
    }

    pub fn step_index(&self, step_name: &str) -> Option<usize> {
        self.steps
            .iter()
            .position(|step| step.step_name.as_str() == step_name)
    }

    pub fn add_step(&mut self, step_name: StepName) -> Result<usize, String> {
        if self.step_index(step_name.as_str()).is_some() {
            return Err(format!("duplicate step name `{step_name}`"));
        }
        self.steps
            .push(StepConfig::new(step_name, self.steps.len() as u32 + 1));
        Ok(self.steps.len() - 1)
    }

    pub fn remove_step(&mut self, index: usize) -> Option<StepConfig> {
        if index >= self.steps.len() {
            return None;
        }
        let removed = self.steps.remove(index);
        self.renumber();
        Some(removed)
    }

    pub fn rename_step(&mut self, index: usize, step_name: StepName) -> Result<(), String> {
        if self
            .steps
            .iter()
            .enumerate()
            .any(|(other, step)| other != index && step.step_name == step_name)
        {
            return Err(format!("duplicate step name `{step_name}`"));
        }
        let step = self
            .steps
            .get_mut(index)
            .ok_or_else(|| format!("no step at position {}", index + 1))?;
        step.step_name = step_name;
        Ok(())
    }

    /// The full variable vocabulary: every step's output variable plus the
    /// tool variables.
    pub fn vocabulary(&self, tool_names: &[String]) -> VariableVocabulary {
        let mut vocabulary = VariableVocabulary::new();
        for step in &self.steps {
            vocabulary.insert_step_output(step.step_name.as_str());
        }
        for name in tool_names {
            vocabulary.insert_tool(name);
        }
        vocabulary
    }

    /// The vocabulary the palette offers while editing the step at `index`:
    /// output variables of strictly earlier steps plus the tool variables.
    pub fn vocabulary_for_step(&self, index: usize, tool_names: &[String]) -> VariableVocabulary {
        let mut vocabulary = VariableVocabulary::new();
        for step in self.steps.iter().take(index) {
            vocabulary.insert_step_output(step.step_name.as_str());
        }
        for name in tool_names {
            vocabulary.insert_tool(name);
        }
        vocabulary
    }
}

pub fn load_pipeline_file(path: &Path) -> Result<PipelineConfig, FlowError> {
    let raw = fs::read_to_string(path).map_err(|source| FlowError::PipelineRead {
        path: path.display().to_string(),
        source,
    })?;
    let pipeline: PipelineConfig =
        serde_yaml::from_str(&raw).map_err(|source| FlowError::PipelineParse {
            path: path.display().to_string(),
            source,
        })?;
    pipeline.validate().map_err(FlowError::Pipeline)?;
    Ok(pipeline)
}

pub fn save_pipeline_file(path: &Path, pipeline: &PipelineConfig) -> Result<(), FlowError> {
    let raw = serde_yaml::to_string(pipeline).map_err(|source| FlowError::PipelineParse {
        path: path.display().to_string(),
        source,
    })?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| FlowError::PipelineWrite {
                path: path.display().to_string(),
                source,
            })?;
        }
    }
    fs::write(path, raw).map_err(|source| FlowError::PipelineWrite {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipeline(names: &[&str]) -> PipelineConfig {
        let mut pipeline = PipelineConfig::default();
        for name in names {
            pipeline
                .add_step(StepName::parse(name).expect("step name"))
                .expect("unique step");
        }
        pipeline
    }

    #[test]
    fn step_name_rejects_non_identifier_characters() {
        assert!(StepName::parse("wyckoff").is_ok());
        assert!(StepName::parse("smc_v2").is_ok());
        assert!(StepName::parse("").is_err());
        assert!(StepName::parse("bad name").is_err());
        assert!(StepName::parse("bad-name").is_err());
    }

    #[test]
    fn add_step_keeps_orders_consistent_and_unique() {
        let mut config = pipeline(&["wyckoff", "smc"]);
        assert_eq!(config.steps[0].order, 1);
        assert_eq!(config.steps[1].order, 2);
        assert!(config
            .add_step(StepName::parse("wyckoff").expect("step name"))
            .is_err());
        config.validate().expect("valid pipeline");
    }

    #[test]
    fn remove_step_renumbers_the_tail() {
        let mut config = pipeline(&["wyckoff", "smc", "merge"]);
        let removed = config.remove_step(0).expect("removed");
        assert_eq!(removed.step_name.as_str(), "wyckoff");
        assert_eq!(config.steps[0].order, 1);
        assert_eq!(config.steps[1].order, 2);
        config.validate().expect("valid pipeline");
    }

    #[test]
    fn validate_flags_order_index_drift() {
        let mut config = pipeline(&["wyckoff", "smc"]);
        config.steps[1].order = 7;
        assert!(config.validate().is_err());
    }

    #[test]
    fn vocabulary_for_step_offers_only_earlier_outputs() {
        let config = pipeline(&["wyckoff", "smc", "merge"]);
        let tools = vec!["Market Data".to_string()];
        let vocabulary = config.vocabulary_for_step(2, &tools);
        assert!(vocabulary.contains_name("wyckoff_output"));
        assert!(vocabulary.contains_name("smc_output"));
        assert!(!vocabulary.contains_name("merge_output"));
        assert!(vocabulary.contains_name("market_data"));
        let first = config.vocabulary_for_step(0, &tools);
        assert!(!first.contains_name("wyckoff_output"));
        assert!(first.contains_name("market_data"));
    }

    #[test]
    fn pipeline_blob_round_trips_unknown_fields() {
        let raw = "steps:\n  - step_name: wyckoff\n    order: 1\n    user_prompt_template: analyze\n    model: gpt-4o\n    temperature: 0.2\n    top_p: 0.9\n";
        let parsed: PipelineConfig = serde_yaml::from_str(raw).expect("parse");
        assert_eq!(parsed.steps[0].model.as_deref(), Some("gpt-4o"));
        assert_eq!(
            parsed.steps[0].extra.get("top_p"),
            Some(&serde_json::json!(0.9))
        );
        let rendered = serde_yaml::to_string(&parsed).expect("serialize");
        let reparsed: PipelineConfig = serde_yaml::from_str(&rendered).expect("reparse");
        assert_eq!(parsed, reparsed);
    }
}

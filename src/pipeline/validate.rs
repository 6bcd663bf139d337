use crate::pipeline::StepConfig;
use crate::template::scan_tokens;
use crate::template::vocabulary::STEP_OUTPUT_SUFFIX;
use std::collections::BTreeMap;

/// Step names referenced through `{<name>_output}` tokens in a template, in
/// order of first occurrence, deduplicated. Tool references use a different
/// naming scheme and are not returned.
pub fn referenced_step_names(template: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for token in scan_tokens(template) {
        let Some(name) = token.strip_suffix(STEP_OUTPUT_SUFFIX) else {
            continue;
        };
        if name.is_empty() {
            continue;
        }
        if !names.iter().any(|seen| seen == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// Outcome of an ordering check over a step sequence. Warnings are advisory
/// and user-facing; they never block a save or a reorder on their own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderValidation {
    pub is_valid: bool,
    pub warnings: Vec<String>,
}

impl OrderValidation {
    fn from_warnings(warnings: Vec<String>) -> Self {
        Self {
            is_valid: warnings.is_empty(),
            warnings,
        }
    }
}

/// Checks that every step-output reference points strictly backward. Pure:
/// callable speculatively against a proposed order and as a pre-save guard
/// against the current one. References to step names that do not exist in
/// the sequence produce no warning here; see [`unresolved_references`].
pub fn validate_order(steps: &[StepConfig]) -> OrderValidation {
    let positions: BTreeMap<&str, usize> = steps
        .iter()
        .enumerate()
        .map(|(index, step)| (step.step_name.as_str(), index))
        .collect();

    let mut warnings = Vec::new();
    for (index, step) in steps.iter().enumerate() {
        for name in referenced_step_names(&step.user_prompt_template) {
            let Some(&target) = positions.get(name.as_str()) else {
                continue;
            };
            if target > index {
                warnings.push(format!(
                    "step `{}` (position {}) references `{{{name}{STEP_OUTPUT_SUFFIX}}}`, but step `{name}` runs later at position {}",
                    step.step_name,
                    index + 1,
                    target + 1,
                ));
            } else if target == index {
                warnings.push(format!(
                    "step `{}` (position {}) references its own output `{{{name}{STEP_OUTPUT_SUFFIX}}}`",
                    step.step_name,
                    index + 1,
                ));
            }
        }
    }
    OrderValidation::from_warnings(warnings)
}

/// Step-output references whose target name matches no step in the
/// sequence. Informational only: such references are treated as
/// not-yet-resolvable, never as an ordering violation.
pub fn unresolved_references(steps: &[StepConfig]) -> Vec<String> {
    let mut notes = Vec::new();
    for (index, step) in steps.iter().enumerate() {
        for name in referenced_step_names(&step.user_prompt_template) {
            if steps.iter().all(|other| other.step_name.as_str() != name) {
                notes.push(format!(
                    "step `{}` (position {}) references `{{{name}{STEP_OUTPUT_SUFFIX}}}`, but no step is named `{name}`",
                    step.step_name,
                    index + 1,
                ));
            }
        }
    }
    notes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{PipelineConfig, StepName};

    fn steps(entries: &[(&str, &str)]) -> Vec<StepConfig> {
        let mut pipeline = PipelineConfig::default();
        for (name, template) in entries {
            let index = pipeline
                .add_step(StepName::parse(name).expect("step name"))
                .expect("unique step");
            pipeline.steps[index].user_prompt_template = (*template).to_string();
        }
        pipeline.steps
    }

    #[test]
    fn referenced_step_names_ignores_tool_tokens_and_dedupes() {
        assert_eq!(
            referenced_step_names(
                "mix {wyckoff_output} and {market_data} plus {wyckoff_output} and {smc_output}"
            ),
            vec!["wyckoff".to_string(), "smc".to_string()]
        );
        assert!(referenced_step_names("{_output} {output}").is_empty());
    }

    #[test]
    fn forward_reference_yields_one_warning_naming_both_positions() {
        let forward = steps(&[("a", "uses {b_output}"), ("b", ""), ("c", "")]);
        let validation = validate_order(&forward);
        assert!(!validation.is_valid);
        assert_eq!(validation.warnings.len(), 1);
        let warning = &validation.warnings[0];
        assert!(warning.contains("`a`"));
        assert!(warning.contains("position 1"));
        assert!(warning.contains("`b`"));
        assert!(warning.contains("position 2"));

        let backward = steps(&[("b", ""), ("a", "uses {b_output}"), ("c", "")]);
        let validation = validate_order(&backward);
        assert!(validation.is_valid);
        assert!(validation.warnings.is_empty());
    }

    #[test]
    fn self_reference_is_flagged() {
        let looped = steps(&[("solo", "re-reads {solo_output}")]);
        let validation = validate_order(&looped);
        assert!(!validation.is_valid);
        assert_eq!(validation.warnings.len(), 1);
        assert!(validation.warnings[0].contains("its own output"));
    }

    #[test]
    fn unresolvable_names_produce_no_order_warnings() {
        let sequence = steps(&[
            ("wyckoff", "analyze"),
            ("merge", "combine {wyckoff_output} and {smc_output}"),
        ]);
        let validation = validate_order(&sequence);
        assert!(validation.is_valid);
        assert!(validation.warnings.is_empty());

        let notes = unresolved_references(&sequence);
        assert_eq!(notes.len(), 1);
        assert!(notes[0].contains("`merge`"));
        assert!(notes[0].contains("{smc_output}"));
    }

    #[test]
    fn validate_order_is_idempotent_and_side_effect_free() {
        let sequence = steps(&[("a", "uses {b_output}"), ("b", "")]);
        let snapshot = sequence.clone();
        let first = validate_order(&sequence);
        let second = validate_order(&sequence);
        assert_eq!(first, second);
        assert_eq!(sequence, snapshot);
    }
}

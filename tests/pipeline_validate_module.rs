use researchflow::pipeline::validate::{
    referenced_step_names, unresolved_references, validate_order,
};
use researchflow::pipeline::{PipelineConfig, StepName};

fn steps(entries: &[(&str, &str)]) -> PipelineConfig {
    let mut pipeline = PipelineConfig::default();
    for (name, template) in entries {
        let index = pipeline
            .add_step(StepName::parse(name).expect("step name"))
            .expect("unique step");
        pipeline.steps[index].user_prompt_template = (*template).to_string();
    }
    pipeline
}

#[test]
fn validate_module_forward_reference_names_both_steps_and_positions() {
    let pipeline = steps(&[("a", "uses {b_output}"), ("b", ""), ("c", "")]);
    let validation = validate_order(&pipeline.steps);
    assert!(!validation.is_valid);
    assert_eq!(validation.warnings.len(), 1);
    let warning = &validation.warnings[0];
    for fragment in ["`a`", "position 1", "`b`", "position 2"] {
        assert!(warning.contains(fragment), "missing {fragment} in {warning}");
    }
}

#[test]
fn validate_module_backward_reference_is_clean() {
    let pipeline = steps(&[("b", ""), ("a", "uses {b_output}"), ("c", "")]);
    let validation = validate_order(&pipeline.steps);
    assert!(validation.is_valid);
    assert!(validation.warnings.is_empty());
}

#[test]
fn validate_module_unresolvable_reference_produces_zero_warnings() {
    // merge references smc_output but no step is named smc: treated as
    // not-yet-resolvable, reported separately, never an ordering violation
    let pipeline = steps(&[
        ("wyckoff", "analyze"),
        ("merge", "combine {wyckoff_output} and {smc_output}"),
    ]);
    let validation = validate_order(&pipeline.steps);
    assert!(validation.is_valid);
    assert_eq!(validation.warnings.len(), 0);

    let notes = unresolved_references(&pipeline.steps);
    assert_eq!(notes.len(), 1);
    assert!(notes[0].contains("`merge`"));
    assert!(notes[0].contains("smc"));
}

#[test]
fn validate_module_is_idempotent_over_an_unchanged_sequence() {
    let pipeline = steps(&[
        ("merge", "uses {wyckoff_output} and {smc_output}"),
        ("wyckoff", ""),
        ("smc", ""),
    ]);
    let snapshot = pipeline.steps.clone();
    let first = validate_order(&pipeline.steps);
    let second = validate_order(&pipeline.steps);
    assert_eq!(first.warnings, second.warnings);
    assert_eq!(first.is_valid, second.is_valid);
    assert_eq!(pipeline.steps, snapshot);
    assert_eq!(first.warnings.len(), 2);
}

#[test]
fn validate_module_tool_references_are_not_step_references() {
    let pipeline = steps(&[("first", "query {market_data} then go"), ("market", "")]);
    // tool variables use a different naming scheme and never count as
    // step-output references
    assert!(referenced_step_names("query {market_data} then go").is_empty());
    let validation = validate_order(&pipeline.steps);
    assert!(validation.is_valid);
    assert!(unresolved_references(&pipeline.steps).is_empty());
}

#[test]
fn validate_module_multiple_occurrences_warn_once_per_target() {
    let pipeline = steps(&[
        ("merge", "use {late_output} and again {late_output}"),
        ("late", ""),
    ]);
    let validation = validate_order(&pipeline.steps);
    assert_eq!(validation.warnings.len(), 1);
}

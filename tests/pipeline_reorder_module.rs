use researchflow::pipeline::reorder::propose_move;
use researchflow::pipeline::{PipelineConfig, StepName};

fn pipeline(entries: &[(&str, &str)]) -> PipelineConfig {
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
fn reorder_module_dragging_dependent_step_first_warns_before_commit() {
    // merge references wyckoff_output; moving merge to position 1 breaks order
    let config = pipeline(&[("wyckoff", "analyze"), ("merge", "uses {wyckoff_output}")]);
    let proposal = propose_move(&config.steps, 1, 0).expect("proposal");
    assert!(!proposal.is_clean());
    assert!(!proposal.warnings().is_empty());

    // nothing committed yet: original order is intact with wyckoff first
    assert_eq!(config.steps[0].step_name.as_str(), "wyckoff");

    // cancelling keeps wyckoff at position 1
    let kept = proposal.clone().discard();
    assert_eq!(kept[0].step_name.as_str(), "wyckoff");
    assert_eq!(kept[0].order, 1);

    // confirming applies the new order and renumbers
    let committed = proposal.commit();
    assert_eq!(committed[0].step_name.as_str(), "merge");
    assert_eq!(committed[0].order, 1);
    assert_eq!(committed[1].step_name.as_str(), "wyckoff");
    assert_eq!(committed[1].order, 2);
}

#[test]
fn reorder_module_fixing_a_forward_reference_is_clean() {
    let config = pipeline(&[("merge", "uses {wyckoff_output}"), ("wyckoff", "analyze")]);
    let proposal = propose_move(&config.steps, 1, 0).expect("proposal");
    assert!(proposal.is_clean());
    let committed = proposal.commit();
    assert_eq!(committed[0].step_name.as_str(), "wyckoff");
    assert_eq!(committed[1].step_name.as_str(), "merge");
}

#[test]
fn reorder_module_validation_runs_against_the_hypothetical_order() {
    let config = pipeline(&[
        ("a", ""),
        ("b", "uses {a_output}"),
        ("c", "uses {b_output}"),
    ]);
    // moving c to the front puts its dependency b after it
    let proposal = propose_move(&config.steps, 2, 0).expect("proposal");
    assert!(!proposal.is_clean());
    assert_eq!(proposal.warnings().len(), 1);
    assert_eq!(proposal.proposed_order()[0].step_name.as_str(), "c");
}

use researchflow::pipeline::{
    load_pipeline_file, save_pipeline_file, PipelineConfig, StepName,
};
use researchflow::shared::errors::FlowError;
use std::fs;

#[test]
fn pipeline_file_module_round_trips_the_configuration_blob() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nested/pipeline.yaml");

    let mut pipeline = PipelineConfig::default();
    let index = pipeline
        .add_step(StepName::parse("wyckoff").expect("step name"))
        .expect("unique step");
    pipeline.steps[index].user_prompt_template = "analyze {market_data}".to_string();
    pipeline.steps[index].model = Some("gpt-4o".to_string());
    pipeline.steps[index].temperature = Some(0.3);

    save_pipeline_file(&path, &pipeline).expect("save");
    let loaded = load_pipeline_file(&path).expect("load");
    assert_eq!(loaded, pipeline);
}

#[test]
fn pipeline_file_module_rejects_duplicate_step_names() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("pipeline.yaml");
    fs::write(
        &path,
        "steps:\n  - step_name: a\n    order: 1\n  - step_name: a\n    order: 2\n",
    )
    .expect("write");
    assert!(matches!(
        load_pipeline_file(&path),
        Err(FlowError::Pipeline(_))
    ));
}

#[test]
fn pipeline_file_module_rejects_invalid_step_names() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("pipeline.yaml");
    fs::write(&path, "steps:\n  - step_name: \"bad name\"\n    order: 1\n").expect("write");
    assert!(matches!(
        load_pipeline_file(&path),
        Err(FlowError::PipelineParse { .. })
    ));
}

#[test]
fn pipeline_file_module_missing_file_is_a_read_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    assert!(matches!(
        load_pipeline_file(&dir.path().join("absent.yaml")),
        Err(FlowError::PipelineRead { .. })
    ));
}

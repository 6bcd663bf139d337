use crate::api::ApiClient;
use crate::cli::{cli_help_lines, parse_cli_verb, CliVerb};
use crate::config::{
    default_settings_path, default_state_root, load_settings, ClientSettings,
};
use crate::pipeline::validate::{unresolved_references, validate_order};
use crate::pipeline::{load_pipeline_file, save_pipeline_file, PipelineConfig};
use crate::shared::errors::FlowError;
use crate::shared::logging::append_session_log_line;
use crate::shared::timers::StatusPoller;
use crate::template::{parse_segments, Segment};
use std::path::{Path, PathBuf};

pub fn run_cli(args: Vec<String>) -> Result<String, String> {
    match parse_cli_verb(&args)? {
        CliVerb::Help => Ok(cli_help_lines().join("\n")),
        CliVerb::Validate { pipeline } => cmd_validate(&pipeline),
        CliVerb::Vars { pipeline } => cmd_vars(&pipeline),
        CliVerb::Render {
            pipeline,
            step_name,
        } => cmd_render(&pipeline, &step_name),
        CliVerb::Edit { pipeline } => cmd_edit(pipeline),
        CliVerb::Pull { pipeline } => cmd_pull(pipeline),
        CliVerb::Push { pipeline } => cmd_push(pipeline),
        CliVerb::Status { document_id } => cmd_status(&document_id),
    }
}

fn load(path: &Path) -> Result<PipelineConfig, String> {
    load_pipeline_file(path).map_err(|err| err.to_string())
}

fn load_client_settings() -> Result<ClientSettings, String> {
    let settings_path = default_settings_path().map_err(|err| err.to_string())?;
    load_settings(&settings_path).map_err(|err| err.to_string())
}

fn resolve_pipeline_path(
    settings: &ClientSettings,
    pipeline: Option<PathBuf>,
) -> Result<PathBuf, String> {
    let state_root = default_state_root().map_err(|err| err.to_string())?;
    Ok(pipeline.unwrap_or_else(|| settings.pipeline_file_or_default(&state_root)))
}

fn client_from(settings: &ClientSettings) -> Result<ApiClient, String> {
    let token = settings.api_token.clone().ok_or_else(|| {
        "no api token configured; set api_token in the client settings file".to_string()
    })?;
    Ok(ApiClient::new(settings.api_base.clone(), token))
}

fn cmd_validate(path: &Path) -> Result<String, String> {
    let pipeline = load(path)?;
    let validation = validate_order(&pipeline.steps);
    let unresolved = unresolved_references(&pipeline.steps);
    let mut lines = Vec::new();
    if validation.is_valid {
        lines.push(format!(
            "order ok: {} step(s), no forward references",
            pipeline.steps.len()
        ));
    } else {
        lines.push(format!("{} warning(s):", validation.warnings.len()));
        for warning in &validation.warnings {
            lines.push(format!("  - {warning}"));
        }
    }
    if !unresolved.is_empty() {
        lines.push(format!("{} unresolved reference(s):", unresolved.len()));
        for note in &unresolved {
            lines.push(format!("  - {note}"));
        }
    }
    Ok(lines.join("\n"))
}

fn cmd_vars(path: &Path) -> Result<String, String> {
    let pipeline = load(path)?;
    let mut lines = Vec::new();
    for (index, step) in pipeline.steps.iter().enumerate() {
        let vocabulary = pipeline.vocabulary_for_step(index, &[]);
        let names: Vec<String> = vocabulary
            .names()
            .map(|name| format!("{{{name}}}"))
            .collect();
        lines.push(format!(
            "{}. {} -> {}",
            step.order,
            step.step_name,
            if names.is_empty() {
                "<none>".to_string()
            } else {
                names.join(", ")
            }
        ));
    }
    if lines.is_empty() {
        lines.push("pipeline has no steps".to_string());
    }
    Ok(lines.join("\n"))
}

fn cmd_render(path: &Path, step_name: &str) -> Result<String, String> {
    let pipeline = load(path)?;
    let index = pipeline
        .step_index(step_name)
        .ok_or_else(|| {
            FlowError::UnknownStep {
                step_name: step_name.to_string(),
            }
            .to_string()
        })?;
    let vocabulary = pipeline.vocabulary_for_step(index, &[]);
    let segments = parse_segments(&pipeline.steps[index].user_prompt_template, &vocabulary);
    let mut rendered = String::new();
    for segment in &segments {
        match segment {
            Segment::Text(text) => rendered.push_str(text),
            Segment::Chip(name) => rendered.push_str(&format!("<<{{{name}}}>>")),
        }
    }
    Ok(format!("step `{step_name}`:\n{rendered}"))
}

fn cmd_edit(pipeline: Option<PathBuf>) -> Result<String, String> {
    let settings = load_client_settings()?;
    let state_root = default_state_root().map_err(|err| err.to_string())?;
    let pipeline_path = resolve_pipeline_path(&settings, pipeline)?;

    // Tool variables and document search come from the backend when a token
    // is configured; the editor stays fully usable offline with step-output
    // variables only.
    let client = client_from(&settings).ok();
    let tool_names = match &client {
        Some(client) => match client.fetch_tools() {
            Ok(tools) => tools.into_iter().map(|tool| tool.name).collect(),
            Err(err) => {
                let _ = append_session_log_line(
                    &state_root,
                    &format!("tool fetch failed, editing without tool variables: {err}"),
                );
                Vec::new()
            }
        },
        None => Vec::new(),
    };

    let result = crate::tui::run_editor(&pipeline_path, tool_names, client)?;
    let _ = append_session_log_line(&state_root, &result);
    Ok(result)
}

fn cmd_pull(pipeline: Option<PathBuf>) -> Result<String, String> {
    let settings = load_client_settings()?;
    let path = resolve_pipeline_path(&settings, pipeline)?;
    let client = client_from(&settings)?;
    let fetched = client.fetch_pipeline().map_err(|err| err.to_string())?;
    fetched.validate()?;
    save_pipeline_file(&path, &fetched).map_err(|err| err.to_string())?;
    Ok(format!(
        "pulled {} step(s) into {}",
        fetched.steps.len(),
        path.display()
    ))
}

fn cmd_push(pipeline: Option<PathBuf>) -> Result<String, String> {
    let settings = load_client_settings()?;
    let path = resolve_pipeline_path(&settings, pipeline)?;
    let client = client_from(&settings)?;
    let pipeline = load(&path)?;
    let validation = validate_order(&pipeline.steps);
    client
        .save_pipeline(&pipeline)
        .map_err(|err| err.to_string())?;
    let mut lines = vec![format!(
        "pushed {} step(s) from {}",
        pipeline.steps.len(),
        path.display()
    )];
    if !validation.is_valid {
        lines.push(format!(
            "{} ordering warning(s) (advisory):",
            validation.warnings.len()
        ));
        for warning in &validation.warnings {
            lines.push(format!("  - {warning}"));
        }
    }
    Ok(lines.join("\n"))
}

fn cmd_status(document_id: &str) -> Result<String, String> {
    let settings = load_client_settings()?;
    let client = client_from(&settings)?;
    let mut poller = StatusPoller::default();
    let mut last = None;
    while !poller.finished() {
        let now_ms = chrono::Utc::now().timestamp_millis();
        if poller.due(now_ms) {
            poller.mark_requested(now_ms);
            let status = client
                .document_status(document_id)
                .map_err(|err| err.to_string())?;
            poller.observe(status.is_terminal(), now_ms);
            last = Some(status);
        }
        if !poller.finished() {
            std::thread::sleep(std::time::Duration::from_millis(200));
        }
    }
    let status = last.ok_or_else(|| "no status observed".to_string())?;
    Ok(format!("document {document_id} is {}", status.label()))
}

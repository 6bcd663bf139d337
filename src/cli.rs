use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliVerb {
    Help,
    Validate { pipeline: PathBuf },
    Vars { pipeline: PathBuf },
    Render { pipeline: PathBuf, step_name: String },
    Edit { pipeline: Option<PathBuf> },
    Pull { pipeline: Option<PathBuf> },
    Push { pipeline: Option<PathBuf> },
    Status { document_id: String },
}

pub fn cli_help_lines() -> Vec<String> {
    vec![
        "usage: researchflow <command> [args]".to_string(),
        "  validate <pipeline.yaml>        check step ordering and report warnings".to_string(),
        "  vars <pipeline.yaml>            list the variables each step may reference".to_string(),
        "  render <pipeline.yaml> <step>   show a step template with variable chips marked"
            .to_string(),
        "  edit [pipeline.yaml]            open the interactive pipeline editor".to_string(),
        "  pull [pipeline.yaml]            fetch the pipeline from the backend into the file"
            .to_string(),
        "  push [pipeline.yaml]            save the local pipeline file to the backend".to_string(),
        "  status <document-id>            poll a document's processing status until it settles"
            .to_string(),
        "  help                            show this help".to_string(),
    ]
}

pub fn parse_cli_verb(args: &[String]) -> Result<CliVerb, String> {
    let Some(verb) = args.first() else {
        return Ok(CliVerb::Help);
    };
    match verb.as_str() {
        "help" | "--help" | "-h" => Ok(CliVerb::Help),
        "validate" => {
            let pipeline = args
                .get(1)
                .ok_or_else(|| "validate requires a pipeline file path".to_string())?;
            Ok(CliVerb::Validate {
                pipeline: PathBuf::from(pipeline),
            })
        }
        "vars" => {
            let pipeline = args
                .get(1)
                .ok_or_else(|| "vars requires a pipeline file path".to_string())?;
            Ok(CliVerb::Vars {
                pipeline: PathBuf::from(pipeline),
            })
        }
        "render" => {
            let pipeline = args
                .get(1)
                .ok_or_else(|| "render requires a pipeline file path".to_string())?;
            let step_name = args
                .get(2)
                .ok_or_else(|| "render requires a step name".to_string())?;
            Ok(CliVerb::Render {
                pipeline: PathBuf::from(pipeline),
                step_name: step_name.clone(),
            })
        }
        "edit" => Ok(CliVerb::Edit {
            pipeline: args.get(1).map(PathBuf::from),
        }),
        "pull" => Ok(CliVerb::Pull {
            pipeline: args.get(1).map(PathBuf::from),
        }),
        "push" => Ok(CliVerb::Push {
            pipeline: args.get(1).map(PathBuf::from),
        }),
        "status" => {
            let document_id = args
                .get(1)
                .ok_or_else(|| "status requires a document id".to_string())?;
            Ok(CliVerb::Status {
                document_id: document_id.clone(),
            })
        }
        other => Err(format!(
            "unknown command `{other}`; run `researchflow help` for usage"
        )),
    }
}

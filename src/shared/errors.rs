use crate::api::ApiError;
use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("api error: {0}")]
    Api(#[from] ApiError),
    #[error("failed to read pipeline file {path}: {source}")]
    PipelineRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid yaml in pipeline file {path}: {source}")]
    PipelineParse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("failed to write pipeline file {path}: {source}")]
    PipelineWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("pipeline validation failed: {0}")]
    Pipeline(String),
    #[error("no step named `{step_name}` in pipeline")]
    UnknownStep { step_name: String },
}

use crate::pipeline::PipelineConfig;
use serde::Deserialize;

const DEFAULT_API_BASE: &str = "https://api.researchflow.app/v1";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("api request failed: {0}")]
    Request(String),
    #[error("api returned status {status} for {path}")]
    Status { status: u16, path: String },
    #[error("failed to decode api response: {0}")]
    Decode(String),
}

/// Processing state of an uploaded knowledge-base document. `completed` and
/// `failed` are terminal; polling stops once either is observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl DocumentStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, DocumentStatus::Completed | DocumentStatus::Failed)
    }

    pub fn label(self) -> &'static str {
        match self {
            DocumentStatus::Pending => "pending",
            DocumentStatus::Processing => "processing",
            DocumentStatus::Completed => "completed",
            DocumentStatus::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToolSummary {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DocumentSummary {
    pub id: String,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
struct DocumentStatusData {
    status: DocumentStatus,
}

#[derive(Debug, Clone, Deserialize)]
struct ToolListData {
    tools: Vec<ToolSummary>,
}

#[derive(Debug, Clone, Deserialize)]
struct SearchData {
    documents: Vec<DocumentSummary>,
}

/// Blocking client for the Research Flow backend. Owns no state beyond the
/// base URL and bearer token; every call is one request.
#[derive(Debug, Clone)]
pub struct ApiClient {
    api_base: String,
    api_token: String,
}

impl ApiClient {
    pub fn new(api_base: Option<String>, api_token: String) -> Self {
        let api_base = std::env::var("RESEARCHFLOW_API_BASE")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .or(api_base)
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        Self {
            api_base,
            api_token,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base.trim_end_matches('/'), path)
    }

    fn get<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let mut url = self.endpoint(path);
        if !query.is_empty() {
            let encoded = query
                .iter()
                .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
                .collect::<Vec<_>>()
                .join("&");
            url = format!("{url}?{encoded}");
        }

        let response = ureq::get(&url)
            .set("Authorization", &format!("Bearer {}", self.api_token))
            .call()
            .map_err(|err| match err {
                ureq::Error::Status(status, _) => ApiError::Status {
                    status,
                    path: path.to_string(),
                },
                other => ApiError::Request(other.to_string()),
            })?;

        response
            .into_json::<T>()
            .map_err(|err| ApiError::Decode(err.to_string()))
    }

    fn put_json<B: serde::Serialize>(&self, path: &str, body: &B) -> Result<(), ApiError> {
        let url = self.endpoint(path);
        ureq::put(&url)
            .set("Authorization", &format!("Bearer {}", self.api_token))
            .send_json(serde_json::to_value(body).map_err(|err| ApiError::Decode(err.to_string()))?)
            .map_err(|err| match err {
                ureq::Error::Status(status, _) => ApiError::Status {
                    status,
                    path: path.to_string(),
                },
                other => ApiError::Request(other.to_string()),
            })?;
        Ok(())
    }

    /// The pipeline configuration blob as the settings screens persist it.
    pub fn fetch_pipeline(&self) -> Result<PipelineConfig, ApiError> {
        self.get("settings/pipeline", &[])
    }

    pub fn save_pipeline(&self, pipeline: &PipelineConfig) -> Result<(), ApiError> {
        self.put_json("settings/pipeline", pipeline)
    }

    /// The configured tools whose slugified names join the variable
    /// vocabulary.
    pub fn fetch_tools(&self) -> Result<Vec<ToolSummary>, ApiError> {
        let data: ToolListData = self.get("settings/tools", &[])?;
        Ok(data.tools)
    }

    pub fn document_status(&self, document_id: &str) -> Result<DocumentStatus, ApiError> {
        let data: DocumentStatusData =
            self.get(&format!("documents/{document_id}/status"), &[])?;
        Ok(data.status)
    }

    pub fn search_documents(&self, query: &str) -> Result<Vec<DocumentSummary>, ApiError> {
        let data: SearchData =
            self.get("documents/search", &[("q", query.to_string())])?;
        Ok(data.documents)
    }
}

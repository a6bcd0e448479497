use core_types::{AgentError, ErrorCode, Severity};
use inference_client::error::InferenceError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("Inference client error: {0}")]
    Inference(#[from] InferenceError),

    #[error("Failed to serialize the prompt payload: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<AnalyzerError> for AgentError {
    fn from(err: AnalyzerError) -> Self {
        match err {
            AnalyzerError::Inference(e) => e.into(),
            AnalyzerError::Serialization(e) => {
                AgentError::new(ErrorCode::UnknownError, Severity::Medium, e.to_string())
            }
        }
    }
}

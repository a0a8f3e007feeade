mod openai;

use std::fmt;

use async_trait::async_trait;
#[cfg(any(test, feature = "mock"))]
use mockall::automock;
pub use openai::OpenAiBackend;
use serde::{
    Deserialize,
    Serialize,
};

use crate::actions::ActionRequest;
use crate::errors::*;

err_impl! {BackendError,
    #[error("reasoning backend unavailable: {0}")]
    Unavailable(String),

    #[error("malformed reasoning backend response: {0}")]
    MalformedResponse(String),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TranscriptMessage {
    pub role: Role,
    pub content: String,
}

impl TranscriptMessage {
    pub fn system(content: &str) -> TranscriptMessage {
        TranscriptMessage { role: Role::System, content: content.into() }
    }

    pub fn user(content: &str) -> TranscriptMessage {
        TranscriptMessage { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: &str) -> TranscriptMessage {
        TranscriptMessage { role: Role::Assistant, content: content.into() }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct FinalAnalysis {
    pub root_cause: String,
    pub remediation: String,
}

impl fmt::Display for FinalAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Root Cause: {}\nRemediation:\n{}", self.root_cause, self.remediation)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BackendResponse {
    // Never empty
    Actions(Vec<ActionRequest>),
    Final(FinalAnalysis),
}

// A reasoning backend turns the session transcript into either some more diagnostic actions to run,
// or a final analysis.  Implementations should report transport failures as
// BackendError::Unavailable and anything that doesn't match the response schema as
// BackendError::MalformedResponse.
#[cfg_attr(any(test, feature = "mock"), automock)]
#[async_trait]
pub trait ReasoningBackend: Send + Sync {
    async fn submit(&self, transcript: &[TranscriptMessage]) -> anyhow::Result<BackendResponse>;
}

pub fn is_backend_error(err: &anyhow::Error) -> bool {
    err.downcast_ref::<BackendError>().is_some()
}

#[cfg(test)]
mod tests;

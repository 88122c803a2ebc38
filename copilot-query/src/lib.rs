//! Query router boundary: forwards a clinical question plus patient summary to a
//! pluggable model backend and returns the answer text.
//!
//! Model inference itself is out of scope here. Every backend is an HTTP
//! service reached with a blocking client that is built once and reused.

mod config;
mod hosted;
mod http;
pub mod keywords;
mod local;
mod prompt;
mod qa;
mod router;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use config::{HostedConfig, LocalConfig, QaConfig, RouterConfig};
pub use hosted::HostedBackend;
pub use local::LocalBackend;
pub use prompt::{strip_prompt_echo, Prompt, RISK_REVIEW_QUESTION, SUMMARIZE_REQUEST};
pub use qa::QaBackend;
pub use router::{QueryAnswer, QueryRouter};

/// Identifies one of the swappable answer backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Hosted generative API behind a bearer token.
    Hosted,
    /// Locally served generative model (Ollama-compatible).
    Local,
    /// Extractive question-answering microservice.
    Qa,
}

impl BackendKind {
    pub const ALL: [BackendKind; 3] = [BackendKind::Hosted, BackendKind::Local, BackendKind::Qa];

    pub fn as_str(self) -> &'static str {
        match self {
            BackendKind::Hosted => "hosted",
            BackendKind::Local => "local",
            BackendKind::Qa => "qa",
        }
    }

    /// Human readable label used in error messages and progress output.
    pub fn label(self) -> &'static str {
        match self {
            BackendKind::Hosted => "hosted model API",
            BackendKind::Local => "local model",
            BackendKind::Qa => "question-answering service",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for BackendKind {
    type Err = QueryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        BackendKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| QueryError::UnknownBackend(value.to_string()))
    }
}

/// A model backend. Implementations block until the service answers or fails.
pub trait QueryBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    fn complete(&self, prompt: &Prompt) -> Result<String, QueryError>;
}

/// Failures of the query boundary. Backend failures carry the backend they came from.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("unknown backend `{0}` (expected hosted, local or qa)")]
    UnknownBackend(String),
    #[error("{0} is not configured")]
    NotConfigured(BackendKind),
    #[error("question is empty")]
    EmptyQuestion,
    #[error("no text to summarize")]
    EmptyText,
    #[error("{backend}: summarization is not supported")]
    SummarizeUnsupported { backend: BackendKind },
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("cannot build HTTP client: {0}")]
    Client(String),
    #[error("{backend}: cannot reach {url}")]
    Connection { backend: BackendKind, url: String },
    #[error("{backend}: request timed out")]
    Timeout { backend: BackendKind },
    #[error("{backend}: HTTP {status}: {body}")]
    Status {
        backend: BackendKind,
        status: u16,
        body: String,
    },
    #[error("{backend}: unreadable response: {detail}")]
    Response { backend: BackendKind, detail: String },
    #[error("{backend}: {detail}")]
    Http { backend: BackendKind, detail: String },
}

impl QueryError {
    /// The backend that produced this failure, if any.
    pub fn backend(&self) -> Option<BackendKind> {
        match self {
            QueryError::NotConfigured(backend)
            | QueryError::SummarizeUnsupported { backend }
            | QueryError::Connection { backend, .. }
            | QueryError::Timeout { backend }
            | QueryError::Status { backend, .. }
            | QueryError::Response { backend, .. }
            | QueryError::Http { backend, .. } => Some(*backend),
            _ => None,
        }
    }
}

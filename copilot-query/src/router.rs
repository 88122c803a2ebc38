use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::{
    BackendKind, HostedBackend, LocalBackend, Prompt, QaBackend, QueryBackend, QueryError,
    RouterConfig,
};

/// An answer together with where and when it came from.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct QueryAnswer {
    pub backend: BackendKind,
    pub question: String,
    pub answer: String,
    pub answered_at: DateTime<Utc>,
}

/// Service handle owning one client per configured backend.
///
/// Build it once at startup and pass it by reference; calls take `&self`
/// so independent sessions can share it.
#[derive(Default)]
pub struct QueryRouter {
    backends: Vec<Box<dyn QueryBackend>>,
}

impl QueryRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &RouterConfig) -> Result<Self, QueryError> {
        let mut router = Self::new();
        if let Some(hosted) = &config.hosted {
            router = router.with_backend(HostedBackend::new(hosted, config)?);
        }
        if let Some(local) = &config.local {
            router = router.with_backend(LocalBackend::new(local, config)?);
        }
        if let Some(qa) = &config.qa {
            router = router.with_backend(QaBackend::new(qa, config)?);
        }
        Ok(router)
    }

    /// Register `backend`, replacing any backend of the same kind.
    pub fn with_backend(mut self, backend: impl QueryBackend + 'static) -> Self {
        let kind = backend.kind();
        self.backends.retain(|existing| existing.kind() != kind);
        self.backends.push(Box::new(backend));
        self
    }

    pub fn available(&self) -> Vec<BackendKind> {
        self.backends.iter().map(|backend| backend.kind()).collect()
    }

    /// Answer `question` using `context` (normally a patient summary).
    pub fn ask(
        &self,
        kind: BackendKind,
        context: &str,
        question: &str,
    ) -> Result<QueryAnswer, QueryError> {
        if question.trim().is_empty() {
            return Err(QueryError::EmptyQuestion);
        }
        self.run(kind, Prompt::question(context, question.trim()))
    }

    /// Ask for the top potential clinical risks in `context`.
    pub fn review_risks(&self, kind: BackendKind, context: &str) -> Result<QueryAnswer, QueryError> {
        self.run(kind, Prompt::risk_review(context))
    }

    /// Condense free-text `notes`. Extractive backends cannot summarize and are refused.
    pub fn summarize(&self, kind: BackendKind, notes: &str) -> Result<QueryAnswer, QueryError> {
        if notes.trim().is_empty() {
            return Err(QueryError::EmptyText);
        }
        if kind == BackendKind::Qa {
            return Err(QueryError::SummarizeUnsupported { backend: kind });
        }
        self.run(kind, Prompt::summarize(notes.trim()))
    }

    fn run(&self, kind: BackendKind, prompt: Prompt) -> Result<QueryAnswer, QueryError> {
        let backend = self
            .backends
            .iter()
            .find(|backend| backend.kind() == kind)
            .ok_or(QueryError::NotConfigured(kind))?;

        let started = Instant::now();
        let result = backend.complete(&prompt);
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(answer) => {
                info!(backend = kind.as_str(), elapsed_ms, "backend answered");
                Ok(QueryAnswer {
                    backend: kind,
                    question: prompt.question_text().to_string(),
                    answer,
                    answered_at: Utc::now(),
                })
            }
            Err(err) => {
                warn!(backend = kind.as_str(), elapsed_ms, error = %err, "backend failed");
                Err(err)
            }
        }
    }
}

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::QaConfig;
use crate::http::{build_client, post_json};
use crate::{BackendKind, Prompt, QueryBackend, QueryError, RouterConfig};

/// Extractive question answering: the service picks an answer span out of the context.
pub struct QaBackend {
    url: String,
    client: Client,
}

#[derive(Serialize)]
struct QaRequest<'a> {
    question: &'a str,
    context: &'a str,
}

#[derive(Deserialize)]
struct QaResponse {
    #[serde(default)]
    answer: String,
    #[serde(default)]
    score: Option<f64>,
}

impl QaBackend {
    pub fn new(config: &QaConfig, router: &RouterConfig) -> Result<Self, QueryError> {
        Ok(Self {
            url: config.url.clone(),
            client: build_client(router.timeout)?,
        })
    }
}

impl QueryBackend for QaBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Qa
    }

    fn complete(&self, prompt: &Prompt) -> Result<String, QueryError> {
        let response: QaResponse = post_json(
            &self.client,
            BackendKind::Qa,
            &self.url,
            None,
            &QaRequest {
                question: prompt.question_text(),
                context: prompt.context(),
            },
        )?;

        debug!(score = ?response.score, "question-answering service replied");
        Ok(response.answer.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_sends_question_and_context_separately() {
        let prompt = Prompt::question("Condition: Asthma", "Which condition?");
        let body = serde_json::to_value(QaRequest {
            question: prompt.question_text(),
            context: prompt.context(),
        })
        .unwrap();

        assert_eq!(
            body,
            json!({"question": "Which condition?", "context": "Condition: Asthma"})
        );
    }

    #[test]
    fn response_without_answer_is_empty() {
        let response: QaResponse = serde_json::from_value(json!({"score": 0.01})).unwrap();
        assert_eq!(response.answer, "");
        assert_eq!(response.score, Some(0.01));
    }
}

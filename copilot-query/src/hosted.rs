use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::HostedConfig;
use crate::http::{build_client, post_json};
use crate::{BackendKind, Prompt, QueryBackend, QueryError, RouterConfig};

const NO_RESPONSE: &str = "No response";

/// Hosted generative API: `POST {"prompt": ...}` with a bearer token.
pub struct HostedBackend {
    endpoint: String,
    api_key: String,
    client: Client,
}

#[derive(Serialize)]
struct HostedRequest<'a> {
    prompt: &'a str,
}

#[derive(Deserialize)]
struct HostedResponse {
    #[serde(default)]
    generated_text: Option<String>,
}

impl HostedBackend {
    pub fn new(config: &HostedConfig, router: &RouterConfig) -> Result<Self, QueryError> {
        Ok(Self {
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            client: build_client(router.timeout)?,
        })
    }
}

impl QueryBackend for HostedBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Hosted
    }

    fn complete(&self, prompt: &Prompt) -> Result<String, QueryError> {
        let text = prompt.render();
        debug!(endpoint = %self.endpoint, prompt_chars = text.len(), "calling hosted model");

        let response: HostedResponse = post_json(
            &self.client,
            BackendKind::Hosted,
            &self.endpoint,
            Some(&self.api_key),
            &HostedRequest { prompt: &text },
        )?;

        Ok(answer_text(response))
    }
}

fn answer_text(response: HostedResponse) -> String {
    response
        .generated_text
        .unwrap_or_else(|| NO_RESPONSE.to_string())
}

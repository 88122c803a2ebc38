use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::LocalConfig;
use crate::http::{build_client, post_json};
use crate::{strip_prompt_echo, BackendKind, Prompt, QueryBackend, QueryError, RouterConfig};

/// Locally served generative model speaking the Ollama `/api/generate` protocol.
pub struct LocalBackend {
    base_url: String,
    model: String,
    client: Client,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

impl LocalBackend {
    pub fn new(config: &LocalConfig, router: &RouterConfig) -> Result<Self, QueryError> {
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            client: build_client(router.timeout)?,
        })
    }

    fn generate_url(&self) -> String {
        format!("{}/api/generate", self.base_url)
    }
}

impl QueryBackend for LocalBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Local
    }

    fn complete(&self, prompt: &Prompt) -> Result<String, QueryError> {
        let text = prompt.render();
        let url = self.generate_url();
        debug!(url = %url, model = %self.model, "calling local model");

        let response: GenerateResponse = post_json(
            &self.client,
            BackendKind::Local,
            &url,
            None,
            &GenerateRequest {
                model: &self.model,
                prompt: &text,
                stream: false,
            },
        )?;

        Ok(strip_prompt_echo(&response.response, &text))
    }
}

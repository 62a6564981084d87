//! `reqwest`-backed [`ContentGenerator`] (`spec.md` §4.7). Request/response
//! shapes are this workspace's own contract with that service, since the
//! spec leaves the generator's wire format unspecified.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use srs_domain::{Card, CoreError, TaskType};
use srs_tasks::ContentGenerator;

/// Calls an external content-generation service over HTTP.
pub struct HttpContentGenerator {
    client: reqwest::Client,
    base_url: String,
}

impl HttpContentGenerator {
    #[must_use]
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    card_fields: &'a Json,
    task_type: TaskType,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    content: Json,
    answer: String,
}

#[async_trait]
impl ContentGenerator for HttpContentGenerator {
    async fn generate(&self, card: &Card, task_type: TaskType) -> Result<(Json, String), CoreError> {
        let url = format!("{}/generate", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(url)
            .json(&GenerateRequest {
                card_fields: &card.fields,
                task_type,
            })
            .send()
            .await
            .map_err(|e| CoreError::ExternalUnavailable(format!("content generator: {e}")))?;

        if !response.status().is_success() {
            return Err(CoreError::ExternalUnavailable(format!(
                "content generator returned {}",
                response.status()
            )));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| CoreError::ExternalUnavailable(format!("content generator: bad response: {e}")))?;
        Ok((body.content, body.answer))
    }
}

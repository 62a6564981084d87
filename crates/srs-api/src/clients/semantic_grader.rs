//! `reqwest`-backed [`SemanticGrader`] (`spec.md` §4.8).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use srs_domain::CoreError;
use srs_tasks::SemanticGrader;

/// Calls an external semantic-grading service over HTTP.
pub struct HttpSemanticGrader {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSemanticGrader {
    #[must_use]
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }
}

#[derive(Debug, Serialize)]
struct GradeRequest<'a> {
    response: &'a str,
    expected: &'a str,
}

#[derive(Debug, Deserialize)]
struct GradeResponse {
    score: u8,
    feedback: Option<String>,
}

#[async_trait]
impl SemanticGrader for HttpSemanticGrader {
    async fn grade(&self, response: &str, expected: &str) -> Result<(u8, Option<String>), CoreError> {
        let url = format!("{}/grade", self.base_url.trim_end_matches('/'));
        let http_response = self
            .client
            .post(url)
            .json(&GradeRequest { response, expected })
            .send()
            .await
            .map_err(|e| CoreError::ExternalUnavailable(format!("semantic grader: {e}")))?;

        if !http_response.status().is_success() {
            return Err(CoreError::ExternalUnavailable(format!(
                "semantic grader returned {}",
                http_response.status()
            )));
        }

        let body: GradeResponse = http_response
            .json()
            .await
            .map_err(|e| CoreError::ExternalUnavailable(format!("semantic grader: bad response: {e}")))?;
        Ok((body.score, body.feedback))
    }
}

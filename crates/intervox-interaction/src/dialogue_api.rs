//! DialogueApiClient - REST client for the dialogue-generation backend.
//!
//! The backend exposes two request/response endpoints, one for the
//! interview introduction and one for processing the next question. No
//! streaming; every failure surfaces as `DialogueService`.

use async_trait::async_trait;
use intervox_core::dialogue::{DialogueService, IntroductionRequest, NextUtteranceRequest};
use intervox_core::error::{IntervoxError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

const INTRO_PATH: &str = "/api/chats/v1/generate-intro";
const PROCESS_PATH: &str = "/api/chats/v1/process-question";

/// HTTP implementation of [`DialogueService`].
#[derive(Clone)]
pub struct DialogueApiClient {
    client: Client,
    base_url: String,
}

impl DialogueApiClient {
    /// Creates a client for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    async fn post_for_text<B: Serialize>(&self, path: &str, body: &B) -> Result<String> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|err| {
                IntervoxError::dialogue_service(format!("request to {url} failed: {err}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read error body".to_string());
            return Err(IntervoxError::dialogue_service(format!(
                "{url} returned {status}: {body_text}"
            )));
        }

        let parsed: GenerationResponse = response.json().await.map_err(|err| {
            IntervoxError::dialogue_service(format!("malformed response from {url}: {err}"))
        })?;
        Ok(parsed.response)
    }
}

#[async_trait]
impl DialogueService for DialogueApiClient {
    async fn generate_introduction(&self, request: IntroductionRequest) -> Result<String> {
        tracing::debug!(candidate = %request.candidate_name, "requesting interview introduction");
        self.post_for_text(INTRO_PATH, &GenerateIntroBody::from(request))
            .await
    }

    async fn generate_next_utterance(&self, request: NextUtteranceRequest) -> Result<String> {
        tracing::debug!(question = %request.current_question, "requesting next utterance");
        self.post_for_text(PROCESS_PATH, &ProcessQuestionBody::from(request))
            .await
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateIntroBody {
    candidate_name: String,
    job_title: String,
    company_name: String,
}

impl From<IntroductionRequest> for GenerateIntroBody {
    fn from(request: IntroductionRequest) -> Self {
        Self {
            candidate_name: request.candidate_name,
            job_title: request.job_title,
            company_name: request.company_name,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProcessQuestionBody {
    current_question: String,
    last_user_response: String,
    last_assistant_response: String,
    candidate_name: String,
    job_title: String,
    company_name: String,
}

impl From<NextUtteranceRequest> for ProcessQuestionBody {
    fn from(request: NextUtteranceRequest) -> Self {
        Self {
            current_question: request.current_question,
            last_user_response: request.last_candidate_text,
            last_assistant_response: request.last_interviewer_text,
            candidate_name: request.candidate_name,
            job_title: request.job_title,
            company_name: request.company_name,
        }
    }
}

#[derive(Deserialize)]
struct GenerationResponse {
    response: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_question_body_uses_backend_field_names() {
        let body = ProcessQuestionBody::from(NextUtteranceRequest {
            current_question: "Describe your last project.".to_string(),
            last_candidate_text: "I built a cache".to_string(),
            last_interviewer_text: "Welcome".to_string(),
            candidate_name: "Dana".to_string(),
            job_title: "Backend Developer".to_string(),
            company_name: "Acme".to_string(),
        });

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["currentQuestion"], "Describe your last project.");
        assert_eq!(json["lastUserResponse"], "I built a cache");
        assert_eq!(json["lastAssistantResponse"], "Welcome");
        assert_eq!(json["candidateName"], "Dana");
    }

    #[test]
    fn test_generation_response_parses_backend_shape() {
        let parsed: GenerationResponse =
            serde_json::from_str(r#"{"response":"Tell me more."}"#).unwrap();
        assert_eq!(parsed.response, "Tell me more.");
    }
}

//! StreamingAvatarClient - REST client for the streaming-avatar provider.
//!
//! Wraps the provider's session protocol (`streaming.new`, `streaming.task`,
//! `streaming.stop`). Every call carries the bearer token; connection-level
//! failures on an established session map to `TransportDisconnected` so the
//! controller can mark the session lost.

use async_trait::async_trait;
use intervox_core::avatar::{AvatarConfig, AvatarTransport, CreatedSession, RemoteStreamHandle};
use intervox_core::error::{IntervoxError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

const NEW_PATH: &str = "/v1/streaming.new";
const TASK_PATH: &str = "/v1/streaming.task";
const STOP_PATH: &str = "/v1/streaming.stop";

/// HTTP implementation of [`AvatarTransport`].
///
/// Holds the bearer token so speak/stop commands can authenticate after
/// the handshake.
#[derive(Clone)]
pub struct StreamingAvatarClient {
    client: Client,
    base_url: String,
    token: String,
}

impl StreamingAvatarClient {
    /// Creates a client for the given provider base URL and bearer token.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    async fn post_session_command<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|err| {
                if err.is_connect() || err.is_timeout() {
                    IntervoxError::TransportDisconnected
                } else {
                    IntervoxError::internal(format!("request to {url} failed: {err}"))
                }
            })?;
        Ok(response)
    }
}

#[async_trait]
impl AvatarTransport for StreamingAvatarClient {
    async fn create_session(&self, token: &str, config: &AvatarConfig) -> Result<CreatedSession> {
        let url = format!("{}{}", self.base_url, NEW_PATH);
        let body = NewSessionBody::from(config);
        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                IntervoxError::session_create_failed(format!("handshake with {url} failed: {err}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read error body".to_string());
            return Err(IntervoxError::session_create_failed(format!(
                "{url} returned {status}: {body_text}"
            )));
        }

        let parsed: NewSessionResponse = response.json().await.map_err(|err| {
            IntervoxError::session_create_failed(format!("malformed handshake response: {err}"))
        })?;

        tracing::info!(session_id = %parsed.data.session_id, "avatar session created");
        Ok(CreatedSession {
            session_id: parsed.data.session_id,
            stream: RemoteStreamHandle {
                url: parsed.data.url,
            },
        })
    }

    async fn speak(&self, session_id: &str, text: &str) -> Result<()> {
        let body = TaskBody {
            session_id: session_id.to_string(),
            text: text.to_string(),
        };
        let response = self.post_session_command(TASK_PATH, &body).await?;

        if !response.status().is_success() {
            return Err(IntervoxError::internal(format!(
                "streaming.task returned {} for session {session_id}",
                response.status()
            )));
        }
        Ok(())
    }

    async fn stop_session(&self, session_id: &str) -> Result<()> {
        let body = StopBody {
            session_id: session_id.to_string(),
        };
        let response = self.post_session_command(STOP_PATH, &body).await?;

        if !response.status().is_success() {
            return Err(IntervoxError::internal(format!(
                "streaming.stop returned {} for session {session_id}",
                response.status()
            )));
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct NewSessionBody {
    avatar_name: String,
    quality: String,
    voice: VoiceSettings,
    disable_idle_timeout: bool,
}

#[derive(Serialize)]
struct VoiceSettings {
    rate: f32,
    language: String,
}

impl From<&AvatarConfig> for NewSessionBody {
    fn from(config: &AvatarConfig) -> Self {
        Self {
            avatar_name: config.avatar_name.clone(),
            quality: config.quality.clone(),
            voice: VoiceSettings {
                rate: config.voice_rate,
                language: config.language.clone(),
            },
            disable_idle_timeout: config.disable_idle_timeout,
        }
    }
}

#[derive(Serialize)]
struct TaskBody {
    session_id: String,
    text: String,
}

#[derive(Serialize)]
struct StopBody {
    session_id: String,
}

#[derive(Deserialize)]
struct NewSessionResponse {
    data: NewSessionData,
}

#[derive(Deserialize)]
struct NewSessionData {
    session_id: String,
    url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_body_mirrors_config() {
        let config = AvatarConfig::default();
        let json = serde_json::to_value(NewSessionBody::from(&config)).unwrap();
        assert_eq!(json["avatar_name"], "josh_lite3_20230714");
        assert_eq!(json["quality"], "low");
        assert_eq!(json["voice"]["language"], "en");
        assert_eq!(json["disable_idle_timeout"], true);
    }

    #[test]
    fn test_new_session_response_parses_provider_shape() {
        let raw = r#"{"data":{"session_id":"sess-1","url":"wss://stream.example/sess-1"}}"#;
        let parsed: NewSessionResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.data.session_id, "sess-1");
        assert_eq!(parsed.data.url, "wss://stream.example/sess-1");
    }
}

//! Environment-based configuration for the remote service clients.

use intervox_core::error::{IntervoxError, Result};
use std::env;

const DEFAULT_DIALOGUE_URL: &str = "http://localhost:3001";
const DEFAULT_DIRECTORY_URL: &str = "http://localhost:8081";
const DEFAULT_ADMIN_URL: &str = "http://localhost:8082";
const DEFAULT_AVATAR_URL: &str = "https://api.heygen.com";

/// Endpoints and credentials for the remote services.
#[derive(Debug, Clone)]
pub struct InteractionConfig {
    /// Base URL of the dialogue-generation backend.
    pub dialogue_url: String,
    /// Base URL of the interview directory (interview id lookup).
    pub directory_url: String,
    /// Base URL of the interview administration service (question lists).
    pub admin_url: String,
    /// Base URL of the streaming-avatar provider.
    pub avatar_url: String,
    /// Bearer token for the streaming-avatar provider.
    pub avatar_token: String,
}

impl InteractionConfig {
    /// Loads configuration from environment variables.
    ///
    /// Service URLs fall back to their local development defaults; only
    /// `INTERVOX_AVATAR_TOKEN` is required.
    pub fn try_from_env() -> Result<Self> {
        let avatar_token = env::var("INTERVOX_AVATAR_TOKEN").map_err(|_| {
            IntervoxError::config("INTERVOX_AVATAR_TOKEN not found in environment variables")
        })?;

        Ok(Self {
            dialogue_url: env::var("INTERVOX_DIALOGUE_URL")
                .unwrap_or_else(|_| DEFAULT_DIALOGUE_URL.into()),
            directory_url: env::var("INTERVOX_DIRECTORY_URL")
                .unwrap_or_else(|_| DEFAULT_DIRECTORY_URL.into()),
            admin_url: env::var("INTERVOX_ADMIN_URL").unwrap_or_else(|_| DEFAULT_ADMIN_URL.into()),
            avatar_url: env::var("INTERVOX_AVATAR_URL")
                .unwrap_or_else(|_| DEFAULT_AVATAR_URL.into()),
            avatar_token,
        })
    }
}

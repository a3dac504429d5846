//! InterviewDirectoryClient - REST client for the interview directory and
//! administration services.
//!
//! The directory resolves a username to their scheduled interview; the
//! administration service returns the ordered question list for that
//! interview. Only interviews still in the pending state are eligible to
//! start.

use intervox_core::context::Question;
use intervox_core::error::{IntervoxError, Result};
use reqwest::Client;
use serde::Deserialize;

/// Directory state code for an interview that has not started yet.
const PENDING_STATE: &str = "PG";

const DIRECTORY_PATH: &str = "/api/orquestador/v1/entrevistadores";
const QUESTIONS_PATH: &str = "/api/administrador-entrevista/v1/preguntas/entrevistas";

/// A candidate's scheduled interview as reported by the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledInterview {
    pub interview_id: i64,
    pub state: String,
}

impl ScheduledInterview {
    /// Whether the interview is still waiting to be conducted.
    pub fn is_pending(&self) -> bool {
        self.state == PENDING_STATE
    }
}

/// HTTP client for interview lookup and question retrieval.
#[derive(Clone)]
pub struct InterviewDirectoryClient {
    client: Client,
    directory_url: String,
    admin_url: String,
}

impl InterviewDirectoryClient {
    /// Creates a client for the given directory and administration base URLs.
    pub fn new(directory_url: impl Into<String>, admin_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            directory_url: directory_url.into(),
            admin_url: admin_url.into(),
        }
    }

    /// Looks up the pending interview scheduled for a username.
    ///
    /// # Errors
    ///
    /// Returns `DialogueService` when the lookup fails, the user has no
    /// scheduled interview, or the interview is no longer pending.
    pub async fn find_pending_interview(&self, username: &str) -> Result<ScheduledInterview> {
        let url = format!("{}{DIRECTORY_PATH}?username={username}", self.directory_url);
        tracing::debug!(%username, "looking up scheduled interview");

        let response = self.client.get(&url).send().await.map_err(|err| {
            IntervoxError::dialogue_service(format!("directory lookup failed: {err}"))
        })?;

        if !response.status().is_success() {
            return Err(IntervoxError::dialogue_service(format!(
                "directory lookup returned {} for {username}",
                response.status()
            )));
        }

        let parsed: DirectoryEntry = response.json().await.map_err(|err| {
            IntervoxError::dialogue_service(format!("malformed directory response: {err}"))
        })?;

        let interview = ScheduledInterview {
            interview_id: parsed.id_entrevista,
            state: parsed.estado_entrevista,
        };
        if !interview.is_pending() {
            return Err(IntervoxError::dialogue_service(format!(
                "interview {} for {username} is in state {}, not pending",
                interview.interview_id, interview.state
            )));
        }
        Ok(interview)
    }

    /// Fetches the ordered question list for an interview.
    pub async fn fetch_questions(&self, interview_id: i64) -> Result<Vec<Question>> {
        let url = format!("{}{QUESTIONS_PATH}/{interview_id}", self.admin_url);
        let response = self.client.get(&url).send().await.map_err(|err| {
            IntervoxError::dialogue_service(format!("question fetch failed: {err}"))
        })?;

        if !response.status().is_success() {
            return Err(IntervoxError::dialogue_service(format!(
                "question fetch returned {} for interview {interview_id}",
                response.status()
            )));
        }

        let rows: Vec<QuestionRow> = response.json().await.map_err(|err| {
            IntervoxError::dialogue_service(format!("malformed question response: {err}"))
        })?;

        tracing::info!(interview_id, count = rows.len(), "loaded interview questions");
        Ok(rows
            .into_iter()
            .map(|row| Question {
                id: row.id_pregunta.to_string(),
                text: row.pregunta,
            })
            .collect())
    }
}

#[derive(Deserialize)]
struct DirectoryEntry {
    #[serde(rename = "idEntrevista")]
    id_entrevista: i64,
    #[serde(rename = "estadoEntrevista")]
    estado_entrevista: String,
}

#[derive(Deserialize)]
struct QuestionRow {
    #[serde(rename = "idPregunta")]
    id_pregunta: i64,
    #[serde(rename = "pregunta")]
    pregunta: String,
}

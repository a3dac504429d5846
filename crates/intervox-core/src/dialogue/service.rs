//! Port trait for the remote dialogue-generation service.

use crate::error::Result;
use async_trait::async_trait;

/// Context for generating the interview introduction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntroductionRequest {
    pub candidate_name: String,
    pub job_title: String,
    pub company_name: String,
}

/// Context for generating the next interviewer utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextUtteranceRequest {
    /// The scripted question currently at the cursor.
    pub current_question: String,
    /// The candidate's most recent answer, empty at interview start.
    pub last_candidate_text: String,
    /// The interviewer's most recent utterance, empty at interview start.
    pub last_interviewer_text: String,
    pub candidate_name: String,
    pub job_title: String,
    pub company_name: String,
}

/// An abstract request/response client for the dialogue-generation
/// backend.
///
/// No streaming: both operations settle with the full utterance text.
/// Transport-level failures (non-2xx, malformed body) surface as
/// `DialogueServiceError`.
#[async_trait]
pub trait DialogueService: Send + Sync {
    /// Generates the interview introduction from candidate/job metadata.
    async fn generate_introduction(&self, request: IntroductionRequest) -> Result<String>;

    /// Generates the next interviewer utterance for the current question.
    async fn generate_next_utterance(&self, request: NextUtteranceRequest) -> Result<String>;
}

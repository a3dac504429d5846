//! Interview context supplied at orchestration start.

use serde::{Deserialize, Serialize};

/// A scripted interview question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Backend identifier of the question.
    pub id: String,
    /// The question text.
    pub text: String,
}

/// External input describing one interview, read-only to the core.
///
/// Supplied once at orchestration start and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewContext {
    /// Unique interview identifier, also the snapshot key.
    pub interview_id: String,
    /// Ordered question list for this interview.
    pub questions: Vec<Question>,
    /// Job title used when generating the introduction.
    pub job_title: String,
    /// Hiring company name.
    pub company_name: String,
    /// The candidate's display name.
    pub candidate_name: String,
}

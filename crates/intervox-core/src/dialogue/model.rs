//! Turn history and dialogue progress types.

use serde::{Deserialize, Serialize};

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    /// The human candidate.
    Candidate,
    /// The AI interviewer avatar.
    Interviewer,
}

/// One utterance in the interview, immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Who spoke.
    pub speaker: Speaker,
    /// The utterance text.
    pub text: String,
    /// Timestamp when the turn was appended (ISO 8601 format).
    pub timestamp: String,
}

impl Turn {
    /// Creates a turn stamped with the current time.
    pub fn now(speaker: Speaker, text: impl Into<String>) -> Self {
        Self {
            speaker,
            text: text.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Dialogue progress owned by the progression engine.
///
/// Invariants:
/// - `turns` is append-only
/// - `question_cursor` never exceeds the question-set length
/// - `finished` becomes true exactly once and never reverts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DialogueState {
    turns: Vec<Turn>,
    question_cursor: usize,
    finished: bool,
}

impl DialogueState {
    /// Appends a turn to the history.
    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// The full ordered turn history.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Index of the next question to ask.
    pub fn question_cursor(&self) -> usize {
        self.question_cursor
    }

    /// Advances the cursor by one question.
    pub fn advance_cursor(&mut self) {
        self.question_cursor += 1;
    }

    /// Whether the question set has been exhausted.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Marks the dialogue finished. One-way: a finished dialogue never
    /// becomes unfinished again.
    pub fn mark_finished(&mut self) {
        self.finished = true;
    }

    /// Most recent turn by the given speaker, if any.
    pub fn last_of(&self, speaker: Speaker) -> Option<&Turn> {
        self.turns.iter().rev().find(|t| t.speaker == speaker)
    }

    /// Most recent turn regardless of speaker.
    pub fn last_turn(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Rebuilds state from a persisted snapshot.
    pub fn restore(snapshot: DialogueSnapshot) -> Self {
        Self {
            turns: snapshot.turns,
            question_cursor: snapshot.question_cursor,
            finished: snapshot.finished,
        }
    }

    /// Serializable projection of the current progress.
    pub fn snapshot(&self) -> DialogueSnapshot {
        DialogueSnapshot {
            turns: self.turns.clone(),
            question_cursor: self.question_cursor,
            finished: self.finished,
        }
    }
}

/// Persisted projection of [`DialogueState`].
///
/// Written after every appended turn, read at most once per session start
/// to resume a prior interview. Never deleted automatically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueSnapshot {
    pub turns: Vec<Turn>,
    pub question_cursor: usize,
    pub finished: bool,
}

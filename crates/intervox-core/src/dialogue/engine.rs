//! Dialogue progression engine.

use super::model::{DialogueState, Speaker, Turn};
use super::repository::SnapshotRepository;
use super::service::{DialogueService, IntroductionRequest, NextUtteranceRequest};
use crate::context::InterviewContext;
use crate::error::{IntervoxError, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

/// Fixed utterance spoken once the question set is exhausted.
const CLOSING_UTTERANCE: &str =
    "Thank you for taking part in this interview. You have completed all of the questions.";

/// Result of bootstrapping the dialogue at session start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// Fresh session: an introduction was generated and appended.
    Introduced { utterance: Turn },
    /// Resumed session whose last turn was the interviewer's; the returned
    /// text re-announces that question and is spoken without being
    /// appended again.
    Resumed { reannounce: String },
    /// Resumed session with a pending candidate answer: the engine
    /// advanced immediately and appended the returned interviewer turn.
    ResumedAdvanced { utterance: Turn },
}

/// Result of a successful candidate submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    /// The appended candidate turn.
    pub candidate: Turn,
    /// The appended interviewer reply (next question or closing).
    pub reply: Turn,
    /// Whether the question set is now exhausted.
    pub finished: bool,
}

/// Sequences questions, calls the remote generation service, and owns the
/// append-only turn history.
///
/// `submit` is single-flight: at most one remote call is outstanding at a
/// time, and a second submission while one is in flight is rejected with
/// `Busy` rather than queued, so turns can never interleave out of order.
pub struct DialogueEngine {
    service: Arc<dyn DialogueService>,
    repository: Arc<dyn SnapshotRepository>,
    context: InterviewContext,
    state: Mutex<DialogueState>,
    in_flight: AtomicBool,
}

impl DialogueEngine {
    /// Creates an engine for one interview.
    pub fn new(
        service: Arc<dyn DialogueService>,
        repository: Arc<dyn SnapshotRepository>,
        context: InterviewContext,
    ) -> Self {
        Self {
            service,
            repository,
            context,
            state: Mutex::new(DialogueState::default()),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Starts or resumes the dialogue.
    ///
    /// With a persisted snapshot present the turn history is restored: a
    /// candidate-last history advances immediately, an interviewer-last
    /// history is re-announced so resumption never goes silently idle.
    /// Without a snapshot an introduction is requested from the remote
    /// service and appended as the first interviewer turn.
    pub async fn bootstrap(&self) -> Result<BootstrapOutcome> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return Err(IntervoxError::Busy("dialogue advance"));
        }
        let result = self.bootstrap_inner().await;
        self.in_flight.store(false, Ordering::SeqCst);
        result
    }

    async fn bootstrap_inner(&self) -> Result<BootstrapOutcome> {
        let snapshot = self
            .repository
            .find_by_interview(&self.context.interview_id)
            .await?;

        if let Some(snapshot) = snapshot.filter(|s| !s.turns.is_empty()) {
            let restored = DialogueState::restore(snapshot);
            tracing::info!(
                interview_id = %self.context.interview_id,
                turns = restored.turns().len(),
                cursor = restored.question_cursor(),
                "resuming interview from snapshot"
            );
            let last = restored
                .last_turn()
                .cloned()
                .ok_or_else(|| IntervoxError::internal("restored snapshot lost its turns"))?;
            *self.state.lock().await = restored;

            return match last.speaker {
                Speaker::Candidate => {
                    let utterance = self.advance_inner().await?;
                    Ok(BootstrapOutcome::ResumedAdvanced { utterance })
                }
                Speaker::Interviewer => Ok(BootstrapOutcome::Resumed {
                    reannounce: format!(
                        "Let's continue your interview. The last question I asked was: {}",
                        last.text
                    ),
                }),
            };
        }

        let intro = self
            .service
            .generate_introduction(IntroductionRequest {
                candidate_name: self.context.candidate_name.clone(),
                job_title: self.context.job_title.clone(),
                company_name: self.context.company_name.clone(),
            })
            .await?;

        let utterance = Turn::now(Speaker::Interviewer, intro);
        let snapshot = {
            let mut state = self.state.lock().await;
            state.append(utterance.clone());
            state.snapshot()
        };
        self.persist(&snapshot).await?;
        tracing::info!(interview_id = %self.context.interview_id, "interview introduced");
        Ok(BootstrapOutcome::Introduced { utterance })
    }

    /// Processes one candidate answer.
    ///
    /// An answer that is empty after trimming is a no-op (`Ok(None)`). A
    /// submission while another advance is in flight is rejected with
    /// `Busy` and has no observable effect. Otherwise the candidate turn
    /// is appended, the snapshot persisted, and the dialogue advanced.
    pub async fn submit(&self, text: &str) -> Result<Option<SubmitOutcome>> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            tracing::debug!("empty candidate submission ignored");
            return Ok(None);
        }
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return Err(IntervoxError::Busy("dialogue advance"));
        }
        let result = self.submit_inner(trimmed).await;
        self.in_flight.store(false, Ordering::SeqCst);
        result.map(Some)
    }

    async fn submit_inner(&self, text: &str) -> Result<SubmitOutcome> {
        let candidate = Turn::now(Speaker::Candidate, text);
        let snapshot = {
            let mut state = self.state.lock().await;
            state.append(candidate.clone());
            state.snapshot()
        };
        self.persist(&snapshot).await?;

        let reply = self.advance_inner().await?;
        let finished = self.state.lock().await.is_finished();
        Ok(SubmitOutcome {
            candidate,
            reply,
            finished,
        })
    }

    /// Fetches and appends the next interviewer utterance.
    ///
    /// The cursor is incremented only after the remote call succeeds, so a
    /// failed call leaves the same question pending for the next attempt.
    async fn advance_inner(&self) -> Result<Turn> {
        let request = {
            let state = self.state.lock().await;
            self.context
                .questions
                .get(state.question_cursor())
                .map(|question| NextUtteranceRequest {
                    current_question: question.text.clone(),
                    last_candidate_text: state
                        .last_of(Speaker::Candidate)
                        .map(|t| t.text.clone())
                        .unwrap_or_default(),
                    last_interviewer_text: state
                        .last_of(Speaker::Interviewer)
                        .map(|t| t.text.clone())
                        .unwrap_or_default(),
                    candidate_name: self.context.candidate_name.clone(),
                    job_title: self.context.job_title.clone(),
                    company_name: self.context.company_name.clone(),
                })
        };

        let Some(request) = request else {
            // Question set exhausted: close the interview.
            let (turn, snapshot) = {
                let mut state = self.state.lock().await;
                state.mark_finished();
                let turn = Turn::now(Speaker::Interviewer, CLOSING_UTTERANCE);
                state.append(turn.clone());
                (turn, state.snapshot())
            };
            self.persist(&snapshot).await?;
            tracing::info!(interview_id = %self.context.interview_id, "interview finished");
            return Ok(turn);
        };

        let text = self.service.generate_next_utterance(request).await?;

        let (turn, snapshot) = {
            let mut state = self.state.lock().await;
            let turn = Turn::now(Speaker::Interviewer, text);
            state.append(turn.clone());
            state.advance_cursor();
            (turn, state.snapshot())
        };
        self.persist(&snapshot).await?;
        Ok(turn)
    }

    async fn persist(&self, snapshot: &super::model::DialogueSnapshot) -> Result<()> {
        self.repository
            .save(&self.context.interview_id, snapshot)
            .await?;
        tracing::debug!(
            interview_id = %self.context.interview_id,
            turns = snapshot.turns.len(),
            "dialogue snapshot persisted"
        );
        Ok(())
    }

    /// The interview context this engine was constructed with.
    pub fn context(&self) -> &InterviewContext {
        &self.context
    }

    /// Ordered copy of the turn history for the UI layer.
    pub async fn turns(&self) -> Vec<Turn> {
        self.state.lock().await.turns().to_vec()
    }

    /// Index of the next question to ask.
    pub async fn question_cursor(&self) -> usize {
        self.state.lock().await.question_cursor()
    }

    /// Whether the question set has been exhausted.
    pub async fn is_finished(&self) -> bool {
        self.state.lock().await.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Question;
    use crate::dialogue::model::DialogueSnapshot;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    struct MockDialogueService {
        intro_calls: AtomicUsize,
        next_calls: AtomicUsize,
        last_request: StdMutex<Option<NextUtteranceRequest>>,
        fail_next: AtomicBool,
        /// When set, `generate_next_utterance` parks until notified.
        gate: Option<Arc<Notify>>,
    }

    impl MockDialogueService {
        fn new() -> Self {
            Self {
                intro_calls: AtomicUsize::new(0),
                next_calls: AtomicUsize::new(0),
                last_request: StdMutex::new(None),
                fail_next: AtomicBool::new(false),
                gate: None,
            }
        }

        fn gated(gate: Arc<Notify>) -> Self {
            Self {
                gate: Some(gate),
                ..Self::new()
            }
        }
    }

    #[async_trait]
    impl DialogueService for MockDialogueService {
        async fn generate_introduction(&self, request: IntroductionRequest) -> Result<String> {
            self.intro_calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!(
                "Welcome {}, let's talk about the {} role at {}.",
                request.candidate_name, request.job_title, request.company_name
            ))
        }

        async fn generate_next_utterance(&self, request: NextUtteranceRequest) -> Result<String> {
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.next_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_next.load(Ordering::SeqCst) {
                return Err(IntervoxError::dialogue_service("upstream 502"));
            }
            *self.last_request.lock().unwrap() = Some(request.clone());
            Ok(format!("Interesting. {}", request.current_question))
        }
    }

    struct MockSnapshotRepository {
        snapshots: StdMutex<HashMap<String, DialogueSnapshot>>,
        saves: AtomicUsize,
    }

    impl MockSnapshotRepository {
        fn new() -> Self {
            Self {
                snapshots: StdMutex::new(HashMap::new()),
                saves: AtomicUsize::new(0),
            }
        }

        fn seeded(interview_id: &str, snapshot: DialogueSnapshot) -> Self {
            let repo = Self::new();
            repo.snapshots
                .lock()
                .unwrap()
                .insert(interview_id.to_string(), snapshot);
            repo
        }
    }

    #[async_trait]
    impl SnapshotRepository for MockSnapshotRepository {
        async fn find_by_interview(
            &self,
            interview_id: &str,
        ) -> Result<Option<DialogueSnapshot>> {
            Ok(self.snapshots.lock().unwrap().get(interview_id).cloned())
        }

        async fn save(&self, interview_id: &str, snapshot: &DialogueSnapshot) -> Result<()> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            self.snapshots
                .lock()
                .unwrap()
                .insert(interview_id.to_string(), snapshot.clone());
            Ok(())
        }
    }

    fn context() -> InterviewContext {
        InterviewContext {
            interview_id: "iv-1".to_string(),
            questions: vec![Question {
                id: "q-1".to_string(),
                text: "Describe your last project.".to_string(),
            }],
            job_title: "Backend Developer".to_string(),
            company_name: "Acme".to_string(),
            candidate_name: "Dana".to_string(),
        }
    }

    fn engine(
        service: Arc<MockDialogueService>,
        repository: Arc<MockSnapshotRepository>,
    ) -> DialogueEngine {
        DialogueEngine::new(service, repository, context())
    }

    #[tokio::test]
    async fn test_fresh_bootstrap_introduces_and_submit_advances() {
        // Scenario A: one question, fresh session.
        let service = Arc::new(MockDialogueService::new());
        let repository = Arc::new(MockSnapshotRepository::new());
        let engine = engine(service.clone(), repository.clone());

        let outcome = engine.bootstrap().await.unwrap();
        let intro = match outcome {
            BootstrapOutcome::Introduced { utterance } => utterance,
            other => panic!("expected introduction, got {other:?}"),
        };
        assert_eq!(intro.speaker, Speaker::Interviewer);
        assert_eq!(engine.question_cursor().await, 0);
        assert_eq!(engine.turns().await.len(), 1);

        let outcome = engine.submit("I built a cache").await.unwrap().unwrap();
        assert_eq!(outcome.candidate.text, "I built a cache");
        assert_eq!(engine.question_cursor().await, 1);
        assert_eq!(engine.turns().await.len(), 3);
        assert!(!outcome.finished);

        let request = service.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(request.current_question, "Describe your last project.");
        assert_eq!(request.last_candidate_text, "I built a cache");
        assert_eq!(request.last_interviewer_text, intro.text);
    }

    #[tokio::test]
    async fn test_exhausted_cursor_closes_interview() {
        let service = Arc::new(MockDialogueService::new());
        let repository = Arc::new(MockSnapshotRepository::new());
        let engine = engine(service, repository);
        engine.bootstrap().await.unwrap();
        engine.submit("I built a cache").await.unwrap();

        let outcome = engine.submit("Anything else?").await.unwrap().unwrap();

        assert!(outcome.finished);
        assert_eq!(outcome.reply.text, CLOSING_UTTERANCE);
        assert!(engine.is_finished().await);
        // Cursor stays at the question count.
        assert_eq!(engine.question_cursor().await, 1);
    }

    #[tokio::test]
    async fn test_failed_advance_does_not_move_cursor() {
        let service = Arc::new(MockDialogueService::new());
        let repository = Arc::new(MockSnapshotRepository::new());
        let engine = engine(service.clone(), repository);
        engine.bootstrap().await.unwrap();

        service.fail_next.store(true, Ordering::SeqCst);
        let err = engine.submit("I built a cache").await.unwrap_err();
        assert!(err.is_dialogue_service());
        assert_eq!(engine.question_cursor().await, 0);

        // Retry is safe and resumes on the same question.
        service.fail_next.store(false, Ordering::SeqCst);
        engine.submit("I built a cache").await.unwrap();
        assert_eq!(engine.question_cursor().await, 1);
        assert_eq!(service.intro_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_resume_interviewer_last_reannounces() {
        let snapshot = DialogueSnapshot {
            turns: vec![
                Turn::now(Speaker::Candidate, "Hello"),
                Turn::now(Speaker::Interviewer, "Describe your last project."),
            ],
            question_cursor: 1,
            finished: false,
        };
        let service = Arc::new(MockDialogueService::new());
        let repository = Arc::new(MockSnapshotRepository::seeded("iv-1", snapshot));
        let engine = engine(service.clone(), repository);

        let outcome = engine.bootstrap().await.unwrap();

        match outcome {
            BootstrapOutcome::Resumed { reannounce } => {
                assert!(reannounce.contains("Describe your last project."));
            }
            other => panic!("expected resume, got {other:?}"),
        }
        assert_eq!(engine.turns().await.len(), 2);
        assert_eq!(engine.question_cursor().await, 1);
        // Resumption never re-requests the introduction.
        assert_eq!(service.intro_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_resume_candidate_last_advances_immediately() {
        let snapshot = DialogueSnapshot {
            turns: vec![
                Turn::now(Speaker::Interviewer, "Welcome"),
                Turn::now(Speaker::Candidate, "I built a cache"),
            ],
            question_cursor: 0,
            finished: false,
        };
        let service = Arc::new(MockDialogueService::new());
        let repository = Arc::new(MockSnapshotRepository::seeded("iv-1", snapshot));
        let engine = engine(service.clone(), repository);

        let outcome = engine.bootstrap().await.unwrap();

        match outcome {
            BootstrapOutcome::ResumedAdvanced { utterance } => {
                assert_eq!(utterance.speaker, Speaker::Interviewer);
            }
            other => panic!("expected advanced resume, got {other:?}"),
        }
        assert_eq!(service.intro_calls.load(Ordering::SeqCst), 0);
        assert_eq!(engine.question_cursor().await, 1);
    }

    #[tokio::test]
    async fn test_empty_submission_is_noop() {
        let service = Arc::new(MockDialogueService::new());
        let repository = Arc::new(MockSnapshotRepository::new());
        let engine = engine(service, repository);
        engine.bootstrap().await.unwrap();

        let outcome = engine.submit("   ").await.unwrap();

        assert!(outcome.is_none());
        assert_eq!(engine.turns().await.len(), 1);
    }

    #[tokio::test]
    async fn test_submit_is_single_flight() {
        // Scenario B: a second submit while the first remote call is
        // pending is rejected with no observable effect.
        let gate = Arc::new(Notify::new());
        let service = Arc::new(MockDialogueService::gated(gate.clone()));
        let repository = Arc::new(MockSnapshotRepository::new());
        let engine = Arc::new(DialogueEngine::new(
            service.clone(),
            repository,
            context(),
        ));
        engine.bootstrap().await.unwrap();

        let first = {
            let engine = engine.clone();
            tokio::spawn(async move { engine.submit("first answer").await })
        };
        tokio::task::yield_now().await;

        let err = engine.submit("second answer").await.unwrap_err();
        assert!(err.is_busy());
        assert_eq!(service.next_calls.load(Ordering::SeqCst), 0);

        gate.notify_one();
        first.await.unwrap().unwrap();

        let turns = engine.turns().await;
        assert_eq!(turns.len(), 3);
        assert!(turns.iter().all(|t| t.text != "second answer"));
    }

    #[tokio::test]
    async fn test_snapshot_written_after_each_append() {
        let service = Arc::new(MockDialogueService::new());
        let repository = Arc::new(MockSnapshotRepository::new());
        let engine = engine(service, repository.clone());

        engine.bootstrap().await.unwrap();
        assert_eq!(repository.saves.load(Ordering::SeqCst), 1);

        engine.submit("I built a cache").await.unwrap();
        // Candidate append and interviewer append each persist.
        assert_eq!(repository.saves.load(Ordering::SeqCst), 3);
    }
}

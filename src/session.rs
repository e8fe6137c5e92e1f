use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Local};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::error::AnalysisError;
use crate::models::{AnalysisRequest, AnalysisResult, RequestState, Subject};
use crate::network::AnalysisClient;

pub type SharedSession = Arc<Mutex<AnalysisSession>>;

/// Form input plus the state of the single request it may have in flight.
#[derive(Debug, Clone, Default)]
pub struct AnalysisSession {
    subject: Subject,
    comments_text: String,
    state: RequestState,
    settled_at: Option<DateTime<Local>>,
}

impl AnalysisSession {
    pub fn new(subject: Subject) -> Self {
        Self { subject, ..Self::default() }
    }

    pub fn subject(&self) -> Subject {
        self.subject
    }

    pub fn set_subject(&mut self, subject: Subject) {
        self.subject = subject;
    }

    pub fn comments_text(&self) -> &str {
        &self.comments_text
    }

    /// Stored raw; normalization waits for submission.
    pub fn set_comments_text(&mut self, raw: impl Into<String>) {
        self.comments_text = raw.into();
    }

    pub fn comments_text_mut(&mut self) -> &mut String {
        &mut self.comments_text
    }

    pub fn state(&self) -> &RequestState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    pub fn settled_at(&self) -> Option<DateTime<Local>> {
        self.settled_at
    }

    /// Builds the request and enters `Loading`. Returns `None` while a request is outstanding.
    pub fn begin(&mut self) -> Option<AnalysisRequest> {
        if self.is_loading() {
            return None;
        }
        let request = AnalysisRequest::new(self.subject, &self.comments_text);
        if request.comments.is_empty() {
            tracing::warn!("Submitting an empty comment list");
        }
        self.state = RequestState::Loading;
        Some(request)
    }

    /// Records how the outstanding request ended, replacing any earlier outcome.
    pub fn settle(&mut self, outcome: Result<AnalysisResult, AnalysisError>) {
        self.settled_at = Some(Local::now());
        self.state = match outcome {
            Ok(result) => {
                tracing::info!(interpretations = result.interpretations.len(), "Analysis succeeded");
                RequestState::Succeeded(result)
            }
            Err(err) => {
                tracing::warn!("Analysis failed: {}", err);
                RequestState::Failed(err)
            }
        };
    }

    /// Runs one submission to completion on the current task.
    ///
    /// Dropping the returned future mid-flight settles the session as
    /// `Interrupted` so it never stays `Loading`.
    pub async fn submit(&mut self, client: &AnalysisClient) -> Result<AnalysisResult, AnalysisError> {
        let request = self.begin().ok_or(AnalysisError::Busy)?;
        let mut flight = InFlight { session: Some(self) };
        let outcome = client.analyze(&request).await;
        flight.settle(outcome.clone());
        outcome
    }

    /// Leaves a failed state without touching the form, so the notification can be dismissed.
    pub fn dismiss_error(&mut self) {
        if matches!(self.state, RequestState::Failed(_)) {
            self.state = RequestState::Idle;
        }
    }
}

/// Settles its session as cancelled if dropped before `settle` is called.
struct InFlight<'a> {
    session: Option<&'a mut AnalysisSession>,
}

impl InFlight<'_> {
    fn settle(&mut self, outcome: Result<AnalysisResult, AnalysisError>) {
        if let Some(session) = self.session.take() {
            session.settle(outcome);
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            session.settle(Err(AnalysisError::Interrupted("request cancelled".into())));
        }
    }
}

pub fn lock_session(session: &SharedSession) -> MutexGuard<'_, AnalysisSession> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Starts a background submission unless one is already running.
///
/// The request runs in its own task so a panic inside it still settles the
/// session as `Failed` instead of leaving it stuck in `Loading`.
pub fn spawn_submission(session: &SharedSession, client: &AnalysisClient, rt: &Handle) -> Option<JoinHandle<()>> {
    let request = lock_session(session).begin()?;
    let client = client.clone();
    let shared = Arc::clone(session);
    let inner = rt.clone();
    Some(rt.spawn(async move {
        let call = inner.spawn(async move { client.analyze(&request).await });
        let outcome = match call.await {
            Ok(outcome) => outcome,
            Err(err) => Err(AnalysisError::Interrupted(err.to_string())),
        };
        lock_session(&shared).settle(outcome);
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample_result() -> AnalysisResult {
        AnalysisResult {
            summary: json!({"mean": 0.4}),
            interpretations: vec!["Overall mean polarity: 0.400".into()],
            wordcloud_url: "/media/wc.png".into(),
        }
    }

    #[test]
    fn test_new_session_is_idle() {
        let session = AnalysisSession::new(Subject::OptimizationTechniques);
        assert_eq!(session.subject(), Subject::OptimizationTechniques);
        assert_eq!(session.state(), &RequestState::Idle);
        assert!(!session.is_loading());
    }

    #[test]
    fn test_set_comments_text_defers_normalization() {
        let mut session = AnalysisSession::default();
        session.set_comments_text("  a \n\n b ");
        assert_eq!(session.comments_text(), "  a \n\n b ");
    }

    #[test]
    fn test_begin_builds_request_and_loads() {
        let mut session = AnalysisSession::new(Subject::ArtificialIntelligence);
        session.set_comments_text("great course\n\nneeds more examples");
        let request = session.begin().unwrap();
        assert_eq!(request.subject, Subject::ArtificialIntelligence);
        assert_eq!(request.comments, vec!["great course", "needs more examples"]);
        assert!(session.is_loading());
    }

    #[test]
    fn test_begin_refuses_while_loading() {
        let mut session = AnalysisSession::default();
        assert!(session.begin().is_some());
        assert!(session.begin().is_none());
        assert!(session.is_loading());
    }

    #[tokio::test]
    async fn test_submit_while_loading_is_busy() {
        let client = AnalysisClient::new("http://127.0.0.1:9", None).unwrap();
        let mut session = AnalysisSession::default();
        session.begin();
        assert_eq!(session.submit(&client).await, Err(AnalysisError::Busy));
        assert!(session.is_loading());
    }

    #[test]
    fn test_empty_comments_are_not_rejected() {
        let mut session = AnalysisSession::default();
        session.set_comments_text(" \n\t\n");
        let request = session.begin().unwrap();
        assert!(request.comments.is_empty());
    }

    #[test]
    fn test_settle_success_then_resubmit_discards_result() {
        let mut session = AnalysisSession::default();
        session.begin();
        session.settle(Ok(sample_result()));
        assert_eq!(session.state().result(), Some(&sample_result()));
        assert!(!session.is_loading());
        assert!(session.settled_at().is_some());

        session.begin();
        assert_eq!(session.state(), &RequestState::Loading);
    }

    #[test]
    fn test_settle_failure_keeps_form() {
        let mut session = AnalysisSession::new(Subject::OptimizationTechniques);
        session.set_comments_text("slow pace");
        session.begin();
        session.settle(Err(AnalysisError::Transport("connection refused".into())));

        assert!(!session.is_loading());
        assert!(session.state().result().is_none());
        assert_eq!(session.comments_text(), "slow pace");
        assert_eq!(session.subject(), Subject::OptimizationTechniques);
    }

    #[test]
    fn test_new_result_replaces_old() {
        let mut session = AnalysisSession::default();
        session.begin();
        session.settle(Ok(sample_result()));
        let mut second = sample_result();
        second.interpretations = vec!["No comments provided.".into()];
        session.begin();
        session.settle(Ok(second.clone()));
        assert_eq!(session.state().result(), Some(&second));
    }

    #[test]
    fn test_dismiss_error_only_clears_failures() {
        let mut session = AnalysisSession::default();
        session.begin();
        session.settle(Ok(sample_result()));
        session.dismiss_error();
        assert!(session.state().result().is_some());

        session.begin();
        session.settle(Err(AnalysisError::Transport("down".into())));
        session.dismiss_error();
        assert_eq!(session.state(), &RequestState::Idle);
    }
}

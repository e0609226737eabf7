//! Scan Session
//!
//! Drives the per-frame cycle: classify every observation, vote the
//! candidates, then check whether the record is complete. A session moves
//! `Idle -> Running -> Completed` or ends early in `Cancelled`; both end
//! states are terminal and the completion handler fires at most once.
//!
//! The handler runs synchronously on the thread that submitted the completing
//! frame. It receives the record by value and has no handle back to the
//! session, so it cannot re-enter `submit_frame`.

pub mod worker;

pub use worker::{ScanStatus, ScanWorker};

use std::fmt;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::analysis::{Candidate, CandidateClassifier, ConsensusTracker};
use crate::capture::frame::{raw_text, TextObservation};
use crate::card::{CardNetwork, CardRecord, NetworkClassifier};
use crate::config::ScannerConfig;
use crate::error::{Result, ScanError};

/// One-shot completion handler
pub type CompletionHandler = Box<dyn FnOnce(CardRecord) + Send + 'static>;

/// Lifecycle state of a scan session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Running,
    Completed,
    Cancelled,
}

impl SessionState {
    /// Whether no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Completed | SessionState::Cancelled)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::Running => "running",
            SessionState::Completed => "completed",
            SessionState::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// A single card scan, from first frame to accepted record
pub struct ScanSession {
    id: Uuid,
    state: SessionState,
    classifier: CandidateClassifier,
    tracker: ConsensusTracker,
    on_complete: Option<CompletionHandler>,
    frames_processed: u64,
    number_seen: bool,
}

impl ScanSession {
    /// Create an idle session from configuration
    pub fn new(config: &ScannerConfig) -> Result<Self> {
        config.validate()?;
        let networks = NetworkClassifier::new(&config.networks)?;
        Ok(Self::with_components(
            CandidateClassifier::new(&config.classifier),
            ConsensusTracker::new(config.consensus, networks),
        ))
    }

    /// Create an idle session from prebuilt parts
    pub fn with_components(classifier: CandidateClassifier, tracker: ConsensusTracker) -> Self {
        Self {
            id: Uuid::new_v4(),
            state: SessionState::Idle,
            classifier,
            tracker,
            on_complete: None,
            frames_processed: 0,
            number_seen: false,
        }
    }

    /// Begin scanning; `on_complete` fires once with the final record
    pub fn start<F>(&mut self, on_complete: F) -> Result<()>
    where
        F: FnOnce(CardRecord) + Send + 'static,
    {
        if self.state != SessionState::Idle {
            return Err(self.invalid_state("start"));
        }

        self.tracker.reset();
        self.frames_processed = 0;
        self.number_seen = false;
        self.on_complete = Some(Box::new(on_complete));
        self.state = SessionState::Running;
        info!("Scan session {} started", self.id);
        Ok(())
    }

    /// Feed one frame of OCR observations
    ///
    /// Returns the state after the frame. Outside `Running` the frame is
    /// rejected with `ScanError::InvalidState` and nothing changes.
    pub fn submit_frame(&mut self, observations: &[TextObservation]) -> Result<SessionState> {
        if self.state != SessionState::Running {
            return Err(self.invalid_state("submit a frame"));
        }

        self.tracker.append_trace(&raw_text(observations));

        let candidates: Vec<Candidate> = observations
            .iter()
            .filter_map(|observation| self.classifier.classify_observation(observation))
            .collect();

        if candidates.iter().any(|c| matches!(c, Candidate::Number(_))) {
            self.number_seen = true;
        }

        let mut accepted = 0;
        for candidate in candidates {
            if self.tracker.observe(candidate) {
                accepted += 1;
            }
        }

        self.frames_processed += 1;
        debug!(
            "Session {} frame {}: {} observations, {} acceptances",
            self.id,
            self.frames_processed,
            observations.len(),
            accepted
        );

        if self.tracker.is_complete() {
            self.complete();
        }

        Ok(self.state)
    }

    /// Stop scanning without delivering a result
    pub fn cancel(&mut self) {
        if self.state.is_terminal() {
            return;
        }
        self.on_complete = None;
        self.state = SessionState::Cancelled;
        info!(
            "Scan session {} cancelled after {} frames",
            self.id, self.frames_processed
        );
    }

    fn complete(&mut self) {
        self.state = SessionState::Completed;
        let record = self.tracker.record().clone();
        info!(
            "Scan session {} completed after {} frames ({})",
            self.id,
            self.frames_processed,
            record.network.unwrap_or(CardNetwork::Unknown)
        );

        if let Some(handler) = self.on_complete.take() {
            handler(record);
        }
    }

    fn invalid_state(&self, operation: &'static str) -> ScanError {
        warn!("Session {}: cannot {} while {}", self.id, operation, self.state);
        ScanError::InvalidState {
            operation,
            state: self.state,
        }
    }

    /// Session identifier used in logs
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The record as accepted so far
    pub fn record(&self) -> &CardRecord {
        self.tracker.record()
    }

    /// Frames processed since `start`
    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    /// Whether any frame has contained a number-shaped candidate
    pub fn number_seen(&self) -> bool {
        self.number_seen
    }
}

impl fmt::Debug for ScanSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanSession")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("frames_processed", &self.frames_processed)
            .field("number_seen", &self.number_seen)
            .field("record", self.tracker.record())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn frame(entries: &[(&str, f32)]) -> Vec<TextObservation> {
        entries
            .iter()
            .map(|(text, confidence)| TextObservation::new(*text, *confidence))
            .collect()
    }

    fn started_session() -> (ScanSession, Arc<Mutex<Vec<CardRecord>>>) {
        let delivered = Arc::new(Mutex::new(Vec::new()));
        let sink = delivered.clone();
        let mut session = ScanSession::new(&ScannerConfig::default()).unwrap();
        session.start(move |record| sink.lock().push(record)).unwrap();
        (session, delivered)
    }

    #[test]
    fn test_session_creation() {
        let session = ScanSession::new(&ScannerConfig::default()).unwrap();
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.frames_processed(), 0);
        assert!(!session.number_seen());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = ScannerConfig::default();
        config.consensus.name_votes = 0;
        assert!(matches!(ScanSession::new(&config), Err(ScanError::Config(_))));

        let mut config = ScannerConfig::default();
        config.networks[0].pattern = "[".to_string();
        assert!(matches!(
            ScanSession::new(&config),
            Err(ScanError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_submit_before_start_rejected() {
        let mut session = ScanSession::new(&ScannerConfig::default()).unwrap();
        let result = session.submit_frame(&frame(&[("4111111111111111", 0.9)]));
        assert!(matches!(
            result,
            Err(ScanError::InvalidState { state: SessionState::Idle, .. })
        ));
        assert_eq!(session.frames_processed(), 0);
    }

    #[test]
    fn test_start_twice_rejected() {
        let (mut session, _) = started_session();
        assert!(session.start(|_| {}).is_err());
        assert_eq!(session.state(), SessionState::Running);
    }

    #[test]
    fn test_completes_after_third_frame() {
        let (mut session, delivered) = started_session();
        let observations = frame(&[("4111111111111111", 0.9), ("12/25", 0.9)]);

        assert_eq!(session.submit_frame(&observations).unwrap(), SessionState::Running);
        assert_eq!(session.submit_frame(&observations).unwrap(), SessionState::Running);
        assert!(delivered.lock().is_empty());

        assert_eq!(session.submit_frame(&observations).unwrap(), SessionState::Completed);

        let records = delivered.lock();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].number.as_deref(), Some("4111111111111111"));
        assert_eq!(records[0].expiry.as_deref(), Some("12/25"));
        assert_eq!(records[0].network, Some(CardNetwork::Visa));
        assert!(records[0].name.is_none());
    }

    #[test]
    fn test_no_second_delivery_after_completion() {
        let (mut session, delivered) = started_session();
        let observations = frame(&[("4111111111111111", 0.9), ("12/25", 0.9)]);
        for _ in 0..3 {
            session.submit_frame(&observations).unwrap();
        }

        let result = session.submit_frame(&observations);
        assert!(matches!(
            result,
            Err(ScanError::InvalidState { state: SessionState::Completed, .. })
        ));
        assert_eq!(delivered.lock().len(), 1);
        assert_eq!(session.frames_processed(), 3);
    }

    #[test]
    fn test_luhn_invalid_number_never_completes() {
        let (mut session, delivered) = started_session();
        let observations = frame(&[("4111111111111112", 0.9), ("12/25", 0.9)]);
        for _ in 0..10 {
            assert_eq!(session.submit_frame(&observations).unwrap(), SessionState::Running);
        }

        assert!(delivered.lock().is_empty());
        assert_eq!(session.record().number.as_deref(), Some("4111111111111112"));
        assert!(session.record().network.is_none());
    }

    #[test]
    fn test_cancel_drops_handler() {
        let (mut session, delivered) = started_session();
        let observations = frame(&[("4111111111111111", 0.9), ("12/25", 0.9)]);
        session.submit_frame(&observations).unwrap();
        session.cancel();

        assert_eq!(session.state(), SessionState::Cancelled);
        assert!(session.submit_frame(&observations).is_err());
        assert!(session.submit_frame(&observations).is_err());
        assert!(delivered.lock().is_empty());

        // Cancelling again is harmless
        session.cancel();
        assert_eq!(session.state(), SessionState::Cancelled);
    }

    #[test]
    fn test_cancel_idle_session() {
        let mut session = ScanSession::new(&ScannerConfig::default()).unwrap();
        session.cancel();
        assert_eq!(session.state(), SessionState::Cancelled);
        assert!(session.start(|_| {}).is_err());
    }

    #[test]
    fn test_cancel_after_completion_keeps_completed() {
        let (mut session, _) = started_session();
        let observations = frame(&[("4111111111111111", 0.9), ("12/25", 0.9)]);
        for _ in 0..3 {
            session.submit_frame(&observations).unwrap();
        }
        session.cancel();
        assert_eq!(session.state(), SessionState::Completed);
    }

    #[test]
    fn test_name_collected_alongside() {
        let (mut session, delivered) = started_session();
        let name_frame = frame(&[("JOHN SMITH", 0.8)]);
        for _ in 0..5 {
            session.submit_frame(&name_frame).unwrap();
        }
        assert_eq!(session.record().name.as_deref(), Some("JOHN SMITH"));

        let card_frame = frame(&[("4111 1111 1111 1111", 0.9), ("12/25", 0.9)]);
        for _ in 0..3 {
            session.submit_frame(&card_frame).unwrap();
        }

        let records = delivered.lock();
        assert_eq!(records[0].name.as_deref(), Some("JOHN SMITH"));
    }

    #[test]
    fn test_debug_trace_and_number_seen() {
        let (mut session, _) = started_session();
        session
            .submit_frame(&frame(&[("VISA", 0.9), ("12/25", 0.2)]))
            .unwrap();
        assert!(!session.number_seen());

        session
            .submit_frame(&frame(&[("4111 1111 1111 1111", 0.9)]))
            .unwrap();
        assert!(session.number_seen());
        assert_eq!(session.record().debug_trace, "VISA,12/25,4111 1111 1111 1111");
    }

    #[test]
    fn test_empty_frames_count() {
        let (mut session, delivered) = started_session();
        for _ in 0..5 {
            session.submit_frame(&[]).unwrap();
        }
        assert_eq!(session.frames_processed(), 5);
        assert_eq!(session.record().debug_trace, "");
        assert!(delivered.lock().is_empty());
    }
}

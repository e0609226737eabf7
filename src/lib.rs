//! card-scanner - payment card extraction from live OCR output
//!
//! Consumes the per-frame text observations produced by a camera OCR pipeline
//! and converges on a validated card number, expiry date, cardholder name and
//! card network. Camera capture, rectangle tracking and text recognition are
//! external collaborators; this crate only sees their output.

pub mod analysis;
pub mod capture;
pub mod card;
pub mod config;
pub mod error;
pub mod session;

pub use analysis::{Candidate, CandidateClassifier, CardField, ConsensusTracker};
pub use capture::{CardRegion, ObservedFrame, Rect, TextObservation};
pub use card::{classify_network, luhn_check, CardNetwork, CardRecord, NetworkClassifier};
pub use config::ScannerConfig;
pub use error::{Result, ScanError};
pub use session::{ScanSession, ScanStatus, ScanWorker, SessionState};

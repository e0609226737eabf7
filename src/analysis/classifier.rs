//! Candidate classification
//!
//! Decides whether a recognized string is a card number, an expiry date, a
//! cardholder name, or noise. Classification is pure: the same input always
//! yields the same candidate.
//!
//! The name filter favours precision. Missing a real name on one frame is
//! harmless since more frames follow, but letting a bank slogan through can
//! end up accepted.

use super::Candidate;
use crate::capture::frame::TextObservation;
use crate::config::ClassifierConfig;

/// Stateless classifier for raw OCR strings
#[derive(Debug, Clone)]
pub struct CandidateClassifier {
    min_confidence: f32,
    min_number_length: usize,
    min_name_length: usize,
    /// Exclusion terms, upper-cased once up front
    exclusions: Vec<String>,
}

impl CandidateClassifier {
    /// Create a classifier from configuration
    pub fn new(config: &ClassifierConfig) -> Self {
        Self {
            min_confidence: config.min_confidence,
            min_number_length: config.min_number_length,
            min_name_length: config.min_name_length,
            exclusions: config
                .name_exclusions
                .iter()
                .map(|term| term.to_uppercase())
                .filter(|term| !term.is_empty())
                .collect(),
        }
    }

    /// Classify one observation
    pub fn classify_observation(&self, observation: &TextObservation) -> Option<Candidate> {
        self.classify(&observation.text, observation.confidence)
    }

    /// Classify a raw string recognized with the given confidence
    pub fn classify(&self, text: &str, confidence: f32) -> Option<Candidate> {
        // Also rejects NaN
        if !(confidence > self.min_confidence) {
            return None;
        }

        if let Some(number) = self.number_candidate(text) {
            return Some(Candidate::Number(number));
        }

        if is_expiry_token(text) {
            return Some(Candidate::ExpiryDate(text.to_string()));
        }

        self.detect_name_holder(text).map(Candidate::Name)
    }

    /// Space-stripped digits, if long enough to be a card number
    fn number_candidate(&self, text: &str) -> Option<String> {
        let digits: String = text.chars().filter(|c| *c != ' ').collect();
        (digits.len() >= self.min_number_length && is_all_digits(&digits)).then_some(digits)
    }

    /// Trimmed text if it plausibly is a cardholder name
    fn detect_name_holder(&self, text: &str) -> Option<String> {
        let upper = text.to_uppercase();
        if self.exclusions.iter().any(|term| upper.contains(term.as_str())) {
            return None;
        }

        let trimmed = text.trim();
        let compact: String = trimmed.chars().filter(|c| !c.is_whitespace()).collect();
        if is_all_digits(&compact) || is_expiry_token(text) {
            return None;
        }

        if text.chars().count() < self.min_name_length {
            return None;
        }

        Some(trimmed.to_string())
    }
}

impl Default for CandidateClassifier {
    fn default() -> Self {
        Self::new(&ClassifierConfig::default())
    }
}

/// True for the empty string, as nothing non-numeric is present
fn is_all_digits(text: &str) -> bool {
    text.bytes().all(|b| b.is_ascii_digit())
}

/// Exactly `NN/NN` with nothing before or after
fn is_expiry_token(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.len() == 5
        && bytes[2] == b'/'
        && [0, 1, 3, 4].iter().all(|&i| bytes[i].is_ascii_digit())
}

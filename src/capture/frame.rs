//! Per-frame OCR output handed to the scanner

use serde::{Deserialize, Serialize};
use std::time::Instant;

/// One recognized string from the external OCR collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextObservation {
    /// Top recognition candidate
    pub text: String,
    /// Recognition confidence (0.0 - 1.0)
    pub confidence: f32,
}

impl TextObservation {
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            text: text.into(),
            confidence,
        }
    }
}

/// All observations recognized on one video frame
#[derive(Debug, Clone)]
pub struct ObservedFrame {
    /// Observations in no particular order
    pub observations: Vec<TextObservation>,
    /// When the frame was handed to the scanner
    pub timestamp: Instant,
}

impl ObservedFrame {
    /// Create a new frame stamped with the current time
    pub fn new(observations: Vec<TextObservation>) -> Self {
        Self {
            observations,
            timestamp: Instant::now(),
        }
    }

    /// Number of observations in the frame
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Raw strings joined with commas, regardless of confidence
    pub fn raw_text(&self) -> String {
        raw_text(&self.observations)
    }
}

/// Join the raw strings of a frame's observations with commas
pub fn raw_text(observations: &[TextObservation]) -> String {
    observations
        .iter()
        .map(|observation| observation.text.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

impl From<Vec<TextObservation>> for ObservedFrame {
    fn from(observations: Vec<TextObservation>) -> Self {
        Self::new(observations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_text() {
        let frame = ObservedFrame::new(vec![
            TextObservation::new("4111 1111 1111 1111", 0.9),
            TextObservation::new("12/25", 0.2),
        ]);
        assert_eq!(frame.len(), 2);
        assert_eq!(frame.raw_text(), "4111 1111 1111 1111,12/25");
    }

    #[test]
    fn test_empty_frame() {
        let frame = ObservedFrame::from(Vec::new());
        assert!(frame.is_empty());
        assert_eq!(frame.raw_text(), "");
    }

    #[test]
    fn test_observation_deserialize() {
        let json = r#"[{"text": "JOHN SMITH", "confidence": 0.8}]"#;
        let observations: Vec<TextObservation> = serde_json::from_str(json).unwrap();
        assert_eq!(observations, vec![TextObservation::new("JOHN SMITH", 0.8)]);
    }
}

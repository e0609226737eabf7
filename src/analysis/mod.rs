//! Analysis Layer
//!
//! Turns raw OCR strings into typed candidates and votes them into an
//! accepted card record across frames.

pub mod classifier;
pub mod consensus;

pub use classifier::CandidateClassifier;
pub use consensus::ConsensusTracker;

use std::fmt;

/// Card field a candidate competes for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardField {
    Number,
    Name,
    Expiry,
}

impl fmt::Display for CardField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardField::Number => f.write_str("number"),
            CardField::Name => f.write_str("name"),
            CardField::Expiry => f.write_str("expiry"),
        }
    }
}

/// A classified guess derived from one OCR observation
///
/// Two candidates are the same vote only if both the field and the exact
/// string match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Candidate {
    /// Card number, digits only
    Number(String),
    /// Cardholder name
    Name(String),
    /// Expiry date, `MM/YY`
    ExpiryDate(String),
}

impl Candidate {
    /// Field this candidate votes for
    pub fn field(&self) -> CardField {
        match self {
            Candidate::Number(_) => CardField::Number,
            Candidate::Name(_) => CardField::Name,
            Candidate::ExpiryDate(_) => CardField::Expiry,
        }
    }

    /// Candidate text
    pub fn value(&self) -> &str {
        match self {
            Candidate::Number(value) | Candidate::Name(value) | Candidate::ExpiryDate(value) => {
                value
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_candidate_identity() {
        let mut tally: HashMap<Candidate, u32> = HashMap::new();
        *tally.entry(Candidate::Number("4111".to_string())).or_default() += 1;
        *tally.entry(Candidate::Number("4111".to_string())).or_default() += 1;
        *tally.entry(Candidate::Name("4111".to_string())).or_default() += 1;

        assert_eq!(tally.len(), 2);
        assert_eq!(tally[&Candidate::Number("4111".to_string())], 2);
        assert_eq!(tally[&Candidate::Name("4111".to_string())], 1);
    }

    #[test]
    fn test_candidate_accessors() {
        let candidate = Candidate::ExpiryDate("12/25".to_string());
        assert_eq!(candidate.field(), CardField::Expiry);
        assert_eq!(candidate.value(), "12/25");
        assert_eq!(candidate.field().to_string(), "expiry");
    }
}

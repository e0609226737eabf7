//! Field validation: Luhn checksum and network classification

use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;
use tracing::debug;

use super::CardNetwork;
use crate::config::NetworkRule;
use crate::error::{Result, ScanError};

/// Shortest card number (in digits) the checksum accepts is one longer than this
const MIN_CHECKED_LEN: usize = 12;

static DEFAULT_CLASSIFIER: LazyLock<NetworkClassifier> = LazyLock::new(|| {
    NetworkClassifier::new(&NetworkRule::defaults()).expect("default network rules must compile")
});

/// Validate a card number with the Luhn (mod 10) checksum
///
/// Returns false for anything that is not more than 12 ASCII digits.
pub fn luhn_check(number: &str) -> bool {
    if number.len() <= MIN_CHECKED_LEN || !number.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }

    let Some((&check_digit, payload)) = number.as_bytes().split_last() else {
        return false;
    };

    // Reduced mod 10 per digit so arbitrarily long input cannot overflow
    let sum = payload
        .iter()
        .rev()
        .map(|b| u32::from(b - b'0'))
        .enumerate()
        .map(|(index, digit)| {
            if index % 2 == 0 {
                let doubled = digit * 2;
                if doubled > 9 {
                    doubled / 10 + doubled % 10
                } else {
                    doubled
                }
            } else {
                digit
            }
        })
        .fold(0u32, |acc, digit| (acc + digit) % 10);

    (sum * 9) % 10 == u32::from(check_digit - b'0')
}

/// Classify a number with the built-in network rules
pub fn classify_network(number: &str) -> CardNetwork {
    DEFAULT_CLASSIFIER.classify(number)
}

/// Ordered set of compiled network rules
///
/// Rules are tried in order and the first match wins.
#[derive(Debug, Clone)]
pub struct NetworkClassifier {
    rules: Vec<(CardNetwork, Regex)>,
}

impl NetworkClassifier {
    /// Compile a rule table
    pub fn new(rules: &[NetworkRule]) -> Result<Self> {
        let rules = rules
            .iter()
            .map(|rule| {
                RegexBuilder::new(&rule.pattern)
                    .case_insensitive(true)
                    .build()
                    .map(|regex| (rule.network, regex))
                    .map_err(|source| ScanError::InvalidPattern {
                        network: rule.network,
                        source,
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!("Compiled {} network rules", rules.len());
        Ok(Self { rules })
    }

    /// Return the first network whose rule matches, or `Unknown`
    pub fn classify(&self, number: &str) -> CardNetwork {
        self.rules
            .iter()
            .find(|(_, regex)| regex.is_match(number))
            .map(|(network, _)| *network)
            .unwrap_or(CardNetwork::Unknown)
    }

    /// Number of rules in the table
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}

impl Default for NetworkClassifier {
    fn default() -> Self {
        DEFAULT_CLASSIFIER.clone()
    }
}

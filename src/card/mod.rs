//! Card Data Model
//!
//! The accepted card record and the payment networks it can belong to.

pub mod validate;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use validate::{classify_network, luhn_check, NetworkClassifier};

/// Payment card network (issuing scheme)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardNetwork {
    Unknown,
    Amex,
    Visa,
    MasterCard,
    Diners,
    Discover,
    JCB,
    Elo,
    Hipercard,
    UnionPay,
}

impl CardNetwork {
    /// Known networks in rule priority order
    pub const PRIORITY: [CardNetwork; 9] = [
        CardNetwork::Amex,
        CardNetwork::Visa,
        CardNetwork::MasterCard,
        CardNetwork::Diners,
        CardNetwork::Discover,
        CardNetwork::JCB,
        CardNetwork::Elo,
        CardNetwork::Hipercard,
        CardNetwork::UnionPay,
    ];

    /// Display name for this network
    pub fn name(&self) -> &'static str {
        match self {
            CardNetwork::Unknown => "Unknown",
            CardNetwork::Amex => "Amex",
            CardNetwork::Visa => "Visa",
            CardNetwork::MasterCard => "MasterCard",
            CardNetwork::Diners => "Diners",
            CardNetwork::Discover => "Discover",
            CardNetwork::JCB => "JCB",
            CardNetwork::Elo => "Elo",
            CardNetwork::Hipercard => "Hipercard",
            CardNetwork::UnionPay => "UnionPay",
        }
    }

    /// Default number pattern for this network, `None` for `Unknown`
    pub fn default_pattern(&self) -> Option<&'static str> {
        match self {
            CardNetwork::Unknown => None,
            CardNetwork::Amex => Some(r"^3[47][0-9]{5,}$"),
            CardNetwork::Visa => Some(r"^4[0-9]{6,}([0-9]{3})?$"),
            CardNetwork::MasterCard => Some(r"^(5[1-5][0-9]{4}|677189)[0-9]{5,}$"),
            CardNetwork::Diners => Some(r"^3(?:0[0-5]|[68][0-9])[0-9]{4,}$"),
            CardNetwork::Discover => Some(r"^6(?:011|5[0-9]{2})[0-9]{3,}$"),
            CardNetwork::JCB => Some(r"^(?:2131|1800|35[0-9]{3})[0-9]{3,}$"),
            CardNetwork::Elo => Some(
                r"^((((636368)|(438935)|(504175)|(451416)|(636297))[0-9]{0,10})|((5067)|(4576)|(4011))[0-9]{0,12})$",
            ),
            CardNetwork::Hipercard => Some(r"^(606282|3841)[0-9]{5,}$"),
            CardNetwork::UnionPay => Some(r"^(62|88)[0-9]{5,}$"),
        }
    }
}

impl fmt::Display for CardNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// In-progress or accepted scan result
///
/// `network` is only ever derived from a Luhn-valid `number`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CardRecord {
    /// Accepted card number, digits only
    pub number: Option<String>,
    /// Accepted cardholder name
    pub name: Option<String>,
    /// Accepted expiry date, `MM/YY`
    pub expiry: Option<String>,
    /// Network inferred from the accepted number
    pub network: Option<CardNetwork>,
    /// Every raw OCR string seen while building this record
    pub debug_trace: String,
}

impl CardRecord {
    /// Whether the accepted number passes the Luhn check
    pub fn has_valid_number(&self) -> bool {
        self.number.as_deref().is_some_and(luhn_check)
    }

    /// Whether the record is good enough to hand back to the caller
    pub fn is_complete(&self) -> bool {
        self.has_valid_number() && self.expiry.is_some()
    }

    /// Append one frame's raw strings to the diagnostic trace
    pub fn append_trace(&mut self, raw: &str) {
        if raw.is_empty() {
            return;
        }
        if !self.debug_trace.is_empty() {
            self.debug_trace.push(',');
        }
        self.debug_trace.push_str(raw);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_excludes_unknown() {
        assert!(!CardNetwork::PRIORITY.contains(&CardNetwork::Unknown));
        assert_eq!(CardNetwork::PRIORITY[0], CardNetwork::Amex);
        assert_eq!(CardNetwork::PRIORITY[8], CardNetwork::UnionPay);
        for network in CardNetwork::PRIORITY {
            assert!(network.default_pattern().is_some());
        }
        assert!(CardNetwork::Unknown.default_pattern().is_none());
    }

    #[test]
    fn test_record_completion() {
        let mut record = CardRecord::default();
        assert!(!record.is_complete());

        record.number = Some("4111111111111111".to_string());
        assert!(!record.is_complete());

        record.expiry = Some("12/25".to_string());
        assert!(record.is_complete());

        record.number = Some("4111111111111112".to_string());
        assert!(!record.is_complete());
    }

    #[test]
    fn test_append_trace() {
        let mut record = CardRecord::default();
        record.append_trace("");
        assert_eq!(record.debug_trace, "");

        record.append_trace("4111 1111,12/25");
        record.append_trace("JOHN SMITH");
        assert_eq!(record.debug_trace, "4111 1111,12/25,JOHN SMITH");
    }
}

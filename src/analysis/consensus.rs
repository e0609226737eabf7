//! Consensus tracking
//!
//! Tallies identical candidates across frames and promotes a value into the
//! card record once it has been seen often enough. Acceptance is sticky but
//! not final: a different value for the same field that later reaches its own
//! threshold replaces the accepted one.

use std::collections::HashMap;
use tracing::debug;

use super::{Candidate, CardField};
use crate::card::{luhn_check, CardRecord, NetworkClassifier};
use crate::config::ConsensusConfig;

/// Vote counts per candidate, kept for the lifetime of a session
pub type VoteTally = HashMap<Candidate, u32>;

/// Single-writer vote tracker owning the in-progress record
#[derive(Debug, Clone)]
pub struct ConsensusTracker {
    tally: VoteTally,
    record: CardRecord,
    thresholds: ConsensusConfig,
    networks: NetworkClassifier,
}

impl ConsensusTracker {
    /// Create an empty tracker
    pub fn new(thresholds: ConsensusConfig, networks: NetworkClassifier) -> Self {
        Self {
            tally: VoteTally::new(),
            record: CardRecord::default(),
            thresholds,
            networks,
        }
    }

    /// Votes needed to accept a value for `field`
    pub fn votes_required(&self, field: CardField) -> u32 {
        match field {
            CardField::Number => self.thresholds.number_votes,
            CardField::Name => self.thresholds.name_votes,
            CardField::Expiry => self.thresholds.expiry_votes,
        }
    }

    /// Count one observation of `candidate`
    ///
    /// Returns true when the observation put the value into the record.
    pub fn observe(&mut self, candidate: Candidate) -> bool {
        let field = candidate.field();
        let required = self.votes_required(field);

        let count = self.tally.entry(candidate.clone()).or_insert(0);
        *count += 1;
        let count = *count;

        if count < required {
            return false;
        }

        debug!("Accepting {} after {} votes", field, count);
        match candidate {
            Candidate::Number(number) => {
                self.record.network = luhn_check(&number).then(|| self.networks.classify(&number));
                self.record.number = Some(number);
            }
            Candidate::Name(name) => self.record.name = Some(name),
            Candidate::ExpiryDate(expiry) => self.record.expiry = Some(expiry),
        }
        true
    }

    /// Votes recorded so far for `candidate`
    pub fn votes(&self, candidate: &Candidate) -> u32 {
        self.tally.get(candidate).copied().unwrap_or(0)
    }

    /// Number of distinct candidates seen
    pub fn distinct_candidates(&self) -> usize {
        self.tally.len()
    }

    /// The record as accepted so far
    pub fn record(&self) -> &CardRecord {
        &self.record
    }

    /// Append one frame's raw strings to the record's trace
    pub fn append_trace(&mut self, raw: &str) {
        self.record.append_trace(raw);
    }

    /// Whether the accepted fields are enough to finish scanning
    pub fn is_complete(&self) -> bool {
        self.record.is_complete()
    }

    /// Forget all votes and accepted fields
    pub fn reset(&mut self) {
        self.tally.clear();
        self.record = CardRecord::default();
    }
}

impl Default for ConsensusTracker {
    fn default() -> Self {
        Self::new(ConsensusConfig::default(), NetworkClassifier::default())
    }
}

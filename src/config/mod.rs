//! Scanner Configuration
//!
//! Tunable policy constants stored in TOML format. Every value has a default
//! matching the behaviour the scanner ships with.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::capture::region::CardRegion;
use crate::card::CardNetwork;
use crate::error::ScanError;

/// Scanner settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Candidate classification settings
    pub classifier: ClassifierConfig,
    /// Vote thresholds
    pub consensus: ConsensusConfig,
    /// Physical card geometry used to gate detected rectangles
    pub card_region: CardRegion,
    /// Network rules, tried in order
    pub networks: Vec<NetworkRule>,
}

/// Candidate classification settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Observations at or below this confidence are dropped
    pub min_confidence: f32,
    /// Minimum digit count for a card number candidate
    pub min_number_length: usize,
    /// Minimum character count for a cardholder name candidate
    pub min_name_length: usize,
    /// Terms that disqualify a string from being a name (case-insensitive)
    pub name_exclusions: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.5,
            min_number_length: 13,
            min_name_length: 8,
            name_exclusions: [
                "VISA", "VIS", "BANQUE", "PREMIERE", "PREMIUM", "AMERICAN", "BRED", "POPULAIRE",
                "BOURSORAMA", "BUSINESS", "EXPIRE", "A FIN", "FIN", "MASTER", "CARD", "MEMBER",
                "DEPUIS", "MEMBRE",
            ]
            .iter()
            .map(|term| term.to_string())
            .collect(),
        }
    }
}

/// Number of identical observations needed before a field is accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsensusConfig {
    pub number_votes: u32,
    pub expiry_votes: u32,
    /// Names are noisier, so they need a higher bar
    pub name_votes: u32,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            number_votes: 3,
            expiry_votes: 3,
            name_votes: 5,
        }
    }
}

/// A single network pattern rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkRule {
    pub network: CardNetwork,
    pub pattern: String,
}

impl NetworkRule {
    /// Built-in rule table in priority order
    pub fn defaults() -> Vec<NetworkRule> {
        CardNetwork::PRIORITY
            .iter()
            .filter_map(|network| {
                network.default_pattern().map(|pattern| NetworkRule {
                    network: *network,
                    pattern: pattern.to_string(),
                })
            })
            .collect()
    }
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            classifier: ClassifierConfig::default(),
            consensus: ConsensusConfig::default(),
            card_region: CardRegion::default(),
            networks: NetworkRule::defaults(),
        }
    }
}

impl ScannerConfig {
    /// Check that values are in range
    ///
    /// Network patterns are compiled separately when a session is built.
    pub fn validate(&self) -> std::result::Result<(), ScanError> {
        let confidence = self.classifier.min_confidence;
        if !(0.0..=1.0).contains(&confidence) {
            return Err(ScanError::Config(format!(
                "min_confidence must be within [0, 1], got {confidence}"
            )));
        }

        let votes = [
            ("number_votes", self.consensus.number_votes),
            ("expiry_votes", self.consensus.expiry_votes),
            ("name_votes", self.consensus.name_votes),
        ];
        if let Some((name, _)) = votes.iter().find(|(_, count)| *count == 0) {
            return Err(ScanError::Config(format!("{name} must be at least 1")));
        }

        let region = &self.card_region;
        if region.width_mm <= 0.0 || region.height_mm <= 0.0 {
            return Err(ScanError::Config(
                "card_region dimensions must be positive".to_string(),
            ));
        }
        if region.min_aspect_factor > region.max_aspect_factor {
            return Err(ScanError::Config(
                "card_region min_aspect_factor exceeds max_aspect_factor".to_string(),
            ));
        }

        Ok(())
    }
}

/// Get the configuration directory
pub fn config_dir() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "cardscanner", "CardScanner")
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

    Ok(proj_dirs.config_dir().to_path_buf())
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<ScannerConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config: ScannerConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &ScannerConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

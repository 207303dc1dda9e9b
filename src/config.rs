//! Configuration loading from TOML.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Session defaults here seed every new session; per-session overrides
//! come in through the API.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fs;

use crate::session::SessionConfig;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub session: SessionDefaults,
    pub analysis: AnalysisConfig,
    pub api: ApiConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionDefaults {
    pub initial_bankroll: Decimal,
    pub stop_loss_percent: Decimal,
    pub take_profit_levels: Vec<Decimal>,
    pub flat_bet_min_percent: Decimal,
    pub flat_bet_max_percent: Decimal,
    pub max_spins: Option<u32>,
    pub max_duration_minutes: Option<i64>,
    pub bingo_stake: Decimal,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AnalysisConfig {
    /// Outcomes considered by the analytics functions.
    pub lookback: usize,
    /// Minimum occurrences for a hot number.
    pub hot_min_freq: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    pub enabled: bool,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub rules_file: String,
    pub archive_dir: String,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        Ok(config)
    }

    /// Session configuration built from the configured defaults.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            initial_bankroll: self.session.initial_bankroll,
            stop_loss_percent: self.session.stop_loss_percent,
            take_profit_levels: self.session.take_profit_levels.clone(),
            flat_bet_min_percent: self.session.flat_bet_min_percent,
            flat_bet_max_percent: self.session.flat_bet_max_percent,
            max_spins: self.session.max_spins,
            max_duration_minutes: self.session.max_duration_minutes,
            lookback: self.analysis.lookback,
            hot_min_freq: self.analysis.hot_min_freq,
            bingo_stake: self.session.bingo_stake,
        }
    }
}

//! Shared types for the WHEELWISE engine.
//!
//! These types form the data model used across all modules.
//! They are designed to be stable so that analysis, rule, and session
//! modules can depend on them without circular references.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::wheel;

// ---------------------------------------------------------------------------
// Outcome characteristics
// ---------------------------------------------------------------------------

/// Pocket color on a European wheel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    Red,
    Black,
    /// Zero only.
    Green,
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Red => write!(f, "Red"),
            Color::Black => write!(f, "Black"),
            Color::Green => write!(f, "Green"),
        }
    }
}

/// Even/odd parity. Zero carries no parity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Parity {
    Even,
    Odd,
}

impl Parity {
    pub fn opposite(&self) -> Self {
        match self {
            Parity::Even => Parity::Odd,
            Parity::Odd => Parity::Even,
        }
    }
}

impl fmt::Display for Parity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Parity::Even => write!(f, "Even"),
            Parity::Odd => write!(f, "Odd"),
        }
    }
}

/// Coarse 4-way wheel section (the French call bets).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Section {
    Zero,
    Voisins,
    Tiers,
    Orphelins,
}

impl Section {
    /// All sections (useful for iteration).
    pub const ALL: &'static [Section] = &[
        Section::Zero,
        Section::Voisins,
        Section::Tiers,
        Section::Orphelins,
    ];
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Zero => write!(f, "Zero"),
            Section::Voisins => write!(f, "Voisins"),
            Section::Tiers => write!(f, "Tiers"),
            Section::Orphelins => write!(f, "Orphelins"),
        }
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// A single spin result plus derived characteristics.
///
/// Immutable once constructed: all derived fields are computed from the
/// winning number in [`Outcome::new`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outcome {
    /// Winning number, 0-36.
    pub number: u8,
    pub color: Color,
    pub section: Section,
    /// Dozen 1-3; None for zero.
    pub dozen: Option<u8>,
    /// Table column 1-3; None for zero.
    pub column: Option<u8>,
    /// None for zero.
    pub parity: Option<Parity>,
    /// 19-36 = high; None for zero.
    pub high: Option<bool>,
    /// Position in the session (1, 2, 3, ...).
    pub sequence: u32,
    pub timestamp: DateTime<Utc>,
}

impl Outcome {
    /// Build an outcome from a winning number, deriving all characteristics.
    pub fn new(number: u8, sequence: u32) -> Result<Self, EngineError> {
        if number > 36 {
            return Err(EngineError::Validation(format!(
                "spin number {number} outside 0-36"
            )));
        }
        Ok(Outcome {
            number,
            color: wheel::color(number),
            section: wheel::section(number),
            dozen: wheel::dozen(number),
            column: wheel::column(number),
            parity: wheel::parity(number),
            high: wheel::is_high(number),
            sequence,
            timestamp: Utc::now(),
        })
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} ({} | {})",
            self.sequence, self.number, self.color, self.section,
        )
    }
}

// ---------------------------------------------------------------------------
// Session enums
// ---------------------------------------------------------------------------

/// Lifecycle status of a playing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    /// Accepting spins and bets.
    Active,
    /// Stopped (manually or by a discipline limit). Terminal.
    Stopped,
    /// Reached its end condition normally. Terminal.
    Completed,
    /// Locked after a discipline violation; requires manual release.
    Locked,
    /// Cooling down before a new session may start.
    Cooldown,
}

impl SessionStatus {
    /// Whether the session still accepts spins and bets.
    pub fn is_active(&self) -> bool {
        matches!(self, SessionStatus::Active)
    }

    /// Whether the session can never become active again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Stopped | SessionStatus::Completed)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Active => write!(f, "ACTIVE"),
            SessionStatus::Stopped => write!(f, "STOPPED"),
            SessionStatus::Completed => write!(f, "COMPLETED"),
            SessionStatus::Locked => write!(f, "LOCKED"),
            SessionStatus::Cooldown => write!(f, "COOLDOWN"),
        }
    }
}

/// Why a session stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    ManualStop,
    StopLossHit,
    TakeProfitReached,
    MaxSpinsReached,
    MaxDurationReached,
    TiltDetected,
    BankrollDepleted,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::ManualStop => write!(f, "manual stop"),
            StopReason::StopLossHit => write!(f, "stop-loss hit"),
            StopReason::TakeProfitReached => write!(f, "take-profit reached"),
            StopReason::MaxSpinsReached => write!(f, "max spins reached"),
            StopReason::MaxDurationReached => write!(f, "max duration reached"),
            StopReason::TiltDetected => write!(f, "tilt detected"),
            StopReason::BankrollDepleted => write!(f, "bankroll depleted"),
        }
    }
}

// ---------------------------------------------------------------------------
// Alerts
// ---------------------------------------------------------------------------

/// Alert severity for the orchestrating layer to dispatch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AlertSeverity {
    Info,
    Warning,
    Critical,
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertSeverity::Info => write!(f, "INFO"),
            AlertSeverity::Warning => write!(f, "WARNING"),
            AlertSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// What kind of event an alert reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertKind {
    SessionStarted,
    SessionEnded,
    StopLossHit,
    TakeProfitReached,
    MaxSpinsReached,
    MaxDurationReached,
    TiltDetected,
    BetRuleViolation,
}

/// An alert raised by `record_outcome` / `record_bet`, returned to the
/// caller for dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub session_id: Uuid,
    pub kind: AlertKind,
    pub severity: AlertSeverity,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl Alert {
    pub fn new(
        session_id: Uuid,
        kind: AlertKind,
        severity: AlertSeverity,
        message: impl Into<String>,
    ) -> Self {
        Alert {
            session_id,
            kind,
            severity,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {:?}: {}", self.severity, self.kind, self.message)
    }
}

// ---------------------------------------------------------------------------
// Weighted picks
// ---------------------------------------------------------------------------

/// Which signal contributed a pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickSource {
    Rule,
    Hot,
    Neighbor,
    Missing,
}

impl fmt::Display for PickSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PickSource::Rule => write!(f, "rule"),
            PickSource::Hot => write!(f, "hot"),
            PickSource::Neighbor => write!(f, "neighbor"),
            PickSource::Missing => write!(f, "missing"),
        }
    }
}

/// Stake allocation tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tier {
    /// High-confidence allocation.
    Bingo,
    /// Backup coverage at a reduced stake.
    Safety,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Bingo => write!(f, "bingo"),
            Tier::Safety => write!(f, "safety"),
        }
    }
}

/// A single number with its stake, provenance, and tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightedPick {
    pub number: u8,
    pub stake: Decimal,
    pub source: PickSource,
    pub tier: Tier,
}

impl fmt::Display for WeightedPick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} @ {} ({}/{})",
            self.number, self.stake, self.source, self.tier,
        )
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for WHEELWISE.
///
/// All variants are local and recoverable; nothing in the core is
/// process-fatal.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid session state: {0}")]
    State(String),

    #[error("Session not found: {0}")]
    SessionNotFound(Uuid),

    #[error("Rule not found: {0}")]
    RuleNotFound(Uuid),

    #[error("Storage error: {0}")]
    Storage(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- Outcome tests --

    #[test]
    fn test_outcome_zero() {
        let o = Outcome::new(0, 1).unwrap();
        assert_eq!(o.color, Color::Green);
        assert_eq!(o.section, Section::Zero);
        assert!(o.dozen.is_none());
        assert!(o.column.is_none());
        assert!(o.parity.is_none());
        assert!(o.high.is_none());
    }

    #[test]
    fn test_outcome_red_high() {
        let o = Outcome::new(32, 5).unwrap();
        assert_eq!(o.color, Color::Red);
        assert_eq!(o.dozen, Some(3));
        assert_eq!(o.column, Some(2));
        assert_eq!(o.parity, Some(Parity::Even));
        assert_eq!(o.high, Some(true));
        assert_eq!(o.sequence, 5);
    }

    #[test]
    fn test_outcome_low_black() {
        let o = Outcome::new(4, 1).unwrap();
        assert_eq!(o.color, Color::Black);
        assert_eq!(o.dozen, Some(1));
        assert_eq!(o.column, Some(1));
        assert_eq!(o.parity, Some(Parity::Even));
        assert_eq!(o.high, Some(false));
    }

    #[test]
    fn test_outcome_rejects_out_of_range() {
        assert!(Outcome::new(37, 1).is_err());
        assert!(Outcome::new(255, 1).is_err());
    }

    #[test]
    fn test_outcome_serialization_roundtrip() {
        let o = Outcome::new(17, 3).unwrap();
        let json = serde_json::to_string(&o).unwrap();
        let parsed: Outcome = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.number, 17);
        assert_eq!(parsed.color, Color::Black);
        assert_eq!(parsed.sequence, 3);
    }

    #[test]
    fn test_outcome_display() {
        let o = Outcome::new(0, 12).unwrap();
        let display = format!("{o}");
        assert!(display.contains("#12"));
        assert!(display.contains("Green"));
    }

    // -- Parity tests --

    #[test]
    fn test_parity_opposite() {
        assert_eq!(Parity::Even.opposite(), Parity::Odd);
        assert_eq!(Parity::Odd.opposite(), Parity::Even);
    }

    // -- SessionStatus tests --

    #[test]
    fn test_session_status_flags() {
        assert!(SessionStatus::Active.is_active());
        assert!(!SessionStatus::Stopped.is_active());
        assert!(SessionStatus::Stopped.is_terminal());
        assert!(SessionStatus::Completed.is_terminal());
        assert!(!SessionStatus::Locked.is_terminal());
        assert!(!SessionStatus::Cooldown.is_terminal());
    }

    #[test]
    fn test_session_status_serialization_roundtrip() {
        for status in [
            SessionStatus::Active,
            SessionStatus::Stopped,
            SessionStatus::Completed,
            SessionStatus::Locked,
            SessionStatus::Cooldown,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            let parsed: SessionStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(status, parsed);
        }
    }

    // -- Alert tests --

    #[test]
    fn test_alert_display() {
        let alert = Alert::new(
            Uuid::new_v4(),
            AlertKind::StopLossHit,
            AlertSeverity::Critical,
            "stop-loss hit at -20%",
        );
        let display = format!("{alert}");
        assert!(display.contains("CRITICAL"));
        assert!(display.contains("StopLossHit"));
    }

    #[test]
    fn test_alert_severity_ordering() {
        assert!(AlertSeverity::Info < AlertSeverity::Warning);
        assert!(AlertSeverity::Warning < AlertSeverity::Critical);
    }

    // -- WeightedPick tests --

    #[test]
    fn test_weighted_pick_serialization_roundtrip() {
        use rust_decimal_macros::dec;
        let pick = WeightedPick {
            number: 30,
            stake: dec!(2.00),
            source: PickSource::Rule,
            tier: Tier::Bingo,
        };
        let json = serde_json::to_string(&pick).unwrap();
        let parsed: WeightedPick = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.number, 30);
        assert_eq!(parsed.source, PickSource::Rule);
        assert_eq!(parsed.tier, Tier::Bingo);
    }

    // -- EngineError tests --

    #[test]
    fn test_engine_error_display() {
        let e = EngineError::Validation("stake too high".to_string());
        assert_eq!(format!("{e}"), "Validation error: stake too high");

        let id = Uuid::new_v4();
        let e = EngineError::SessionNotFound(id);
        assert!(format!("{e}").contains(&id.to_string()));
    }
}

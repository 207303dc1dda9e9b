//! Custom betting-pattern rules.
//!
//! A [`Rule`] is an externally managed configuration: a type tag, a set
//! of trigger numbers, a set of suggested numbers, and a confidence
//! score. The [`engine`] module evaluates enabled rules against recent
//! history; [`defaults`] seeds a starter catalogue; [`RuleStore`] holds
//! the shared, read-mostly rule set.

pub mod defaults;
pub mod engine;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::types::EngineError;

pub use engine::{EvaluationContext, RuleMatch};

// ---------------------------------------------------------------------------
// Rule kinds
// ---------------------------------------------------------------------------

/// The 16 supported rule behaviors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleKind {
    /// Last outcome in the trigger set suggests configured numbers.
    Adjacent,
    /// Last outcome suggests its configured partner(s).
    Pair,
    /// Outcome two spins back suggests configured numbers.
    DelayedPair,
    /// Last outcome inside a correlated group suggests the rest of the
    /// group plus their close wheel neighbors.
    GroupCorrelation,
    /// Exact ordered run of outcomes suggests configured numbers.
    Sequence,
    /// A trigger number repeating within the last 5 spins.
    HotStreak,
    /// A trigger number absent from the lookback window.
    ColdNumber,
    /// Fires once the session spin count crosses a threshold.
    TimeBased,
    /// Three same-colored spins in a row.
    ColorAlternation,
    /// Three same-parity spins in a row.
    ParityAlternation,
    /// Last outcome's decade sector inside the configured trigger sectors.
    SectorBounce,
    /// One dozen claiming 3 of the last 5 spins.
    DozenCycle,
    /// Projects the numeric distance between the last two outcomes.
    RepeatingDistance,
    /// Always suggests the wheel mirror of the last outcome.
    MirrorNumber,
    /// Numbers seen before a recent gap but silent during it.
    GapPattern,
    /// A repeating number within the last 5 spins suggests its opposites.
    StreakBreaker,
}

impl RuleKind {
    pub const ALL: &'static [RuleKind] = &[
        RuleKind::Adjacent,
        RuleKind::Pair,
        RuleKind::DelayedPair,
        RuleKind::GroupCorrelation,
        RuleKind::Sequence,
        RuleKind::HotStreak,
        RuleKind::ColdNumber,
        RuleKind::TimeBased,
        RuleKind::ColorAlternation,
        RuleKind::ParityAlternation,
        RuleKind::SectorBounce,
        RuleKind::DozenCycle,
        RuleKind::RepeatingDistance,
        RuleKind::MirrorNumber,
        RuleKind::GapPattern,
        RuleKind::StreakBreaker,
    ];
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            RuleKind::Adjacent => "adjacent",
            RuleKind::Pair => "pair",
            RuleKind::DelayedPair => "delayed-pair",
            RuleKind::GroupCorrelation => "group-correlation",
            RuleKind::Sequence => "sequence",
            RuleKind::HotStreak => "hot-streak",
            RuleKind::ColdNumber => "cold-number",
            RuleKind::TimeBased => "time-based",
            RuleKind::ColorAlternation => "color-alternation",
            RuleKind::ParityAlternation => "parity-alternation",
            RuleKind::SectorBounce => "sector-bounce",
            RuleKind::DozenCycle => "dozen-cycle",
            RuleKind::RepeatingDistance => "repeating-distance",
            RuleKind::MirrorNumber => "mirror-number",
            RuleKind::GapPattern => "gap-pattern",
            RuleKind::StreakBreaker => "streak-breaker",
        };
        write!(f, "{tag}")
    }
}

// ---------------------------------------------------------------------------
// Rule
// ---------------------------------------------------------------------------

/// Default spin threshold for time-based rules.
pub const DEFAULT_SPIN_THRESHOLD: u32 = 50;
/// Default gap window for gap-pattern rules.
pub const DEFAULT_GAP_WINDOW: usize = 5;

/// A configured betting-pattern rule.
///
/// Counters are bookkeeping only and never influence matching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub id: Uuid,
    pub name: String,
    pub kind: RuleKind,
    /// Trigger numbers. For sector-bounce these are decade sector ids
    /// (0-3) rather than pocket numbers.
    pub triggers: Vec<u8>,
    /// Suggested numbers. Some kinds derive suggestions and treat an
    /// empty list as "use the derived default".
    pub suggestions: Vec<u8>,
    /// Confidence score, 0-100.
    pub confidence: u8,
    pub enabled: bool,
    /// Lifetime count of confirmed matches.
    pub times_triggered: u64,
    /// Lifetime count of suggestions confirmed by the following spin.
    pub times_hit: u64,
    /// Spin-count threshold (time-based only).
    #[serde(default)]
    pub spin_threshold: Option<u32>,
    /// Gap window length in spins (gap-pattern only).
    #[serde(default)]
    pub gap_window: Option<usize>,
    pub created_at: DateTime<Utc>,
}

impl Rule {
    pub fn new(
        name: impl Into<String>,
        kind: RuleKind,
        triggers: Vec<u8>,
        suggestions: Vec<u8>,
        confidence: u8,
    ) -> Self {
        Rule {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            triggers,
            suggestions,
            confidence,
            enabled: true,
            times_triggered: 0,
            times_hit: 0,
            spin_threshold: None,
            gap_window: None,
            created_at: Utc::now(),
        }
    }

    /// Structural validation. An invalid rule is skipped at evaluation
    /// time; other rules still run.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.name.trim().is_empty() {
            return Err(EngineError::Config("rule name must not be empty".into()));
        }
        if self.confidence > 100 {
            return Err(EngineError::Config(format!(
                "rule '{}': confidence {} outside 0-100",
                self.name, self.confidence
            )));
        }

        let trigger_bound = match self.kind {
            RuleKind::SectorBounce => 3,
            _ => 36,
        };
        if let Some(&bad) = self.triggers.iter().find(|&&n| n > trigger_bound) {
            return Err(EngineError::Config(format!(
                "rule '{}': trigger {bad} outside 0-{trigger_bound}",
                self.name
            )));
        }
        if let Some(&bad) = self.suggestions.iter().find(|&&n| n > 36) {
            return Err(EngineError::Config(format!(
                "rule '{}': suggestion {bad} outside 0-36",
                self.name
            )));
        }

        // Per-kind requirements.
        let needs_triggers = matches!(
            self.kind,
            RuleKind::Adjacent
                | RuleKind::Pair
                | RuleKind::DelayedPair
                | RuleKind::HotStreak
                | RuleKind::ColdNumber
                | RuleKind::SectorBounce
        );
        if needs_triggers && self.triggers.is_empty() {
            return Err(EngineError::Config(format!(
                "rule '{}' ({}) requires trigger numbers",
                self.name, self.kind
            )));
        }
        if self.kind == RuleKind::GroupCorrelation && self.triggers.len() < 2 {
            return Err(EngineError::Config(format!(
                "rule '{}': a correlation group needs at least 2 members",
                self.name
            )));
        }
        if self.kind == RuleKind::Sequence && self.triggers.len() < 2 {
            return Err(EngineError::Config(format!(
                "rule '{}': a sequence needs at least 2 numbers",
                self.name
            )));
        }

        let needs_suggestions = matches!(
            self.kind,
            RuleKind::Adjacent
                | RuleKind::Pair
                | RuleKind::DelayedPair
                | RuleKind::Sequence
                | RuleKind::TimeBased
                | RuleKind::SectorBounce
        );
        if needs_suggestions && self.suggestions.is_empty() {
            return Err(EngineError::Config(format!(
                "rule '{}' ({}) requires suggestion numbers",
                self.name, self.kind
            )));
        }

        Ok(())
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] conf={} triggers={:?} -> {:?}",
            self.name, self.kind, self.confidence, self.triggers, self.suggestions,
        )
    }
}

// ---------------------------------------------------------------------------
// Rule store
// ---------------------------------------------------------------------------

/// Shared, read-mostly rule catalogue.
///
/// Reads take a short read lock; counter updates and CRUD take the
/// write lock. No lock is held across I/O or await points.
pub struct RuleStore {
    rules: RwLock<Vec<Rule>>,
}

impl RuleStore {
    pub fn new() -> Self {
        RuleStore {
            rules: RwLock::new(Vec::new()),
        }
    }

    pub fn from_rules(rules: Vec<Rule>) -> Self {
        RuleStore {
            rules: RwLock::new(rules),
        }
    }

    /// Snapshot of all rules (for listing and persistence).
    pub fn list(&self) -> Vec<Rule> {
        match self.rules.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn get(&self, id: Uuid) -> Result<Rule, EngineError> {
        self.list()
            .into_iter()
            .find(|r| r.id == id)
            .ok_or(EngineError::RuleNotFound(id))
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.list().iter().any(|r| r.name == name)
    }

    /// Add a rule after validating it. Rule names are unique.
    pub fn add(&self, rule: Rule) -> Result<Rule, EngineError> {
        rule.validate()?;
        let mut guard = self.write_guard();
        if guard.iter().any(|r| r.name == rule.name) {
            return Err(EngineError::Validation(format!(
                "a rule named '{}' already exists",
                rule.name
            )));
        }
        info!(rule = %rule.name, kind = %rule.kind, "Rule added");
        guard.push(rule.clone());
        Ok(rule)
    }

    /// Replace an existing rule's configuration, keeping its counters.
    pub fn update(&self, id: Uuid, mut updated: Rule) -> Result<Rule, EngineError> {
        updated.validate()?;
        let mut guard = self.write_guard();
        let existing = guard
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(EngineError::RuleNotFound(id))?;
        updated.id = existing.id;
        updated.times_triggered = existing.times_triggered;
        updated.times_hit = existing.times_hit;
        updated.created_at = existing.created_at;
        *existing = updated.clone();
        info!(rule = %updated.name, "Rule updated");
        Ok(updated)
    }

    pub fn remove(&self, id: Uuid) -> Result<(), EngineError> {
        let mut guard = self.write_guard();
        let before = guard.len();
        guard.retain(|r| r.id != id);
        if guard.len() == before {
            return Err(EngineError::RuleNotFound(id));
        }
        info!(%id, "Rule removed");
        Ok(())
    }

    pub fn set_enabled(&self, id: Uuid, enabled: bool) -> Result<Rule, EngineError> {
        let mut guard = self.write_guard();
        let rule = guard
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(EngineError::RuleNotFound(id))?;
        rule.enabled = enabled;
        info!(rule = %rule.name, enabled, "Rule toggled");
        Ok(rule.clone())
    }

    /// Evaluate all enabled rules against the given context, bumping
    /// the trigger counter of every rule that matched.
    pub fn evaluate(&self, ctx: &EvaluationContext<'_>) -> Vec<RuleMatch> {
        let rules = self.list();
        let mut matches = Vec::new();
        for rule in rules.iter().filter(|r| r.enabled) {
            if let Err(e) = rule.validate() {
                warn!(rule = %rule.name, error = %e, "Skipping invalid rule");
                continue;
            }
            if let Some(m) = engine::match_rule(rule, ctx) {
                matches.push(m);
            }
        }
        if !matches.is_empty() {
            let ids: Vec<Uuid> = matches.iter().map(|m| m.rule_id).collect();
            self.record_triggered(&ids);
        }
        matches
    }

    /// Bump the trigger counter for each matched rule.
    pub fn record_triggered(&self, ids: &[Uuid]) {
        let mut guard = self.write_guard();
        for rule in guard.iter_mut() {
            if ids.contains(&rule.id) {
                rule.times_triggered += 1;
            }
        }
    }

    /// Bump the hit counter for each rule whose suggestion was
    /// confirmed by the following spin.
    pub fn record_hits(&self, ids: &[Uuid]) {
        let mut guard = self.write_guard();
        for rule in guard.iter_mut() {
            if ids.contains(&rule.id) {
                rule.times_hit += 1;
            }
        }
    }

    fn write_guard(&self) -> std::sync::RwLockWriteGuard<'_, Vec<Rule>> {
        match self.rules.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Default for RuleStore {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

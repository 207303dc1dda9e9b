//! Starter rule catalogue.
//!
//! Seeding is idempotent and keyed by rule name: a rule is only created
//! when no rule with the same name exists, so repeated startups never
//! duplicate or reset user-tuned rules.

use tracing::info;

use super::{Rule, RuleKind, RuleStore};

/// Seed the starter rules into `store`. Returns how many were created.
pub fn seed_default_rules(store: &RuleStore) -> usize {
    let mut created = 0;
    for rule in default_rules() {
        if store.contains_name(&rule.name) {
            continue;
        }
        // add() only fails on duplicates, which contains_name just excluded
        if store.add(rule).is_ok() {
            created += 1;
        }
    }
    if created > 0 {
        info!(created, "Seeded default rules");
    }
    created
}

fn default_rules() -> Vec<Rule> {
    vec![
        Rule::new(
            "32 Adjacent ±2",
            RuleKind::Adjacent,
            vec![32],
            vec![30, 34],
            75,
        ),
        Rule::new("30-3 Pair", RuleKind::Pair, vec![30], vec![3], 70),
        Rule::new("3-30 Pair", RuleKind::Pair, vec![3], vec![30], 70),
        Rule::new(
            "30 → 3 Delayed",
            RuleKind::DelayedPair,
            vec![30],
            vec![3],
            75,
        ),
        Rule::new(
            "3 → 30 Delayed",
            RuleKind::DelayedPair,
            vec![3],
            vec![30],
            75,
        ),
        Rule::new(
            "Numbers ending in 2 - Adjacent",
            RuleKind::Adjacent,
            vec![2, 12, 22, 32],
            vec![0, 4, 10, 14, 20, 24, 30, 34],
            65,
        ),
        Rule::new(
            "Group [31,33,13,11] Correlation",
            RuleKind::GroupCorrelation,
            vec![31, 33, 13, 11],
            vec![],
            80,
        ),
    ]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Persistence layer.
//!
//! The rule catalogue is saved to a JSON file so user-tuned rules and
//! their counters survive restarts. Finished sessions are archived as
//! one JSON file each for later review.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info};

use crate::rules::Rule;
use crate::session::SessionState;

/// Default rule catalogue path.
const DEFAULT_RULES_FILE: &str = "wheelwise_rules.json";
/// Default directory for archived sessions.
const DEFAULT_ARCHIVE_DIR: &str = "sessions";

/// Save the rule catalogue to a JSON file.
pub fn save_rules(rules: &[Rule], path: Option<&str>) -> Result<()> {
    let path = path.unwrap_or(DEFAULT_RULES_FILE);
    let json = serde_json::to_string_pretty(rules)
        .context("Failed to serialise rule catalogue")?;

    std::fs::write(path, &json)
        .context(format!("Failed to write rules to {path}"))?;

    debug!(path, count = rules.len(), "Rules saved");
    Ok(())
}

/// Load the rule catalogue from a JSON file.
/// Returns None if the file doesn't exist (fresh start).
pub fn load_rules(path: Option<&str>) -> Result<Option<Vec<Rule>>> {
    let path = path.unwrap_or(DEFAULT_RULES_FILE);

    if !Path::new(path).exists() {
        info!(path, "No saved rules found, starting fresh");
        return Ok(None);
    }

    let json = std::fs::read_to_string(path)
        .context(format!("Failed to read rules from {path}"))?;

    let rules: Vec<Rule> = serde_json::from_str(&json)
        .context(format!("Failed to parse rules from {path}"))?;

    info!(path, count = rules.len(), "Rules loaded from disk");
    Ok(Some(rules))
}

/// Delete the rules file (for testing or reset).
pub fn delete_rules(path: Option<&str>) -> Result<()> {
    let path = path.unwrap_or(DEFAULT_RULES_FILE);
    if Path::new(path).exists() {
        std::fs::remove_file(path)
            .context(format!("Failed to delete rules file {path}"))?;
    }
    Ok(())
}

/// Archive a finished session as `<dir>/<session-id>.json`.
pub fn archive_session(state: &SessionState, dir: Option<&str>) -> Result<String> {
    let dir = dir.unwrap_or(DEFAULT_ARCHIVE_DIR);
    std::fs::create_dir_all(dir)
        .context(format!("Failed to create archive directory {dir}"))?;

    let path = format!("{dir}/{}.json", state.id);
    let json = serde_json::to_string_pretty(state)
        .context("Failed to serialise session state")?;
    std::fs::write(&path, &json)
        .context(format!("Failed to write session archive to {path}"))?;

    info!(
        session = %state.id,
        path,
        profit = %state.profit(),
        "Session archived"
    );
    Ok(path)
}

/// Load an archived session.
pub fn load_session(path: &str) -> Result<SessionState> {
    let json = std::fs::read_to_string(path)
        .context(format!("Failed to read session archive {path}"))?;
    serde_json::from_str(&json).context(format!("Failed to parse session archive {path}"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

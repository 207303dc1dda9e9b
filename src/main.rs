//! WHEELWISE — Roulette session discipline assistant.
//!
//! Entry point. Loads configuration, initialises structured logging,
//! restores the rule catalogue from disk (or seeds the defaults), and
//! serves the HTTP API until shutdown.

use anyhow::Result;
use std::sync::Arc;
use tracing::{error, info};

use wheelwise::api::{self, ApiState};
use wheelwise::config::AppConfig;
use wheelwise::rules::{defaults::seed_default_rules, RuleStore};
use wheelwise::storage;

const BANNER: &str = r#"
__        ___               _ __        ___
\ \      / / |__   ___  ___| |\ \      / (_)___  ___
 \ \ /\ / /| '_ \ / _ \/ _ \ | \ \ /\ / /| / __|/ _ \
  \ V  V / | | | |  __/  __/ |  \ V  V / | \__ \  __/
   \_/\_/  |_| |_|\___|\___|_|   \_/\_/  |_|___/\___|

  Session discipline for the single-zero wheel
  v0.1.0
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    // Load configuration from TOML
    let cfg = AppConfig::load("config.toml")?;

    // Initialise structured logging
    init_logging();

    // Print startup banner
    println!("{BANNER}");
    info!(
        bankroll = %cfg.session.initial_bankroll,
        stop_loss = %cfg.session.stop_loss_percent,
        lookback = cfg.analysis.lookback,
        "WHEELWISE starting up"
    );

    // -- Restore or seed the rule catalogue --------------------------------

    let rules = match storage::load_rules(Some(&cfg.storage.rules_file))? {
        Some(saved) => {
            info!(count = saved.len(), "Resumed rule catalogue from disk");
            Arc::new(RuleStore::from_rules(saved))
        }
        None => Arc::new(RuleStore::new()),
    };
    let seeded = seed_default_rules(&rules);
    if seeded > 0 {
        if let Err(e) = storage::save_rules(&rules.list(), Some(&cfg.storage.rules_file)) {
            error!(error = %e, "Failed to persist seeded rules");
        }
    }

    // -- Serve the API ------------------------------------------------------

    let mut state = ApiState::new(Arc::clone(&rules), cfg.session_config());
    state.rules_file = Some(cfg.storage.rules_file.clone());
    state.archive_dir = Some(cfg.storage.archive_dir.clone());
    let state = Arc::new(state);

    if cfg.api.enabled {
        api::spawn_api(Arc::clone(&state), cfg.api.port)?;
    }

    info!("Ready. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received.");

    // Save the rule catalogue (counters included) on the way out
    storage::save_rules(&rules.list(), Some(&cfg.storage.rules_file))?;
    info!(rules = rules.list().len(), "WHEELWISE shut down cleanly.");

    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("wheelwise=info"));

    let json_logging = std::env::var("WHEELWISE_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt().with_env_filter(env_filter).with_target(true).init();
    }
}

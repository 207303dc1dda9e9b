//! API route handlers.
//!
//! All endpoints return JSON. State is shared via `Arc<ApiState>`;
//! each session engine sits behind its own `tokio::sync::Mutex` so
//! spins and bets for one session are processed one at a time.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::error;
use uuid::Uuid;

use crate::rules::{Rule, RuleKind, RuleStore};
use crate::session::{HealthSnapshot, SessionConfig, SessionEngine, SessionState};
use crate::storage;
use crate::suggest::BetSuggestion;
use crate::types::{Alert, EngineError, PickSource, Tier, WeightedPick};

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared state accessible by all route handlers.
pub struct ApiState {
    pub sessions: RwLock<HashMap<Uuid, Arc<Mutex<SessionEngine>>>>,
    pub rules: Arc<RuleStore>,
    pub defaults: SessionConfig,
    pub rules_file: Option<String>,
    pub archive_dir: Option<String>,
}

impl ApiState {
    pub fn new(rules: Arc<RuleStore>, defaults: SessionConfig) -> Self {
        ApiState {
            sessions: RwLock::new(HashMap::new()),
            rules,
            defaults,
            rules_file: None,
            archive_dir: None,
        }
    }

    async fn session(&self, id: Uuid) -> Result<Arc<Mutex<SessionEngine>>, ApiError> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| ApiError::from(EngineError::SessionNotFound(id)))
    }

    /// Persist the rule catalogue if a path is configured. A failed
    /// save is logged, never surfaced: the in-memory catalogue stays
    /// authoritative.
    fn persist_rules(&self) {
        if let Some(path) = &self.rules_file {
            if let Err(e) = storage::save_rules(&self.rules.list(), Some(path)) {
                error!(error = %e, "Failed to persist rules");
            }
        }
    }
}

pub type AppState = Arc<ApiState>;

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        let status = match &e {
            EngineError::SessionNotFound(_) | EngineError::RuleNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            EngineError::Validation(_) | EngineError::Config(_) => StatusCode::BAD_REQUEST,
            EngineError::State(_) => StatusCode::CONFLICT,
            EngineError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError {
            status,
            message: e.to_string(),
        }
    }
}

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionRequest {
    pub initial_bankroll: Option<Decimal>,
    pub stop_loss_percent: Option<Decimal>,
    pub take_profit_levels: Option<Vec<Decimal>>,
    pub max_spins: Option<u32>,
    pub max_duration_minutes: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SpinRequest {
    pub number: u8,
}

#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    pub numbers: Vec<u8>,
}

#[derive(Debug, Deserialize)]
pub struct PickRequest {
    pub number: u8,
    pub stake: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct BetRequest {
    pub picks: Vec<PickRequest>,
}

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub enabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct RuleRequest {
    pub name: String,
    pub kind: RuleKind,
    #[serde(default)]
    pub triggers: Vec<u8>,
    #[serde(default)]
    pub suggestions: Vec<u8>,
    pub confidence: u8,
    #[serde(default)]
    pub spin_threshold: Option<u32>,
    #[serde(default)]
    pub gap_window: Option<usize>,
}

impl RuleRequest {
    fn into_rule(self) -> Rule {
        let mut rule = Rule::new(
            self.name,
            self.kind,
            self.triggers,
            self.suggestions,
            self.confidence,
        );
        rule.spin_threshold = self.spin_threshold;
        rule.gap_window = self.gap_window;
        rule
    }
}

#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub state: SessionState,
    pub alerts: Vec<Alert>,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub imported: usize,
    pub state: SessionState,
}

// ---------------------------------------------------------------------------
// Session handlers
// ---------------------------------------------------------------------------

/// POST /api/sessions
pub async fn create_session(
    State(state): State<AppState>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<SessionState>), ApiError> {
    let mut config = state.defaults.clone();
    if let Some(bankroll) = req.initial_bankroll {
        config.initial_bankroll = bankroll;
    }
    if let Some(stop_loss) = req.stop_loss_percent {
        config.stop_loss_percent = stop_loss;
    }
    if let Some(levels) = req.take_profit_levels {
        config.take_profit_levels = levels;
    }
    if req.max_spins.is_some() {
        config.max_spins = req.max_spins;
    }
    if req.max_duration_minutes.is_some() {
        config.max_duration_minutes = req.max_duration_minutes;
    }

    let engine = SessionEngine::new(config)?;
    let snapshot = engine.snapshot();
    state
        .sessions
        .write()
        .await
        .insert(engine.id(), Arc::new(Mutex::new(engine)));
    Ok((StatusCode::CREATED, Json(snapshot)))
}

/// GET /api/sessions/:id
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionState>, ApiError> {
    let session = state.session(id).await?;
    let snapshot = session.lock().await.snapshot();
    Ok(Json(snapshot))
}

/// POST /api/sessions/:id/spins
pub async fn record_spin(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SpinRequest>,
) -> Result<Json<EventResponse>, ApiError> {
    let session = state.session(id).await?;
    let mut engine = session.lock().await;
    let (snapshot, alerts) = engine.record_outcome(req.number, &state.rules)?;
    if snapshot.status.is_terminal() {
        archive(&state, &snapshot);
    }
    Ok(Json(EventResponse {
        state: snapshot,
        alerts,
    }))
}

/// POST /api/sessions/:id/spins/import
pub async fn import_spins(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ImportRequest>,
) -> Result<Json<ImportResponse>, ApiError> {
    let session = state.session(id).await?;
    let mut engine = session.lock().await;
    let imported = engine.import_history(&req.numbers)?;
    Ok(Json(ImportResponse {
        imported,
        state: engine.snapshot(),
    }))
}

/// POST /api/sessions/:id/bets
pub async fn record_bet(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<BetRequest>,
) -> Result<Json<EventResponse>, ApiError> {
    let picks: Vec<WeightedPick> = req
        .picks
        .into_iter()
        .map(|p| WeightedPick {
            number: p.number,
            stake: p.stake,
            source: PickSource::Rule,
            tier: Tier::Bingo,
        })
        .collect();

    let session = state.session(id).await?;
    let mut engine = session.lock().await;
    let (snapshot, alerts) = engine.record_bet(picks)?;
    if snapshot.status.is_terminal() {
        archive(&state, &snapshot);
    }
    Ok(Json(EventResponse {
        state: snapshot,
        alerts,
    }))
}

/// GET /api/sessions/:id/suggestion
pub async fn get_suggestion(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BetSuggestion>, ApiError> {
    let session = state.session(id).await?;
    let suggestion = session.lock().await.suggestion(&state.rules);
    Ok(Json(suggestion))
}

/// GET /api/sessions/:id/health
pub async fn get_session_health(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<HealthSnapshot>, ApiError> {
    let session = state.session(id).await?;
    let health = session.lock().await.health();
    Ok(Json(health))
}

/// POST /api/sessions/:id/stop
pub async fn stop_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<EventResponse>, ApiError> {
    let session = state.session(id).await?;
    let mut engine = session.lock().await;
    let (snapshot, alerts) = engine.stop()?;
    archive(&state, &snapshot);
    Ok(Json(EventResponse {
        state: snapshot,
        alerts,
    }))
}

fn archive(state: &ApiState, snapshot: &SessionState) {
    if let Some(dir) = &state.archive_dir {
        if let Err(e) = storage::archive_session(snapshot, Some(dir)) {
            error!(error = %e, session = %snapshot.id, "Failed to archive session");
        }
    }
}

// ---------------------------------------------------------------------------
// Rule handlers
// ---------------------------------------------------------------------------

/// GET /api/rules
pub async fn list_rules(State(state): State<AppState>) -> Json<Vec<Rule>> {
    Json(state.rules.list())
}

/// POST /api/rules
pub async fn create_rule(
    State(state): State<AppState>,
    Json(req): Json<RuleRequest>,
) -> Result<(StatusCode, Json<Rule>), ApiError> {
    let rule = state.rules.add(req.into_rule())?;
    state.persist_rules();
    Ok((StatusCode::CREATED, Json(rule)))
}

/// PUT /api/rules/:id
pub async fn update_rule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<RuleRequest>,
) -> Result<Json<Rule>, ApiError> {
    let rule = state.rules.update(id, req.into_rule())?;
    state.persist_rules();
    Ok(Json(rule))
}

/// DELETE /api/rules/:id
pub async fn delete_rule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.rules.remove(id)?;
    state.persist_rules();
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/rules/:id/toggle
pub async fn toggle_rule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ToggleRequest>,
) -> Result<Json<Rule>, ApiError> {
    let rule = state.rules.set_enabled(id, req.enabled)?;
    state.persist_rules();
    Ok(Json(rule))
}

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn test_state() -> AppState {
        Arc::new(ApiState::new(
            Arc::new(RuleStore::new()),
            SessionConfig::default(),
        ))
    }

    #[tokio::test]
    async fn test_create_and_get_session() {
        let state = test_state();
        let (status, Json(created)) = create_session(
            State(state.clone()),
            Json(CreateSessionRequest::default()),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created.current_bankroll, dec!(500));

        let Json(fetched) = get_session(State(state), Path(created.id)).await.unwrap();
        assert_eq!(fetched.id, created.id);
    }

    #[tokio::test]
    async fn test_create_session_with_overrides() {
        let state = test_state();
        let req = CreateSessionRequest {
            initial_bankroll: Some(dec!(1000)),
            stop_loss_percent: Some(dec!(-10)),
            ..Default::default()
        };
        let (_, Json(created)) = create_session(State(state), Json(req)).await.unwrap();
        assert_eq!(created.initial_bankroll, dec!(1000));
    }

    #[tokio::test]
    async fn test_create_session_rejects_bad_config() {
        let state = test_state();
        let req = CreateSessionRequest {
            initial_bankroll: Some(dec!(-5)),
            ..Default::default()
        };
        assert!(create_session(State(state), Json(req)).await.is_err());
    }

    #[tokio::test]
    async fn test_unknown_session_is_404() {
        let state = test_state();
        let err = get_session(State(state), Path(Uuid::new_v4()))
            .await
            .err()
            .unwrap();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_record_spin_flow() {
        let state = test_state();
        let (_, Json(created)) = create_session(
            State(state.clone()),
            Json(CreateSessionRequest::default()),
        )
        .await
        .unwrap();

        let Json(resp) = record_spin(
            State(state.clone()),
            Path(created.id),
            Json(SpinRequest { number: 17 }),
        )
        .await
        .unwrap();
        assert_eq!(resp.state.total_spins, 1);

        let err = record_spin(
            State(state),
            Path(created.id),
            Json(SpinRequest { number: 37 }),
        )
        .await
        .err()
        .unwrap();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_stopped_session_conflicts() {
        let state = test_state();
        let (_, Json(created)) = create_session(
            State(state.clone()),
            Json(CreateSessionRequest::default()),
        )
        .await
        .unwrap();

        stop_session(State(state.clone()), Path(created.id))
            .await
            .unwrap();

        let err = record_spin(
            State(state),
            Path(created.id),
            Json(SpinRequest { number: 4 }),
        )
        .await
        .err()
        .unwrap();
        assert_eq!(err.status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_rule_crud_handlers() {
        let state = test_state();
        let req = RuleRequest {
            name: "32 adjacent".into(),
            kind: RuleKind::Adjacent,
            triggers: vec![32],
            suggestions: vec![30, 34],
            confidence: 75,
            spin_threshold: None,
            gap_window: None,
        };

        let (status, Json(rule)) = create_rule(State(state.clone()), Json(req)).await.unwrap();
        assert_eq!(status, StatusCode::CREATED);

        let Json(toggled) = toggle_rule(
            State(state.clone()),
            Path(rule.id),
            Json(ToggleRequest { enabled: false }),
        )
        .await
        .unwrap();
        assert!(!toggled.enabled);

        let status = delete_rule(State(state.clone()), Path(rule.id)).await.unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let Json(rules) = list_rules(State(state)).await;
        assert!(rules.is_empty());
    }
}

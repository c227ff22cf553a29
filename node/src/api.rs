//! # REST API
//!
//! Builds the axum router that exposes the ledger over HTTP. All endpoints
//! share application state through axum's `State` extractor.
//!
//! ## Endpoints
//!
//! | Method | Path                  | Description                              |
//! |--------|-----------------------|------------------------------------------|
//! | GET    | `/health`             | Liveness probe                           |
//! | GET    | `/status`             | Supply, cap, pause flag, event count     |
//! | GET    | `/accounts/:address`  | Balance of an account                    |
//! | GET    | `/events`             | Event log, `?since=N`                    |
//! | GET    | `/stabilization`      | Advice, `?price=P&volatility=V`          |
//! | POST   | `/mint`               | Mint on an oracle approval               |
//! | POST   | `/redeem`             | Redeem own balance (caller-signed)       |
//! | POST   | `/bridge`             | Burn for bridging (caller-signed)        |
//! | POST   | `/admin/adjust-peg`   | Rebase toward the peg (caller-signed)    |
//! | POST   | `/admin/pause`        | Pause (caller-signed)                    |
//! | POST   | `/admin/unpause`      | Unpause (caller-signed)                  |
//!
//! ## Caller authentication
//!
//! Everything except `/mint` carries a `caller` address, a caller-chosen
//! `nonce` and an `authorization` envelope signed by that caller over
//! `(purpose, caller, amount)`. The purpose embeds the nonce, plus the
//! volatility reading where the request has one:
//!
//! ```text
//! /redeem             "redeem;nonce=N;volatility=V"       amount
//! /bridge             "bridge:<chain>;nonce=N"            amount
//! /admin/adjust-peg   "adjust-peg;nonce=N;volatility=V"   observed_price
//! /admin/pause        "pause;nonce=N"                     0
//! /admin/unpause      "unpause;nonce=N"                   0
//! ```
//!
//! A signature that does not recover to `caller` is a 401 before the ledger
//! is consulted. Each caller envelope is good for one request: once the
//! ledger has seen it, presenting it again is a 401 `signature_replayed`,
//! whether or not the first attempt succeeded.

use axum::{
    extract::{Path, Query, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use pegcoin_contracts::{EventRecord, Recommendation, ReplayGuard, Stablecoin, StablecoinError};
use pegcoin_protocol::config::{
    bridge_purpose, request_purpose, PURPOSE_ADJUST_PEG, PURPOSE_PAUSE, PURPOSE_REDEEM,
    PURPOSE_UNPAUSE, TOKEN_SYMBOL, VOLATILITY_SCALE,
};
use pegcoin_protocol::crypto::{authorization_digest, recover_signer, Address, Digest};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::metrics::SharedMetrics;

// ---------------------------------------------------------------------------
// Application State
// ---------------------------------------------------------------------------

/// Shared application state. Cheap to clone: everything behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// The node's reported version string.
    pub version: String,
    /// The ledger. Writers hold the write lock for the whole call, which
    /// keeps mutations strictly serial.
    pub ledger: Arc<RwLock<Stablecoin>>,
    /// Digests of caller envelopes the ledger has already seen. Only
    /// touched while the ledger write lock is held.
    pub consumed: Arc<Mutex<ReplayGuard>>,
    pub metrics: SharedMetrics,
}

impl AppState {
    pub fn new(version: String, ledger: Stablecoin, metrics: SharedMetrics) -> Self {
        Self {
            version,
            ledger: Arc::new(RwLock::new(ledger)),
            consumed: Arc::new(Mutex::new(ReplayGuard::new())),
            metrics,
        }
    }
}

// ---------------------------------------------------------------------------
// Router Construction
// ---------------------------------------------------------------------------

/// Builds the full axum [`Router`] with all API routes, CORS, and tracing.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/status", get(status_handler))
        .route("/accounts/:address", get(account_handler))
        .route("/events", get(events_handler))
        .route("/stabilization", get(stabilization_handler))
        .route("/mint", post(mint_handler))
        .route("/redeem", post(redeem_handler))
        .route("/bridge", post(bridge_handler))
        .route("/admin/adjust-peg", post(adjust_peg_handler))
        .route("/admin/pause", post(pause_handler))
        .route("/admin/unpause", post(unpause_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Request Types
// ---------------------------------------------------------------------------

/// Body of `POST /mint`. No caller: the oracle's envelope is the
/// authorization.
#[derive(Debug, Serialize, Deserialize)]
pub struct MintRequest {
    pub to: Address,
    pub amount: u64,
    /// Hex-encoded 96-byte envelope from the oracle.
    pub signature: String,
    /// Price from the feed, 18 decimals.
    pub observed_price: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RedeemRequest {
    pub caller: Address,
    pub amount: u64,
    pub observed_volatility: u8,
    pub nonce: u64,
    pub authorization: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BridgeRequest {
    pub caller: Address,
    pub amount: u64,
    pub target_chain: u64,
    pub nonce: u64,
    pub authorization: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AdjustPegRequest {
    pub caller: Address,
    pub observed_price: u64,
    pub observed_volatility: u8,
    pub nonce: u64,
    pub authorization: String,
}

/// Body of `POST /admin/pause` and `POST /admin/unpause`.
#[derive(Debug, Serialize, Deserialize)]
pub struct AdminRequest {
    pub caller: Address,
    pub nonce: u64,
    pub authorization: String,
}

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    #[serde(default)]
    pub since: u64,
}

#[derive(Debug, Deserialize)]
pub struct StabilizationQuery {
    pub price: u64,
    pub volatility: u8,
}

// ---------------------------------------------------------------------------
// Response Types
// ---------------------------------------------------------------------------

/// Response payload for `GET /status`.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub version: String,
    pub symbol: String,
    pub total_supply: u64,
    pub supply_cap: u64,
    pub paused: bool,
    pub event_count: u64,
    pub oracle: Address,
    pub treasury: Address,
    pub replay_protection: bool,
    /// ISO-8601 timestamp of the response.
    pub timestamp: String,
}

/// Response payload for `GET /accounts/:address`.
#[derive(Debug, Serialize, Deserialize)]
pub struct AccountResponse {
    pub address: Address,
    pub balance: u64,
}

/// Error body returned on every failure.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Stable machine-readable reason, e.g. `insufficient_balance`.
    pub reason: String,
}

/// A failed request: status plus body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorResponse {
                error: message.into(),
                reason: "bad_request".into(),
            },
        }
    }
}

impl From<StablecoinError> for ApiError {
    fn from(err: StablecoinError) -> Self {
        Self {
            status: status_for(&err),
            body: ErrorResponse {
                error: err.to_string(),
                reason: err.kind().into(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Maps a ledger rejection onto an HTTP status.
pub fn status_for(err: &StablecoinError) -> StatusCode {
    match err {
        StablecoinError::InvalidSignature
        | StablecoinError::MalformedSignature(_)
        | StablecoinError::SignatureReplayed => StatusCode::UNAUTHORIZED,
        StablecoinError::Unauthorized => StatusCode::FORBIDDEN,
        StablecoinError::ContractPaused => StatusCode::LOCKED,
        StablecoinError::SupplyCapExceeded { .. }
        | StablecoinError::PegUnstable { .. }
        | StablecoinError::InsufficientBalance { .. }
        | StablecoinError::VolatilityTooHigh { .. }
        | StablecoinError::ArithmeticOverflow => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn decode_envelope(hex_str: &str) -> Result<Vec<u8>, StablecoinError> {
    let raw = hex_str.strip_prefix("0x").unwrap_or(hex_str);
    hex::decode(raw).map_err(|_| StablecoinError::MalformedSignature("envelope is not hex"))
}

/// Checks that `authorization` was signed by `caller` over
/// `(purpose, caller, amount)` and returns the signed digest.
fn authenticate(
    purpose: &str,
    caller: &Address,
    amount: u64,
    authorization: &str,
) -> Result<Digest, StablecoinError> {
    let envelope = decode_envelope(authorization)?;
    let digest = authorization_digest(purpose, caller, amount);
    let signer = recover_signer(&digest, &envelope)?;
    if signer != *caller {
        return Err(StablecoinError::InvalidSignature);
    }
    Ok(digest)
}

fn check_volatility(volatility: u8) -> Result<(), ApiError> {
    if volatility > VOLATILITY_SCALE {
        return Err(ApiError::bad_request(format!(
            "volatility must be between 0 and {}",
            VOLATILITY_SCALE
        )));
    }
    Ok(())
}

impl AppState {
    /// Runs one mutating ledger call under the write lock and records the
    /// outcome in the metrics.
    async fn apply<F>(&self, operation: F) -> Result<Json<EventRecord>, ApiError>
    where
        F: FnOnce(&mut Stablecoin) -> Result<EventRecord, StablecoinError>,
    {
        self.run_mutation(None, operation).await
    }

    /// Like [`AppState::apply`], for a caller-signed request. The digest is
    /// spent as soon as the ledger is consulted, so a denied envelope can't
    /// be held back and replayed once the ledger would accept it.
    async fn apply_signed<F>(
        &self,
        digest: Digest,
        operation: F,
    ) -> Result<Json<EventRecord>, ApiError>
    where
        F: FnOnce(&mut Stablecoin) -> Result<EventRecord, StablecoinError>,
    {
        self.run_mutation(Some(digest), operation).await
    }

    async fn run_mutation<F>(
        &self,
        digest: Option<Digest>,
        operation: F,
    ) -> Result<Json<EventRecord>, ApiError>
    where
        F: FnOnce(&mut Stablecoin) -> Result<EventRecord, StablecoinError>,
    {
        let mut ledger = self.ledger.write().await;
        if let Some(digest) = digest {
            if !self.consumed.lock().await.consume(digest) {
                return Err(self.reject(StablecoinError::SignatureReplayed));
            }
        }
        let result = operation(&mut *ledger);
        self.metrics.total_supply.set(ledger.total_supply() as i64);
        drop(ledger);

        match result {
            Ok(record) => {
                self.metrics.record_event(&record.event);
                Ok(Json(record))
            }
            Err(err) => Err(self.reject(err)),
        }
    }

    fn reject(&self, err: StablecoinError) -> ApiError {
        self.metrics.record_denial(&err);
        err.into()
    }
}

// ---------------------------------------------------------------------------
// Read Handlers
// ---------------------------------------------------------------------------

/// `GET /health`: 200 while the process is up.
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    let ledger = state.ledger.read().await;
    let admin = ledger.administration();
    Json(StatusResponse {
        version: state.version.clone(),
        symbol: TOKEN_SYMBOL.into(),
        total_supply: ledger.total_supply(),
        supply_cap: ledger.supply_cap(),
        paused: ledger.is_paused(),
        event_count: ledger.events().len() as u64,
        oracle: *admin.oracle(),
        treasury: admin.treasury(),
        replay_protection: ledger.replay_protection(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// `GET /accounts/:address`: unknown accounts report a zero balance.
async fn account_handler(
    Path(address): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<AccountResponse>, ApiError> {
    let address: Address = address
        .parse()
        .map_err(|e| ApiError::bad_request(format!("{}", e)))?;
    let balance = state.ledger.read().await.balance_of(&address);
    Ok(Json(AccountResponse { address, balance }))
}

async fn events_handler(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> Json<Vec<EventRecord>> {
    let ledger = state.ledger.read().await;
    Json(ledger.events().since(query.since).to_vec())
}

async fn stabilization_handler(
    State(state): State<AppState>,
    Query(query): Query<StabilizationQuery>,
) -> Result<Json<Recommendation>, ApiError> {
    check_volatility(query.volatility)?;
    let ledger = state.ledger.read().await;
    let advice = ledger.recommend(query.price, query.volatility)?;
    Ok(Json(advice))
}

// ---------------------------------------------------------------------------
// Mutating Handlers
// ---------------------------------------------------------------------------

async fn mint_handler(
    State(state): State<AppState>,
    Json(req): Json<MintRequest>,
) -> Result<Json<EventRecord>, ApiError> {
    let _timer = state.metrics.request_latency_seconds.start_timer();
    let envelope = decode_envelope(&req.signature).map_err(|e| state.reject(e))?;
    state
        .apply(|ledger| ledger.mint(req.to, req.amount, &envelope, req.observed_price))
        .await
}

async fn redeem_handler(
    State(state): State<AppState>,
    Json(req): Json<RedeemRequest>,
) -> Result<Json<EventRecord>, ApiError> {
    let _timer = state.metrics.request_latency_seconds.start_timer();
    check_volatility(req.observed_volatility)?;
    let purpose = request_purpose(PURPOSE_REDEEM, req.nonce, Some(req.observed_volatility));
    let digest = authenticate(&purpose, &req.caller, req.amount, &req.authorization)
        .map_err(|e| state.reject(e))?;
    state
        .apply_signed(digest, |ledger| {
            ledger.redeem(req.caller, req.amount, req.observed_volatility)
        })
        .await
}

async fn bridge_handler(
    State(state): State<AppState>,
    Json(req): Json<BridgeRequest>,
) -> Result<Json<EventRecord>, ApiError> {
    let _timer = state.metrics.request_latency_seconds.start_timer();
    let purpose = request_purpose(&bridge_purpose(req.target_chain), req.nonce, None);
    let digest = authenticate(&purpose, &req.caller, req.amount, &req.authorization)
        .map_err(|e| state.reject(e))?;
    state
        .apply_signed(digest, |ledger| {
            ledger.bridge_burn(req.caller, req.amount, req.target_chain)
        })
        .await
}

async fn adjust_peg_handler(
    State(state): State<AppState>,
    Json(req): Json<AdjustPegRequest>,
) -> Result<Json<EventRecord>, ApiError> {
    let _timer = state.metrics.request_latency_seconds.start_timer();
    check_volatility(req.observed_volatility)?;
    let purpose = request_purpose(PURPOSE_ADJUST_PEG, req.nonce, Some(req.observed_volatility));
    let digest = authenticate(&purpose, &req.caller, req.observed_price, &req.authorization)
        .map_err(|e| state.reject(e))?;
    state
        .apply_signed(digest, |ledger| {
            ledger.adjust_peg(req.caller, req.observed_price, req.observed_volatility)
        })
        .await
}

async fn pause_handler(
    State(state): State<AppState>,
    Json(req): Json<AdminRequest>,
) -> Result<Json<EventRecord>, ApiError> {
    let _timer = state.metrics.request_latency_seconds.start_timer();
    let purpose = request_purpose(PURPOSE_PAUSE, req.nonce, None);
    let digest = authenticate(&purpose, &req.caller, 0, &req.authorization)
        .map_err(|e| state.reject(e))?;
    state
        .apply_signed(digest, |ledger| ledger.pause(req.caller))
        .await
}

async fn unpause_handler(
    State(state): State<AppState>,
    Json(req): Json<AdminRequest>,
) -> Result<Json<EventRecord>, ApiError> {
    let _timer = state.metrics.request_latency_seconds.start_timer();
    let purpose = request_purpose(PURPOSE_UNPAUSE, req.nonce, None);
    let digest = authenticate(&purpose, &req.caller, 0, &req.authorization)
        .map_err(|e| state.reject(e))?;
    state
        .apply_signed(digest, |ledger| ledger.unpause(req.caller))
        .await
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

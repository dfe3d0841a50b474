use std::sync::Arc;

use axum::extract::multipart::MultipartRejection;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use contract_common::api::{AnalyzeResponse, HealthResponse, RulesResponse, STATUS_SUCCESS};
use contract_common::extract::DocumentReader;
use contract_common::rules::RuleSet;
use contract_common::scorer::analyze_risk;

use crate::error::ApiError;
use crate::rate_limit::RateLimiter;

/// Multipart field carrying the contract.
const FILE_FIELD: &str = "file";

#[derive(Clone)]
pub struct AppState {
    rules: Arc<RuleSet>,
    reader: DocumentReader,
    limiter: Option<RateLimiter>,
}

impl AppState {
    pub fn new(rules: Arc<RuleSet>, reader: DocumentReader, limiter: Option<RateLimiter>) -> Self {
        Self {
            rules,
            reader,
            limiter,
        }
    }
}

pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/analyze", post(analyze))
        .route("/api/health", get(health))
        .route("/api/rules", get(list_rules))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

struct Upload {
    filename: String,
    bytes: Vec<u8>,
}

/// Find the first `file` part that carries a filename and buffer it. Other parts,
/// including a plain form value named `file`, are skipped.
async fn read_upload(multipart: &mut Multipart) -> Result<Option<Upload>, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        let filename = match (field.name(), field.file_name()) {
            (Some(FILE_FIELD), Some(filename)) => filename.to_string(),
            (name, _) => {
                debug!(field = ?name, "skipping multipart field");
                continue;
            }
        };
        let bytes = field.bytes().await?;
        return Ok(Some(Upload {
            filename,
            bytes: bytes.to_vec(),
        }));
    }
    Ok(None)
}

async fn analyze(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    info!("analyze request received");

    if let Some(limiter) = &state.limiter {
        limiter
            .acquire()
            .await
            .map_err(|retry_after| ApiError::RateLimited { retry_after })?;
    }

    let mut multipart = multipart.map_err(|rejection| {
        debug!(error = %rejection, "request body is not multipart");
        ApiError::MissingFile
    })?;
    let Upload { filename, bytes } = read_upload(&mut multipart)
        .await?
        .ok_or(ApiError::MissingFile)?;
    let byte_count = bytes.len();

    let extracted = state.reader.read(bytes).await?;
    info!(
        filename = %filename,
        bytes = byte_count,
        pages = extracted.page_count,
        chars = extracted.char_count(),
        "extracted text"
    );

    let result = analyze_risk(&extracted.text, &state.rules);
    info!(
        filename = %filename,
        risk_score = result.risk_score,
        risk_level = %result.risk_level,
        triggered = result.triggered_messages.len(),
        "contract scored"
    );

    Ok(Json(AnalyzeResponse {
        status: STATUS_SUCCESS.to_string(),
        explanation: result.explanation(),
        filename,
        risk_score: result.risk_score,
        risk_level: result.risk_level,
    }))
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        rule_count: state.rules.len(),
        ruleset: state.rules.fingerprint().to_string(),
    })
}

async fn list_rules(State(state): State<AppState>) -> Json<RulesResponse> {
    Json(RulesResponse {
        fingerprint: state.rules.fingerprint().to_string(),
        rules: state.rules.rules().cloned().collect(),
    })
}

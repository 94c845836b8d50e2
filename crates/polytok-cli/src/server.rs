//! Encode/decode HTTP service.
//!
//! The model is loaded once at startup and shared immutably across request
//! handlers; encode and decode never take a lock.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use polytok::{BpeModel, PolytokError, TokenId};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

/// Response body for `POST /encode`.
#[derive(Debug, Serialize)]
pub struct EncodeResponse {
    pub tokens: Vec<TokenId>,
    pub token_texts: Vec<String>,
    pub computation_time_ms: String,
}

/// Request body for `POST /decode`.
#[derive(Debug, Deserialize)]
pub struct DecodeRequest {
    pub tokens: Vec<TokenId>,
}

/// Response body for `POST /decode`.
#[derive(Debug, Serialize)]
pub struct DecodeResponse {
    pub text: String,
    pub computation_time_ms: String,
}

/// Build the service router around a shared model.
pub fn router(model: Arc<BpeModel>) -> Router {
    Router::new()
        .route("/encode", post(encode))
        .route("/decode", post(decode))
        .layer(CorsLayer::permissive())
        .with_state(model)
}

/// Serve the API on `port`.
pub async fn serve(
    model: BpeModel,
    port: u16,
) -> std::io::Result<()> {
    let app = router(Arc::new(model));

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    log::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await
}

async fn encode(
    State(model): State<Arc<BpeModel>>,
    Json(input): Json<String>,
) -> Result<Json<EncodeResponse>, (StatusCode, String)> {
    let start = Instant::now();

    let tokens = model.encode(&input);
    let token_texts = model.token_texts(&tokens).map_err(internal)?;

    Ok(Json(EncodeResponse {
        tokens,
        token_texts,
        computation_time_ms: elapsed_ms(start),
    }))
}

async fn decode(
    State(model): State<Arc<BpeModel>>,
    Json(request): Json<DecodeRequest>,
) -> Result<Json<DecodeResponse>, (StatusCode, String)> {
    let start = Instant::now();

    let text = model.decode(&request.tokens).map_err(bad_request)?;

    Ok(Json(DecodeResponse {
        text,
        computation_time_ms: elapsed_ms(start),
    }))
}

fn elapsed_ms(start: Instant) -> String {
    format!("{:.3}", start.elapsed().as_secs_f64() * 1_000.0)
}

fn bad_request(err: PolytokError) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, err.to_string())
}

fn internal(err: PolytokError) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}

// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of FluxION.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! HTTP host for the skill endpoint

use crate::skill::BatterySkill;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::Value;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

pub fn router(skill: Arc<BatterySkill>) -> Router {
    Router::new()
        .route("/alexa", post(alexa_handler))
        .route("/health", get(health_handler))
        .with_state(skill)
}

/// Serve the skill until the listener fails
///
/// # Errors
/// Returns error if the address cannot be bound or the server stops abnormally
pub async fn serve(skill: Arc<BatterySkill>, bind_address: &str) -> std::io::Result<()> {
    let listener = TcpListener::bind(bind_address).await?;
    info!("🌐 Starting skill endpoint on {}", listener.local_addr()?);
    info!("   POST /alexa, GET /health");
    serve_on(skill, listener).await
}

/// Serve on an already bound listener
pub async fn serve_on(skill: Arc<BatterySkill>, listener: TcpListener) -> std::io::Result<()> {
    axum::serve(listener, router(skill)).await
}

async fn alexa_handler(State(skill): State<Arc<BatterySkill>>, Json(body): Json<Value>) -> Response {
    debug!("Skill request received");
    match skill.handle_value(&body).await {
        Ok(envelope) => Json(envelope).into_response(),
        Err(e) => {
            warn!("⚠️ [SKILL] Rejecting request: {}", e);
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
    }
}

async fn health_handler() -> &'static str {
    "OK"
}

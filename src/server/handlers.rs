//! HTTP request handlers

use std::sync::Arc;
use axum::{extract::State, Json};
use tracing::info;

use super::error::Result;
use super::state::AppState;

/// Collect a network snapshot, evaluate it, and return the verdict
pub async fn get_network_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>> {
    let mut endpoint = state.network.lock().await;
    let snapshot = endpoint.source.collect()?;
    let verdict = endpoint.service.evaluate(snapshot)?;
    state.record_network_evaluation();

    if verdict.is_warning() {
        info!(
            alerts = verdict.alerts.as_ref().map(|a| a.len()).unwrap_or(0),
            "network status degraded"
        );
    }

    Ok(Json(serde_json::to_value(&verdict)?))
}

/// Collect a power snapshot and return the full energy-metrics report
pub async fn get_energy_metrics(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>> {
    let mut endpoint = state.energy.lock().await;
    let snapshot = endpoint.source.collect()?;
    let report = endpoint.service.evaluate(snapshot)?;
    state.record_energy_evaluation();

    if let Some(anomalies) = &report.verdict.anomalies {
        if !anomalies.is_empty() {
            info!(count = anomalies.len(), "power anomalies detected");
        }
    }

    Ok(Json(serde_json::to_value(&report)?))
}

/// Service uptime, evaluation counts, and monitor phases
pub async fn get_system_status(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let network = state.network.lock().await;
    let energy = state.energy.lock().await;

    Json(serde_json::json!({
        "status": "healthy",
        "uptime_secs": state.uptime_secs(),
        "network": {
            "phase": network.service.phase(),
            "history_len": network.service.history_len(),
            "evaluations": state.network_evaluations(),
        },
        "energy": {
            "phase": energy.service.phase(),
            "history_len": energy.service.history_len(),
            "evaluations": state.energy_evaluations(),
        },
    }))
}

pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Service index at the root: lists the available endpoints
pub async fn serve_index() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "service": "infrawatch",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "/api/network/status",
            "/api/energy/metrics",
            "/api/system/status",
            "/api/health",
        ],
    }))
}

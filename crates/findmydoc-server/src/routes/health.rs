// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Liveness handler.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use findmydoc_server_db::Collection;
use serde::{Deserialize, Serialize};

use crate::api::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
	Healthy,
	Unhealthy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
	pub status: HealthStatus,
	pub timestamp: String,
	pub version: String,
	pub environment: String,
	pub database: HealthStatus,
}

/// GET /health - unauthenticated liveness with a cheap store probe.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
	let database = match state.store.count(Collection::Countries).await {
		Ok(_) => HealthStatus::Healthy,
		Err(e) => {
			tracing::warn!(error = %e, "health check: database probe failed");
			HealthStatus::Unhealthy
		}
	};

	let response = HealthResponse {
		status: database,
		timestamp: chrono::Utc::now().to_rfc3339(),
		version: env!("CARGO_PKG_VERSION").to_string(),
		environment: state.environment.clone(),
		database,
	};

	let http_status = match response.status {
		HealthStatus::Healthy => StatusCode::OK,
		HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
	};

	(http_status, Json(response))
}

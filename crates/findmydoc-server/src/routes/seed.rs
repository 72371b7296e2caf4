// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Seeding handlers.
//!
//! - `POST /seed?type=baseline|demo&reset=0|1|true|false` runs a seed and
//!   returns its summary
//! - `GET /seed` returns the most recent summary

use axum::{
	extract::{Query, State},
	http::StatusCode,
	response::{IntoResponse, Response},
	Json,
};
use findmydoc_server_seed::{RunStatus, SeedRequest, SeedType};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::{api::AppState, error::ServerError};

#[derive(Debug, Default, Deserialize)]
pub struct SeedQuery {
	#[serde(rename = "type")]
	pub seed_type: Option<String>,
	pub reset: Option<String>,
}

impl SeedQuery {
	/// An absent `type` means baseline and an absent `reset` means no reset.
	pub fn into_request(self) -> Result<SeedRequest, ServerError> {
		let seed_type = match self.seed_type.as_deref() {
			None => SeedType::Baseline,
			Some(raw) => raw.parse::<SeedType>()?,
		};
		let reset = match self.reset.as_deref() {
			None => false,
			Some(raw) => parse_reset_flag(raw).ok_or_else(|| ServerError::InvalidReset(raw.to_string()))?,
		};
		Ok(SeedRequest { seed_type, reset })
	}
}

fn parse_reset_flag(raw: &str) -> Option<bool> {
	match raw.trim().to_ascii_lowercase().as_str() {
		"1" | "true" => Some(true),
		"0" | "false" | "" => Some(false),
		_ => None,
	}
}

/// POST /seed - run a baseline or demo seed.
///
/// `ok` and `partial` runs answer 200 and `failed` runs answer 500, both
/// with the summary body.
pub async fn run_seed(
	State(state): State<AppState>,
	Query(query): Query<SeedQuery>,
) -> Result<Response, ServerError> {
	let request = query.into_request()?;
	info!(seed_type = %request.seed_type, reset = request.reset, "seed requested");

	let summary = state.runner.run(request).await?;

	let status = match summary.status {
		RunStatus::Ok | RunStatus::Partial => StatusCode::OK,
		RunStatus::Failed => StatusCode::INTERNAL_SERVER_ERROR,
	};
	Ok((status, Json(summary)).into_response())
}

/// GET /seed - most recent run summary.
pub async fn latest_seed(State(state): State<AppState>) -> Result<Response, ServerError> {
	match state.runner.latest().await? {
		Some(summary) => Ok(Json(summary).into_response()),
		None => Ok(Json(json!({ "message": "No seed run yet" })).into_response()),
	}
}

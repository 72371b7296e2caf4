// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Error types and JSON error bodies for the HTTP surface.

use axum::{
	http::StatusCode,
	response::{IntoResponse, Response},
	Json,
};
use findmydoc_server_seed::SeedError;
use serde::{Deserialize, Serialize};

/// Error body returned by every rejected request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
	pub error: String,
	pub message: String,
}

impl ErrorResponse {
	pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			error: error.into(),
			message: message.into(),
		}
	}
}

pub fn bad_request(error: &str, message: impl Into<String>) -> (StatusCode, Json<ErrorResponse>) {
	(StatusCode::BAD_REQUEST, Json(ErrorResponse::new(error, message)))
}

pub fn unauthorized(message: impl Into<String>) -> (StatusCode, Json<ErrorResponse>) {
	(StatusCode::UNAUTHORIZED, Json(ErrorResponse::new("unauthorized", message)))
}

pub fn internal_error(message: impl Into<String>) -> (StatusCode, Json<ErrorResponse>) {
	(StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse::new("internal_error", message)))
}

/// Errors surfaced by the server handlers.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
	#[error("Invalid seed type: {0}")]
	InvalidSeedType(String),

	#[error("Invalid reset flag: {0}")]
	InvalidReset(String),

	#[error("{0} is not allowed in production")]
	ProductionGuard(String),

	#[error("Seed run failed: {0}")]
	Seed(SeedError),
}

impl From<SeedError> for ServerError {
	fn from(e: SeedError) -> Self {
		match e {
			SeedError::InvalidSeedType(value) => ServerError::InvalidSeedType(value),
			SeedError::ProductionGuard(action) => ServerError::ProductionGuard(action),
			other => ServerError::Seed(other),
		}
	}
}

impl IntoResponse for ServerError {
	fn into_response(self) -> Response {
		match self {
			ServerError::InvalidSeedType(value) => bad_request(
				"invalid_seed_type",
				format!("Invalid seed type '{value}'; expected 'baseline' or 'demo'"),
			)
			.into_response(),
			ServerError::InvalidReset(value) => bad_request(
				"invalid_reset",
				format!("Invalid reset flag '{value}'; expected 0, 1, true or false"),
			)
			.into_response(),
			ServerError::ProductionGuard(action) => bad_request(
				"production_guard",
				format!("{action} is not allowed in production"),
			)
			.into_response(),
			ServerError::Seed(e) => {
				tracing::error!(error = %e, "seed request failed");
				internal_error("Seed run failed").into_response()
			}
		}
	}
}

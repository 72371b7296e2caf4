// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Operator bearer-token authentication for the seeding routes.
//!
//! Configured tokens are hashed with SHA-256 once at startup; only the
//! digests stay in memory. Requests are admitted when the digest of the
//! presented token matches one of them.

use std::sync::Arc;

use axum::{
	extract::{Request, State},
	middleware::Next,
	response::{IntoResponse, Response},
};
use findmydoc_common_secret::SecretString;
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::error::unauthorized;

/// Hex-encoded SHA-256 digests of the accepted operator tokens.
#[derive(Clone, Default)]
pub struct OperatorTokens {
	hashes: Vec<String>,
}

impl std::fmt::Debug for OperatorTokens {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("OperatorTokens")
			.field("count", &self.hashes.len())
			.finish()
	}
}

pub fn hash_token(token: &str) -> String {
	hex::encode(Sha256::digest(token.as_bytes()))
}

impl OperatorTokens {
	pub fn from_secrets(tokens: &[SecretString]) -> Self {
		Self {
			hashes: tokens
				.iter()
				.map(|t| t.expose().trim())
				.filter(|t| !t.is_empty())
				.map(hash_token)
				.collect(),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.hashes.is_empty()
	}

	pub fn len(&self) -> usize {
		self.hashes.len()
	}

	pub fn verify(&self, token: &str) -> bool {
		let presented = hash_token(token);
		self.hashes.iter().any(|h| *h == presented)
	}
}

fn bearer_token(request: &Request) -> Option<&str> {
	request
		.headers()
		.get("Authorization")
		.and_then(|h| h.to_str().ok())
		.and_then(|v| v.strip_prefix("Bearer "))
		.map(str::trim)
		.filter(|t| !t.is_empty())
}

/// Rejects the request with 401 unless it carries a known operator token.
pub async fn operator_auth_middleware(
	State(tokens): State<Arc<OperatorTokens>>,
	request: Request,
	next: Next,
) -> Response {
	if tokens.is_empty() {
		warn!("operator auth failed: no operator tokens configured");
		return unauthorized("Operator authentication is not configured").into_response();
	}

	let Some(token) = bearer_token(&request) else {
		warn!("operator auth failed: missing or malformed Authorization header");
		return unauthorized("Missing bearer token").into_response();
	};

	if !tokens.verify(token) {
		warn!("operator auth failed: invalid token");
		return unauthorized("Invalid operator token").into_response();
	}

	next.run(request).await
}

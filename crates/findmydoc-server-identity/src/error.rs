// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use findmydoc_server_db::{Collection, DbError};
use thiserror::Error;

/// Errors reported by an external identity provider.
#[derive(Debug, Error)]
pub enum ProviderError {
	/// The account does not exist. Deletion treats this as converged.
	#[error("identity provider account not found")]
	NotFound,

	#[error("invalid provider request: {0}")]
	InvalidRequest(String),

	#[error("identity provider request timed out")]
	Timeout,

	#[error("network error talking to identity provider: {0}")]
	Network(#[from] reqwest::Error),

	#[error("identity provider rejected request: {status} - {message}")]
	Rejected { status: u16, message: String },

	#[error("invalid response from identity provider: {0}")]
	InvalidResponse(String),
}

#[derive(Debug, Error)]
pub enum IdentityError {
	#[error("identity provider error: {0}")]
	Provider(#[from] ProviderError),

	#[error("database error: {0}")]
	Database(#[from] DbError),

	#[error("{collection} record is missing required field {field}")]
	MissingField {
		collection: Collection,
		field: &'static str,
	},

	#[error("invalid user type: {0}")]
	InvalidUserType(String),
}

pub type Result<T> = std::result::Result<T, IdentityError>;

impl From<IdentityError> for DbError {
	fn from(e: IdentityError) -> Self {
		match e {
			IdentityError::Database(db) => db,
			other => DbError::Internal(other.to_string()),
		}
	}
}

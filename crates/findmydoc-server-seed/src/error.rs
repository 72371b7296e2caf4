// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use findmydoc_server_db::{Collection, DbError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SeedError {
	#[error("{0} is not allowed in production")]
	ProductionGuard(String),

	#[error("invalid seed type: {0} (expected baseline or demo)")]
	InvalidSeedType(String),

	#[error("{0} record is missing a stableId")]
	MissingStableId(Collection),

	#[error("seed file {path}: {message}")]
	Dataset { path: String, message: String },

	#[error("database error: {0}")]
	Database(#[from] DbError),

	#[error("{collection} did not shrink while clearing ({remaining} rows left)")]
	Stalled {
		collection: Collection,
		remaining: u64,
	},
}

pub type Result<T> = std::result::Result<T, SeedError>;

impl SeedError {
	pub fn dataset(path: impl Into<String>, message: impl Into<String>) -> Self {
		SeedError::Dataset {
			path: path.into(),
			message: message.into(),
		}
	}
}

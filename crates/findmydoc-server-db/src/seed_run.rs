// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Single-slot persistence for the most recent seed run summary.

use chrono::{SecondsFormat, Utc};
use sqlx::SqlitePool;

use crate::error::{DbError, Result};

#[derive(Clone)]
pub struct SeedRunRepository {
	pool: SqlitePool,
}

impl SeedRunRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Overwrites the stored summary.
	#[tracing::instrument(skip(self, summary))]
	pub async fn save_latest(&self, summary: &serde_json::Value) -> Result<()> {
		let now = Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true);
		sqlx::query(
			r#"
			INSERT INTO seed_runs (slot, summary, recorded_at)
			VALUES (1, ?, ?)
			ON CONFLICT(slot) DO UPDATE SET
				summary = excluded.summary,
				recorded_at = excluded.recorded_at
			"#,
		)
		.bind(serde_json::to_string(summary)?)
		.bind(&now)
		.execute(&self.pool)
		.await?;

		Ok(())
	}

	#[tracing::instrument(skip(self))]
	pub async fn latest(&self) -> Result<Option<serde_json::Value>> {
		let row = sqlx::query_as::<_, (String,)>("SELECT summary FROM seed_runs WHERE slot = 1")
			.fetch_optional(&self.pool)
			.await?;

		row.map(|(summary,)| serde_json::from_str(&summary).map_err(DbError::from))
			.transpose()
	}
}

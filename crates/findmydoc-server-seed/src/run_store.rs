// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Where the most recent run summary lives. Each save replaces the last.

use async_trait::async_trait;
use findmydoc_server_db::{DbError, SeedRunRepository};
use tokio::sync::RwLock;

use crate::error::Result;
use crate::summary::SeedRunSummary;

#[async_trait]
pub trait RunStore: Send + Sync {
	async fn save(&self, summary: &SeedRunSummary) -> Result<()>;

	async fn latest(&self) -> Result<Option<SeedRunSummary>>;
}

#[derive(Default)]
pub struct InMemoryRunStore {
	latest: RwLock<Option<SeedRunSummary>>,
}

impl InMemoryRunStore {
	pub fn new() -> Self {
		Self::default()
	}
}

#[async_trait]
impl RunStore for InMemoryRunStore {
	async fn save(&self, summary: &SeedRunSummary) -> Result<()> {
		*self.latest.write().await = Some(summary.clone());
		Ok(())
	}

	async fn latest(&self) -> Result<Option<SeedRunSummary>> {
		Ok(self.latest.read().await.clone())
	}
}

/// Persists the summary so it survives restarts.
pub struct SqliteRunStore {
	repository: SeedRunRepository,
}

impl SqliteRunStore {
	pub fn new(repository: SeedRunRepository) -> Self {
		Self { repository }
	}
}

#[async_trait]
impl RunStore for SqliteRunStore {
	async fn save(&self, summary: &SeedRunSummary) -> Result<()> {
		let value = serde_json::to_value(summary).map_err(DbError::from)?;
		self.repository.save_latest(&value).await?;
		Ok(())
	}

	async fn latest(&self) -> Result<Option<SeedRunSummary>> {
		let Some(value) = self.repository.latest().await? else {
			return Ok(None);
		};
		let summary = serde_json::from_value(value).map_err(DbError::from)?;
		Ok(Some(summary))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::summary::SeedType;
	use findmydoc_server_db::testing::create_test_pool;

	async fn exercise(store: &dyn RunStore) {
		assert!(store.latest().await.unwrap().is_none());

		let mut first = SeedRunSummary::start(SeedType::Baseline, false);
		first.finish();
		store.save(&first).await.unwrap();

		let mut second = SeedRunSummary::start(SeedType::Demo, true);
		second.record_failure("posts", "boom");
		second.finish();
		store.save(&second).await.unwrap();

		let latest = store.latest().await.unwrap().unwrap();
		assert_eq!(latest.seed_type, SeedType::Demo);
		assert_eq!(latest.failures.len(), 1);
		assert_eq!(latest.started_at, second.started_at);
	}

	#[tokio::test]
	async fn test_in_memory_overwrites() {
		exercise(&InMemoryRunStore::new()).await;
	}

	#[tokio::test]
	async fn test_sqlite_overwrites() {
		let repository = SeedRunRepository::new(create_test_pool().await);
		exercise(&SqliteRunStore::new(repository)).await;
	}
}

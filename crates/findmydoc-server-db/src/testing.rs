// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Test helpers shared by the server crates.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::collection::Collection;
use crate::context::{CascadeContext, OperationContext};
use crate::document::{Document, Fields, RecordId};
use crate::error::{DbError, Result};
use crate::pool::run_migrations;
use crate::query::{FieldFilter, FindQuery, Page};
use crate::store::{RecordStore, SqliteRecordStore};

/// In-memory pool with the schema applied.
///
/// Pinned to one connection: every `:memory:` connection is its own database.
pub async fn create_test_pool() -> SqlitePool {
	let pool = SqlitePoolOptions::new()
		.max_connections(1)
		.connect("sqlite::memory:")
		.await
		.unwrap();
	run_migrations(&pool).await.unwrap();
	pool
}

/// A call observed by [`RecordingStore`].
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
	Find(Collection, Option<FieldFilter>),
	FindById(Collection, RecordId),
	Create(Collection),
	Update(Collection, RecordId),
	Delete(Collection, RecordId, CascadeContext),
	Count(Collection),
}

/// Store decorator that records every call and can fail creates per
/// collection. Used to assert lookup counts and deletion order.
pub struct RecordingStore {
	inner: Arc<dyn RecordStore>,
	calls: Mutex<Vec<StoreCall>>,
	failing_creates: Mutex<HashSet<Collection>>,
}

impl RecordingStore {
	pub fn new(inner: Arc<dyn RecordStore>) -> Self {
		Self {
			inner,
			calls: Mutex::new(Vec::new()),
			failing_creates: Mutex::new(HashSet::new()),
		}
	}

	pub async fn in_memory() -> Self {
		Self::new(Arc::new(SqliteRecordStore::new(create_test_pool().await)))
	}

	pub fn fail_creates_for(&self, collection: Collection) {
		self.failing_creates.lock().unwrap().insert(collection);
	}

	pub fn allow_creates_for(&self, collection: Collection) {
		self.failing_creates.lock().unwrap().remove(&collection);
	}

	pub fn calls(&self) -> Vec<StoreCall> {
		self.calls.lock().unwrap().clone()
	}

	pub fn clear(&self) {
		self.calls.lock().unwrap().clear();
	}

	pub fn lookups(&self, collection: Collection) -> usize {
		self.calls()
			.iter()
			.filter(|c| matches!(c, StoreCall::Find(col, _) | StoreCall::FindById(col, _) if *col == collection))
			.count()
	}

	/// Collections in the order rows were deleted from them, with
	/// consecutive repeats collapsed.
	pub fn deletion_order(&self) -> Vec<Collection> {
		let mut order: Vec<Collection> = Vec::new();
		for call in self.calls() {
			if let StoreCall::Delete(collection, _, _) = call {
				if order.last() != Some(&collection) {
					order.push(collection);
				}
			}
		}
		order
	}

	pub fn deletes(&self) -> Vec<(Collection, RecordId, CascadeContext)> {
		self.calls()
			.into_iter()
			.filter_map(|c| match c {
				StoreCall::Delete(collection, id, cascade) => Some((collection, id, cascade)),
				_ => None,
			})
			.collect()
	}

	pub fn mutations(&self) -> usize {
		self.calls()
			.iter()
			.filter(|c| {
				matches!(
					c,
					StoreCall::Create(_) | StoreCall::Update(_, _) | StoreCall::Delete(_, _, _)
				)
			})
			.count()
	}

	pub fn is_untouched(&self) -> bool {
		self.calls.lock().unwrap().is_empty()
	}

	fn record(&self, call: StoreCall) {
		self.calls.lock().unwrap().push(call);
	}
}

#[async_trait]
impl RecordStore for RecordingStore {
	async fn find(&self, collection: Collection, query: &FindQuery) -> Result<Page> {
		self.record(StoreCall::Find(collection, query.filter.clone()));
		self.inner.find(collection, query).await
	}

	async fn find_by_id(&self, collection: Collection, id: &RecordId) -> Result<Option<Document>> {
		self.record(StoreCall::FindById(collection, id.clone()));
		self.inner.find_by_id(collection, id).await
	}

	async fn create(
		&self,
		collection: Collection,
		data: Fields,
		ctx: &OperationContext,
	) -> Result<Document> {
		self.record(StoreCall::Create(collection));
		if self.failing_creates.lock().unwrap().contains(&collection) {
			return Err(DbError::Internal(format!("injected failure for {collection}")));
		}
		self.inner.create(collection, data, ctx).await
	}

	async fn update(
		&self,
		collection: Collection,
		id: &RecordId,
		data: Fields,
		ctx: &OperationContext,
	) -> Result<Document> {
		self.record(StoreCall::Update(collection, id.clone()));
		self.inner.update(collection, id, data, ctx).await
	}

	async fn delete(
		&self,
		collection: Collection,
		id: &RecordId,
		ctx: &OperationContext,
	) -> Result<bool> {
		self.record(StoreCall::Delete(collection, id.clone(), ctx.cascade));
		self.inner.delete(collection, id, ctx).await
	}

	async fn count(&self, collection: Collection) -> Result<u64> {
		self.record(StoreCall::Count(collection));
		self.inner.count(collection).await
	}
}

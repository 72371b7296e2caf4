// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Stable id to internal id resolution with a per-run memo cache.
//!
//! Both directions are cached, misses included, and a hit in one direction
//! primes the other. The cache lives as long as the resolver, which is one
//! seed run; it is never invalidated.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use findmydoc_server_db::{Collection, FindQuery, RecordId, RecordStore, STABLE_ID_FIELD};
use tracing::{instrument, trace};

use crate::error::Result;

/// Batch resolution outcome. Both lists keep input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedIds {
	pub ids: Vec<RecordId>,
	pub missing: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedStableIds {
	pub stable_ids: Vec<String>,
	pub missing: Vec<RecordId>,
}

#[derive(Default)]
struct Cache {
	ids: HashMap<(Collection, String), Option<RecordId>>,
	stable_ids: HashMap<(Collection, RecordId), Option<String>>,
}

pub struct StableIdResolver {
	store: Arc<dyn RecordStore>,
	cache: Mutex<Cache>,
}

impl StableIdResolver {
	pub fn new(store: Arc<dyn RecordStore>) -> Self {
		Self {
			store,
			cache: Mutex::new(Cache::default()),
		}
	}

	fn cached_id(&self, collection: Collection, stable_id: &str) -> Option<Option<RecordId>> {
		let cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
		cache.ids.get(&(collection, stable_id.to_string())).cloned()
	}

	fn cached_stable_id(&self, collection: Collection, id: &RecordId) -> Option<Option<String>> {
		let cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
		cache.stable_ids.get(&(collection, id.clone())).cloned()
	}

	fn remember(&self, collection: Collection, stable_id: &str, id: &RecordId) {
		let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
		cache
			.ids
			.insert((collection, stable_id.to_string()), Some(id.clone()));
		cache
			.stable_ids
			.insert((collection, id.clone()), Some(stable_id.to_string()));
	}

	#[instrument(skip(self), fields(%collection))]
	pub async fn resolve_id(&self, collection: Collection, stable_id: &str) -> Result<Option<RecordId>> {
		if let Some(hit) = self.cached_id(collection, stable_id) {
			trace!(stable_id, "resolver cache hit");
			return Ok(hit);
		}

		let found = self
			.store
			.find(
				collection,
				&FindQuery::where_equals(STABLE_ID_FIELD, stable_id).limit(1),
			)
			.await?
			.first();

		match found {
			Some(doc) => {
				self.remember(collection, stable_id, &doc.id);
				Ok(Some(doc.id))
			}
			None => {
				let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
				cache.ids.insert((collection, stable_id.to_string()), None);
				Ok(None)
			}
		}
	}

	pub async fn resolve_many_ids(
		&self,
		collection: Collection,
		stable_ids: &[String],
	) -> Result<ResolvedIds> {
		let mut resolved = ResolvedIds::default();
		for stable_id in stable_ids {
			match self.resolve_id(collection, stable_id).await? {
				Some(id) => resolved.ids.push(id),
				None => resolved.missing.push(stable_id.clone()),
			}
		}
		Ok(resolved)
	}

	/// Reverse lookup. A record that does not exist resolves to `None`.
	#[instrument(skip(self), fields(%collection, %id))]
	pub async fn resolve_stable_id(&self, collection: Collection, id: &RecordId) -> Result<Option<String>> {
		if let Some(hit) = self.cached_stable_id(collection, id) {
			trace!("resolver cache hit");
			return Ok(hit);
		}

		let stable_id = self
			.store
			.find_by_id(collection, id)
			.await?
			.and_then(|doc| doc.stable_id().map(str::to_string));

		match &stable_id {
			Some(stable_id) => self.remember(collection, stable_id, id),
			None => {
				let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
				cache.stable_ids.insert((collection, id.clone()), None);
			}
		}
		Ok(stable_id)
	}

	pub async fn resolve_many_stable_ids(
		&self,
		collection: Collection,
		ids: &[RecordId],
	) -> Result<ResolvedStableIds> {
		let mut resolved = ResolvedStableIds::default();
		for id in ids {
			match self.resolve_stable_id(collection, id).await? {
				Some(stable_id) => resolved.stable_ids.push(stable_id),
				None => resolved.missing.push(id.clone()),
			}
		}
		Ok(resolved)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use findmydoc_server_db::testing::RecordingStore;
	use findmydoc_server_db::{Fields, OperationContext};
	use serde_json::json;

	async fn seeded() -> (Arc<RecordingStore>, RecordId) {
		let store = Arc::new(RecordingStore::in_memory().await);
		let mut data = Fields::new();
		data.insert("stableId".into(), json!("country-de"));
		data.insert("name".into(), json!("Germany"));
		let doc = store
			.create(Collection::Countries, data, &OperationContext::seeding())
			.await
			.unwrap();
		store.clear();
		(store, doc.id)
	}

	#[tokio::test]
	async fn test_repeated_lookup_hits_store_once() {
		let (store, id) = seeded().await;
		let resolver = StableIdResolver::new(store.clone());

		let first = resolver.resolve_id(Collection::Countries, "country-de").await.unwrap();
		let second = resolver.resolve_id(Collection::Countries, "country-de").await.unwrap();

		assert_eq!(first, Some(id.clone()));
		assert_eq!(second, Some(id));
		assert_eq!(store.lookups(Collection::Countries), 1);
	}

	#[tokio::test]
	async fn test_misses_are_memoized() {
		let (store, _) = seeded().await;
		let resolver = StableIdResolver::new(store.clone());

		assert_eq!(resolver.resolve_id(Collection::Countries, "nope").await.unwrap(), None);
		assert_eq!(resolver.resolve_id(Collection::Countries, "nope").await.unwrap(), None);
		assert_eq!(store.lookups(Collection::Countries), 1);
	}

	#[tokio::test]
	async fn test_cache_is_scoped_per_collection() {
		let (store, _) = seeded().await;
		let resolver = StableIdResolver::new(store.clone());

		assert!(resolver.resolve_id(Collection::Countries, "country-de").await.unwrap().is_some());
		assert!(resolver.resolve_id(Collection::Cities, "country-de").await.unwrap().is_none());
	}

	#[tokio::test]
	async fn test_forward_hit_primes_reverse() {
		let (store, id) = seeded().await;
		let resolver = StableIdResolver::new(store.clone());

		resolver.resolve_id(Collection::Countries, "country-de").await.unwrap();
		let stable = resolver.resolve_stable_id(Collection::Countries, &id).await.unwrap();

		assert_eq!(stable.as_deref(), Some("country-de"));
		assert_eq!(store.lookups(Collection::Countries), 1);
	}

	#[tokio::test]
	async fn test_reverse_hit_primes_forward() {
		let (store, id) = seeded().await;
		let resolver = StableIdResolver::new(store.clone());

		resolver.resolve_stable_id(Collection::Countries, &id).await.unwrap();
		let forward = resolver.resolve_id(Collection::Countries, "country-de").await.unwrap();

		assert_eq!(forward, Some(id));
		assert_eq!(store.lookups(Collection::Countries), 1);
	}

	#[tokio::test]
	async fn test_reverse_lookup_of_unknown_id_is_none() {
		let (store, _) = seeded().await;
		let resolver = StableIdResolver::new(store);

		let stable = resolver
			.resolve_stable_id(Collection::Countries, &RecordId::new("missing"))
			.await
			.unwrap();
		assert_eq!(stable, None);
	}

	#[tokio::test]
	async fn test_batch_partitions_in_input_order() {
		let (store, id) = seeded().await;
		let resolver = StableIdResolver::new(store);

		let resolved = resolver
			.resolve_many_ids(
				Collection::Countries,
				&["x".to_string(), "country-de".to_string(), "y".to_string()],
			)
			.await
			.unwrap();

		assert_eq!(resolved.ids, vec![id.clone()]);
		assert_eq!(resolved.missing, vec!["x".to_string(), "y".to_string()]);

		let reverse = resolver
			.resolve_many_stable_ids(Collection::Countries, &[RecordId::new("z"), id])
			.await
			.unwrap();
		assert_eq!(reverse.stable_ids, vec!["country-de".to_string()]);
		assert_eq!(reverse.missing, vec![RecordId::new("z")]);
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Seed units and the collection importer.

use async_trait::async_trait;
use findmydoc_server_db::{Collection, Fields, RecordStore, STABLE_ID_FIELD};
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::dataset::load_dataset;
use crate::error::Result;
use crate::plan::{set_value_at_path, PlanStep, RelationMapping};
use crate::resolver::StableIdResolver;
use crate::summary::{SeedType, SeedUnitResult};
use crate::upsert::upsert_by_stable_id;

/// One named step of a seed program.
///
/// An `Err` fails the unit as a whole. Record-level problems are reported
/// in the returned result instead.
#[async_trait]
pub trait SeedUnit: Send + Sync {
	fn name(&self) -> &str;

	async fn run(&self, store: &dyn RecordStore, resolver: &StableIdResolver) -> Result<SeedUnitResult>;
}

enum RecordSource {
	Embedded(SeedType),
	Inline(Vec<Fields>),
}

/// Imports one dataset into one collection through the upsert engine.
pub struct CollectionImport {
	step: PlanStep,
	source: RecordSource,
}

enum Resolution {
	Set(Value),
	Leave,
	Skip,
}

fn record_label(collection: Collection, record: &Fields) -> String {
	let stable_id = record
		.get(STABLE_ID_FIELD)
		.and_then(Value::as_str)
		.unwrap_or("<unknown>");
	format!("{collection}:{stable_id}")
}

fn is_seed_only_field(key: &str) -> bool {
	key.ends_with("StableId") || key.ends_with("StableIds")
}

impl CollectionImport {
	pub fn from_step(seed_type: SeedType, step: PlanStep) -> Self {
		Self {
			step,
			source: RecordSource::Embedded(seed_type),
		}
	}

	pub fn with_records(step: PlanStep, records: Vec<Fields>) -> Self {
		Self {
			step,
			source: RecordSource::Inline(records),
		}
	}

	fn records(&self) -> Result<Vec<Fields>> {
		match &self.source {
			RecordSource::Embedded(seed_type) => load_dataset(*seed_type, self.step.dataset),
			RecordSource::Inline(records) => Ok(records.clone()),
		}
	}

	async fn resolve(
		&self,
		resolver: &StableIdResolver,
		mapping: &RelationMapping,
		raw: Option<Value>,
		label: &str,
		warnings: &mut Vec<String>,
	) -> Result<Resolution> {
		let raw = match raw {
			None | Some(Value::Null) => {
				if mapping.required {
					warnings.push(format!("Missing {} for {label}", mapping.source_field));
					return Ok(Resolution::Skip);
				}
				return Ok(Resolution::Leave);
			}
			Some(raw) => raw,
		};

		if mapping.many {
			let Value::Array(items) = raw else {
				warnings.push(format!("Expected array for {} on {label}", mapping.source_field));
				return Ok(Resolution::Skip);
			};
			let stable_ids: Vec<String> = items
				.into_iter()
				.filter_map(|v| v.as_str().map(str::to_string))
				.collect();
			let resolved = resolver.resolve_many_ids(mapping.collection, &stable_ids).await?;
			if !resolved.missing.is_empty() {
				warnings.push(format!(
					"Missing {} stableIds for {label}: {}",
					mapping.collection,
					resolved.missing.join(", ")
				));
				if mapping.required {
					return Ok(Resolution::Skip);
				}
			}
			let ids = resolved.ids.into_iter().map(|id| id.into_value()).collect();
			return Ok(Resolution::Set(Value::Array(ids)));
		}

		let Value::String(stable_id) = raw else {
			warnings.push(format!("Expected string for {} on {label}", mapping.source_field));
			return Ok(Resolution::Skip);
		};
		match resolver.resolve_id(mapping.collection, &stable_id).await? {
			Some(id) => Ok(Resolution::Set(id.into_value())),
			None => {
				warnings.push(format!(
					"Missing {} for {label} (stableId: {stable_id})",
					mapping.collection
				));
				Ok(if mapping.required {
					Resolution::Skip
				} else {
					Resolution::Leave
				})
			}
		}
	}

	/// Applies relation mappings. Returns `None` when the record is skipped.
	async fn prepare(
		&self,
		resolver: &StableIdResolver,
		record: Fields,
		warnings: &mut Vec<String>,
	) -> Result<Option<Fields>> {
		let label = record_label(self.step.collection, &record);
		let mut draft = record;
		let mut skip = false;

		for mapping in &self.step.mappings {
			let raw = draft.remove(mapping.source_field);
			match self.resolve(resolver, mapping, raw, &label, warnings).await? {
				Resolution::Set(value) => set_value_at_path(&mut draft, mapping.target_field, value),
				Resolution::Leave => {}
				Resolution::Skip => skip = true,
			}
		}

		draft.retain(|key, _| !is_seed_only_field(key));
		Ok((!skip).then_some(draft))
	}
}

#[async_trait]
impl SeedUnit for CollectionImport {
	fn name(&self) -> &str {
		self.step.name
	}

	#[instrument(skip(self, store, resolver), fields(unit = self.step.name, collection = %self.step.collection))]
	async fn run(&self, store: &dyn RecordStore, resolver: &StableIdResolver) -> Result<SeedUnitResult> {
		let records = self.records()?;
		let collection = self.step.collection;
		let mut result = SeedUnitResult::new(self.step.name);

		for record in records {
			let label = record_label(collection, &record);
			let prepared = match self.prepare(resolver, record, &mut result.warnings).await {
				Ok(Some(prepared)) => prepared,
				Ok(None) => continue,
				Err(e) => {
					result.failures.push(format!("Failed {label}: {e}"));
					continue;
				}
			};

			match upsert_by_stable_id(store, collection, prepared).await {
				Ok(outcome) => {
					result.created += u64::from(outcome.created);
					result.updated += u64::from(outcome.updated);
				}
				Err(e) => {
					warn!(record = %label, error = %e, "seed record failed");
					result.failures.push(format!("Failed {label}: {e}"));
				}
			}
		}

		info!(
			created = result.created,
			updated = result.updated,
			warnings = result.warnings.len(),
			failures = result.failures.len(),
			"seed unit finished"
		);
		Ok(result)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use findmydoc_server_db::testing::RecordingStore;
	use findmydoc_server_db::{FindQuery, OperationContext};
	use serde_json::json;
	use std::sync::Arc;

	fn fields(value: Value) -> Fields {
		match value {
			Value::Object(map) => map,
			_ => panic!("expected object"),
		}
	}

	fn clinics_step() -> PlanStep {
		PlanStep {
			name: "clinics",
			collection: Collection::Clinics,
			dataset: "clinics",
			mappings: vec![
				RelationMapping::one("cityStableId", "address.city", Collection::Cities).required(),
				RelationMapping::many("tagsStableIds", "tags", Collection::Tags),
			],
		}
	}

	async fn store_with_city() -> (Arc<RecordingStore>, String) {
		let store = Arc::new(RecordingStore::in_memory().await);
		let city = store
			.create(
				Collection::Cities,
				fields(json!({"stableId": "city-berlin", "name": "Berlin"})),
				&OperationContext::seeding(),
			)
			.await
			.unwrap();
		(store, city.id.to_string())
	}

	#[tokio::test]
	async fn test_maps_relations_and_strips_seed_fields() {
		let (store, city_id) = store_with_city().await;
		let resolver = StableIdResolver::new(store.clone());
		let unit = CollectionImport::with_records(
			clinics_step(),
			vec![fields(json!({
				"stableId": "clinic-a",
				"name": "A",
				"address": {"street": "Main"},
				"cityStableId": "city-berlin",
				"tagsStableIds": ["tag-missing"],
				"doctorStableId": "later-pass"
			}))],
		);

		let result = unit.run(&*store, &resolver).await.unwrap();

		assert_eq!(result.created, 1);
		assert_eq!(result.warnings, vec!["Missing tags stableIds for clinics:clinic-a: tag-missing"]);
		let clinic = store
			.find(Collection::Clinics, &FindQuery::all())
			.await
			.unwrap()
			.first()
			.unwrap();
		assert_eq!(clinic.get("address"), Some(&json!({"street": "Main", "city": city_id})));
		assert_eq!(clinic.get("tags"), Some(&json!([])));
		assert!(clinic.data.keys().all(|k| !is_seed_only_field(k)));
	}

	#[tokio::test]
	async fn test_required_relation_problems_skip_the_record() {
		let (store, _) = store_with_city().await;
		let resolver = StableIdResolver::new(store.clone());
		let unit = CollectionImport::with_records(
			clinics_step(),
			vec![
				fields(json!({"stableId": "no-city"})),
				fields(json!({"stableId": "bad-city", "cityStableId": 7})),
				fields(json!({"stableId": "unknown-city", "cityStableId": "city-atlantis"})),
				fields(json!({"stableId": "bad-tags", "cityStableId": "city-berlin", "tagsStableIds": "tag"})),
			],
		);

		let result = unit.run(&*store, &resolver).await.unwrap();

		assert_eq!(result.created, 0);
		assert!(result.failures.is_empty());
		assert_eq!(
			result.warnings,
			vec![
				"Missing cityStableId for clinics:no-city".to_string(),
				"Expected string for cityStableId on clinics:bad-city".to_string(),
				"Missing cities for clinics:unknown-city (stableId: city-atlantis)".to_string(),
				"Expected array for tagsStableIds on clinics:bad-tags".to_string(),
			]
		);
		assert_eq!(store.count(Collection::Clinics).await.unwrap(), 0);
	}

	#[tokio::test]
	async fn test_upsert_errors_become_record_failures() {
		let (store, _) = store_with_city().await;
		store.fail_creates_for(Collection::Clinics);
		let resolver = StableIdResolver::new(store.clone());
		let unit = CollectionImport::with_records(
			clinics_step(),
			vec![
				fields(json!({"stableId": "clinic-a", "cityStableId": "city-berlin"})),
				fields(json!({"stableId": "clinic-b", "cityStableId": "city-berlin"})),
			],
		);

		let result = unit.run(&*store, &resolver).await.unwrap();

		assert_eq!(result.failures.len(), 2);
		assert!(result.failures[0].starts_with("Failed clinics:clinic-a: "));
	}

	#[tokio::test]
	async fn test_invalid_dataset_fails_the_unit() {
		let store = Arc::new(RecordingStore::in_memory().await);
		let resolver = StableIdResolver::new(store.clone());
		let step = PlanStep {
			name: "ghost",
			collection: Collection::Tags,
			dataset: "doesNotExist",
			mappings: Vec::new(),
		};

		let result = CollectionImport::from_step(SeedType::Baseline, step)
			.run(&*store, &resolver)
			.await;

		assert!(result.is_err());
		assert!(store.is_untouched());
	}
}

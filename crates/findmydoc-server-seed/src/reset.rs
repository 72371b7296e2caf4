// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Ordered, per-row clearing of seed-managed collections.
//!
//! Rows are deleted one at a time through the store so per-row lifecycle
//! handling runs (identity rows go through the lifecycle coordinator when
//! the store is wrapped by one). There is no bulk delete.

use std::sync::Arc;

use findmydoc_server_db::{Collection, FindQuery, OperationContext, RecordStore};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::environment::EnvironmentClassifier;
use crate::error::{Result, SeedError};
use crate::summary::SeedType;

pub const DEFAULT_RESET_PAGE_SIZE: u32 = 100;

/// Demo collections, dependents before dependencies.
pub const DEMO_RESET_ORDER: [Collection; 10] = [
	Collection::Reviews,
	Collection::FavoriteClinics,
	Collection::DoctorTreatments,
	Collection::DoctorSpecialties,
	Collection::ClinicTreatments,
	Collection::Doctors,
	Collection::Clinics,
	Collection::Posts,
	Collection::PlatformContentMedia,
	Collection::BasicUsers,
];

/// Reference data cleared after the demo sequence on a baseline reset.
pub const BASELINE_RESET_ORDER: [Collection; 7] = [
	Collection::Treatments,
	Collection::Categories,
	Collection::Tags,
	Collection::Accreditations,
	Collection::MedicalSpecialties,
	Collection::Cities,
	Collection::Countries,
];

pub fn reset_order(seed_type: SeedType) -> Vec<Collection> {
	let mut order = DEMO_RESET_ORDER.to_vec();
	if seed_type == SeedType::Baseline {
		order.extend(BASELINE_RESET_ORDER);
	}
	order
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetCount {
	pub collection: Collection,
	pub before: u64,
	pub after: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResetReport {
	pub counts: Vec<ResetCount>,
}

impl ResetReport {
	pub fn total_deleted(&self) -> u64 {
		self.counts
			.iter()
			.map(|c| c.before.saturating_sub(c.after))
			.sum()
	}
}

pub struct ResetOrchestrator {
	store: Arc<dyn RecordStore>,
	environment: Arc<dyn EnvironmentClassifier>,
	page_size: u32,
}

impl ResetOrchestrator {
	pub fn new(store: Arc<dyn RecordStore>, environment: Arc<dyn EnvironmentClassifier>) -> Self {
		Self {
			store,
			environment,
			page_size: DEFAULT_RESET_PAGE_SIZE,
		}
	}

	pub fn with_page_size(mut self, page_size: u32) -> Self {
		self.page_size = page_size.max(1);
		self
	}

	#[instrument(skip(self), fields(seed_type = %seed_type))]
	pub async fn reset_collections(&self, seed_type: SeedType) -> Result<ResetReport> {
		if self.environment.is_production() {
			return Err(SeedError::ProductionGuard(format!("{seed_type} reset")));
		}

		let mut report = ResetReport::default();
		for collection in reset_order(seed_type) {
			report.counts.push(self.clear_collection(collection).await?);
		}

		info!(
			collections = report.counts.len(),
			deleted = report.total_deleted(),
			"reset complete"
		);
		Ok(report)
	}

	#[instrument(skip(self), fields(%collection))]
	async fn clear_collection(&self, collection: Collection) -> Result<ResetCount> {
		let before = self.store.count(collection).await?;
		let query = FindQuery::all().limit(self.page_size);
		let ctx = OperationContext::seeding();

		loop {
			let page = self.store.find(collection, &query).await?;
			if page.docs.is_empty() {
				break;
			}

			let mut deleted = 0u64;
			for doc in &page.docs {
				if self.store.delete(collection, &doc.id, &ctx).await? {
					deleted += 1;
				}
			}
			debug!(deleted, remaining = page.total_docs.saturating_sub(deleted), "deleted page");

			if deleted == 0 {
				return Err(SeedError::Stalled {
					collection,
					remaining: page.total_docs,
				});
			}
		}

		let after = self.store.count(collection).await?;
		info!(%collection, before, after, "cleared collection");
		Ok(ResetCount {
			collection,
			before,
			after,
		})
	}
}

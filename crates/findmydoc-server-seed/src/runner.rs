// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Seed run orchestration.
//!
//! A run checks its preconditions, optionally resets, executes the program's
//! units strictly in order, classifies the outcome and stores the summary.
//! Unit failures are recorded and the remaining units still run; a reset
//! failure aborts the run.

use std::collections::HashMap;
use std::sync::Arc;

use findmydoc_server_db::RecordStore;
use tracing::{error, info, instrument, warn};

use crate::environment::EnvironmentClassifier;
use crate::error::{Result, SeedError};
use crate::import::{CollectionImport, SeedUnit};
use crate::plan::SeedPlan;
use crate::reset::{ResetOrchestrator, DEFAULT_RESET_PAGE_SIZE};
use crate::resolver::StableIdResolver;
use crate::run_store::RunStore;
use crate::summary::{RunStatus, SeedRunSummary, SeedType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedRequest {
	pub seed_type: SeedType,
	pub reset: bool,
}

pub struct SeedRunner {
	store: Arc<dyn RecordStore>,
	environment: Arc<dyn EnvironmentClassifier>,
	run_store: Arc<dyn RunStore>,
	page_size: u32,
	programs: HashMap<SeedType, Vec<Arc<dyn SeedUnit>>>,
}

impl SeedRunner {
	pub fn new(
		store: Arc<dyn RecordStore>,
		environment: Arc<dyn EnvironmentClassifier>,
		run_store: Arc<dyn RunStore>,
	) -> Self {
		Self {
			store,
			environment,
			run_store,
			page_size: DEFAULT_RESET_PAGE_SIZE,
			programs: HashMap::new(),
		}
	}

	pub fn with_page_size(mut self, page_size: u32) -> Self {
		self.page_size = page_size;
		self
	}

	/// Replaces the units run for `seed_type`.
	pub fn with_program(mut self, seed_type: SeedType, units: Vec<Arc<dyn SeedUnit>>) -> Self {
		self.programs.insert(seed_type, units);
		self
	}

	fn units(&self, seed_type: SeedType) -> Vec<Arc<dyn SeedUnit>> {
		if let Some(units) = self.programs.get(&seed_type) {
			return units.clone();
		}
		SeedPlan::for_type(seed_type)
			.steps
			.into_iter()
			.map(|step| Arc::new(CollectionImport::from_step(seed_type, step)) as Arc<dyn SeedUnit>)
			.collect()
	}

	/// Rejects demo seeding and resets in production.
	pub fn check_preconditions(&self, request: &SeedRequest) -> Result<()> {
		if !self.environment.is_production() {
			return Ok(());
		}
		if request.reset {
			return Err(SeedError::ProductionGuard(format!("{} reset", request.seed_type)));
		}
		if request.seed_type == SeedType::Demo {
			return Err(SeedError::ProductionGuard("demo seeding".to_string()));
		}
		Ok(())
	}

	#[instrument(skip(self), fields(seed_type = %request.seed_type, reset = request.reset))]
	pub async fn run(&self, request: SeedRequest) -> Result<SeedRunSummary> {
		self.check_preconditions(&request)?;

		let mut summary = SeedRunSummary::start(request.seed_type, request.reset);

		if request.reset {
			let report = ResetOrchestrator::new(self.store.clone(), self.environment.clone())
				.with_page_size(self.page_size)
				.reset_collections(request.seed_type)
				.await
				.map_err(|e| {
					error!(error = %e, "reset failed; aborting seed run");
					e
				})?;
			summary.reset_counts = Some(report.counts);
		}

		let resolver = StableIdResolver::new(self.store.clone());
		for unit in self.units(request.seed_type) {
			match unit.run(self.store.as_ref(), &resolver).await {
				Ok(result) => {
					info!(
						unit = unit.name(),
						created = result.created,
						updated = result.updated,
						"finished {} seed unit",
						request.seed_type
					);
					summary.record_unit(result);
				}
				Err(e) => {
					error!(unit = unit.name(), error = %e, "seed unit failed");
					summary.record_failure(unit.name(), e.to_string());
				}
			}
		}

		summary.finish();
		self.run_store.save(&summary).await?;

		match summary.status {
			RunStatus::Ok => info!(
				created = summary.totals.created,
				updated = summary.totals.updated,
				duration_ms = summary.duration_ms,
				"seed run complete"
			),
			RunStatus::Partial => warn!(
				failures = summary.failures.len(),
				created = summary.totals.created,
				updated = summary.totals.updated,
				"partial seed run"
			),
			RunStatus::Failed => error!(failures = summary.failures.len(), "seed run failed"),
		}

		Ok(summary)
	}

	pub async fn latest(&self) -> Result<Option<SeedRunSummary>> {
		self.run_store.latest().await
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SeedError;
use crate::reset::ResetCount;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeedType {
	Baseline,
	Demo,
}

impl SeedType {
	pub fn as_str(&self) -> &'static str {
		match self {
			SeedType::Baseline => "baseline",
			SeedType::Demo => "demo",
		}
	}
}

impl std::fmt::Display for SeedType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for SeedType {
	type Err = SeedError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"baseline" => Ok(SeedType::Baseline),
			"demo" => Ok(SeedType::Demo),
			other => Err(SeedError::InvalidSeedType(other.to_string())),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
	Ok,
	Partial,
	Failed,
}

impl RunStatus {
	pub fn classify(failures: usize, completed_units: usize) -> Self {
		match (failures, completed_units) {
			(0, _) => RunStatus::Ok,
			(_, 0) => RunStatus::Failed,
			_ => RunStatus::Partial,
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedUnitResult {
	pub name: String,
	pub created: u64,
	pub updated: u64,
	pub warnings: Vec<String>,
	pub failures: Vec<String>,
}

impl SeedUnitResult {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			..Self::default()
		}
	}

	/// A unit whose every record failed produced nothing and does not count
	/// toward a partial run.
	pub fn counts_as_completed(&self) -> bool {
		self.created + self.updated > 0 || self.failures.is_empty()
	}
}

/// A failure attributed to a unit by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedFailure {
	pub name: String,
	pub message: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
	pub created: u64,
	pub updated: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedRunSummary {
	#[serde(rename = "type")]
	pub seed_type: SeedType,
	pub reset: bool,
	pub status: RunStatus,
	pub started_at: DateTime<Utc>,
	pub finished_at: Option<DateTime<Utc>>,
	pub duration_ms: u64,
	pub totals: Totals,
	pub units: Vec<SeedUnitResult>,
	pub warnings: Vec<String>,
	pub failures: Vec<SeedFailure>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub reset_counts: Option<Vec<ResetCount>>,
}

impl SeedRunSummary {
	pub fn start(seed_type: SeedType, reset: bool) -> Self {
		Self {
			seed_type,
			reset,
			status: RunStatus::Ok,
			started_at: Utc::now(),
			finished_at: None,
			duration_ms: 0,
			totals: Totals::default(),
			units: Vec::new(),
			warnings: Vec::new(),
			failures: Vec::new(),
			reset_counts: None,
		}
	}

	pub fn record_unit(&mut self, unit: SeedUnitResult) {
		self.warnings.extend(unit.warnings.iter().cloned());
		self.failures.extend(unit.failures.iter().map(|message| SeedFailure {
			name: unit.name.clone(),
			message: message.clone(),
		}));
		self.units.push(unit);
	}

	pub fn record_failure(&mut self, name: impl Into<String>, message: impl Into<String>) {
		self.failures.push(SeedFailure {
			name: name.into(),
			message: message.into(),
		});
	}

	pub fn finish(&mut self) {
		let finished_at = Utc::now();
		self.duration_ms = u64::try_from((finished_at - self.started_at).num_milliseconds()).unwrap_or(0);
		self.finished_at = Some(finished_at);
		self.totals = Totals {
			created: self.units.iter().map(|u| u.created).sum(),
			updated: self.units.iter().map(|u| u.updated).sum(),
		};
		let completed = self.units.iter().filter(|u| u.counts_as_completed()).count();
		self.status = RunStatus::classify(self.failures.len(), completed);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use serde_json::json;

	#[test]
	fn test_seed_type_parsing() {
		assert_eq!("baseline".parse::<SeedType>().unwrap(), SeedType::Baseline);
		assert_eq!("demo".parse::<SeedType>().unwrap(), SeedType::Demo);
		assert!(matches!(
			"Demo".parse::<SeedType>(),
			Err(SeedError::InvalidSeedType(_))
		));
	}

	#[test]
	fn test_classification_table() {
		assert_eq!(RunStatus::classify(0, 0), RunStatus::Ok);
		assert_eq!(RunStatus::classify(0, 4), RunStatus::Ok);
		assert_eq!(RunStatus::classify(1, 3), RunStatus::Partial);
		assert_eq!(RunStatus::classify(2, 0), RunStatus::Failed);
	}

	proptest! {
		#[test]
		fn prop_classification(failures in 0usize..50, units in 0usize..50) {
			let status = RunStatus::classify(failures, units);
			prop_assert_eq!(status == RunStatus::Ok, failures == 0);
			prop_assert_eq!(status == RunStatus::Failed, failures > 0 && units == 0);
			prop_assert_eq!(status == RunStatus::Partial, failures > 0 && units > 0);
		}
	}

	#[test]
	fn test_summary_serializes_camel_case() {
		let mut summary = SeedRunSummary::start(SeedType::Demo, true);
		let mut unit = SeedUnitResult::new("clinics");
		unit.created = 2;
		unit.warnings.push("Missing cities for clinics:x (stableId: y)".into());
		summary.record_unit(unit);
		summary.record_failure("posts", "boom");
		summary.finish();

		let value = serde_json::to_value(&summary).unwrap();
		assert_eq!(value["type"], json!("demo"));
		assert_eq!(value["status"], json!("partial"));
		assert_eq!(value["totals"], json!({"created": 2, "updated": 0}));
		assert_eq!(value["failures"][0], json!({"name": "posts", "message": "boom"}));
		assert_eq!(value["warnings"].as_array().unwrap().len(), 1);
		assert!(value.get("startedAt").is_some());
		assert!(value.get("durationMs").is_some());
		assert!(value.get("resetCounts").is_none());
	}

	#[test]
	fn test_record_level_failures_are_attributed_to_unit() {
		let mut summary = SeedRunSummary::start(SeedType::Baseline, false);
		let mut unit = SeedUnitResult::new("cities");
		unit.created = 4;
		unit.failures.push("Failed cities:city-x: conflict".into());
		summary.record_unit(unit);
		summary.finish();

		assert_eq!(summary.status, RunStatus::Partial);
		assert_eq!(summary.failures[0].name, "cities");
	}

	#[test]
	fn test_units_without_output_do_not_rescue_a_run() {
		let mut summary = SeedRunSummary::start(SeedType::Baseline, false);
		let mut cities = SeedUnitResult::new("cities");
		cities.failures.push("Failed cities:city-x: database is locked".into());
		summary.record_unit(cities);
		summary.record_unit(SeedUnitResult::new("tags"));
		summary.finish();
		assert_eq!(summary.status, RunStatus::Partial);

		let mut summary = SeedRunSummary::start(SeedType::Baseline, false);
		for name in ["countries", "cities"] {
			let mut unit = SeedUnitResult::new(name);
			unit.failures.push(format!("Failed {name}:x: database is locked"));
			summary.record_unit(unit);
		}
		summary.finish();

		assert_eq!(summary.status, RunStatus::Failed);
		assert_eq!(summary.units.len(), 2);
		assert_eq!(summary.failures.len(), 2);
	}
}

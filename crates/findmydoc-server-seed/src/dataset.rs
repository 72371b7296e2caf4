// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Seed datasets embedded in the binary.

use std::collections::HashSet;

use findmydoc_server_db::{Fields, STABLE_ID_FIELD};
use serde_json::Value;

use crate::error::{Result, SeedError};
use crate::summary::SeedType;

fn embedded(seed_type: SeedType, name: &str) -> Option<&'static str> {
	let raw = match (seed_type, name) {
		(SeedType::Baseline, "countries") => include_str!("../data/baseline/countries.json"),
		(SeedType::Baseline, "cities") => include_str!("../data/baseline/cities.json"),
		(SeedType::Baseline, "medicalSpecialties") => {
			include_str!("../data/baseline/medicalSpecialties.json")
		}
		(SeedType::Baseline, "accreditations") => include_str!("../data/baseline/accreditations.json"),
		(SeedType::Baseline, "tags") => include_str!("../data/baseline/tags.json"),
		(SeedType::Baseline, "categories") => include_str!("../data/baseline/categories.json"),
		(SeedType::Baseline, "treatments") => include_str!("../data/baseline/treatments.json"),
		(SeedType::Demo, "basicUsers") => include_str!("../data/demo/basicUsers.json"),
		(SeedType::Demo, "patients") => include_str!("../data/demo/patients.json"),
		(SeedType::Demo, "platformContentMedia") => {
			include_str!("../data/demo/platformContentMedia.json")
		}
		(SeedType::Demo, "posts") => include_str!("../data/demo/posts.json"),
		(SeedType::Demo, "clinics") => include_str!("../data/demo/clinics.json"),
		(SeedType::Demo, "doctors") => include_str!("../data/demo/doctors.json"),
		(SeedType::Demo, "clinicTreatments") => include_str!("../data/demo/clinicTreatments.json"),
		(SeedType::Demo, "doctorSpecialties") => include_str!("../data/demo/doctorSpecialties.json"),
		(SeedType::Demo, "doctorTreatments") => include_str!("../data/demo/doctorTreatments.json"),
		(SeedType::Demo, "reviews") => include_str!("../data/demo/reviews.json"),
		(SeedType::Demo, "favoriteClinics") => include_str!("../data/demo/favoriteClinics.json"),
		_ => return None,
	};
	Some(raw)
}

/// Loads and validates an embedded dataset.
pub fn load_dataset(seed_type: SeedType, name: &str) -> Result<Vec<Fields>> {
	let path = format!("{seed_type}/{name}.json");
	let raw = embedded(seed_type, name)
		.ok_or_else(|| SeedError::dataset(&path, "not registered"))?;
	parse_dataset(&path, raw)
}

/// Parses a dataset: an array of objects, each with a unique non-empty
/// `stableId`.
pub fn parse_dataset(path: &str, raw: &str) -> Result<Vec<Fields>> {
	let value: Value = serde_json::from_str(raw)
		.map_err(|e| SeedError::dataset(path, format!("invalid JSON: {e}")))?;
	let Value::Array(items) = value else {
		return Err(SeedError::dataset(path, "must contain a JSON array"));
	};

	let mut seen = HashSet::new();
	items
		.into_iter()
		.enumerate()
		.map(|(index, item)| {
			let Value::Object(record) = item else {
				return Err(SeedError::dataset(
					path,
					format!("must contain objects, item {index} is invalid"),
				));
			};
			let stable_id = record
				.get(STABLE_ID_FIELD)
				.and_then(Value::as_str)
				.filter(|s| !s.is_empty())
				.ok_or_else(|| SeedError::dataset(path, format!("is missing stableId for item {index}")))?;
			if !seen.insert(stable_id.to_string()) {
				return Err(SeedError::dataset(
					path,
					format!("has duplicate stableId {stable_id}"),
				));
			}
			Ok(record)
		})
		.collect()
}

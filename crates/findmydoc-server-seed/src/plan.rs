// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The ordered seed programs.

use findmydoc_server_db::{Collection, Fields};
use serde_json::Value;

use crate::summary::SeedType;

/// Path segments never written by [`set_value_at_path`].
const FORBIDDEN_SEGMENTS: [&str; 3] = ["__proto__", "constructor", "prototype"];

/// Maps a seed-only `*StableId(s)` field onto a relationship field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationMapping {
	pub source_field: &'static str,
	/// Dotted path, e.g. `address.city`.
	pub target_field: &'static str,
	pub collection: Collection,
	pub many: bool,
	pub required: bool,
}

impl RelationMapping {
	pub fn one(source_field: &'static str, target_field: &'static str, collection: Collection) -> Self {
		Self {
			source_field,
			target_field,
			collection,
			many: false,
			required: false,
		}
	}

	pub fn many(source_field: &'static str, target_field: &'static str, collection: Collection) -> Self {
		Self {
			many: true,
			..Self::one(source_field, target_field, collection)
		}
	}

	pub fn required(mut self) -> Self {
		self.required = true;
		self
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanStep {
	pub name: &'static str,
	pub collection: Collection,
	pub dataset: &'static str,
	pub mappings: Vec<RelationMapping>,
}

impl PlanStep {
	fn new(name: &'static str, collection: Collection, dataset: &'static str) -> Self {
		Self {
			name,
			collection,
			dataset,
			mappings: Vec::new(),
		}
	}

	fn map(mut self, mapping: RelationMapping) -> Self {
		self.mappings.push(mapping);
		self
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedPlan {
	pub seed_type: SeedType,
	pub steps: Vec<PlanStep>,
}

impl SeedPlan {
	pub fn for_type(seed_type: SeedType) -> Self {
		match seed_type {
			SeedType::Baseline => Self::baseline(),
			SeedType::Demo => Self::demo(),
		}
	}

	pub fn baseline() -> Self {
		use Collection::*;
		Self {
			seed_type: SeedType::Baseline,
			steps: vec![
				PlanStep::new("countries", Countries, "countries"),
				PlanStep::new("cities", Cities, "cities")
					.map(RelationMapping::one("countryStableId", "country", Countries).required()),
				PlanStep::new("medical-specialties", MedicalSpecialties, "medicalSpecialties").map(
					RelationMapping::one("parentSpecialtyStableId", "parentSpecialty", MedicalSpecialties),
				),
				PlanStep::new("accreditations", Accreditations, "accreditations"),
				PlanStep::new("tags", Tags, "tags"),
				PlanStep::new("categories", Categories, "categories"),
				PlanStep::new("treatments", Treatments, "treatments")
					.map(
						RelationMapping::one("medicalSpecialtyStableId", "medicalSpecialty", MedicalSpecialties)
							.required(),
					)
					.map(RelationMapping::many("tagsStableIds", "tags", Tags)),
			],
		}
	}

	pub fn demo() -> Self {
		use Collection::*;
		Self {
			seed_type: SeedType::Demo,
			steps: vec![
				PlanStep::new("basic-users", BasicUsers, "basicUsers"),
				PlanStep::new("patients", Patients, "patients"),
				PlanStep::new("platform-content-media", PlatformContentMedia, "platformContentMedia")
					.map(RelationMapping::one("createdByStableId", "createdBy", BasicUsers)),
				PlanStep::new("posts", Posts, "posts")
					.map(RelationMapping::one("heroImageStableId", "heroImage", PlatformContentMedia))
					.map(RelationMapping::one("metaImageStableId", "meta.image", PlatformContentMedia))
					.map(RelationMapping::many("tagsStableIds", "tags", Tags))
					.map(RelationMapping::many("categoriesStableIds", "categories", Categories))
					.map(RelationMapping::many("authorsUserStableIds", "authors", BasicUsers).required())
					.map(RelationMapping::many("relatedPostsStableIds", "relatedPosts", Posts)),
				PlanStep::new("clinics", Clinics, "clinics")
					.map(RelationMapping::one("cityStableId", "address.city", Cities).required())
					.map(RelationMapping::many("tagsStableIds", "tags", Tags))
					.map(RelationMapping::many("accreditationsStableIds", "accreditations", Accreditations)),
				PlanStep::new("doctors", Doctors, "doctors")
					.map(RelationMapping::one("clinicStableId", "clinic", Clinics).required()),
				PlanStep::new("clinic-treatments", ClinicTreatments, "clinicTreatments")
					.map(RelationMapping::one("clinicStableId", "clinic", Clinics).required())
					.map(RelationMapping::one("treatmentStableId", "treatment", Treatments).required()),
				PlanStep::new("doctor-specialties", DoctorSpecialties, "doctorSpecialties")
					.map(RelationMapping::one("doctorStableId", "doctor", Doctors).required())
					.map(
						RelationMapping::one("medicalSpecialtyStableId", "medicalSpecialty", MedicalSpecialties)
							.required(),
					),
				PlanStep::new("doctor-treatments", DoctorTreatments, "doctorTreatments")
					.map(RelationMapping::one("doctorStableId", "doctor", Doctors).required())
					.map(RelationMapping::one("treatmentStableId", "treatment", Treatments).required()),
				PlanStep::new("reviews", Reviews, "reviews")
					.map(RelationMapping::one("clinicStableId", "clinic", Clinics).required())
					.map(RelationMapping::one("doctorStableId", "doctor", Doctors).required())
					.map(RelationMapping::one("treatmentStableId", "treatment", Treatments).required())
					.map(RelationMapping::one("patientStableId", "patient", Patients)),
				PlanStep::new("favorite-clinics", FavoriteClinics, "favoriteClinics")
					.map(RelationMapping::one("patientStableId", "patient", Patients).required())
					.map(RelationMapping::one("clinicStableId", "clinic", Clinics).required()),
			],
		}
	}
}

/// Writes `value` at a dotted path, creating intermediate objects and
/// replacing non-object intermediates. Paths with a forbidden segment are
/// ignored entirely; empty segments are skipped.
pub fn set_value_at_path(target: &mut Fields, path: &str, value: Value) {
	let segments: Vec<&str> = path.split('.').filter(|s| !s.is_empty()).collect();
	if segments.is_empty() || segments.iter().any(|s| FORBIDDEN_SEGMENTS.contains(s)) {
		return;
	}

	let (last, parents) = match segments.split_last() {
		Some(split) => split,
		None => return,
	};

	let mut current = target;
	for segment in parents {
		let slot = current
			.entry(segment.to_string())
			.or_insert_with(|| Value::Object(Fields::new()));
		if !slot.is_object() {
			*slot = Value::Object(Fields::new());
		}
		current = match slot {
			Value::Object(map) => map,
			_ => return,
		};
	}
	current.insert(last.to_string(), value);
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The typed collection catalogue.
//!
//! Slugs are the stable names stored in the `documents.collection` column
//! and used on the wire.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Collection {
	#[serde(rename = "countries")]
	Countries,
	#[serde(rename = "cities")]
	Cities,
	#[serde(rename = "medical-specialties")]
	MedicalSpecialties,
	#[serde(rename = "accreditation")]
	Accreditations,
	#[serde(rename = "tags")]
	Tags,
	#[serde(rename = "categories")]
	Categories,
	#[serde(rename = "treatments")]
	Treatments,
	#[serde(rename = "basicUsers")]
	BasicUsers,
	#[serde(rename = "patients")]
	Patients,
	#[serde(rename = "clinicStaff")]
	ClinicStaff,
	#[serde(rename = "platformStaff")]
	PlatformStaff,
	#[serde(rename = "platformContentMedia")]
	PlatformContentMedia,
	#[serde(rename = "posts")]
	Posts,
	#[serde(rename = "clinics")]
	Clinics,
	#[serde(rename = "doctors")]
	Doctors,
	#[serde(rename = "clinictreatments")]
	ClinicTreatments,
	#[serde(rename = "doctorspecialties")]
	DoctorSpecialties,
	#[serde(rename = "doctortreatments")]
	DoctorTreatments,
	#[serde(rename = "favoriteclinics")]
	FavoriteClinics,
	#[serde(rename = "reviews")]
	Reviews,
}

impl Collection {
	pub const ALL: [Collection; 20] = [
		Collection::Countries,
		Collection::Cities,
		Collection::MedicalSpecialties,
		Collection::Accreditations,
		Collection::Tags,
		Collection::Categories,
		Collection::Treatments,
		Collection::BasicUsers,
		Collection::Patients,
		Collection::ClinicStaff,
		Collection::PlatformStaff,
		Collection::PlatformContentMedia,
		Collection::Posts,
		Collection::Clinics,
		Collection::Doctors,
		Collection::ClinicTreatments,
		Collection::DoctorSpecialties,
		Collection::DoctorTreatments,
		Collection::FavoriteClinics,
		Collection::Reviews,
	];

	pub fn as_str(&self) -> &'static str {
		match self {
			Collection::Countries => "countries",
			Collection::Cities => "cities",
			Collection::MedicalSpecialties => "medical-specialties",
			Collection::Accreditations => "accreditation",
			Collection::Tags => "tags",
			Collection::Categories => "categories",
			Collection::Treatments => "treatments",
			Collection::BasicUsers => "basicUsers",
			Collection::Patients => "patients",
			Collection::ClinicStaff => "clinicStaff",
			Collection::PlatformStaff => "platformStaff",
			Collection::PlatformContentMedia => "platformContentMedia",
			Collection::Posts => "posts",
			Collection::Clinics => "clinics",
			Collection::Doctors => "doctors",
			Collection::ClinicTreatments => "clinictreatments",
			Collection::DoctorSpecialties => "doctorspecialties",
			Collection::DoctorTreatments => "doctortreatments",
			Collection::FavoriteClinics => "favoriteclinics",
			Collection::Reviews => "reviews",
		}
	}

	/// Rows that represent a credential-holding party with an external
	/// provider account.
	pub fn is_identity(&self) -> bool {
		matches!(self, Collection::BasicUsers | Collection::Patients)
	}

	/// Role-specific profile rows linked to a staff identity.
	pub fn is_staff_profile(&self) -> bool {
		matches!(self, Collection::ClinicStaff | Collection::PlatformStaff)
	}
}

impl std::fmt::Display for Collection {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

impl std::str::FromStr for Collection {
	type Err = String;

	fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
		Collection::ALL
			.iter()
			.copied()
			.find(|c| c.as_str() == s)
			.ok_or_else(|| format!("unknown collection: {s}"))
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User types and the role profiles linked to staff identities.

use findmydoc_server_db::{Collection, Fields, RecordId};
use serde_json::{json, Value};

use crate::error::{IdentityError, Result};

/// Provider account id stamped onto every identity row.
pub const PROVIDER_ACCOUNT_FIELD: &str = "providerAccountId";
/// Profile relation pointing back at its `basicUsers` row.
pub const USER_FIELD: &str = "user";
pub const USER_TYPE_FIELD: &str = "userType";
/// Accepted on create, forwarded to the provider, never persisted.
pub const PASSWORD_FIELD: &str = "password";
pub const EMAIL_FIELD: &str = "email";
pub const FIRST_NAME_FIELD: &str = "firstName";
pub const LAST_NAME_FIELD: &str = "lastName";

/// Collections holding a role profile for a staff identity.
pub const PROFILE_COLLECTIONS: [Collection; 2] = [Collection::ClinicStaff, Collection::PlatformStaff];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserType {
	Clinic,
	Platform,
	Patient,
}

impl UserType {
	pub fn as_str(&self) -> &'static str {
		match self {
			UserType::Clinic => "clinic",
			UserType::Platform => "platform",
			UserType::Patient => "patient",
		}
	}

	pub fn parse(value: &str) -> Result<Self> {
		match value {
			"clinic" => Ok(UserType::Clinic),
			"platform" => Ok(UserType::Platform),
			"patient" => Ok(UserType::Patient),
			other => Err(IdentityError::InvalidUserType(other.to_string())),
		}
	}

	/// Determines the user type of an identity row being written.
	///
	/// Patients are implicit. Staff identities must carry `userType`.
	pub fn for_identity(collection: Collection, data: &Fields) -> Result<Self> {
		if collection == Collection::Patients {
			return Ok(UserType::Patient);
		}
		let raw = data
			.get(USER_TYPE_FIELD)
			.and_then(Value::as_str)
			.ok_or(IdentityError::MissingField {
				collection,
				field: USER_TYPE_FIELD,
			})?;
		match UserType::parse(raw)? {
			UserType::Patient => Err(IdentityError::InvalidUserType(raw.to_string())),
			staff => Ok(staff),
		}
	}

	pub fn for_profile_collection(collection: Collection) -> Option<Self> {
		match collection {
			Collection::ClinicStaff => Some(UserType::Clinic),
			Collection::PlatformStaff => Some(UserType::Platform),
			_ => None,
		}
	}

	pub fn profile_collection(&self) -> Option<Collection> {
		match self {
			UserType::Clinic => Some(Collection::ClinicStaff),
			UserType::Platform => Some(Collection::PlatformStaff),
			UserType::Patient => None,
		}
	}
}

impl std::fmt::Display for UserType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// The pending profile created for a freshly committed staff identity.
pub fn default_profile(user_type: UserType, identity_id: &RecordId, identity: &Fields) -> Fields {
	let name = |field: &str, fallback: &str| {
		identity
			.get(field)
			.and_then(Value::as_str)
			.filter(|s| !s.trim().is_empty())
			.unwrap_or(fallback)
			.to_string()
	};

	let mut profile = Fields::new();
	profile.insert(USER_FIELD.to_string(), identity_id.clone().into_value());
	profile.insert(FIRST_NAME_FIELD.to_string(), json!(name(FIRST_NAME_FIELD, "Unknown")));
	profile.insert(LAST_NAME_FIELD.to_string(), json!(name(LAST_NAME_FIELD, "User")));
	if user_type == UserType::Clinic {
		if let Some(email) = identity.get(EMAIL_FIELD) {
			profile.insert(EMAIL_FIELD.to_string(), email.clone());
		}
	}
	apply_profile_defaults(user_type, &mut profile);
	profile
}

/// Fills the conservative default state without overriding given values.
pub fn apply_profile_defaults(user_type: UserType, profile: &mut Fields) {
	match user_type {
		UserType::Clinic => {
			profile
				.entry("status")
				.or_insert_with(|| json!("pending"));
		}
		UserType::Platform => {
			profile.entry("role").or_insert_with(|| json!("user"));
		}
		UserType::Patient => {}
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Field holding the durable, author-assigned identifier.
pub const STABLE_ID_FIELD: &str = "stableId";

/// JSON object payload of a document.
pub type Fields = serde_json::Map<String, Value>;

/// Storage-internal identifier. Opaque and environment-specific.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
	pub fn generate() -> Self {
		Self(uuid::Uuid::new_v4().to_string())
	}

	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	pub fn into_value(self) -> Value {
		Value::String(self.0)
	}
}

impl std::fmt::Display for RecordId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for RecordId {
	fn from(value: &str) -> Self {
		Self(value.to_string())
	}
}

impl From<String> for RecordId {
	fn from(value: String) -> Self {
		Self(value)
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
	pub id: RecordId,
	pub data: Fields,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl Document {
	pub fn get(&self, field: &str) -> Option<&Value> {
		self.data.get(field)
	}

	pub fn get_str(&self, field: &str) -> Option<&str> {
		self.data.get(field).and_then(Value::as_str)
	}

	pub fn stable_id(&self) -> Option<&str> {
		self.get_str(STABLE_ID_FIELD)
	}
}

/// Reads the stable id from a payload, ignoring empty strings.
pub fn stable_id_of(fields: &Fields) -> Option<&str> {
	fields
		.get(STABLE_ID_FIELD)
		.and_then(Value::as_str)
		.filter(|s| !s.is_empty())
}

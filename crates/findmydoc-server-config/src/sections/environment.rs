// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Deployment environment.
//!
//! The single "is this production" signal that gates reset and demo
//! seeding is derived from here.

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentConfig {
	pub name: String,
}

impl EnvironmentConfig {
	pub fn new(name: impl Into<String>) -> Self {
		Self { name: name.into() }
	}

	/// `production` and `prod` count as production, case-insensitively.
	pub fn is_production(&self) -> bool {
		let name = self.name.trim();
		name.eq_ignore_ascii_case("production") || name.eq_ignore_ascii_case("prod")
	}
}

impl Default for EnvironmentConfig {
	fn default() -> Self {
		Self::new("development")
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnvironmentConfigLayer {
	#[serde(default)]
	pub name: Option<String>,
}

impl EnvironmentConfigLayer {
	pub fn merge(&mut self, other: EnvironmentConfigLayer) {
		if other.name.is_some() {
			self.name = other.name;
		}
	}

	pub fn finalize(self) -> EnvironmentConfig {
		self.name.map(EnvironmentConfig::new).unwrap_or_default()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_default_is_development() {
		let config = EnvironmentConfigLayer::default().finalize();
		assert_eq!(config.name, "development");
		assert!(!config.is_production());
	}

	#[test]
	fn test_production_names() {
		for name in ["production", "PRODUCTION", "prod", " Production "] {
			assert!(EnvironmentConfig::new(name).is_production(), "{name}");
		}
	}

	#[test]
	fn test_non_production_names() {
		for name in ["staging", "preview", "test", "production-like", ""] {
			assert!(!EnvironmentConfig::new(name).is_production(), "{name}");
		}
	}
}

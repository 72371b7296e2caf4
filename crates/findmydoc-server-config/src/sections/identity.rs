// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! External identity provider configuration.

use findmydoc_common_secret::SecretString;
use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:54321";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Identity provider configuration (runtime, fully resolved).
#[derive(Debug, Clone)]
pub struct IdentityConfig {
	pub base_url: String,
	pub timeout_secs: u64,
	/// Admin service key. Loaded from the environment only.
	pub service_key: Option<SecretString>,
}

impl Default for IdentityConfig {
	fn default() -> Self {
		IdentityConfigLayer::default().finalize(None)
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdentityConfigLayer {
	#[serde(default)]
	pub base_url: Option<String>,
	#[serde(default)]
	pub timeout_secs: Option<u64>,
}

impl IdentityConfigLayer {
	pub fn merge(&mut self, other: IdentityConfigLayer) {
		if other.base_url.is_some() {
			self.base_url = other.base_url;
		}
		if other.timeout_secs.is_some() {
			self.timeout_secs = other.timeout_secs;
		}
	}

	pub fn finalize(self, service_key: Option<SecretString>) -> IdentityConfig {
		IdentityConfig {
			base_url: self
				.base_url
				.map(|url| url.trim_end_matches('/').to_string())
				.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
			timeout_secs: self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
			service_key,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults() {
		let config = IdentityConfig::default();
		assert_eq!(config.base_url, "http://127.0.0.1:54321");
		assert_eq!(config.timeout_secs, 10);
		assert!(config.service_key.is_none());
	}

	#[test]
	fn test_trailing_slash_trimmed() {
		let layer = IdentityConfigLayer {
			base_url: Some("https://auth.example.test/".to_string()),
			timeout_secs: Some(3),
		};
		let config = layer.finalize(Some(SecretString::from("key")));
		assert_eq!(config.base_url, "https://auth.example.test");
		assert_eq!(config.timeout_secs, 3);
		assert!(config.service_key.is_some());
	}
}

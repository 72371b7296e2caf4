// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Document store location and pool sizing.

use serde::Deserialize;

const DEFAULT_DATABASE_URL: &str = "sqlite:./findmydoc.db";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
	pub url: String,
	pub max_connections: u32,
}

impl Default for DatabaseConfig {
	fn default() -> Self {
		DatabaseConfigLayer::default().finalize()
	}
}

impl DatabaseConfig {
	/// `:memory:` databases exist per connection.
	pub fn is_in_memory(&self) -> bool {
		self.url.contains(":memory:")
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseConfigLayer {
	#[serde(default)]
	pub url: Option<String>,
	#[serde(default)]
	pub max_connections: Option<u32>,
}

impl DatabaseConfigLayer {
	pub fn merge(&mut self, other: DatabaseConfigLayer) {
		if other.url.is_some() {
			self.url = other.url;
		}
		if other.max_connections.is_some() {
			self.max_connections = other.max_connections;
		}
	}

	pub fn finalize(self) -> DatabaseConfig {
		let url = self.url.unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
		let max_connections = if url.contains(":memory:") {
			1
		} else {
			self.max_connections.unwrap_or(DEFAULT_MAX_CONNECTIONS)
		};
		DatabaseConfig { url, max_connections }
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Seeding configuration.

use serde::Deserialize;

const DEFAULT_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone)]
pub struct SeedConfig {
	/// Rows fetched per find-batch during reset.
	pub page_size: u32,
}

impl Default for SeedConfig {
	fn default() -> Self {
		Self {
			page_size: DEFAULT_PAGE_SIZE,
		}
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedConfigLayer {
	#[serde(default)]
	pub page_size: Option<u32>,
}

impl SeedConfigLayer {
	pub fn merge(&mut self, other: SeedConfigLayer) {
		if other.page_size.is_some() {
			self.page_size = other.page_size;
		}
	}

	pub fn finalize(self) -> SeedConfig {
		SeedConfig {
			page_size: self.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
		}
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use findmydoc_server_config::EnvironmentConfig;

/// The single signal that gates destructive seeding.
pub trait EnvironmentClassifier: Send + Sync {
	fn is_production(&self) -> bool;
}

impl EnvironmentClassifier for EnvironmentConfig {
	fn is_production(&self) -> bool {
		EnvironmentConfig::is_production(self)
	}
}

/// A classifier with a fixed answer.
#[derive(Debug, Clone, Copy)]
pub struct FixedEnvironment {
	pub production: bool,
}

impl FixedEnvironment {
	pub fn development() -> Self {
		Self { production: false }
	}
}

impl EnvironmentClassifier for FixedEnvironment {
	fn is_production(&self) -> bool {
		self.production
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Operator credentials for the seed trigger surface.
//!
//! Tokens are secrets and only come from the environment
//! (`FINDMYDOC_SERVER_OPERATOR_TOKENS` or `FINDMYDOC_SERVER_OPERATOR_TOKENS_FILE`),
//! so this section has no TOML layer.

use findmydoc_common_secret::SecretString;

#[derive(Debug, Clone, Default)]
pub struct OperatorConfig {
	pub tokens: Vec<SecretString>,
}

impl OperatorConfig {
	pub fn new(tokens: Vec<SecretString>) -> Self {
		Self { tokens }
	}

	pub fn is_configured(&self) -> bool {
		!self.tokens.is_empty()
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared HTTP client construction for findmydoc.
//!
//! Every outbound client is built from [`builder`] so requests carry a
//! consistent User-Agent header.

use std::time::Duration;

use reqwest::{Client, ClientBuilder};

/// Returns the standard findmydoc User-Agent string.
///
/// Format: `findmydoc/{crate_version}`
pub fn user_agent() -> String {
	format!("findmydoc/{}", env!("CARGO_PKG_VERSION"))
}

/// Creates a client builder with the standard User-Agent header.
///
/// # Example
/// ```ignore
/// let client = findmydoc_common_http::builder()
///     .timeout(Duration::from_secs(10))
///     .build()?;
/// ```
pub fn builder() -> ClientBuilder {
	Client::builder().user_agent(user_agent())
}

/// Creates a client with the standard User-Agent and a request timeout.
pub fn client_with_timeout(timeout: Duration) -> reqwest::Result<Client> {
	builder().timeout(timeout).build()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn user_agent_names_product_and_version() {
		let ua = user_agent();
		let parts: Vec<&str> = ua.split('/').collect();
		assert_eq!(parts.len(), 2);
		assert_eq!(parts[0], "findmydoc");
		assert!(!parts[1].is_empty());
	}

	#[test]
	fn client_with_timeout_builds() {
		assert!(client_with_timeout(Duration::from_secs(5)).is_ok());
	}
}

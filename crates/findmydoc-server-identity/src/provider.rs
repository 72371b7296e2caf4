// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The external identity provider seam.

use async_trait::async_trait;
use findmydoc_common_secret::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// Account id issued by the external identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderAccountId(String);

impl ProviderAccountId {
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl std::fmt::Display for ProviderAccountId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.0)
	}
}

/// Account to provision for a new identity.
#[derive(Debug, Clone)]
pub struct NewAccount {
	pub email: String,
	/// Present for admin-created accounts; invitations have none.
	pub password: Option<SecretString>,
	pub user_type: String,
	pub first_name: Option<String>,
	pub last_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderAccount {
	pub id: ProviderAccountId,
	pub email: Option<String>,
	pub user_type: Option<String>,
}

/// Admin-level operations against the external identity provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
	/// Creates a confirmed account with a password.
	async fn create_account(&self, account: &NewAccount) -> Result<ProviderAccountId, ProviderError>;

	/// Invites an account by email; the user sets a password later.
	async fn invite_account(&self, account: &NewAccount) -> Result<ProviderAccountId, ProviderError>;

	/// Returns `ProviderError::NotFound` if the account is already gone.
	async fn delete_account(&self, id: &ProviderAccountId) -> Result<(), ProviderError>;

	async fn get_account(
		&self,
		id: &ProviderAccountId,
	) -> Result<Option<ProviderAccount>, ProviderError>;
}

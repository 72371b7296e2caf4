// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-process identity provider double for tests across the server crates.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::provider::{IdentityProvider, NewAccount, ProviderAccount, ProviderAccountId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
	Create(String),
	Invite(String),
	Delete(ProviderAccountId),
	Get(ProviderAccountId),
}

#[derive(Default)]
struct State {
	accounts: HashMap<ProviderAccountId, ProviderAccount>,
	calls: Vec<ProviderCall>,
	next_id: u64,
	fail_creates: bool,
	fail_deletes: bool,
}

/// Keeps accounts in memory and records every call.
#[derive(Default)]
pub struct RecordingIdentityProvider {
	state: Mutex<State>,
}

impl RecordingIdentityProvider {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers an account as if it had been created out of band.
	pub fn with_account(self, id: &str, user_type: &str) -> Self {
		let account = ProviderAccount {
			id: ProviderAccountId::new(id),
			email: None,
			user_type: Some(user_type.to_string()),
		};
		self.state
			.lock()
			.unwrap()
			.accounts
			.insert(account.id.clone(), account);
		self
	}

	pub fn fail_creates(&self) {
		self.state.lock().unwrap().fail_creates = true;
	}

	pub fn fail_deletes(&self) {
		self.state.lock().unwrap().fail_deletes = true;
	}

	pub fn calls(&self) -> Vec<ProviderCall> {
		self.state.lock().unwrap().calls.clone()
	}

	pub fn delete_attempts(&self) -> usize {
		self.calls()
			.iter()
			.filter(|c| matches!(c, ProviderCall::Delete(_)))
			.count()
	}

	pub fn provisioning_calls(&self) -> usize {
		self.calls()
			.iter()
			.filter(|c| matches!(c, ProviderCall::Create(_) | ProviderCall::Invite(_)))
			.count()
	}

	pub fn has_account(&self, id: &str) -> bool {
		self.state
			.lock()
			.unwrap()
			.accounts
			.contains_key(&ProviderAccountId::new(id))
	}

	pub fn account_count(&self) -> usize {
		self.state.lock().unwrap().accounts.len()
	}

	fn provision(&self, call: ProviderCall, account: &NewAccount) -> Result<ProviderAccountId, ProviderError> {
		let mut state = self.state.lock().unwrap();
		state.calls.push(call);
		if state.fail_creates {
			return Err(ProviderError::Rejected {
				status: 500,
				message: "provider unavailable".to_string(),
			});
		}
		state.next_id += 1;
		let id = ProviderAccountId::new(format!("acct-{}", state.next_id));
		state.accounts.insert(
			id.clone(),
			ProviderAccount {
				id: id.clone(),
				email: Some(account.email.clone()),
				user_type: Some(account.user_type.clone()),
			},
		);
		Ok(id)
	}
}

#[async_trait]
impl IdentityProvider for RecordingIdentityProvider {
	async fn create_account(&self, account: &NewAccount) -> Result<ProviderAccountId, ProviderError> {
		self.provision(ProviderCall::Create(account.email.clone()), account)
	}

	async fn invite_account(&self, account: &NewAccount) -> Result<ProviderAccountId, ProviderError> {
		self.provision(ProviderCall::Invite(account.email.clone()), account)
	}

	async fn delete_account(&self, id: &ProviderAccountId) -> Result<(), ProviderError> {
		let mut state = self.state.lock().unwrap();
		state.calls.push(ProviderCall::Delete(id.clone()));
		if state.fail_deletes {
			return Err(ProviderError::Rejected {
				status: 500,
				message: "provider unavailable".to_string(),
			});
		}
		match state.accounts.remove(id) {
			Some(_) => Ok(()),
			None => Err(ProviderError::NotFound),
		}
	}

	async fn get_account(
		&self,
		id: &ProviderAccountId,
	) -> Result<Option<ProviderAccount>, ProviderError> {
		let mut state = self.state.lock().unwrap();
		state.calls.push(ProviderCall::Get(id.clone()));
		Ok(state.accounts.get(id).cloned())
	}
}

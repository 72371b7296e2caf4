// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identity lifecycle coordination.
//!
//! [`LifecycleStore`] decorates a [`RecordStore`] and keeps three things in
//! step: the identity row (`basicUsers` or `patients`), the external
//! provider account, and the staff role profile (`clinicStaff` or
//! `platformStaff`). Other collections pass through untouched.
//!
//! Creation provisions the provider account before the row commits.
//! Deletion runs in reverse and is best-effort. Every side-effect deletion
//! carries a non-`None` [`CascadeContext`], and handlers exit early on it,
//! so a profile deletion produces exactly one identity deletion and one
//! provider delete.

use std::sync::Arc;

use async_trait::async_trait;
use findmydoc_common_secret::SecretString;
use findmydoc_server_db::{
	CascadeContext, Collection, DbError, Document, Fields, FindQuery, OperationContext, Page,
	RecordId, RecordStore,
};
use serde_json::{json, Value};
use tracing::{debug, error, info, instrument, warn};

use crate::error::{IdentityError, ProviderError, Result};
use crate::profile::{
	apply_profile_defaults, default_profile, UserType, EMAIL_FIELD, FIRST_NAME_FIELD,
	LAST_NAME_FIELD, PASSWORD_FIELD, PROFILE_COLLECTIONS, PROVIDER_ACCOUNT_FIELD, USER_FIELD,
	USER_TYPE_FIELD,
};
use crate::provider::{IdentityProvider, NewAccount, ProviderAccountId};

const CASCADE_PAGE_SIZE: u32 = 100;

/// Link state of one identity, for operators and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsistencyReport {
	pub provider_account_id: Option<ProviderAccountId>,
	pub provider_account_present: bool,
	pub profile_count: u64,
}

impl ConsistencyReport {
	/// True when the row, its provider account and its profiles agree.
	pub fn is_consistent(&self, user_type: UserType) -> bool {
		let expected_profiles = u64::from(user_type.profile_collection().is_some());
		self.provider_account_present && self.profile_count == expected_profiles
	}
}

#[derive(Clone)]
pub struct LifecycleStore {
	inner: Arc<dyn RecordStore>,
	provider: Arc<dyn IdentityProvider>,
}

fn provider_account_of(data: &Fields) -> Option<ProviderAccountId> {
	data.get(PROVIDER_ACCOUNT_FIELD)
		.and_then(Value::as_str)
		.filter(|s| !s.is_empty())
		.map(ProviderAccountId::new)
}

fn optional_string(data: &Fields, field: &str) -> Option<String> {
	data.get(field)
		.and_then(Value::as_str)
		.filter(|s| !s.is_empty())
		.map(str::to_string)
}

fn take_password(data: &mut Fields) -> Option<SecretString> {
	data.remove(PASSWORD_FIELD)
		.and_then(|v| v.as_str().filter(|s| !s.is_empty()).map(SecretString::from))
}

impl LifecycleStore {
	pub fn new(inner: Arc<dyn RecordStore>, provider: Arc<dyn IdentityProvider>) -> Self {
		Self { inner, provider }
	}

	/// Creates an identity row, provisioning its provider account first
	/// when the row does not already carry one.
	#[instrument(skip(self, data, ctx), fields(%collection))]
	pub async fn create_identity(
		&self,
		collection: Collection,
		mut data: Fields,
		ctx: &OperationContext,
	) -> Result<Document> {
		let password = take_password(&mut data);
		let user_type = UserType::for_identity(collection, &data)?;

		let provisioned = match provider_account_of(&data) {
			Some(existing) => {
				debug!(account_id = %existing, "identity already linked to provider account");
				None
			}
			None => {
				let account = NewAccount {
					email: optional_string(&data, EMAIL_FIELD).ok_or(IdentityError::MissingField {
						collection,
						field: EMAIL_FIELD,
					})?,
					password,
					user_type: user_type.as_str().to_string(),
					first_name: optional_string(&data, FIRST_NAME_FIELD),
					last_name: optional_string(&data, LAST_NAME_FIELD),
				};
				let id = if account.password.is_some() {
					self.provider.create_account(&account).await?
				} else {
					self.provider.invite_account(&account).await?
				};
				info!(%collection, account_id = %id, user_type = %user_type, "provider account provisioned");
				data.insert(PROVIDER_ACCOUNT_FIELD.to_string(), json!(id.as_str()));
				Some(id)
			}
		};

		let identity = match self.inner.create(collection, data, ctx).await {
			Ok(doc) => doc,
			Err(e) => {
				if let Some(account_id) = provisioned {
					self.compensate_provider_account(&account_id).await;
				}
				return Err(e.into());
			}
		};

		if user_type.profile_collection().is_some() && !ctx.skip_profile_provisioning {
			if let Err(e) = self.ensure_profile(collection, &identity, ctx).await {
				error!(
					%collection,
					id = %identity.id,
					error = %e,
					"failed to provision staff profile; retry with ensure_profile"
				);
			}
		}

		Ok(identity)
	}

	/// Makes sure a staff identity has its role profile. Idempotent.
	///
	/// Returns `None` for identities without a profile collection.
	#[instrument(skip(self, identity, ctx), fields(%collection, id = %identity.id))]
	pub async fn ensure_profile(
		&self,
		collection: Collection,
		identity: &Document,
		ctx: &OperationContext,
	) -> Result<Option<Document>> {
		let user_type = UserType::for_identity(collection, &identity.data)?;
		let Some(profile_collection) = user_type.profile_collection() else {
			return Ok(None);
		};

		if let Some(existing) = self
			.inner
			.find_one(profile_collection, USER_FIELD, identity.id.clone().into_value())
			.await?
		{
			debug!(profile = %existing.id, "staff profile already present");
			return Ok(Some(existing));
		}

		let profile = default_profile(user_type, &identity.id, &identity.data);
		let created = self.inner.create(profile_collection, profile, ctx).await?;
		info!(
			collection = %profile_collection,
			profile = %created.id,
			user = %identity.id,
			"staff profile provisioned"
		);
		Ok(Some(created))
	}

	/// Creates a profile row. Without a `user` relation the identity is
	/// created first from the row's transient credentials.
	#[instrument(skip(self, data, ctx), fields(%collection))]
	async fn create_profile(
		&self,
		collection: Collection,
		mut data: Fields,
		ctx: &OperationContext,
	) -> Result<Document> {
		let has_user = data.get(USER_FIELD).is_some_and(|v| !v.is_null());
		let Some(user_type) = UserType::for_profile_collection(collection) else {
			return Ok(self.inner.create(collection, data, ctx).await?);
		};
		if has_user {
			data.remove(PASSWORD_FIELD);
			if let Some(user) = data.get(USER_FIELD).cloned() {
				if let Some(existing) = self.inner.find_one(collection, USER_FIELD, user.clone()).await? {
					warn!(profile = %existing.id, %user, "user already has a profile");
					return Err(IdentityError::Database(DbError::Conflict(format!(
						"{collection} profile already exists for user {user}"
					))));
				}
			}
			return Ok(self.inner.create(collection, data, ctx).await?);
		}

		let mut identity = Fields::new();
		for field in [EMAIL_FIELD, FIRST_NAME_FIELD, LAST_NAME_FIELD] {
			if let Some(value) = data.get(field) {
				identity.insert(field.to_string(), value.clone());
			}
		}
		if let Some(password) = data.remove(PASSWORD_FIELD) {
			identity.insert(PASSWORD_FIELD.to_string(), password);
		}
		identity.insert(USER_TYPE_FIELD.to_string(), json!(user_type.as_str()));
		if !identity.contains_key(EMAIL_FIELD) {
			return Err(IdentityError::MissingField {
				collection,
				field: EMAIL_FIELD,
			});
		}

		let user = self
			.create_identity(
				Collection::BasicUsers,
				identity,
				&ctx.without_profile_provisioning(),
			)
			.await?;

		data.insert(USER_FIELD.to_string(), user.id.clone().into_value());
		apply_profile_defaults(user_type, &mut data);

		match self.inner.create(collection, data, ctx).await {
			Ok(profile) => Ok(profile),
			Err(e) => {
				warn!(user = %user.id, error = %e, "profile commit failed; removing new identity");
				let undo = ctx.with_cascade(CascadeContext::CascadingFromProfile);
				if let Err(undo_err) = self
					.delete_identity(Collection::BasicUsers, &user.id, &undo)
					.await
				{
					warn!(user = %user.id, error = %undo_err, "failed to remove orphaned identity");
				}
				Err(e.into())
			}
		}
	}

	async fn compensate_provider_account(&self, account_id: &ProviderAccountId) {
		match self.provider.delete_account(account_id).await {
			Ok(()) | Err(ProviderError::NotFound) => {
				info!(%account_id, "removed provider account after failed commit");
			}
			Err(e) => {
				warn!(%account_id, error = %e, "failed to remove provider account after failed commit");
			}
		}
	}

	/// Deletes an identity row, its dependent profiles and its provider
	/// account.
	#[instrument(skip(self, ctx), fields(%collection, %id, cascade = ctx.cascade.as_str()))]
	pub async fn delete_identity(
		&self,
		collection: Collection,
		id: &RecordId,
		ctx: &OperationContext,
	) -> Result<bool> {
		let Some(identity) = self.inner.find_by_id(collection, id).await? else {
			debug!("identity already gone");
			return Ok(false);
		};

		if ctx.cascade != CascadeContext::CascadingFromProfile && collection == Collection::BasicUsers {
			let cascade = ctx.with_cascade(CascadeContext::CascadingFromIdentity);
			for profile_collection in PROFILE_COLLECTIONS {
				self.delete_profiles_of(profile_collection, id, &cascade).await?;
			}
		}

		match provider_account_of(&identity.data) {
			Some(account_id) => match self.provider.delete_account(&account_id).await {
				Ok(()) => debug!(%account_id, "provider account deleted"),
				Err(ProviderError::NotFound) => {
					info!(%account_id, "provider account already absent");
				}
				Err(e) => {
					error!(%account_id, error = %e, "provider account deletion failed");
					return Err(e.into());
				}
			},
			None => warn!("identity has no provider account id; skipping provider deletion"),
		}

		Ok(self.inner.delete(collection, id, ctx).await?)
	}

	async fn delete_profiles_of(
		&self,
		profile_collection: Collection,
		user: &RecordId,
		ctx: &OperationContext,
	) -> Result<()> {
		let query = FindQuery::where_equals(USER_FIELD, user.clone().into_value()).limit(CASCADE_PAGE_SIZE);
		loop {
			let page = self.inner.find(profile_collection, &query).await?;
			if page.docs.is_empty() {
				return Ok(());
			}
			let mut deleted = 0usize;
			for profile in &page.docs {
				if Box::pin(self.delete_profile(profile_collection, &profile.id, ctx)).await? {
					deleted += 1;
				}
			}
			debug!(collection = %profile_collection, deleted, "removed dependent profiles");
			if deleted == 0 {
				return Err(IdentityError::Database(DbError::Internal(format!(
					"{profile_collection} profiles of {user} could not be removed"
				))));
			}
		}
	}

	/// Deletes a staff profile. Outside a cascade the linked identity goes
	/// first.
	#[instrument(skip(self, ctx), fields(%collection, %id, cascade = ctx.cascade.as_str()))]
	pub async fn delete_profile(
		&self,
		collection: Collection,
		id: &RecordId,
		ctx: &OperationContext,
	) -> Result<bool> {
		if ctx.is_cascading() {
			return Ok(self.inner.delete(collection, id, ctx).await?);
		}

		let Some(profile) = self.inner.find_by_id(collection, id).await? else {
			return Ok(false);
		};

		match profile.get_str(USER_FIELD) {
			Some(user) => {
				let cascade = ctx.with_cascade(CascadeContext::CascadingFromProfile);
				Box::pin(self.delete_identity(Collection::BasicUsers, &RecordId::new(user), &cascade))
					.await?;
			}
			None => warn!("profile has no linked identity"),
		}

		Ok(self.inner.delete(collection, id, ctx).await?)
	}

	/// Compares an identity row against the provider and its profiles.
	#[instrument(skip(self), fields(%collection, %id))]
	pub async fn check_consistency(
		&self,
		collection: Collection,
		id: &RecordId,
	) -> Result<ConsistencyReport> {
		let identity = self
			.inner
			.find_by_id(collection, id)
			.await?
			.ok_or_else(|| DbError::NotFound(format!("{collection}/{id}")))?;

		let provider_account_id = provider_account_of(&identity.data);
		let provider_account_present = match &provider_account_id {
			Some(account_id) => self.provider.get_account(account_id).await?.is_some(),
			None => false,
		};

		let mut profile_count = 0;
		if collection == Collection::BasicUsers {
			for profile_collection in PROFILE_COLLECTIONS {
				let page = self
					.inner
					.find(
						profile_collection,
						&FindQuery::where_equals(USER_FIELD, id.clone().into_value()).limit(1),
					)
					.await?;
				profile_count += page.total_docs;
			}
		}

		Ok(ConsistencyReport {
			provider_account_id,
			provider_account_present,
			profile_count,
		})
	}
}

#[async_trait]
impl RecordStore for LifecycleStore {
	async fn find(&self, collection: Collection, query: &FindQuery) -> findmydoc_server_db::Result<Page> {
		self.inner.find(collection, query).await
	}

	async fn find_by_id(
		&self,
		collection: Collection,
		id: &RecordId,
	) -> findmydoc_server_db::Result<Option<Document>> {
		self.inner.find_by_id(collection, id).await
	}

	async fn create(
		&self,
		collection: Collection,
		data: Fields,
		ctx: &OperationContext,
	) -> findmydoc_server_db::Result<Document> {
		if collection.is_identity() {
			return Ok(self.create_identity(collection, data, ctx).await?);
		}
		if collection.is_staff_profile() {
			return Ok(self.create_profile(collection, data, ctx).await?);
		}
		self.inner.create(collection, data, ctx).await
	}

	async fn update(
		&self,
		collection: Collection,
		id: &RecordId,
		mut data: Fields,
		ctx: &OperationContext,
	) -> findmydoc_server_db::Result<Document> {
		if collection.is_identity() {
			data.remove(PASSWORD_FIELD);
			if provider_account_of(&data).is_none() {
				let linked = self
					.inner
					.find_by_id(collection, id)
					.await?
					.and_then(|existing| existing.get(PROVIDER_ACCOUNT_FIELD).cloned());
				if let Some(account) = linked {
					data.insert(PROVIDER_ACCOUNT_FIELD.to_string(), account);
				}
			}
		}
		self.inner.update(collection, id, data, ctx).await
	}

	async fn delete(
		&self,
		collection: Collection,
		id: &RecordId,
		ctx: &OperationContext,
	) -> findmydoc_server_db::Result<bool> {
		if collection.is_identity() {
			return Ok(self.delete_identity(collection, id, ctx).await?);
		}
		if collection.is_staff_profile() {
			return Ok(self.delete_profile(collection, id, ctx).await?);
		}
		self.inner.delete(collection, id, ctx).await
	}

	async fn count(&self, collection: Collection) -> findmydoc_server_db::Result<u64> {
		self.inner.count(collection).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::provider::MockIdentityProvider;
	use crate::testing::{ProviderCall, RecordingIdentityProvider};
	use findmydoc_server_db::testing::{RecordingStore, StoreCall};

	fn fields(value: Value) -> Fields {
		match value {
			Value::Object(map) => map,
			_ => panic!("expected object"),
		}
	}

	async fn setup() -> (LifecycleStore, Arc<RecordingStore>, Arc<RecordingIdentityProvider>) {
		let store = Arc::new(RecordingStore::in_memory().await);
		let provider = Arc::new(RecordingIdentityProvider::new());
		let lifecycle = LifecycleStore::new(store.clone(), provider.clone());
		(lifecycle, store, provider)
	}

	fn clinic_user() -> Fields {
		fields(json!({
			"email": "dr.who@clinic.test",
			"userType": "clinic",
			"firstName": "Jane",
			"lastName": "Smith",
			"password": "correct-horse"
		}))
	}

	#[tokio::test]
	async fn test_clinic_identity_gets_provider_account_and_pending_profile() {
		let (lifecycle, store, provider) = setup().await;
		let ctx = OperationContext::interactive();

		let user = lifecycle
			.create(Collection::BasicUsers, clinic_user(), &ctx)
			.await
			.unwrap();

		assert_eq!(
			provider.calls(),
			vec![ProviderCall::Create("dr.who@clinic.test".to_string())]
		);
		assert_eq!(user.get_str(PROVIDER_ACCOUNT_FIELD), Some("acct-1"));
		assert!(!user.data.contains_key(PASSWORD_FIELD));

		let stored = store
			.find_by_id(Collection::BasicUsers, &user.id)
			.await
			.unwrap()
			.unwrap();
		assert_eq!(stored.get_str(PROVIDER_ACCOUNT_FIELD), Some("acct-1"));
		assert!(!stored.data.contains_key(PASSWORD_FIELD));

		let profile = store
			.find_one(Collection::ClinicStaff, USER_FIELD, user.id.clone().into_value())
			.await
			.unwrap()
			.unwrap();
		assert_eq!(profile.get_str("status"), Some("pending"));
		assert_eq!(store.count(Collection::ClinicStaff).await.unwrap(), 1);
	}

	#[tokio::test]
	async fn test_identity_without_password_is_invited() {
		let (lifecycle, _store, provider) = setup().await;
		let mut data = clinic_user();
		data.remove(PASSWORD_FIELD);

		lifecycle
			.create(Collection::BasicUsers, data, &OperationContext::interactive())
			.await
			.unwrap();

		assert_eq!(
			provider.calls(),
			vec![ProviderCall::Invite("dr.who@clinic.test".to_string())]
		);
	}

	#[tokio::test]
	async fn test_prelinked_identity_skips_provider() {
		let (lifecycle, _store, provider) = setup().await;
		let data = fields(json!({
			"email": "pat@example.test",
			"providerAccountId": "seed-provider-pat"
		}));

		let patient = lifecycle
			.create(Collection::Patients, data, &OperationContext::seeding())
			.await
			.unwrap();

		assert!(provider.calls().is_empty());
		assert_eq!(patient.get_str(PROVIDER_ACCOUNT_FIELD), Some("seed-provider-pat"));
	}

	#[tokio::test]
	async fn test_provider_failure_aborts_commit() {
		let store = Arc::new(RecordingStore::in_memory().await);
		let mut provider = MockIdentityProvider::new();
		provider.expect_create_account().times(1).returning(|_| {
			Err(ProviderError::Rejected {
				status: 422,
				message: "email taken".to_string(),
			})
		});
		provider.expect_delete_account().never();
		let lifecycle = LifecycleStore::new(store.clone(), Arc::new(provider));

		let err = lifecycle
			.create(Collection::BasicUsers, clinic_user(), &OperationContext::interactive())
			.await
			.unwrap_err();

		assert!(err.to_string().contains("email taken"));
		assert_eq!(store.count(Collection::BasicUsers).await.unwrap(), 0);
		assert_eq!(store.count(Collection::ClinicStaff).await.unwrap(), 0);
	}

	#[tokio::test]
	async fn test_commit_failure_removes_provider_account() {
		let (lifecycle, store, provider) = setup().await;
		store.fail_creates_for(Collection::BasicUsers);

		let result = lifecycle
			.create(Collection::BasicUsers, clinic_user(), &OperationContext::interactive())
			.await;

		assert!(result.is_err());
		assert_eq!(provider.delete_attempts(), 1);
		assert_eq!(provider.account_count(), 0);
	}

	#[tokio::test]
	async fn test_profile_failure_keeps_identity_and_can_be_retried() {
		let (lifecycle, store, _provider) = setup().await;
		store.fail_creates_for(Collection::ClinicStaff);
		let ctx = OperationContext::interactive();

		let user = lifecycle
			.create(Collection::BasicUsers, clinic_user(), &ctx)
			.await
			.unwrap();
		assert_eq!(store.count(Collection::BasicUsers).await.unwrap(), 1);
		assert_eq!(store.count(Collection::ClinicStaff).await.unwrap(), 0);

		store.allow_creates_for(Collection::ClinicStaff);
		let profile = lifecycle
			.ensure_profile(Collection::BasicUsers, &user, &ctx)
			.await
			.unwrap()
			.unwrap();
		assert_eq!(profile.get_str("status"), Some("pending"));

		let again = lifecycle
			.ensure_profile(Collection::BasicUsers, &user, &ctx)
			.await
			.unwrap()
			.unwrap();
		assert_eq!(again.id, profile.id);
	}

	#[tokio::test]
	async fn test_staff_first_creation_creates_one_profile() {
		let (lifecycle, store, provider) = setup().await;
		let data = fields(json!({
			"email": "ops@findmydoc.test",
			"firstName": "Olga",
			"lastName": "Ops",
			"password": "s3cret-pass"
		}));

		let profile = lifecycle
			.create(Collection::PlatformStaff, data, &OperationContext::interactive())
			.await
			.unwrap();

		assert_eq!(provider.provisioning_calls(), 1);
		assert_eq!(store.count(Collection::PlatformStaff).await.unwrap(), 1);
		assert_eq!(store.count(Collection::BasicUsers).await.unwrap(), 1);
		assert_eq!(profile.get_str("role"), Some("user"));
		assert!(!profile.data.contains_key(PASSWORD_FIELD));

		let user_id = RecordId::new(profile.get_str(USER_FIELD).unwrap());
		let user = store
			.find_by_id(Collection::BasicUsers, &user_id)
			.await
			.unwrap()
			.unwrap();
		assert_eq!(user.get_str(USER_TYPE_FIELD), Some("platform"));
	}

	#[tokio::test]
	async fn test_second_profile_for_same_user_is_rejected() {
		let (lifecycle, store, _provider) = setup().await;
		let ctx = OperationContext::interactive();

		let user = lifecycle
			.create(Collection::BasicUsers, clinic_user(), &ctx)
			.await
			.unwrap();
		assert_eq!(store.count(Collection::ClinicStaff).await.unwrap(), 1);

		let duplicate = fields(json!({ "user": user.id.to_string(), "status": "approved" }));
		let err = lifecycle
			.create(Collection::ClinicStaff, duplicate, &ctx)
			.await
			.unwrap_err();

		assert!(matches!(err, DbError::Conflict(_)), "unexpected error: {err}");
		assert_eq!(store.count(Collection::ClinicStaff).await.unwrap(), 1);
	}

	#[tokio::test]
	async fn test_deleting_profile_cascades_exactly_once() {
		let (lifecycle, store, provider) = setup().await;
		let ctx = OperationContext::interactive();
		let user = lifecycle
			.create(Collection::BasicUsers, clinic_user(), &ctx)
			.await
			.unwrap();
		let profile = store
			.find_one(Collection::ClinicStaff, USER_FIELD, user.id.clone().into_value())
			.await
			.unwrap()
			.unwrap();
		store.clear();

		let deleted = lifecycle
			.delete(Collection::ClinicStaff, &profile.id, &ctx)
			.await
			.unwrap();

		assert!(deleted);
		assert_eq!(provider.delete_attempts(), 1);
		assert_eq!(
			store.deletes(),
			vec![
				(
					Collection::BasicUsers,
					user.id.clone(),
					CascadeContext::CascadingFromProfile
				),
				(Collection::ClinicStaff, profile.id.clone(), CascadeContext::None),
			]
		);
		assert_eq!(store.count(Collection::BasicUsers).await.unwrap(), 0);
		assert_eq!(store.count(Collection::ClinicStaff).await.unwrap(), 0);
	}

	#[tokio::test]
	async fn test_deleting_profile_whose_account_is_gone_succeeds() {
		let (lifecycle, store, provider) = setup().await;
		let ctx = OperationContext::interactive();
		let user = lifecycle
			.create(
				Collection::BasicUsers,
				fields(json!({
					"email": "gone@clinic.test",
					"userType": "clinic",
					"providerAccountId": "acct-deleted-elsewhere"
				})),
				&ctx,
			)
			.await
			.unwrap();
		let profile = store
			.find_one(Collection::ClinicStaff, USER_FIELD, user.id.clone().into_value())
			.await
			.unwrap()
			.unwrap();

		assert!(lifecycle
			.delete(Collection::ClinicStaff, &profile.id, &ctx)
			.await
			.unwrap());
		assert_eq!(provider.delete_attempts(), 1);
		assert_eq!(store.count(Collection::BasicUsers).await.unwrap(), 0);
	}

	#[tokio::test]
	async fn test_deleting_identity_removes_profiles_first() {
		let (lifecycle, store, provider) = setup().await;
		let ctx = OperationContext::interactive();
		let user = lifecycle
			.create(Collection::BasicUsers, clinic_user(), &ctx)
			.await
			.unwrap();
		store.clear();

		assert!(lifecycle
			.delete(Collection::BasicUsers, &user.id, &ctx)
			.await
			.unwrap());

		assert_eq!(
			store.deletion_order(),
			vec![Collection::ClinicStaff, Collection::BasicUsers]
		);
		let deletes = store.deletes();
		assert_eq!(deletes[0].2, CascadeContext::CascadingFromIdentity);
		assert_eq!(provider.delete_attempts(), 1);
		assert!(!provider.has_account("acct-1"));
	}

	#[tokio::test]
	async fn test_provider_delete_failure_keeps_identity_row() {
		let (lifecycle, store, provider) = setup().await;
		let ctx = OperationContext::interactive();
		let patient = lifecycle
			.create(
				Collection::Patients,
				fields(json!({"email": "p@example.test", "password": "pw-123456"})),
				&ctx,
			)
			.await
			.unwrap();
		provider.fail_deletes();

		let result = lifecycle.delete(Collection::Patients, &patient.id, &ctx).await;

		assert!(result.is_err());
		assert_eq!(store.count(Collection::Patients).await.unwrap(), 1);
	}

	#[tokio::test]
	async fn test_identity_without_account_skips_provider_on_delete() {
		let (lifecycle, store, provider) = setup().await;
		let ctx = OperationContext::seeding();
		let row = store
			.create(
				Collection::Patients,
				fields(json!({"email": "legacy@example.test"})),
				&ctx,
			)
			.await
			.unwrap();

		assert!(lifecycle.delete(Collection::Patients, &row.id, &ctx).await.unwrap());
		assert_eq!(provider.delete_attempts(), 0);
	}

	#[tokio::test]
	async fn test_update_strips_password_and_keeps_account_link() {
		let (lifecycle, _store, _provider) = setup().await;
		let ctx = OperationContext::interactive();
		let user = lifecycle
			.create(Collection::BasicUsers, clinic_user(), &ctx)
			.await
			.unwrap();

		let updated = lifecycle
			.update(
				Collection::BasicUsers,
				&user.id,
				fields(json!({
					"email": "dr.who@clinic.test",
					"userType": "clinic",
					"password": "new-password"
				})),
				&ctx,
			)
			.await
			.unwrap();

		assert!(!updated.data.contains_key(PASSWORD_FIELD));
		assert_eq!(updated.get_str(PROVIDER_ACCOUNT_FIELD), Some("acct-1"));
	}

	#[tokio::test]
	async fn test_other_collections_pass_through() {
		let (lifecycle, store, provider) = setup().await;
		let ctx = OperationContext::interactive();
		let country = lifecycle
			.create(
				Collection::Countries,
				fields(json!({"stableId": "country-de", "name": "Germany"})),
				&ctx,
			)
			.await
			.unwrap();
		assert!(lifecycle
			.delete(Collection::Countries, &country.id, &ctx)
			.await
			.unwrap());

		assert!(provider.calls().is_empty());
		assert_eq!(
			store.calls(),
			vec![
				StoreCall::Create(Collection::Countries),
				StoreCall::Delete(Collection::Countries, country.id, CascadeContext::None),
			]
		);
	}

	#[tokio::test]
	async fn test_consistency_report() {
		let (lifecycle, _store, provider) = setup().await;
		let ctx = OperationContext::interactive();
		let user = lifecycle
			.create(Collection::BasicUsers, clinic_user(), &ctx)
			.await
			.unwrap();

		let report = lifecycle
			.check_consistency(Collection::BasicUsers, &user.id)
			.await
			.unwrap();
		assert!(report.provider_account_present);
		assert_eq!(report.profile_count, 1);
		assert!(report.is_consistent(UserType::Clinic));

		provider
			.delete_account(&ProviderAccountId::new("acct-1"))
			.await
			.unwrap();
		let report = lifecycle
			.check_consistency(Collection::BasicUsers, &user.id)
			.await
			.unwrap();
		assert!(!report.provider_account_present);
		assert!(!report.is_consistent(UserType::Clinic));
	}
}

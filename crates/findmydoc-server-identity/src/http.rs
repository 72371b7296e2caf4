// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! GoTrue-style admin REST client for the external identity provider.

use std::time::Duration;

use async_trait::async_trait;
use findmydoc_common_secret::SecretString;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error, instrument};

use crate::error::ProviderError;
use crate::provider::{IdentityProvider, NewAccount, ProviderAccount, ProviderAccountId};

#[derive(Clone)]
pub struct HttpIdentityProvider {
	http_client: Client,
	base_url: String,
	service_key: SecretString,
}

#[derive(Debug, Serialize)]
struct UserMetadata<'a> {
	#[serde(skip_serializing_if = "Option::is_none")]
	first_name: Option<&'a str>,
	#[serde(skip_serializing_if = "Option::is_none")]
	last_name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct CreateUserRequest<'a> {
	email: &'a str,
	password: &'a str,
	email_confirm: bool,
	user_metadata: UserMetadata<'a>,
	app_metadata: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct InviteRequest<'a> {
	email: &'a str,
	data: UserMetadata<'a>,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
	id: String,
	email: Option<String>,
	#[serde(default)]
	app_metadata: serde_json::Map<String, serde_json::Value>,
}

impl From<UserResponse> for ProviderAccount {
	fn from(user: UserResponse) -> Self {
		ProviderAccount {
			id: ProviderAccountId::new(user.id),
			email: user.email,
			user_type: user
				.app_metadata
				.get("user_type")
				.and_then(|v| v.as_str())
				.map(str::to_string),
		}
	}
}

impl HttpIdentityProvider {
	pub fn new(
		base_url: impl Into<String>,
		service_key: SecretString,
		timeout: Duration,
	) -> Result<Self, ProviderError> {
		let http_client = findmydoc_common_http::client_with_timeout(timeout)?;
		Ok(Self {
			http_client,
			base_url: base_url.into().trim_end_matches('/').to_string(),
			service_key,
		})
	}

	fn url(&self, path: &str) -> String {
		format!("{}/auth/v1{path}", self.base_url)
	}

	fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
		let key = self.service_key.expose();
		builder.header("apikey", key).bearer_auth(key)
	}

	async fn send(&self, builder: reqwest::RequestBuilder) -> Result<Response, ProviderError> {
		let response = self.authorized(builder).send().await.map_err(|e| {
			if e.is_timeout() {
				error!("identity provider request timed out");
				return ProviderError::Timeout;
			}
			error!(error = %e, "network error during identity provider request");
			ProviderError::Network(e)
		})?;

		let status = response.status();
		debug!(status = %status, "identity provider responded");
		if status.is_success() {
			return Ok(response);
		}

		let body = response.text().await.unwrap_or_default();
		if status == StatusCode::NOT_FOUND || body.to_lowercase().contains("user not found") {
			return Err(ProviderError::NotFound);
		}

		error!(status = status.as_u16(), body = %body, "identity provider rejected request");
		Err(ProviderError::Rejected {
			status: status.as_u16(),
			message: body,
		})
	}

	async fn parse_user(response: Response) -> Result<UserResponse, ProviderError> {
		let body = response.text().await?;
		serde_json::from_str(&body).map_err(|e| {
			error!(error = %e, "failed to parse identity provider user");
			ProviderError::InvalidResponse(format!("JSON parse error: {e}"))
		})
	}

	async fn set_user_type(
		&self,
		id: &ProviderAccountId,
		user_type: &str,
	) -> Result<(), ProviderError> {
		let path = format!("/admin/users/{id}");
		self.send(
			self.http_client
				.put(self.url(&path))
				.json(&json!({ "app_metadata": { "user_type": user_type } })),
		)
		.await?;
		Ok(())
	}
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
	#[instrument(skip(self, account), fields(user_type = %account.user_type))]
	async fn create_account(&self, account: &NewAccount) -> Result<ProviderAccountId, ProviderError> {
		let Some(password) = &account.password else {
			return Err(ProviderError::InvalidRequest(
				"password is required to create an account".to_string(),
			));
		};

		let request = CreateUserRequest {
			email: &account.email,
			password: password.expose(),
			email_confirm: true,
			user_metadata: UserMetadata {
				first_name: account.first_name.as_deref(),
				last_name: account.last_name.as_deref(),
			},
			app_metadata: json!({ "user_type": account.user_type }),
		};

		let response = self
			.send(self.http_client.post(self.url("/admin/users")).json(&request))
			.await?;
		let user = Self::parse_user(response).await?;
		debug!(account_id = %user.id, "provider account created");
		Ok(ProviderAccountId::new(user.id))
	}

	#[instrument(skip(self, account), fields(user_type = %account.user_type))]
	async fn invite_account(&self, account: &NewAccount) -> Result<ProviderAccountId, ProviderError> {
		let request = InviteRequest {
			email: &account.email,
			data: UserMetadata {
				first_name: account.first_name.as_deref(),
				last_name: account.last_name.as_deref(),
			},
		};

		let response = self
			.send(self.http_client.post(self.url("/invite")).json(&request))
			.await?;
		let user = Self::parse_user(response).await?;
		let id = ProviderAccountId::new(user.id);

		self.set_user_type(&id, &account.user_type).await?;
		debug!(account_id = %id, "provider account invited");
		Ok(id)
	}

	#[instrument(skip(self), fields(account_id = %id))]
	async fn delete_account(&self, id: &ProviderAccountId) -> Result<(), ProviderError> {
		let path = format!("/admin/users/{id}");
		self.send(self.http_client.delete(self.url(&path))).await?;
		Ok(())
	}

	#[instrument(skip(self), fields(account_id = %id))]
	async fn get_account(
		&self,
		id: &ProviderAccountId,
	) -> Result<Option<ProviderAccount>, ProviderError> {
		let path = format!("/admin/users/{id}");
		match self.send(self.http_client.get(self.url(&path))).await {
			Ok(response) => Ok(Some(Self::parse_user(response).await?.into())),
			Err(ProviderError::NotFound) => Ok(None),
			Err(e) => Err(e),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use wiremock::matchers::{body_partial_json, header, method, path};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	const KEY: &str = "service-role-key";

	fn provider(server: &MockServer) -> HttpIdentityProvider {
		HttpIdentityProvider::new(
			server.uri(),
			SecretString::from(KEY),
			Duration::from_secs(5),
		)
		.unwrap()
	}

	fn account(password: Option<&str>) -> NewAccount {
		NewAccount {
			email: "staff@clinic.test".to_string(),
			password: password.map(SecretString::from),
			user_type: "clinic".to_string(),
			first_name: Some("Ada".to_string()),
			last_name: None,
		}
	}

	#[tokio::test]
	async fn test_create_account_posts_admin_user() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/auth/v1/admin/users"))
			.and(header("apikey", KEY))
			.and(header("authorization", format!("Bearer {KEY}").as_str()))
			.and(body_partial_json(json!({
				"email": "staff@clinic.test",
				"password": "hunter22",
				"email_confirm": true,
				"app_metadata": {"user_type": "clinic"},
				"user_metadata": {"first_name": "Ada"}
			})))
			.respond_with(ResponseTemplate::new(200).set_body_json(json!({
				"id": "acct-1",
				"email": "staff@clinic.test"
			})))
			.expect(1)
			.mount(&server)
			.await;

		let id = provider(&server)
			.create_account(&account(Some("hunter22")))
			.await
			.unwrap();
		assert_eq!(id.as_str(), "acct-1");
	}

	#[tokio::test]
	async fn test_create_account_requires_password() {
		let server = MockServer::start().await;
		let result = provider(&server).create_account(&account(None)).await;
		assert!(matches!(result, Err(ProviderError::InvalidRequest(_))));
	}

	#[tokio::test]
	async fn test_invite_sets_user_type() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/auth/v1/invite"))
			.respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "acct-2"})))
			.expect(1)
			.mount(&server)
			.await;
		Mock::given(method("PUT"))
			.and(path("/auth/v1/admin/users/acct-2"))
			.and(body_partial_json(json!({"app_metadata": {"user_type": "clinic"}})))
			.respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "acct-2"})))
			.expect(1)
			.mount(&server)
			.await;

		let id = provider(&server).invite_account(&account(None)).await.unwrap();
		assert_eq!(id.as_str(), "acct-2");
	}

	#[tokio::test]
	async fn test_delete_not_found_maps_to_not_found() {
		let server = MockServer::start().await;
		Mock::given(method("DELETE"))
			.and(path("/auth/v1/admin/users/gone"))
			.respond_with(ResponseTemplate::new(404).set_body_string("User not found"))
			.expect(1)
			.mount(&server)
			.await;

		let result = provider(&server)
			.delete_account(&ProviderAccountId::new("gone"))
			.await;
		assert!(matches!(result, Err(ProviderError::NotFound)));
	}

	#[tokio::test]
	async fn test_user_not_found_body_maps_to_not_found() {
		let server = MockServer::start().await;
		Mock::given(method("DELETE"))
			.and(path("/auth/v1/admin/users/gone"))
			.respond_with(
				ResponseTemplate::new(400).set_body_json(json!({"msg": "User not found"})),
			)
			.mount(&server)
			.await;

		let result = provider(&server)
			.delete_account(&ProviderAccountId::new("gone"))
			.await;
		assert!(matches!(result, Err(ProviderError::NotFound)));
	}

	#[tokio::test]
	async fn test_delete_server_error_is_rejected() {
		let server = MockServer::start().await;
		Mock::given(method("DELETE"))
			.and(path("/auth/v1/admin/users/acct-3"))
			.respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
			.mount(&server)
			.await;

		let result = provider(&server)
			.delete_account(&ProviderAccountId::new("acct-3"))
			.await;
		assert!(matches!(
			result,
			Err(ProviderError::Rejected { status: 503, .. })
		));
	}

	#[tokio::test]
	async fn test_get_account() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path("/auth/v1/admin/users/acct-4"))
			.respond_with(ResponseTemplate::new(200).set_body_json(json!({
				"id": "acct-4",
				"email": "p@example.test",
				"app_metadata": {"user_type": "patient"}
			})))
			.mount(&server)
			.await;
		Mock::given(method("GET"))
			.and(path("/auth/v1/admin/users/missing"))
			.respond_with(ResponseTemplate::new(404))
			.mount(&server)
			.await;

		let provider = provider(&server);
		let account = provider
			.get_account(&ProviderAccountId::new("acct-4"))
			.await
			.unwrap()
			.unwrap();
		assert_eq!(account.user_type.as_deref(), Some("patient"));
		assert!(provider
			.get_account(&ProviderAccountId::new("missing"))
			.await
			.unwrap()
			.is_none());
	}

	#[tokio::test]
	async fn test_malformed_body_is_invalid_response() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/auth/v1/invite"))
			.respond_with(ResponseTemplate::new(200).set_body_string("not json"))
			.mount(&server)
			.await;

		let result = provider(&server).invite_account(&account(None)).await;
		assert!(matches!(result, Err(ProviderError::InvalidResponse(_))));
	}
}

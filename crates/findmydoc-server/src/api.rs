// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Router construction and shared handler state.

use std::sync::Arc;

use axum::{
	middleware,
	routing::{get, post},
	Router,
};
use findmydoc_server_config::ServerConfig;
use findmydoc_server_db::{RecordStore, RevalidationLogger, SeedRunRepository, SqliteRecordStore};
use findmydoc_server_identity::{IdentityProvider, LifecycleStore};
use findmydoc_server_seed::{SeedRunner, SqliteRunStore};
use sqlx::SqlitePool;

use crate::{
	auth_middleware::{operator_auth_middleware, OperatorTokens},
	routes,
};

#[derive(Clone)]
pub struct AppState {
	pub runner: Arc<SeedRunner>,
	/// Lifecycle-aware store the runner writes through.
	pub store: Arc<dyn RecordStore>,
	pub operator_tokens: Arc<OperatorTokens>,
	pub environment: String,
}

/// Wires the store stack: SQLite documents with revalidation logging,
/// wrapped by the identity lifecycle coordinator.
pub fn create_app_state(
	pool: SqlitePool,
	provider: Arc<dyn IdentityProvider>,
	config: &ServerConfig,
) -> AppState {
	let documents = SqliteRecordStore::new(pool.clone()).with_listener(Arc::new(RevalidationLogger));
	let store: Arc<dyn RecordStore> = Arc::new(LifecycleStore::new(Arc::new(documents), provider));
	let run_store = Arc::new(SqliteRunStore::new(SeedRunRepository::new(pool)));

	let runner = SeedRunner::new(store.clone(), Arc::new(config.environment.clone()), run_store)
		.with_page_size(config.seed.page_size);

	let operator_tokens = OperatorTokens::from_secrets(&config.operator.tokens);
	if operator_tokens.is_empty() {
		tracing::warn!("no operator tokens configured; /seed will reject every request");
	}

	AppState {
		runner: Arc::new(runner),
		store,
		operator_tokens: Arc::new(operator_tokens),
		environment: config.environment.name.clone(),
	}
}

pub fn create_router(state: AppState) -> Router {
	let operator = Router::new()
		.route(
			"/seed",
			post(routes::seed::run_seed).get(routes::seed::latest_seed),
		)
		.layer(middleware::from_fn_with_state(
			state.operator_tokens.clone(),
			operator_auth_middleware,
		));

	Router::new()
		.route("/health", get(routes::health::health_check))
		.merge(operator)
		.with_state(state)
}

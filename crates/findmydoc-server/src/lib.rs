// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! findmydoc seeding server.
//!
//! This crate exposes the operator-only `/seed` endpoints and the public
//! `/health` probe over the identity-aware record store.

pub mod api;
pub mod auth_middleware;
pub mod error;
pub mod routes;

pub use api::{create_app_state, create_router, AppState};
pub use auth_middleware::OperatorTokens;
pub use error::{ErrorResponse, ServerError};
pub use findmydoc_server_config::ServerConfig;

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! # findmydoc-server-identity
//!
//! Keeps identity rows, external provider accounts and staff role profiles
//! consistent.
//!
//! - [`IdentityProvider`] is the admin seam to the external provider, with
//!   [`HttpIdentityProvider`] speaking its REST API.
//! - [`LifecycleStore`] wraps any [`findmydoc_server_db::RecordStore`] and
//!   runs the creation and deletion flows for `basicUsers`, `patients`,
//!   `clinicStaff` and `platformStaff`.

pub mod error;
pub mod http;
pub mod lifecycle;
pub mod profile;
pub mod provider;
pub mod testing;

pub use error::{IdentityError, ProviderError, Result};
pub use findmydoc_server_db::CascadeContext;
pub use http::HttpIdentityProvider;
pub use lifecycle::{ConsistencyReport, LifecycleStore};
pub use profile::UserType;
pub use provider::{IdentityProvider, NewAccount, ProviderAccount, ProviderAccountId};

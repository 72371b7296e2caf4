// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections.

mod database;
mod environment;
mod http;
mod identity;
mod logging;
mod operator;
mod seed;

pub use database::{DatabaseConfig, DatabaseConfigLayer};
pub use environment::{EnvironmentConfig, EnvironmentConfigLayer};
pub use http::{HttpConfig, HttpConfigLayer};
pub use identity::{IdentityConfig, IdentityConfigLayer};
pub use logging::{LogFormat, LoggingConfig, LoggingConfigLayer};
pub use operator::OperatorConfig;
pub use seed::{SeedConfig, SeedConfigLayer};

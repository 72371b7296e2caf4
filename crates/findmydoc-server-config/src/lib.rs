// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Centralized configuration management for the findmydoc server.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - Type-safe configuration with validation
//! - Consistent environment variable naming (`FINDMYDOC_SERVER_*`)
//!
//! # Usage
//!
//! ```ignore
//! use findmydoc_server_config::load_config;
//!
//! let config = load_config()?;
//! println!("Server listening on {}", config.socket_addr());
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::ServerConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use findmydoc_common_secret::{load_secret_env, load_secret_list_env};
use tracing::{debug, info};

/// Fully resolved server configuration.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
	pub http: HttpConfig,
	pub database: DatabaseConfig,
	pub environment: EnvironmentConfig,
	pub seed: SeedConfig,
	pub identity: IdentityConfig,
	pub operator: OperatorConfig,
	pub logging: LoggingConfig,
}

impl ServerConfig {
	/// Get the socket address string for binding.
	pub fn socket_addr(&self) -> String {
		format!("{}:{}", self.http.host, self.http.port)
	}
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`FINDMYDOC_SERVER_*`)
/// 2. Config file (`/etc/findmydoc/server.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

fn load_from_sources(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<ServerConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = ServerConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		merged.merge(source.load()?);
	}

	let service_key = load_secret_env("FINDMYDOC_SERVER_IDENTITY_SERVICE_KEY")?;
	let operator_tokens = load_secret_list_env("FINDMYDOC_SERVER_OPERATOR_TOKENS")?;

	finalize(merged, service_key, operator_tokens)
}

/// Finalize configuration layer into resolved config.
fn finalize(
	layer: ServerConfigLayer,
	service_key: Option<findmydoc_common_secret::SecretString>,
	operator_tokens: Vec<findmydoc_common_secret::SecretString>,
) -> Result<ServerConfig, ConfigError> {
	let http = layer.http.unwrap_or_default().finalize();
	let database = layer.database.unwrap_or_default().finalize();
	let environment = layer.environment.unwrap_or_default().finalize();
	let seed = layer.seed.unwrap_or_default().finalize();
	let identity = layer.identity.unwrap_or_default().finalize(service_key);
	let logging = layer.logging.unwrap_or_default().finalize();
	let operator = OperatorConfig::new(operator_tokens);

	let config = ServerConfig {
		http,
		database,
		environment,
		seed,
		identity,
		operator,
		logging,
	};

	validate_config(&config)?;

	info!(
		host = %config.http.host,
		port = config.http.port,
		database = %config.database.url,
		environment = %config.environment.name,
		production = config.environment.is_production(),
		identity_base_url = %config.identity.base_url,
		identity_key_configured = config.identity.service_key.is_some(),
		operator_tokens = config.operator.tokens.len(),
		"Server configuration loaded"
	);

	Ok(config)
}

/// Validate cross-field configuration rules.
fn validate_config(config: &ServerConfig) -> Result<(), ConfigError> {
	if config.database.max_connections == 0 {
		return Err(ConfigError::Validation(
			"FINDMYDOC_SERVER_DATABASE_MAX_CONNECTIONS must be greater than zero".to_string(),
		));
	}

	if config.seed.page_size == 0 {
		return Err(ConfigError::Validation(
			"FINDMYDOC_SERVER_SEED_PAGE_SIZE must be greater than zero".to_string(),
		));
	}

	if config.environment.is_production() {
		if config.identity.service_key.is_none() {
			return Err(ConfigError::MissingEnvVar(
				"FINDMYDOC_SERVER_IDENTITY_SERVICE_KEY".to_string(),
			));
		}
		if !config.operator.is_configured() {
			return Err(ConfigError::Validation(
				"FINDMYDOC_SERVER_ENV=production requires at least one operator token in \
				 FINDMYDOC_SERVER_OPERATOR_TOKENS."
					.to_string(),
			));
		}
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use findmydoc_common_secret::SecretString;

	fn production_layer() -> ServerConfigLayer {
		ServerConfigLayer {
			environment: Some(EnvironmentConfigLayer {
				name: Some("production".to_string()),
			}),
			..Default::default()
		}
	}

	#[test]
	fn test_finalize_defaults() {
		let config = finalize(ServerConfigLayer::default(), None, Vec::new()).unwrap();
		assert_eq!(config.socket_addr(), "0.0.0.0:8080");
		assert_eq!(config.seed.page_size, 100);
		assert!(!config.environment.is_production());
		assert!(!config.operator.is_configured());
	}

	#[test]
	fn test_zero_page_size_rejected() {
		let layer = ServerConfigLayer {
			seed: Some(SeedConfigLayer { page_size: Some(0) }),
			..Default::default()
		};
		let result = finalize(layer, None, Vec::new());
		assert!(matches!(result, Err(ConfigError::Validation(_))));
	}

	#[test]
	fn test_production_requires_service_key() {
		let result = finalize(
			production_layer(),
			None,
			vec![SecretString::from("operator")],
		);
		assert!(matches!(result, Err(ConfigError::MissingEnvVar(_))));
	}

	#[test]
	fn test_production_requires_operator_token() {
		let result = finalize(
			production_layer(),
			Some(SecretString::from("service-key")),
			Vec::new(),
		);
		let err = result.unwrap_err();
		assert!(err.to_string().contains("operator token"));
	}

	#[test]
	fn test_production_with_secrets_ok() {
		let config = finalize(
			production_layer(),
			Some(SecretString::from("service-key")),
			vec![SecretString::from("operator")],
		)
		.unwrap();
		assert!(config.environment.is_production());
	}
}

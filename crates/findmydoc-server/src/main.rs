// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! findmydoc seeding server binary.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use findmydoc_common_secret::SecretString;
use findmydoc_server::{create_app_state, create_router};
use findmydoc_server_config::{LogFormat, ServerConfig};
use findmydoc_server_identity::HttpIdentityProvider;
use findmydoc_server_seed::{SeedRequest, SeedType};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// findmydoc server - seeding and identity lifecycle.
#[derive(Parser, Debug)]
#[command(
	name = "findmydoc-server",
	about = "findmydoc seeding server",
	version
)]
struct Args {
	/// Config file to use instead of /etc/findmydoc/server.toml
	#[arg(long, env = "FINDMYDOC_SERVER_CONFIG")]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Run one seed without starting the HTTP server
	Seed {
		/// baseline or demo
		#[arg(long = "type", default_value = "baseline")]
		seed_type: String,

		/// Clear the seeded collections first
		#[arg(long)]
		reset: bool,
	},
}

fn init_tracing(config: &ServerConfig) {
	let filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| config.logging.level.clone().into());
	let registry = tracing_subscriber::registry().with(filter);
	match config.logging.format {
		LogFormat::Json => registry.with(fmt::layer().json()).init(),
		LogFormat::Pretty => registry.with(fmt::layer()).init(),
	}
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let args = Args::parse();

	dotenvy::dotenv().ok();

	let config = match &args.config {
		Some(path) => findmydoc_server_config::load_config_with_file(path)?,
		None => findmydoc_server_config::load_config()?,
	};

	init_tracing(&config);

	tracing::info!(
		host = %config.http.host,
		port = config.http.port,
		database = %config.database.url,
		environment = %config.environment.name,
		"starting findmydoc-server"
	);

	let pool = findmydoc_server_db::create_pool(
		&config.database.url,
		config.database.max_connections,
	)
	.await
	.context("opening database")?;
	findmydoc_server_db::run_migrations(&pool)
		.await
		.context("running migrations")?;

	let service_key = match &config.identity.service_key {
		Some(key) => key.clone(),
		None => {
			tracing::warn!("no identity service key configured; provider calls will be rejected");
			SecretString::new(String::new())
		}
	};
	let provider = HttpIdentityProvider::new(
		config.identity.base_url.clone(),
		service_key,
		Duration::from_secs(config.identity.timeout_secs),
	)
	.context("building identity provider client")?;

	let state = create_app_state(pool, Arc::new(provider), &config);

	if let Some(Command::Seed { seed_type, reset }) = args.command {
		let seed_type: SeedType = seed_type.parse()?;
		let summary = state.runner.run(SeedRequest { seed_type, reset }).await?;
		println!("{}", serde_json::to_string_pretty(&summary)?);
		return Ok(());
	}

	let app = create_router(state).layer(TraceLayer::new_for_http());

	let addr = config.socket_addr();
	tracing::info!("listening on {}", addr);

	let listener = tokio::net::TcpListener::bind(&addr).await?;

	tokio::select! {
		result = axum::serve(listener, app) => {
			if let Err(e) = result {
				tracing::error!(error = %e, "Server error");
			}
		}
		_ = tokio::signal::ctrl_c() => {
			tracing::info!("Received shutdown signal");
		}
	}

	Ok(())
}

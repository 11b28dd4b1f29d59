// SPDX-FileCopyrightText: 2026 WagerGenie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `wagergenie serve`: wires the provider into the gateway and runs until a
//! shutdown signal arrives.

use std::sync::Arc;

use tracing::info;
use wagergenie_config::model::GenieConfig;
use wagergenie_core::GenieError;
use wagergenie_core::traits::{DataProvider, SessionProvider};
use wagergenie_gateway::{GatewayState, start_server};
use wagergenie_supabase::SupabaseProvider;

use crate::shutdown;

/// Runs the web server with the given configuration.
pub async fn run_serve(config: GenieConfig) -> Result<(), GenieError> {
    init_tracing(&config.app.log_level);
    info!(
        app = %config.app.name,
        version = env!("CARGO_PKG_VERSION"),
        "starting wagergenie"
    );

    // One client serves both auth and table queries.
    let provider = Arc::new(SupabaseProvider::new(&config)?);
    let sessions: Arc<dyn SessionProvider> = provider.clone();
    let data: Arc<dyn DataProvider> = provider;

    let cancel = shutdown::install_signal_handler();
    let state = GatewayState::new(&config, sessions, data, cancel)?;

    start_server(&config.server.host, config.server.port, state).await?;

    info!("wagergenie serve shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("wagergenie={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

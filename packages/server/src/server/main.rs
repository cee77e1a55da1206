// Main entry point for the whitelist server

use std::sync::Arc;

use anyhow::{Context, Result};
use discord::{DiscordOptions, DiscordService};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use whitelist_core::domains::whitelist::{SharedStore, WhitelistStore};
use whitelist_core::kernel::{DiscordCommandRelay, DiscordRoleAdapter, FileSink, RoleIds, ServerDeps};
use whitelist_core::{server::build_app, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,whitelist_core=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting whitelist server");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(
        db_file = %config.db_file,
        command_channels = config.command_channels.len(),
        steam_id_policy = ?config.steam_id_policy,
        "Configuration loaded"
    );

    // Load the whitelist database (never fails; problems are logged)
    let store = WhitelistStore::load(Arc::new(FileSink::new(&config.db_file)));

    // Chat platform adapters
    let discord = Arc::new(DiscordService::new(DiscordOptions::new(
        config.discord_bot_token.clone(),
        config.discord_guild_id.clone(),
    )));
    let roles = DiscordRoleAdapter::new(
        discord.clone(),
        RoleIds {
            whitelisted: config.whitelisted_role_id.clone(),
            rejected: config.rejected_role_id.clone(),
        },
    );
    let relay = DiscordCommandRelay::new(discord, config.command_channels.clone());

    let deps = ServerDeps::new(
        SharedStore::new(store),
        Arc::new(roles),
        Arc::new(relay),
        config.steam_id_policy,
    );

    // Build application
    let app = build_app(deps, config.admin_api_token.clone());

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

//! Offline admin CLI for the whitelist database
//!
//! Opens the same JSON snapshot the server uses and never talks to the chat
//! platform; role flags catch up through rejoin reconciliation. Every command
//! prints one JSON object on stdout.
//!
//! Approvals honor `ALLOW_SHARED_STEAM_IDS` the same way the server does.
//!
//! Stop the server first: both processes rewrite the whole file.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use whitelist_core::common::{MemberId, SteamId};
use whitelist_core::domains::whitelist::actions::{parse_search, require_member};
use whitelist_core::domains::whitelist::{SteamIdPolicy, WhitelistError, WhitelistStore};
use whitelist_core::kernel::FileSink;
use whitelist_core::steam_id_policy_from_env;

#[derive(Parser)]
#[command(name = "whitelist-cli")]
#[command(about = "Inspect and edit the whitelist database offline")]
struct Cli {
    /// Database file (defaults to $DB_FILE, then whitelist_db.json)
    #[arg(long, global = true)]
    db_file: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print record counts
    Stats,

    /// Look a member up by member ID, Steam ID, or both
    Find {
        #[arg(long)]
        member_id: Option<String>,
        #[arg(long)]
        steam_id: Option<String>,
    },

    /// Whitelist a member under a Steam ID
    Approve {
        member_id: String,
        steam_id: String,
        /// Replace a different Steam ID already on file
        #[arg(long)]
        overwrite: bool,
    },

    /// Reject a member
    Reject { member_id: String },
}

// ============================================================================
// JSON Response Types
// ============================================================================

#[derive(Serialize)]
struct Response {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

fn output(resp: &Response) {
    match serde_json::to_string_pretty(resp) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Failed to encode output: {e}"),
    }
}

// ============================================================================
// Main
// ============================================================================

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let db_file = cli
        .db_file
        .or_else(|| std::env::var("DB_FILE").ok())
        .filter(|path| !path.trim().is_empty())
        .unwrap_or_else(|| "whitelist_db.json".to_string());
    let mut store = WhitelistStore::load(Arc::new(FileSink::new(db_file)));

    let result = steam_id_policy_from_env().and_then(|policy| run(cli.command, &mut store, policy));
    match result {
        Ok(data) => {
            output(&Response {
                success: true,
                error: None,
                data: Some(data),
            });
            ExitCode::SUCCESS
        }
        Err(e) => {
            output(&Response {
                success: false,
                error: Some(e.to_string()),
                data: None,
            });
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands, store: &mut WhitelistStore, policy: SteamIdPolicy) -> Result<Value> {
    match command {
        Commands::Stats => Ok(serde_json::to_value(store.stats())?),
        Commands::Find {
            member_id,
            steam_id,
        } => cmd_find(store, member_id.as_deref(), steam_id.as_deref()),
        Commands::Approve {
            member_id,
            steam_id,
            overwrite,
        } => cmd_approve(store, policy, &member_id, &steam_id, overwrite),
        Commands::Reject { member_id } => cmd_reject(store, &member_id),
    }
}

fn cmd_find(store: &WhitelistStore, member_id: Option<&str>, steam_id: Option<&str>) -> Result<Value> {
    let (member_id, steam_id) = parse_search(member_id, steam_id)?;
    let result = store.find(member_id.as_ref(), steam_id.as_ref())?;
    Ok(serde_json::to_value(result)?)
}

fn cmd_approve(
    store: &mut WhitelistStore,
    policy: SteamIdPolicy,
    member_id: &str,
    steam_id: &str,
    overwrite: bool,
) -> Result<Value> {
    let member_id: MemberId = require_member(member_id)?;
    let steam_id: SteamId = SteamId::parse(steam_id).map_err(WhitelistError::from)?;

    if let Some(existing) = store.steam_id_of(&member_id) {
        if existing != &steam_id && !overwrite {
            bail!(
                "Member {} already has Steam ID {}; pass --overwrite to replace it",
                member_id,
                existing
            );
        }
    }
    policy.check(store, &member_id, &steam_id)?;

    let report = store.approve(&member_id, &steam_id);
    if !report.persisted {
        bail!("Approved in memory but the database file could not be written");
    }
    Ok(serde_json::json!({
        "member_id": member_id,
        "steam_id": steam_id,
        "previous": report.change.previous.filter(|p| p != &steam_id),
    }))
}

fn cmd_reject(store: &mut WhitelistStore, member_id: &str) -> Result<Value> {
    let member_id = require_member(member_id)?;
    if store.is_rejected(&member_id) {
        return Err(WhitelistError::AlreadyRejected.into());
    }

    let report = store.reject(&member_id);
    if !report.persisted {
        bail!("Rejected in memory but the database file could not be written");
    }
    Ok(serde_json::json!({
        "member_id": member_id,
        "steam_id": report.change.previous,
    }))
}

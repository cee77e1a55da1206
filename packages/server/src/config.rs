use anyhow::{bail, Context, Result};
use dotenvy::dotenv;
use std::env;

use crate::domains::whitelist::SteamIdPolicy;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub discord_bot_token: String,
    pub discord_guild_id: String,
    pub whitelisted_role_id: String,
    pub rejected_role_id: String,
    pub command_channels: Vec<String>,
    pub admin_api_token: String,
    pub db_file: String,
    pub port: u16,
    pub steam_id_policy: SteamIdPolicy,
}

const REQUIRED: [&str; 6] = [
    "DISCORD_BOT_TOKEN",
    "DISCORD_GUILD_ID",
    "WHITELISTED_ROLE_ID",
    "REJECTED_ROLE_ID",
    "COMMAND_CHANNELS",
    "ADMIN_API_TOKEN",
];

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup. Blank values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let missing: Vec<&str> = REQUIRED
            .iter()
            .copied()
            .filter(|key| get(*key).is_none())
            .collect();
        if !missing.is_empty() {
            bail!(
                "Missing required environment variables: {}",
                missing.join(", ")
            );
        }

        let command_channels = parse_channel_list(&get("COMMAND_CHANNELS").unwrap_or_default());
        if command_channels.is_empty() {
            bail!("COMMAND_CHANNELS must contain at least one channel ID");
        }

        let steam_id_policy = steam_id_policy_from(get("ALLOW_SHARED_STEAM_IDS"))?;

        Ok(Self {
            discord_bot_token: get("DISCORD_BOT_TOKEN").unwrap_or_default(),
            discord_guild_id: get("DISCORD_GUILD_ID").unwrap_or_default(),
            whitelisted_role_id: get("WHITELISTED_ROLE_ID").unwrap_or_default(),
            rejected_role_id: get("REJECTED_ROLE_ID").unwrap_or_default(),
            command_channels,
            admin_api_token: get("ADMIN_API_TOKEN").unwrap_or_default(),
            db_file: get("DB_FILE").unwrap_or_else(|| "whitelist_db.json".to_string()),
            port: get("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            steam_id_policy,
        })
    }
}

/// Policy for `ALLOW_SHARED_STEAM_IDS`. Absent or blank means shared.
pub fn steam_id_policy_from(raw: Option<String>) -> Result<SteamIdPolicy> {
    let Some(raw) = raw.filter(|v| !v.trim().is_empty()) else {
        return Ok(SteamIdPolicy::Shared);
    };
    let shared: bool = raw
        .trim()
        .parse()
        .context("ALLOW_SHARED_STEAM_IDS must be true or false")?;
    Ok(if shared {
        SteamIdPolicy::Shared
    } else {
        SteamIdPolicy::Unique
    })
}

/// Same as [`steam_id_policy_from`], read from the process environment.
pub fn steam_id_policy_from_env() -> Result<SteamIdPolicy> {
    steam_id_policy_from(env::var("ALLOW_SHARED_STEAM_IDS").ok())
}

fn parse_channel_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

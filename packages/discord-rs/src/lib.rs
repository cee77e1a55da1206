// Minimal Discord REST client: guild member roles and channel messages.

pub mod models;
use reqwest::{header, Client, StatusCode};
use tracing::{error, warn};

use crate::models::{CreateMessage, GuildMember};

pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";

#[derive(Debug, Clone)]
pub struct DiscordOptions {
    pub bot_token: String,
    pub guild_id: String,
    pub api_base: String,
}

impl DiscordOptions {
    pub fn new(bot_token: impl Into<String>, guild_id: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            guild_id: guild_id.into(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DiscordService {
    options: DiscordOptions,
    client: Client,
}

impl DiscordService {
    pub fn new(options: DiscordOptions) -> Self {
        Self {
            options,
            client: Client::new(),
        }
    }

    fn member_url(&self, user_id: &str) -> String {
        format!(
            "{base}/guilds/{guild}/members/{user}",
            base = self.options.api_base,
            guild = self.options.guild_id,
            user = user_id
        )
    }

    fn member_role_url(&self, user_id: &str, role_id: &str) -> String {
        format!("{}/roles/{}", self.member_url(user_id), role_id)
    }

    fn channel_messages_url(&self, channel_id: &str) -> String {
        format!(
            "{base}/channels/{channel}/messages",
            base = self.options.api_base,
            channel = channel_id
        )
    }

    fn authorization(&self) -> String {
        format!("Bot {}", self.options.bot_token)
    }

    /// Fetch a guild member. `Ok(None)` when the user is not in the guild.
    pub async fn fetch_member(&self, user_id: &str) -> Result<Option<GuildMember>, &'static str> {
        let res = self
            .client
            .get(self.member_url(user_id))
            .header(header::AUTHORIZATION, self.authorization())
            .send()
            .await;

        match res {
            Ok(response) => {
                let status = response.status();
                if status == StatusCode::NOT_FOUND {
                    return Ok(None);
                }
                if !status.is_success() {
                    let error_body = response.text().await.unwrap_or_default();
                    error!(%status, body = %error_body, "Discord rejected member fetch");
                    return Err("Discord returned an error");
                }

                response
                    .json::<GuildMember>()
                    .await
                    .map(Some)
                    .map_err(|e| {
                        error!(error = %e, "Failed to parse guild member");
                        "Error parsing guild member response"
                    })
            }
            Err(e) => {
                error!(error = %e, "Request to Discord failed");
                Err("Error fetching guild member")
            }
        }
    }

    pub async fn add_member_role(&self, user_id: &str, role_id: &str) -> Result<(), &'static str> {
        let res = self
            .client
            .put(self.member_role_url(user_id, role_id))
            .header(header::AUTHORIZATION, self.authorization())
            .header(header::CONTENT_LENGTH, "0")
            .send()
            .await;

        match res {
            Ok(response) if response.status().is_success() => Ok(()),
            Ok(response) => {
                warn!(status = %response.status(), user_id, role_id, "Role add refused");
                Err("Discord refused to add role")
            }
            Err(e) => {
                error!(error = %e, "Request to Discord failed");
                Err("Error adding role")
            }
        }
    }

    pub async fn remove_member_role(
        &self,
        user_id: &str,
        role_id: &str,
    ) -> Result<(), &'static str> {
        let res = self
            .client
            .delete(self.member_role_url(user_id, role_id))
            .header(header::AUTHORIZATION, self.authorization())
            .send()
            .await;

        match res {
            Ok(response) if response.status().is_success() => Ok(()),
            Ok(response) => {
                warn!(status = %response.status(), user_id, role_id, "Role removal refused");
                Err("Discord refused to remove role")
            }
            Err(e) => {
                error!(error = %e, "Request to Discord failed");
                Err("Error removing role")
            }
        }
    }

    pub async fn send_message(
        &self,
        channel_id: &str,
        content: &str,
    ) -> Result<(), &'static str> {
        let res = self
            .client
            .post(self.channel_messages_url(channel_id))
            .header(header::AUTHORIZATION, self.authorization())
            .json(&CreateMessage { content })
            .send()
            .await;

        match res {
            Ok(response) => {
                if !response.status().is_success() {
                    warn!(status = %response.status(), channel_id, "Message send refused");
                    return Err("Discord refused to send message");
                }
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Request to Discord failed");
                Err("Error sending message")
            }
        }
    }
}

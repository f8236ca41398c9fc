//! Discord REST adapter - application command catalog

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::application::errors::BotError;
use crate::domain::entities::ApplicationCommand;
use crate::domain::traits::CommandPublisher;

/// Discord API base URL
pub const API_BASE: &str = "https://discord.com/api/v10";

/// Error body returned by the Discord API
#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
    #[serde(default)]
    code: u64,
}

/// Publishes slash commands through the Discord HTTP API
pub struct DiscordRest {
    token: String,
    application_id: String,
    api_base: String,
    client: Client,
}

impl DiscordRest {
    pub fn new(token: impl Into<String>, application_id: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            application_id: application_id.into(),
            api_base: API_BASE.to_string(),
            client: Client::new(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Route for the global command catalog of this application
    pub fn commands_url(&self) -> String {
        format!("{}/applications/{}/commands", self.api_base, self.application_id)
    }

    fn classify(status: StatusCode, body: String) -> BotError {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                let reason = serde_json::from_str::<ApiError>(&body)
                    .map(|e| format!("{} (code {})", e.message, e.code))
                    .unwrap_or(body);
                BotError::Auth(format!("Discord rejected the bot token ({}): {}", status, reason))
            }
            _ => BotError::Publish {
                status: status.as_u16(),
                body,
            },
        }
    }
}

#[async_trait]
impl CommandPublisher for DiscordRest {
    async fn publish(&self, commands: &[ApplicationCommand]) -> Result<(), BotError> {
        tracing::info!(
            "Started refreshing {} application (/) commands.",
            commands.len()
        );

        let response = self
            .client
            .put(self.commands_url())
            .header("Authorization", format!("Bot {}", self.token))
            .json(commands)
            .send()
            .await
            .map_err(|e| {
                let error = BotError::Network(e.to_string());
                tracing::error!("Error registering slash commands: {}", error);
                error
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let error = Self::classify(status, body);
            tracing::error!("Error registering slash commands: {}", error);
            return Err(error);
        }

        tracing::info!(
            "Successfully reloaded {} application (/) commands.",
            commands.len()
        );
        Ok(())
    }
}

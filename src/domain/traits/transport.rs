use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::application::errors::BotError;
use crate::domain::entities::{EventPayload, Interaction, InteractionReply, User};

/// Real-time connection to the chat platform.
///
/// Implementations own authentication and heartbeats; once logged in they push
/// every inbound event into the sender handed to [`Transport::login`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// Authenticate and start delivering events
    async fn login(&self, token: &str, events: mpsc::Sender<EventPayload>) -> Result<(), BotError>;

    /// Disconnect; best effort
    async fn destroy(&self);

    /// Last measured websocket round trip
    fn ws_latency(&self) -> Option<Duration>;

    /// Update the presence shown for the bot account
    async fn set_activity(&self, activity: Activity) -> Result<(), BotError>;

    /// The logged-in bot account, if connected
    fn bot_user(&self) -> Option<User>;
}

/// Outbound answers to a single interaction
#[async_trait]
pub trait InteractionResponder: Send + Sync {
    async fn create_response(&self, interaction: &Interaction, reply: &InteractionReply) -> Result<(), BotError>;

    async fn defer_response(&self, interaction: &Interaction, ephemeral: bool) -> Result<(), BotError>;

    async fn create_followup(&self, interaction: &Interaction, reply: &InteractionReply) -> Result<(), BotError>;

    async fn edit_response(&self, interaction: &Interaction, content: &str) -> Result<(), BotError>;
}

/// "Playing ..." presence shown next to the bot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    pub name: String,
}

impl Activity {
    pub fn playing(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::application::errors::{BotError, CommandError};
use crate::domain::entities::{CommandRegistry, EventPayload, Interaction};
use crate::domain::traits::Transport;

/// Everything a command body can reach
#[derive(Clone)]
pub struct CommandContext {
    pub interaction: Arc<Interaction>,
    pub registry: Arc<CommandRegistry>,
    pub transport: Arc<dyn Transport>,
}

impl CommandContext {
    pub fn ws_latency(&self) -> Option<Duration> {
        self.transport.ws_latency()
    }
}

/// Body of a slash command
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn execute(&self, ctx: &CommandContext) -> Result<(), CommandError>;
}

/// Subscriber to a gateway event
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn execute(&self, payload: EventPayload) -> Result<(), BotError>;
}

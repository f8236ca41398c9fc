//! `ready` - announce the session and set the bot's presence

use std::sync::Arc;

use async_trait::async_trait;

use crate::application::errors::BotError;
use crate::domain::entities::{EventDescriptor, EventPayload, GatewayEvent};
use crate::domain::traits::{Activity, EventHandler, HandlerEnv, Transport};

/// Presence shown once the bot is connected
pub const ACTIVITY: &str = "with penguins 🐧";

pub struct ReadyHandler {
    transport: Arc<dyn Transport>,
}

impl ReadyHandler {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl EventHandler for ReadyHandler {
    async fn execute(&self, payload: EventPayload) -> Result<(), BotError> {
        let EventPayload::Ready(info) = payload else {
            return Ok(());
        };

        tracing::info!("✅ Logged in as {}", info.user.tag());
        tracing::info!("📊 Serving {} guilds", info.guild_count);
        tracing::info!("👥 Total users: {}", info.user_count);
        tracing::info!("🐧 Pingu Bot is ready!");

        self.transport.set_activity(Activity::playing(ACTIVITY)).await
    }
}

pub fn descriptor(env: &HandlerEnv) -> EventDescriptor {
    EventDescriptor::once(GatewayEvent::Ready, ReadyHandler::new(env.transport.clone()))
}

use async_trait::async_trait;

use crate::application::errors::BotError;
use crate::domain::entities::ApplicationCommand;

/// Remote command catalog
#[async_trait]
pub trait CommandPublisher: Send + Sync {
    /// Replace the whole catalog with `commands`
    async fn publish(&self, commands: &[ApplicationCommand]) -> Result<(), BotError>;
}

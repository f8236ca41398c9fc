use std::sync::Arc;
use std::time::Duration;

use crate::application::errors::BotError;
use crate::application::messaging::CooldownTracker;
use crate::domain::entities::{Command, CommandCategory, CommandRegistry, EventDescriptor};
use crate::domain::traits::Transport;

/// Shared components event handlers may be built around
#[derive(Clone)]
pub struct HandlerEnv {
    pub registry: Arc<CommandRegistry>,
    pub cooldowns: Arc<CooldownTracker>,
    pub transport: Arc<dyn Transport>,
    pub handler_timeout: Option<Duration>,
}

/// Where command and event handlers are discovered
pub trait HandlerSource: Send + Sync {
    /// Commands of one category; `Ok(None)` when the category has no location
    fn commands(&self, category: CommandCategory) -> Result<Option<Vec<Command>>, BotError>;

    /// Event subscriptions; `Ok(None)` when there is no event location
    fn events(&self, env: &HandlerEnv) -> Result<Option<Vec<EventDescriptor>>, BotError>;
}

//! Static handler manifest
//!
//! Commands and events are listed explicitly at build time instead of being
//! discovered on disk. A category that is never declared behaves like a
//! missing directory: it is skipped without error.

use std::collections::BTreeMap;

use crate::application::errors::BotError;
use crate::domain::entities::{Command, CommandCategory, EventDescriptor};
use crate::domain::traits::{HandlerEnv, HandlerSource};

/// Builds one command definition
pub type CommandFactory = fn() -> Command;

/// Builds one event subscription from the shared components
pub type EventFactory = fn(&HandlerEnv) -> EventDescriptor;

/// Explicit table of handler factories
#[derive(Default, Clone)]
pub struct StaticManifest {
    categories: BTreeMap<CommandCategory, Vec<CommandFactory>>,
    events: Option<Vec<EventFactory>>,
}

impl StaticManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a category, even if it ends up empty
    pub fn category(mut self, category: CommandCategory) -> Self {
        self.categories.entry(category).or_default();
        self
    }

    /// Add a command to `category`, declaring it if needed
    pub fn command(mut self, category: CommandCategory, build: CommandFactory) -> Self {
        self.categories.entry(category).or_default().push(build);
        self
    }

    /// Add an event subscription, declaring the event location if needed
    pub fn event(mut self, build: EventFactory) -> Self {
        self.events.get_or_insert_with(Vec::new).push(build);
        self
    }

    pub fn has_category(&self, category: CommandCategory) -> bool {
        self.categories.contains_key(&category)
    }
}

impl HandlerSource for StaticManifest {
    fn commands(&self, category: CommandCategory) -> Result<Option<Vec<Command>>, BotError> {
        Ok(self
            .categories
            .get(&category)
            .map(|factories| factories.iter().map(|build| build()).collect()))
    }

    fn events(&self, env: &HandlerEnv) -> Result<Option<Vec<EventDescriptor>>, BotError> {
        Ok(self
            .events
            .as_ref()
            .map(|factories| factories.iter().map(|build| build(env)).collect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roll() -> Command {
        Command::new("roll", CommandCategory::Fun)
            .with_description("Roll a die")
            .with_handler_fn(|_ctx| async { Ok(()) })
    }

    #[test]
    fn test_undeclared_category_is_missing() {
        let manifest = StaticManifest::new().command(CommandCategory::Fun, roll);

        assert!(manifest.has_category(CommandCategory::Fun));
        assert_eq!(manifest.commands(CommandCategory::Fun).unwrap().unwrap().len(), 1);
        assert!(manifest.commands(CommandCategory::Economy).unwrap().is_none());
    }

    #[test]
    fn test_declared_empty_category_is_present() {
        let manifest = StaticManifest::new().category(CommandCategory::Leveling);
        let commands = manifest.commands(CommandCategory::Leveling).unwrap();
        assert_eq!(commands.map(|c| c.len()), Some(0));
    }
}

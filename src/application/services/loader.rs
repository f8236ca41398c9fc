//! Handler loader - fills the command registry and installs event subscriptions

use std::sync::Arc;

use crate::application::errors::BotResult;
use crate::application::messaging::EventEmitter;
use crate::domain::entities::{CommandCategory, CommandRegistry};
use crate::domain::traits::{HandlerEnv, HandlerSource};

/// Loads handlers from a [`HandlerSource`]
pub struct HandlerLoader {
    source: Arc<dyn HandlerSource>,
}

impl HandlerLoader {
    pub fn new(source: Arc<dyn HandlerSource>) -> Self {
        Self { source }
    }

    /// Register every valid command, category by category.
    ///
    /// Missing categories and malformed commands are skipped; only a failure of
    /// the source itself is returned.
    pub fn load_commands(&self, registry: &mut CommandRegistry) -> BotResult<usize> {
        for category in CommandCategory::ALL {
            let Some(commands) = self.source.commands(category)? else {
                continue;
            };

            for command in commands {
                if let Err(reason) = command.validate() {
                    tracing::warn!(
                        category = %category,
                        "Warning: command {:?} is missing required data or handler: {}",
                        command.name,
                        reason
                    );
                    continue;
                }

                let name = command.name.clone();
                if let Some(previous) = registry.register(command) {
                    tracing::info!(
                        "Command {} ({}) replaced by a later definition ({})",
                        name,
                        previous.category,
                        category
                    );
                }
                tracing::info!("Loaded command: {} ({})", name, category);
            }
        }

        tracing::info!("Loaded {} commands", registry.len());
        Ok(registry.len())
    }

    /// Install each event descriptor on the emitter
    pub fn load_events(&self, env: &HandlerEnv, emitter: &EventEmitter) -> BotResult<usize> {
        let Some(events) = self.source.events(env)? else {
            tracing::warn!("Events source not found, skipping event loading");
            return Ok(0);
        };

        let count = events.len();
        for event in events {
            if event.once {
                emitter.once(event.name, event.handler);
            } else {
                emitter.on(event.name, event.handler);
            }
            tracing::info!("Loaded event: {}", event.name);
        }

        tracing::info!("Loaded {} events", count);
        Ok(count)
    }
}

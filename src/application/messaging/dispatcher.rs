//! Interaction dispatcher - routes slash commands to their handlers

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::cooldown::{CooldownStatus, CooldownTracker};
use super::panic_message;
use crate::application::errors::{BotError, CommandError};
use crate::domain::entities::{CommandRegistry, EventPayload, Interaction, InteractionReply};
use crate::domain::traits::{CommandContext, CommandHandler, EventHandler, Transport};

/// Generic message shown when a command body fails
pub const FAILURE_MESSAGE: &str = "❌ An error occurred while executing this command.";

/// Terminal state of one dispatched interaction
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// Not a slash command
    Discarded,
    /// No registered command with that name
    Unresolved,
    /// Still on cooldown; the user was told how long to wait
    Denied { remaining: Duration },
    Completed,
    Failed,
}

/// Resolves, rate limits and runs slash commands
pub struct InteractionDispatcher {
    registry: Arc<CommandRegistry>,
    cooldowns: Arc<CooldownTracker>,
    transport: Arc<dyn Transport>,
    timeout: Option<Duration>,
}

impl InteractionDispatcher {
    pub fn new(
        registry: Arc<CommandRegistry>,
        cooldowns: Arc<CooldownTracker>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            registry,
            cooldowns,
            transport,
            timeout: None,
        }
    }

    /// Fail handlers that run longer than `timeout`
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn dispatch(&self, interaction: Arc<Interaction>) -> DispatchOutcome {
        if !interaction.kind.is_chat_input_command() {
            return DispatchOutcome::Discarded;
        }

        let Some(command) = self.registry.get(&interaction.command_name).cloned() else {
            tracing::error!("No command matching {} was found.", interaction.command_name);
            return DispatchOutcome::Unresolved;
        };

        if let Some(seconds) = command.cooldown {
            let window = Duration::from_secs(seconds);
            if let CooldownStatus::Active { remaining } =
                self.cooldowns
                    .try_acquire(&command.name, &interaction.user.id, window)
            {
                let notice = cooldown_message(&command.name, remaining);
                if let Err(e) = interaction.reply(InteractionReply::ephemeral(notice)).await {
                    tracing::warn!(command = %command.name, "failed to send cooldown notice: {}", e);
                }
                return DispatchOutcome::Denied { remaining };
            }
        }

        let Some(handler) = command.handler.clone() else {
            // validated at load time
            tracing::error!(command = %command.name, "command has no handler");
            return DispatchOutcome::Failed;
        };

        let ctx = CommandContext {
            interaction: interaction.clone(),
            registry: self.registry.clone(),
            transport: self.transport.clone(),
        };

        match self.invoke(handler, ctx).await {
            Ok(()) => {
                tracing::info!(
                    user = %interaction.user.id,
                    command = %command.name,
                    guild = interaction.guild.as_ref().map(|g| g.id.as_str()),
                    "✓ {} used /{} in {}",
                    interaction.user.tag(),
                    command.name,
                    interaction.origin()
                );
                DispatchOutcome::Completed
            }
            Err(e) => {
                tracing::error!(
                    user = %interaction.user.id,
                    command = %command.name,
                    error = ?e,
                    "Error executing command {}: {}",
                    command.name,
                    e
                );
                self.report_failure(&interaction).await;
                DispatchOutcome::Failed
            }
        }
    }

    /// Run the handler in its own task so a panic stays contained
    async fn invoke(
        &self,
        handler: Arc<dyn CommandHandler>,
        ctx: CommandContext,
    ) -> Result<(), CommandError> {
        let task = tokio::spawn(async move { handler.execute(&ctx).await });
        let abort = task.abort_handle();

        let joined = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, task).await {
                Ok(joined) => joined,
                Err(_) => {
                    abort.abort();
                    return Err(CommandError::Timeout(limit));
                }
            },
            None => task.await,
        };

        match joined {
            Ok(result) => result,
            Err(e) if e.is_panic() => Err(CommandError::Panicked(panic_message(e.into_panic()))),
            Err(e) => Err(CommandError::ExecutionFailed(e.to_string())),
        }
    }

    async fn report_failure(&self, interaction: &Interaction) {
        let notice = InteractionReply::ephemeral(FAILURE_MESSAGE);
        let sent = if interaction.is_acknowledged() {
            interaction.follow_up(notice).await
        } else {
            interaction.reply(notice).await
        };
        if let Err(e) = sent {
            tracing::error!(interaction = %interaction.id, "failed to report command failure: {}", e);
        }
    }
}

#[async_trait]
impl EventHandler for InteractionDispatcher {
    async fn execute(&self, payload: EventPayload) -> Result<(), BotError> {
        if let EventPayload::InteractionCreate(interaction) = payload {
            self.dispatch(interaction).await;
        }
        Ok(())
    }
}

/// User-facing cooldown notice
pub fn cooldown_message(command: &str, remaining: Duration) -> String {
    format!(
        "⏰ Please wait {:.1} more second(s) before using `{}` again.",
        remaining.as_secs_f64(),
        command
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cooldown_message_format() {
        assert_eq!(
            cooldown_message("daily", Duration::from_millis(2_340)),
            "⏰ Please wait 2.3 more second(s) before using `daily` again."
        );
    }
}

//! `/help` - registered commands grouped by category

use crate::application::errors::CommandError;
use crate::domain::entities::{Command, CommandCategory, CommandRegistry, InteractionReply, User};
use crate::domain::traits::CommandContext;

pub fn command() -> Command {
    Command::new("help", CommandCategory::Utility)
        .with_description("Display all available commands and their descriptions")
        .with_handler_fn(execute)
}

async fn execute(ctx: CommandContext) -> Result<(), CommandError> {
    let text = render(&ctx.registry, &ctx.interaction.user);
    ctx.interaction.reply(InteractionReply::new(text)).await
}

/// Help listing; categories without commands are left out
pub fn render(registry: &CommandRegistry, requested_by: &User) -> String {
    let mut out = String::from("🐧 Pingu Bot - Help\nHere are all available commands:\n");

    for (category, commands) in registry.by_category() {
        if commands.is_empty() {
            continue;
        }
        out.push_str(&format!("\n{} {}\n", category.emoji(), category.title()));
        for cmd in commands {
            out.push_str(&format!("`/{}` - {}\n", cmd.name, cmd.description));
        }
    }

    out.push_str(&format!("\nRequested by {}", requested_by.tag()));
    out
}

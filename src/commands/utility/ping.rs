//! `/ping` - round trip and websocket latency

use chrono::Utc;

use crate::application::errors::CommandError;
use crate::domain::entities::{Command, CommandCategory, InteractionReply};
use crate::domain::traits::CommandContext;

pub fn command() -> Command {
    Command::new("ping", CommandCategory::Utility)
        .with_description("Check the bot latency and API response time")
        .with_cooldown(3)
        .with_handler_fn(execute)
}

async fn execute(ctx: CommandContext) -> Result<(), CommandError> {
    let interaction = &ctx.interaction;
    interaction
        .reply(InteractionReply::ephemeral("🏓 Pinging..."))
        .await?;

    let roundtrip = (Utc::now() - interaction.created_at).num_milliseconds();
    interaction
        .edit_reply(pong(roundtrip, ctx.ws_latency().map(|d| d.as_millis())))
        .await
}

fn pong(roundtrip_ms: i64, ws_ms: Option<u128>) -> String {
    let ws = ws_ms
        .map(|ms| format!("{}ms", ms))
        .unwrap_or_else(|| "n/a".to_string());
    [
        "🏓 **Pong!**".to_string(),
        format!("📡 Roundtrip Latency: `{}ms`", roundtrip_ms),
        format!("⚡ WebSocket Latency: `{}`", ws),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition() {
        let cmd = command();
        assert!(cmd.validate().is_ok());
        assert_eq!(cmd.cooldown, Some(3));
    }

    #[test]
    fn test_pong_format() {
        assert_eq!(
            pong(42, Some(17)),
            "🏓 **Pong!**\n📡 Roundtrip Latency: `42ms`\n⚡ WebSocket Latency: `17ms`"
        );
        assert!(pong(5, None).ends_with("WebSocket Latency: `n/a`"));
    }
}

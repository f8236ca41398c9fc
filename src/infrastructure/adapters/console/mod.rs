//! Console adapter for development/testing
//!
//! Reads `/command key=value arg` lines and turns them into slash command
//! interactions from a local user; replies are printed to stdout.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::application::errors::BotError;
use crate::domain::entities::{
    EventPayload, Guild, Interaction, InteractionKind, InteractionReply, ReadyInfo, User,
};
use crate::domain::traits::{Activity, InteractionResponder, Transport};

type Input = Box<dyn AsyncBufRead + Send + Unpin>;

/// Prints replies and keeps a transcript of them
#[derive(Default)]
pub struct ConsoleResponder {
    transcript: Mutex<Vec<String>>,
}

impl ConsoleResponder {
    pub fn transcript(&self) -> Vec<String> {
        self.transcript.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn emit(&self, line: String) {
        println!("{}", line);
        self.transcript
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(line);
    }

    fn render(reply: &InteractionReply) -> String {
        if reply.ephemeral {
            format!("[BOT] (only you) {}", reply.content)
        } else {
            format!("[BOT] {}", reply.content)
        }
    }
}

#[async_trait]
impl InteractionResponder for ConsoleResponder {
    async fn create_response(&self, _interaction: &Interaction, reply: &InteractionReply) -> Result<(), BotError> {
        self.emit(Self::render(reply));
        Ok(())
    }

    async fn defer_response(&self, _interaction: &Interaction, _ephemeral: bool) -> Result<(), BotError> {
        self.emit("[BOT] is thinking...".to_string());
        Ok(())
    }

    async fn create_followup(&self, _interaction: &Interaction, reply: &InteractionReply) -> Result<(), BotError> {
        self.emit(Self::render(reply));
        Ok(())
    }

    async fn edit_response(&self, _interaction: &Interaction, content: &str) -> Result<(), BotError> {
        self.emit(format!("[BOT] (edited) {}", content));
        Ok(())
    }
}

/// Parses console lines into interactions
#[derive(Clone)]
pub struct ConsoleParser {
    user: User,
    guild: Option<Guild>,
    responder: Arc<ConsoleResponder>,
}

impl ConsoleParser {
    /// Parse one input line; `None` for blank lines
    pub fn parse_line(&self, line: &str) -> Option<Interaction> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let responder: Arc<dyn InteractionResponder> = self.responder.clone();
        let Some(command) = line.strip_prefix('/') else {
            // plain text stands in for a non-command interaction
            return Some(Interaction::new(
                InteractionKind::Component,
                "",
                self.user.clone(),
                responder,
            ));
        };

        let mut parts = command.split_whitespace();
        let name = parts.next().unwrap_or_default().to_lowercase();
        let mut interaction = Interaction::command(name, self.user.clone(), responder);
        for (index, part) in parts.enumerate() {
            interaction = match part.split_once('=') {
                Some((key, value)) => interaction.with_option(key, value),
                None => interaction.with_option(format!("arg{}", index), part),
            };
        }
        if let Some(guild) = &self.guild {
            interaction = interaction.with_guild(guild.clone());
        }
        Some(interaction)
    }
}

/// Console transport for local development
pub struct ConsoleTransport {
    bot: User,
    parser: ConsoleParser,
    input: Mutex<Option<Input>>,
    reader: Mutex<Option<JoinHandle<()>>>,
    activity: Mutex<Option<Activity>>,
    connected: AtomicBool,
}

impl ConsoleTransport {
    pub fn new() -> Self {
        Self::with_input(BufReader::new(tokio::io::stdin()))
    }

    pub fn with_input<R>(input: R) -> Self
    where
        R: AsyncBufRead + Send + Unpin + 'static,
    {
        Self {
            bot: User::new("0", "pingu-bot").as_bot(),
            parser: ConsoleParser {
                user: User::new("console", "console"),
                guild: None,
                responder: Arc::new(ConsoleResponder::default()),
            },
            input: Mutex::new(Some(Box::new(input))),
            reader: Mutex::new(None),
            activity: Mutex::new(None),
            connected: AtomicBool::new(false),
        }
    }

    /// Pretend every interaction comes from `guild`
    pub fn with_guild(mut self, guild: Guild) -> Self {
        self.parser.guild = Some(guild);
        self
    }

    pub fn responder(&self) -> Arc<ConsoleResponder> {
        self.parser.responder.clone()
    }

    pub fn activity(&self) -> Option<Activity> {
        self.activity.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn parse_line(&self, line: &str) -> Option<Interaction> {
        self.parser.parse_line(line)
    }
}

impl Default for ConsoleTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for ConsoleTransport {
    async fn login(&self, token: &str, events: mpsc::Sender<EventPayload>) -> Result<(), BotError> {
        if token.is_empty() {
            return Err(BotError::Auth("empty token".to_string()));
        }
        let input = self.input.lock().unwrap_or_else(|e| e.into_inner()).take();
        let Some(mut input) = input else {
            return Err(BotError::Transport("console transport already started".to_string()));
        };

        tracing::info!("Starting console transport (dev mode)");
        self.connected.store(true, Ordering::Release);

        let ready = EventPayload::Ready(ReadyInfo {
            user: self.bot.clone(),
            guild_count: usize::from(self.parser.guild.is_some()),
            user_count: 1,
        });
        events
            .send(ready)
            .await
            .map_err(|e| BotError::Transport(e.to_string()))?;

        let parser = self.parser.clone();
        let handle = tokio::spawn(async move {
            let mut line = String::new();
            loop {
                line.clear();
                match input.read_line(&mut line).await {
                    Ok(0) => break,
                    Ok(_) => {
                        let Some(interaction) = parser.parse_line(&line) else {
                            continue;
                        };
                        let payload = EventPayload::InteractionCreate(Arc::new(interaction));
                        if events.send(payload).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Failed to read console input: {}", e);
                        break;
                    }
                }
            }
            tracing::debug!("console input closed");
        });
        *self.reader.lock().unwrap_or_else(|e| e.into_inner()) = Some(handle);

        Ok(())
    }

    async fn destroy(&self) {
        self.connected.store(false, Ordering::Release);
        let reader = self.reader.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(reader) = reader {
            reader.abort();
        }
        tracing::info!("Console transport stopped");
    }

    fn ws_latency(&self) -> Option<Duration> {
        None
    }

    async fn set_activity(&self, activity: Activity) -> Result<(), BotError> {
        tracing::debug!("activity set to Playing {}", activity.name);
        *self.activity.lock().unwrap_or_else(|e| e.into_inner()) = Some(activity);
        Ok(())
    }

    fn bot_user(&self) -> Option<User> {
        self.connected
            .load(Ordering::Acquire)
            .then(|| self.bot.clone())
    }
}

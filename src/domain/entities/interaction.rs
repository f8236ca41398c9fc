use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::{Guild, User};
use crate::application::errors::CommandError;
use crate::domain::traits::InteractionResponder;

const PENDING: u8 = 0;
const DEFERRED: u8 = 1;
const REPLIED: u8 = 2;

/// Kind of inbound interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionKind {
    Ping,
    ChatInputCommand,
    Component,
    Autocomplete,
    ModalSubmit,
}

impl InteractionKind {
    pub fn is_chat_input_command(&self) -> bool {
        matches!(self, InteractionKind::ChatInputCommand)
    }
}

/// A named option value supplied with a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionOption {
    pub name: String,
    pub value: String,
}

/// Outbound reply content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionReply {
    pub content: String,
    pub ephemeral: bool,
}

impl InteractionReply {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ephemeral: false,
        }
    }

    pub fn ephemeral(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ephemeral: true,
        }
    }
}

/// A single user-initiated interaction and the operations to answer it.
///
/// The transport accepts exactly one initial response per interaction (either a
/// reply or a deferral); everything after that goes through follow-ups or edits.
pub struct Interaction {
    pub id: String,
    pub token: String,
    pub kind: InteractionKind,
    pub command_name: String,
    pub options: Vec<InteractionOption>,
    pub user: User,
    pub guild: Option<Guild>,
    pub created_at: DateTime<Utc>,
    responder: Arc<dyn InteractionResponder>,
    state: AtomicU8,
}

impl Interaction {
    pub fn new(
        kind: InteractionKind,
        command_name: impl Into<String>,
        user: User,
        responder: Arc<dyn InteractionResponder>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            token: uuid::Uuid::new_v4().simple().to_string(),
            kind,
            command_name: command_name.into(),
            options: Vec::new(),
            user,
            guild: None,
            created_at: Utc::now(),
            responder,
            state: AtomicU8::new(PENDING),
        }
    }

    pub fn command(
        command_name: impl Into<String>,
        user: User,
        responder: Arc<dyn InteractionResponder>,
    ) -> Self {
        Self::new(InteractionKind::ChatInputCommand, command_name, user, responder)
    }

    pub fn with_guild(mut self, guild: Guild) -> Self {
        self.guild = Some(guild);
        self
    }

    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.push(InteractionOption {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn option(&self, name: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|o| o.name == name)
            .map(|o| o.value.as_str())
    }

    /// Guild name, or `DM` for direct messages
    pub fn origin(&self) -> &str {
        self.guild.as_ref().map(|g| g.name.as_str()).unwrap_or("DM")
    }

    pub fn replied(&self) -> bool {
        self.state.load(Ordering::Acquire) == REPLIED
    }

    pub fn deferred(&self) -> bool {
        self.state.load(Ordering::Acquire) == DEFERRED
    }

    pub fn is_acknowledged(&self) -> bool {
        self.state.load(Ordering::Acquire) != PENDING
    }

    /// Send the initial response
    pub async fn reply(&self, reply: InteractionReply) -> Result<(), CommandError> {
        self.acknowledge(REPLIED)?;
        if let Err(e) = self.responder.create_response(self, &reply).await {
            self.state.store(PENDING, Ordering::Release);
            return Err(CommandError::Reply(e.to_string()));
        }
        Ok(())
    }

    /// Acknowledge now and answer later through [`Interaction::edit_reply`]
    pub async fn defer(&self, ephemeral: bool) -> Result<(), CommandError> {
        self.acknowledge(DEFERRED)?;
        if let Err(e) = self.responder.defer_response(self, ephemeral).await {
            self.state.store(PENDING, Ordering::Release);
            return Err(CommandError::Reply(e.to_string()));
        }
        Ok(())
    }

    /// Send an additional message after the initial response
    pub async fn follow_up(&self, reply: InteractionReply) -> Result<(), CommandError> {
        if !self.is_acknowledged() {
            return Err(CommandError::NotAcknowledged);
        }
        self.responder
            .create_followup(self, &reply)
            .await
            .map_err(|e| CommandError::Reply(e.to_string()))
    }

    /// Replace the content of the initial response
    pub async fn edit_reply(&self, content: impl Into<String>) -> Result<(), CommandError> {
        if !self.is_acknowledged() {
            return Err(CommandError::NotAcknowledged);
        }
        let content = content.into();
        self.responder
            .edit_response(self, &content)
            .await
            .map_err(|e| CommandError::Reply(e.to_string()))?;
        self.state.store(REPLIED, Ordering::Release);
        Ok(())
    }

    fn acknowledge(&self, next: u8) -> Result<(), CommandError> {
        self.state
            .compare_exchange(PENDING, next, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(|_| CommandError::AlreadyAcknowledged)
    }
}

impl std::fmt::Debug for Interaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interaction")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("command_name", &self.command_name)
            .field("user", &self.user.id)
            .field("guild", &self.guild.as_ref().map(|g| &g.id))
            .field("state", &self.state.load(Ordering::Relaxed))
            .finish()
    }
}

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::Serialize;

use crate::application::errors::CommandError;
use crate::domain::traits::{CommandContext, CommandHandler};

/// Names accepted by the remote command catalog
static COMMAND_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-_a-z0-9]{1,32}$").expect("command name pattern"));

const MAX_DESCRIPTION: usize = 100;

/// Fixed set of command categories, in load order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CommandCategory {
    Games,
    Economy,
    Leveling,
    Fun,
    Utility,
}

impl CommandCategory {
    pub const ALL: [CommandCategory; 5] = [
        CommandCategory::Games,
        CommandCategory::Economy,
        CommandCategory::Leveling,
        CommandCategory::Fun,
        CommandCategory::Utility,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CommandCategory::Games => "games",
            CommandCategory::Economy => "economy",
            CommandCategory::Leveling => "leveling",
            CommandCategory::Fun => "fun",
            CommandCategory::Utility => "utility",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            CommandCategory::Games => "🎮",
            CommandCategory::Economy => "🪙",
            CommandCategory::Leveling => "⬆️",
            CommandCategory::Fun => "🎉",
            CommandCategory::Utility => "🔧",
        }
    }

    /// Capitalised label used in help listings
    pub fn title(&self) -> String {
        let name = self.as_str();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl fmt::Display for CommandCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Member permissions a command may require
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    CreateInstantInvite,
    KickMembers,
    BanMembers,
    Administrator,
    ManageChannels,
    ManageGuild,
    ManageMessages,
    ManageRoles,
    ModerateMembers,
}

impl Permission {
    pub fn bits(&self) -> u64 {
        match self {
            Permission::CreateInstantInvite => 1 << 0,
            Permission::KickMembers => 1 << 1,
            Permission::BanMembers => 1 << 2,
            Permission::Administrator => 1 << 3,
            Permission::ManageChannels => 1 << 4,
            Permission::ManageGuild => 1 << 5,
            Permission::ManageMessages => 1 << 13,
            Permission::ManageRoles => 1 << 28,
            Permission::ModerateMembers => 1 << 40,
        }
    }
}

/// Option value types understood by the remote catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "u8")]
pub enum OptionKind {
    String,
    Integer,
    Boolean,
    User,
    Channel,
    Role,
    Number,
}

impl From<OptionKind> for u8 {
    fn from(kind: OptionKind) -> Self {
        match kind {
            OptionKind::String => 3,
            OptionKind::Integer => 4,
            OptionKind::Boolean => 5,
            OptionKind::User => 6,
            OptionKind::Channel => 7,
            OptionKind::Role => 8,
            OptionKind::Number => 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionChoice {
    pub name: String,
    pub value: String,
}

/// A single declared command option
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandOption {
    #[serde(rename = "type")]
    pub kind: OptionKind,
    pub name: String,
    pub description: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<OptionChoice>,
}

impl CommandOption {
    pub fn new(kind: OptionKind, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            description: description.into(),
            required: false,
            choices: Vec::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_choice(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.choices.push(OptionChoice {
            name: name.into(),
            value: value.into(),
        });
        self
    }
}

/// Wire schema of one application command in the remote catalog
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicationCommand {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: u8,
    pub options: Vec<CommandOption>,
    pub default_member_permissions: Option<String>,
    pub dm_permission: bool,
}

/// Represents a bot command
pub struct Command {
    pub name: String,
    pub description: String,
    pub category: CommandCategory,
    pub options: Vec<CommandOption>,
    /// Seconds between uses by the same user
    pub cooldown: Option<u64>,
    pub permissions: Vec<Permission>,
    pub dm_permission: bool,
    pub handler: Option<Arc<dyn CommandHandler>>,
}

impl Command {
    pub fn new(name: impl Into<String>, category: CommandCategory) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            category,
            options: Vec::new(),
            cooldown: None,
            permissions: Vec::new(),
            dm_permission: true,
            handler: None,
        }
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    pub fn with_option(mut self, option: CommandOption) -> Self {
        self.options.push(option);
        self
    }

    pub fn with_cooldown(mut self, seconds: u64) -> Self {
        self.cooldown = Some(seconds);
        self
    }

    pub fn with_permission(mut self, permission: Permission) -> Self {
        self.permissions.push(permission);
        self
    }

    pub fn guild_only(mut self) -> Self {
        self.dm_permission = false;
        self
    }

    pub fn with_handler<H: CommandHandler + 'static>(mut self, handler: H) -> Self {
        self.handler = Some(Arc::new(handler));
        self
    }

    pub fn with_handler_fn<F, Fut>(self, f: F) -> Self
    where
        F: Fn(CommandContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), CommandError>> + Send + 'static,
    {
        self.with_handler(FnHandler(f))
    }

    /// Reason the command cannot be registered, if any
    pub fn validate(&self) -> Result<(), String> {
        if !COMMAND_NAME.is_match(&self.name) {
            return Err(format!("invalid command name {:?}", self.name));
        }
        if self.description.is_empty() || self.description.chars().count() > MAX_DESCRIPTION {
            return Err(format!(
                "description must be 1-{} characters",
                MAX_DESCRIPTION
            ));
        }
        if self.handler.is_none() {
            return Err("missing handler".to_string());
        }
        Ok(())
    }

    /// Bitfield of required permissions, `None` when unrestricted
    pub fn permission_bits(&self) -> Option<u64> {
        if self.permissions.is_empty() {
            None
        } else {
            Some(self.permissions.iter().fold(0, |acc, p| acc | p.bits()))
        }
    }

    pub fn to_application_command(&self) -> ApplicationCommand {
        ApplicationCommand {
            name: self.name.clone(),
            description: self.description.clone(),
            kind: 1,
            options: self.options.clone(),
            default_member_permissions: self.permission_bits().map(|b| b.to_string()),
            dm_permission: self.dm_permission,
        }
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("category", &self.category)
            .field("cooldown", &self.cooldown)
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}

/// Adapts an async closure into a [`CommandHandler`]
struct FnHandler<F>(F);

#[async_trait::async_trait]
impl<F, Fut> CommandHandler for FnHandler<F>
where
    F: Fn(CommandContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), CommandError>> + Send + 'static,
{
    async fn execute(&self, ctx: &CommandContext) -> Result<(), CommandError> {
        (self.0)(ctx.clone()).await
    }
}

/// Command registry, keyed by unique name
#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<String, Arc<Command>>,
    order: Vec<String>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a command, returning the one it replaced
    pub fn register(&mut self, command: Command) -> Option<Arc<Command>> {
        let name = command.name.clone();
        let previous = self.commands.insert(name.clone(), Arc::new(command));
        if previous.is_none() {
            self.order.push(name);
        }
        previous
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Command>> {
        self.commands.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Commands in registration order
    pub fn all(&self) -> impl Iterator<Item = &Arc<Command>> {
        self.order.iter().filter_map(|name| self.commands.get(name))
    }

    pub fn names(&self) -> Vec<String> {
        self.order.clone()
    }

    pub fn by_category(&self) -> Vec<(CommandCategory, Vec<&Arc<Command>>)> {
        CommandCategory::ALL
            .iter()
            .map(|category| {
                let commands = self.all().filter(|c| c.category == *category).collect();
                (*category, commands)
            })
            .collect()
    }

    pub fn application_commands(&self) -> Vec<ApplicationCommand> {
        self.all().map(|c| c.to_application_command()).collect()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

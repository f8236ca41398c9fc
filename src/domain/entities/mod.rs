//! Domain entities - Core bot objects

pub mod command;
pub mod event;
pub mod interaction;
pub mod user;

pub use command::{
    ApplicationCommand, Command, CommandCategory, CommandOption, CommandRegistry, OptionKind,
    Permission,
};
pub use event::{EventDescriptor, EventPayload, GatewayEvent, ReadyInfo};
pub use interaction::{Interaction, InteractionKind, InteractionOption, InteractionReply};
pub use user::{Guild, User};

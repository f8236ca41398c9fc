use std::fmt;
use std::sync::Arc;

use super::{Interaction, User};
use crate::domain::traits::EventHandler;

/// Event identifiers emitted by the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayEvent {
    Ready,
    InteractionCreate,
}

impl GatewayEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            GatewayEvent::Ready => "ready",
            GatewayEvent::InteractionCreate => "interactionCreate",
        }
    }
}

impl fmt::Display for GatewayEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Session summary delivered with the `ready` event
#[derive(Debug, Clone)]
pub struct ReadyInfo {
    pub user: User,
    pub guild_count: usize,
    pub user_count: usize,
}

/// Arguments of an emitted event
#[derive(Debug, Clone)]
pub enum EventPayload {
    Ready(ReadyInfo),
    InteractionCreate(Arc<Interaction>),
}

impl EventPayload {
    pub fn event(&self) -> GatewayEvent {
        match self {
            EventPayload::Ready(_) => GatewayEvent::Ready,
            EventPayload::InteractionCreate(_) => GatewayEvent::InteractionCreate,
        }
    }
}

/// A handler bound to one gateway event
#[derive(Clone)]
pub struct EventDescriptor {
    pub name: GatewayEvent,
    pub once: bool,
    pub handler: Arc<dyn EventHandler>,
}

impl EventDescriptor {
    pub fn on<H: EventHandler + 'static>(name: GatewayEvent, handler: H) -> Self {
        Self {
            name,
            once: false,
            handler: Arc::new(handler),
        }
    }

    pub fn once<H: EventHandler + 'static>(name: GatewayEvent, handler: H) -> Self {
        Self {
            name,
            once: true,
            handler: Arc::new(handler),
        }
    }
}

impl fmt::Debug for EventDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDescriptor")
            .field("name", &self.name)
            .field("once", &self.once)
            .finish()
    }
}

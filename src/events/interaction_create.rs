//! `interactionCreate` - hand slash commands to the dispatcher

use crate::application::messaging::InteractionDispatcher;
use crate::domain::entities::{EventDescriptor, GatewayEvent};
use crate::domain::traits::HandlerEnv;

pub fn descriptor(env: &HandlerEnv) -> EventDescriptor {
    let dispatcher = InteractionDispatcher::new(
        env.registry.clone(),
        env.cooldowns.clone(),
        env.transport.clone(),
    )
    .with_timeout(env.handler_timeout);

    EventDescriptor::on(GatewayEvent::InteractionCreate, dispatcher)
}

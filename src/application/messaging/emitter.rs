//! Event emitter - fans transport events out to subscribed handlers

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::panic_message;
use crate::application::errors::BotError;
use crate::domain::entities::{EventPayload, GatewayEvent};
use crate::domain::traits::EventHandler;

/// Error raised by an event handler, as delivered to the error channel
#[derive(Debug)]
pub struct EventError {
    pub event: GatewayEvent,
    pub error: BotError,
}

struct Subscription {
    handler: Arc<dyn EventHandler>,
    once: bool,
    fired: AtomicBool,
}

/// Subscription table for gateway events.
///
/// Each matching handler runs in its own task, so a slow handler never holds
/// up delivery of later events.
pub struct EventEmitter {
    subscriptions: RwLock<HashMap<GatewayEvent, Vec<Arc<Subscription>>>>,
    errors: Option<mpsc::UnboundedSender<EventError>>,
}

impl EventEmitter {
    pub fn new() -> Self {
        Self {
            subscriptions: RwLock::new(HashMap::new()),
            errors: None,
        }
    }

    /// Route handler errors to `errors` instead of only logging them
    pub fn with_error_channel(mut self, errors: mpsc::UnboundedSender<EventError>) -> Self {
        self.errors = Some(errors);
        self
    }

    /// Subscribe for every occurrence of `event`
    pub fn on(&self, event: GatewayEvent, handler: Arc<dyn EventHandler>) {
        self.subscribe(event, handler, false);
    }

    /// Subscribe for the next occurrence of `event` only
    pub fn once(&self, event: GatewayEvent, handler: Arc<dyn EventHandler>) {
        self.subscribe(event, handler, true);
    }

    pub fn listener_count(&self, event: GatewayEvent) -> usize {
        self.subscriptions
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&event)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Deliver `payload` to its subscribers.
    ///
    /// Handler errors and panics are both logged and forwarded to the error
    /// channel.
    pub fn emit(&self, payload: EventPayload) -> Vec<JoinHandle<()>> {
        let event = payload.event();
        let targets: Vec<Arc<Subscription>> = {
            let mut subscriptions = self.subscriptions.write().unwrap_or_else(|e| e.into_inner());
            let Some(list) = subscriptions.get_mut(&event) else {
                return Vec::new();
            };
            let targets = list
                .iter()
                .filter(|s| !s.once || !s.fired.swap(true, Ordering::AcqRel))
                .cloned()
                .collect();
            list.retain(|s| !s.once || !s.fired.load(Ordering::Acquire));
            targets
        };

        targets
            .into_iter()
            .map(|subscription| {
                let payload = payload.clone();
                let errors = self.errors.clone();
                tokio::spawn(async move {
                    let handler = subscription.handler.clone();
                    let joined = tokio::spawn(async move { handler.execute(payload).await }).await;
                    let result = match joined {
                        Ok(result) => result,
                        Err(e) if e.is_panic() => {
                            Err(BotError::Panicked(panic_message(e.into_panic())))
                        }
                        Err(e) => Err(BotError::Internal(e.to_string())),
                    };
                    if let Err(error) = result {
                        tracing::error!(event = %event, "event handler failed: {}", error);
                        if let Some(errors) = errors {
                            let _ = errors.send(EventError { event, error });
                        }
                    }
                })
            })
            .collect()
    }

    /// Pump events from the transport until the channel closes
    pub async fn run(&self, mut events: mpsc::Receiver<EventPayload>) {
        while let Some(payload) = events.recv().await {
            tracing::debug!(event = %payload.event(), "event received");
            self.emit(payload);
        }
        tracing::debug!("event stream closed");
    }

    fn subscribe(&self, event: GatewayEvent, handler: Arc<dyn EventHandler>, once: bool) {
        let mut subscriptions = self.subscriptions.write().unwrap_or_else(|e| e.into_inner());
        subscriptions.entry(event).or_default().push(Arc::new(Subscription {
            handler,
            once,
            fired: AtomicBool::new(false),
        }));
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Interaction, InteractionReply, ReadyInfo, User};
    use crate::domain::traits::InteractionResponder;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;

    struct Counter(Arc<AtomicUsize>);

    #[async_trait]
    impl EventHandler for Counter {
        async fn execute(&self, _payload: EventPayload) -> Result<(), BotError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct Failing;

    #[async_trait]
    impl EventHandler for Failing {
        async fn execute(&self, _payload: EventPayload) -> Result<(), BotError> {
            Err(BotError::Internal("boom".to_string()))
        }
    }

    struct Exploding;

    #[async_trait]
    impl EventHandler for Exploding {
        async fn execute(&self, _payload: EventPayload) -> Result<(), BotError> {
            panic!("ready handler exploded")
        }
    }

    struct Silent;

    #[async_trait]
    impl InteractionResponder for Silent {
        async fn create_response(&self, _i: &Interaction, _r: &InteractionReply) -> Result<(), BotError> {
            Ok(())
        }

        async fn defer_response(&self, _i: &Interaction, _ephemeral: bool) -> Result<(), BotError> {
            Ok(())
        }

        async fn create_followup(&self, _i: &Interaction, _r: &InteractionReply) -> Result<(), BotError> {
            Ok(())
        }

        async fn edit_response(&self, _i: &Interaction, _content: &str) -> Result<(), BotError> {
            Ok(())
        }
    }

    fn interaction(name: &str) -> EventPayload {
        let responder: Arc<dyn InteractionResponder> = Arc::new(Silent);
        EventPayload::InteractionCreate(Arc::new(Interaction::command(
            name,
            User::new("u1", "pinga"),
            responder,
        )))
    }

    fn ready() -> EventPayload {
        EventPayload::Ready(ReadyInfo {
            user: User::new("b1", "pingu-bot").as_bot(),
            guild_count: 1,
            user_count: 2,
        })
    }

    async fn join_all(handles: Vec<JoinHandle<()>>) {
        for handle in handles {
            handle.await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_once_fires_a_single_time() {
        let emitter = EventEmitter::new();
        let hits = Arc::new(AtomicUsize::new(0));
        emitter.once(GatewayEvent::Ready, Arc::new(Counter(hits.clone())));

        join_all(emitter.emit(ready())).await;
        join_all(emitter.emit(ready())).await;

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(emitter.listener_count(GatewayEvent::Ready), 0);
    }

    #[tokio::test]
    async fn test_on_fires_every_time_for_matching_event_only() {
        let emitter = EventEmitter::new();
        let hits = Arc::new(AtomicUsize::new(0));
        emitter.on(GatewayEvent::InteractionCreate, Arc::new(Counter(hits.clone())));

        join_all(emitter.emit(interaction("ping"))).await;
        join_all(emitter.emit(interaction("help"))).await;
        join_all(emitter.emit(ready())).await;

        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_handler_errors_reach_error_channel() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let emitter = EventEmitter::new().with_error_channel(tx);
        emitter.on(GatewayEvent::Ready, Arc::new(Failing));

        join_all(emitter.emit(ready())).await;

        let err = rx.recv().await.unwrap();
        assert_eq!(err.event, GatewayEvent::Ready);
        assert!(err.error.to_string().contains("boom"));
    }

    #[tokio::test]
    async fn test_handler_panics_reach_error_channel() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let emitter = EventEmitter::new().with_error_channel(tx);
        emitter.on(GatewayEvent::Ready, Arc::new(Exploding));

        let (events, stream) = mpsc::channel(1);
        events.send(ready()).await.unwrap();
        drop(events);
        emitter.run(stream).await;

        let err = tokio::time::timeout(std::time::Duration::from_secs(5), rx.recv())
            .await
            .expect("no error delivered")
            .unwrap();
        assert_eq!(err.event, GatewayEvent::Ready);
        match err.error {
            BotError::Panicked(message) => assert_eq!(message, "ready handler exploded"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_panicking_handler_does_not_stop_later_events() {
        let emitter = EventEmitter::new();
        let hits = Arc::new(AtomicUsize::new(0));
        emitter.on(GatewayEvent::Ready, Arc::new(Exploding));
        emitter.on(GatewayEvent::Ready, Arc::new(Counter(hits.clone())));

        join_all(emitter.emit(ready())).await;
        join_all(emitter.emit(ready())).await;

        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_run_drains_channel() {
        let emitter = EventEmitter::new();
        let hits = Arc::new(AtomicUsize::new(0));
        emitter.on(GatewayEvent::Ready, Arc::new(Counter(hits.clone())));

        let (tx, rx) = mpsc::channel(4);
        tx.send(ready()).await.unwrap();
        tx.send(ready()).await.unwrap();
        drop(tx);
        emitter.run(rx).await;

        // handlers were spawned; give them a chance to finish
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }
}

//! Shared test doubles
#![allow(dead_code)]

use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use pingu_bot::application::errors::BotError;
use pingu_bot::domain::entities::{
    ApplicationCommand, Command, CommandCategory, EventDescriptor, EventPayload, Interaction,
    InteractionReply, User,
};
use pingu_bot::domain::traits::{
    Activity, CommandPublisher, HandlerEnv, HandlerSource, InteractionResponder, Transport,
};

static INIT: Once = Once::new();

/// Install a test subscriber so `RUST_LOG` works under `cargo test`
pub fn ensure_init() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Ordered record of calls across all doubles
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn position(&self, entry: &str) -> Option<usize> {
        self.entries().iter().position(|e| e == entry)
    }
}

/// What a responder was asked to send
#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Reply(InteractionReply),
    Defer,
    FollowUp(InteractionReply),
    Edit(String),
}

#[derive(Default)]
pub struct RecordingResponder {
    sent: Mutex<Vec<Sent>>,
}

impl RecordingResponder {
    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn contents(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Reply(r) | Sent::FollowUp(r) => Some(r.content),
                Sent::Edit(content) => Some(content),
                Sent::Defer => None,
            })
            .collect()
    }
}

#[async_trait]
impl InteractionResponder for RecordingResponder {
    async fn create_response(&self, _i: &Interaction, reply: &InteractionReply) -> Result<(), BotError> {
        self.sent.lock().unwrap().push(Sent::Reply(reply.clone()));
        Ok(())
    }

    async fn defer_response(&self, _i: &Interaction, _ephemeral: bool) -> Result<(), BotError> {
        self.sent.lock().unwrap().push(Sent::Defer);
        Ok(())
    }

    async fn create_followup(&self, _i: &Interaction, reply: &InteractionReply) -> Result<(), BotError> {
        self.sent.lock().unwrap().push(Sent::FollowUp(reply.clone()));
        Ok(())
    }

    async fn edit_response(&self, _i: &Interaction, content: &str) -> Result<(), BotError> {
        self.sent.lock().unwrap().push(Sent::Edit(content.to_string()));
        Ok(())
    }
}

/// Transport that records lifecycle calls and lets the test push events
#[derive(Default)]
pub struct MockTransport {
    journal: Journal,
    events: Mutex<Option<mpsc::Sender<EventPayload>>>,
    activity: Mutex<Option<Activity>>,
    fail_login: bool,
}

impl MockTransport {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            ..Default::default()
        }
    }

    pub fn failing(journal: Journal) -> Self {
        Self {
            journal,
            fail_login: true,
            ..Default::default()
        }
    }

    pub async fn emit(&self, payload: EventPayload) {
        let sender = self.events.lock().unwrap().clone().expect("not logged in");
        sender.send(payload).await.expect("event stream closed");
    }

    /// Drop the event sender, ending the stream
    pub fn close(&self) {
        self.events.lock().unwrap().take();
    }

    pub fn activity(&self) -> Option<Activity> {
        self.activity.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn login(&self, token: &str, events: mpsc::Sender<EventPayload>) -> Result<(), BotError> {
        self.journal.push("login");
        if self.fail_login {
            return Err(BotError::Auth(format!("bad token {}", token)));
        }
        *self.events.lock().unwrap() = Some(events);
        Ok(())
    }

    async fn destroy(&self) {
        self.journal.push("destroy");
        self.events.lock().unwrap().take();
    }

    fn ws_latency(&self) -> Option<Duration> {
        Some(Duration::from_millis(42))
    }

    async fn set_activity(&self, activity: Activity) -> Result<(), BotError> {
        *self.activity.lock().unwrap() = Some(activity);
        Ok(())
    }

    fn bot_user(&self) -> Option<User> {
        Some(User::new("b1", "pingu-bot").as_bot())
    }
}

/// Publisher that records what it was asked to publish
#[derive(Default)]
pub struct MockPublisher {
    journal: Journal,
    published: Mutex<Vec<ApplicationCommand>>,
    fail: bool,
}

impl MockPublisher {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            ..Default::default()
        }
    }

    pub fn failing(journal: Journal) -> Self {
        Self {
            journal,
            fail: true,
            ..Default::default()
        }
    }

    pub fn published_names(&self) -> Vec<String> {
        self.published
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.name.clone())
            .collect()
    }
}

#[async_trait]
impl CommandPublisher for MockPublisher {
    async fn publish(&self, commands: &[ApplicationCommand]) -> Result<(), BotError> {
        self.journal.push("publish");
        if self.fail {
            return Err(BotError::Publish {
                status: 400,
                body: "invalid form body".to_string(),
            });
        }
        *self.published.lock().unwrap() = commands.to_vec();
        Ok(())
    }
}

/// Wraps a source and notes when commands and events are requested
pub struct JournaledSource<S> {
    inner: S,
    journal: Journal,
}

impl<S> JournaledSource<S> {
    pub fn new(inner: S, journal: Journal) -> Self {
        Self { inner, journal }
    }
}

impl<S: HandlerSource> HandlerSource for JournaledSource<S> {
    fn commands(&self, category: CommandCategory) -> Result<Option<Vec<Command>>, BotError> {
        self.journal.push(format!("commands:{}", category));
        self.inner.commands(category)
    }

    fn events(&self, env: &HandlerEnv) -> Result<Option<Vec<EventDescriptor>>, BotError> {
        self.journal.push("events");
        self.inner.events(env)
    }
}

pub fn command_from(
    user: User,
    name: &str,
    responder: &Arc<RecordingResponder>,
) -> Arc<Interaction> {
    let responder: Arc<dyn InteractionResponder> = responder.clone();
    Arc::new(Interaction::command(name, user, responder))
}

/// Poll `check` until it holds or a second passes
pub async fn eventually<F: Fn() -> bool>(check: F) -> bool {
    for _ in 0..100 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}

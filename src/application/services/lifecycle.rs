//! Bot lifecycle - ordered startup and signal-driven shutdown

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::loader::HandlerLoader;
use crate::application::errors::{BotError, BotResult};
use crate::application::messaging::{CooldownTracker, EventEmitter};
use crate::domain::entities::CommandRegistry;
use crate::domain::traits::{CommandPublisher, HandlerEnv, HandlerSource, Transport};

/// Capacity of the transport -> emitter channel
const EVENT_BUFFER: usize = 256;

/// Runtime knobs for a [`Bot`]
#[derive(Debug, Clone)]
pub struct BotSettings {
    pub token: String,
    pub handler_timeout: Option<Duration>,
    pub cooldown_sweep: Option<Duration>,
}

impl BotSettings {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            handler_timeout: None,
            cooldown_sweep: None,
        }
    }

    pub fn with_handler_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.handler_timeout = timeout;
        self
    }

    /// A zero period disables the sweeper
    pub fn with_cooldown_sweep(mut self, period: Option<Duration>) -> Self {
        self.cooldown_sweep = period.filter(|p| !p.is_zero());
        self
    }
}

/// Owns every long-lived component and drives them through startup
/// (commands, events, publish, login) and shutdown.
pub struct Bot {
    settings: BotSettings,
    transport: Arc<dyn Transport>,
    publisher: Arc<dyn CommandPublisher>,
    loader: HandlerLoader,
    registry: Arc<CommandRegistry>,
    cooldowns: Arc<CooldownTracker>,
    emitter: Arc<EventEmitter>,
    events_loaded: bool,
    pump: Option<JoinHandle<()>>,
    tasks: Vec<JoinHandle<()>>,
}

impl Bot {
    pub fn new(
        settings: BotSettings,
        transport: Arc<dyn Transport>,
        publisher: Arc<dyn CommandPublisher>,
        source: Arc<dyn HandlerSource>,
    ) -> Self {
        Self {
            settings,
            transport,
            publisher,
            loader: HandlerLoader::new(source),
            registry: Arc::new(CommandRegistry::new()),
            cooldowns: Arc::new(CooldownTracker::new()),
            emitter: Arc::new(EventEmitter::new()),
            events_loaded: false,
            pump: None,
            tasks: Vec::new(),
        }
    }

    /// Use `emitter`, e.g. one built with an error channel
    pub fn with_emitter(mut self, emitter: EventEmitter) -> Self {
        self.emitter = Arc::new(emitter);
        self
    }

    pub fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }

    pub fn cooldowns(&self) -> &Arc<CooldownTracker> {
        &self.cooldowns
    }

    pub fn emitter(&self) -> &Arc<EventEmitter> {
        &self.emitter
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Components handed to event handlers
    pub fn handler_env(&self) -> HandlerEnv {
        HandlerEnv {
            registry: self.registry.clone(),
            cooldowns: self.cooldowns.clone(),
            transport: self.transport.clone(),
            handler_timeout: self.settings.handler_timeout,
        }
    }

    /// Fill the registry from the handler source.
    ///
    /// Must run before events are loaded: event handlers share the registry
    /// and it is frozen from then on.
    pub fn load_commands(&mut self) -> BotResult<usize> {
        let registry = Arc::get_mut(&mut self.registry)
            .ok_or_else(|| BotError::Internal("command registry is already in use".to_string()))?;
        self.loader.load_commands(registry)
    }

    /// Install event subscriptions; a second call is refused
    pub fn load_events(&mut self) -> BotResult<usize> {
        if self.events_loaded {
            tracing::warn!("Events already loaded, skipping duplicate subscriptions");
            return Ok(0);
        }
        let env = self.handler_env();
        let count = self.loader.load_events(&env, &self.emitter)?;
        self.events_loaded = true;
        Ok(count)
    }

    /// Replace the remote command catalog with the registered commands
    pub async fn register_slash_commands(&self) -> BotResult<()> {
        let commands = self.registry.application_commands();
        self.publisher.publish(&commands).await
    }

    /// Run the startup sequence; any failure aborts it
    pub async fn start(&mut self) -> BotResult<()> {
        tracing::info!("Starting Pingu Bot...");
        match self.boot().await {
            Ok(()) => {
                tracing::info!("Pingu Bot started successfully!");
                Ok(())
            }
            Err(e) => {
                tracing::error!("Failed to start bot: {}", e);
                Err(e)
            }
        }
    }

    /// Start, then serve until SIGINT/SIGTERM or the event stream ends
    pub async fn run(&mut self) -> BotResult<()> {
        self.start().await?;

        let reason = match self.pump.take() {
            Some(mut pump) => {
                tokio::select! {
                    signal = shutdown_signal() => signal?,
                    _ = &mut pump => "event stream closed",
                }
            }
            None => shutdown_signal().await?,
        };

        tracing::info!("Received {}, shutting down", reason);
        self.shutdown().await;
        Ok(())
    }

    /// Disconnect and stop background tasks. In-flight handlers are not awaited.
    pub async fn shutdown(&mut self) {
        tracing::info!("Shutting down Pingu Bot...");
        self.transport.destroy().await;
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }

    async fn boot(&mut self) -> BotResult<()> {
        self.load_commands()?;
        self.load_events()?;
        self.register_slash_commands().await?;
        self.login().await
    }

    async fn login(&mut self) -> BotResult<()> {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let emitter = self.emitter.clone();
        let pump = tokio::spawn(async move { emitter.run(rx).await });

        if let Err(e) = self.transport.login(&self.settings.token, tx).await {
            pump.abort();
            return Err(e);
        }
        self.pump = Some(pump);

        if let Some(period) = self.settings.cooldown_sweep.filter(|p| !p.is_zero()) {
            self.tasks.push(self.cooldowns.spawn_sweeper(period));
        }
        Ok(())
    }
}

impl Drop for Bot {
    fn drop(&mut self) {
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

/// Drive `future` on `runtime` and return its exit status.
///
/// A panic that escapes the future is an uncaught top-level fault and maps
/// to status 1.
pub fn exit_status<F>(runtime: &tokio::runtime::Runtime, future: F) -> i32
where
    F: Future<Output = i32>,
{
    match std::panic::catch_unwind(AssertUnwindSafe(|| runtime.block_on(future))) {
        Ok(code) => code,
        Err(_) => {
            tracing::error!("Uncaught fault, exiting");
            1
        }
    }
}

#[cfg(unix)]
async fn shutdown_signal() -> BotResult<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| BotError::Internal(format!("failed to install SIGTERM handler: {}", e)))?;

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result.map_err(|e| BotError::Internal(format!("failed to listen for ctrl-c: {}", e)))?;
            Ok("SIGINT")
        }
        _ = sigterm.recv() => Ok("SIGTERM"),
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() -> BotResult<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| BotError::Internal(format!("failed to listen for ctrl-c: {}", e)))?;
    Ok("ctrl-c")
}

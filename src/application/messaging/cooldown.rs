//! Per-command, per-user cooldowns
//!
//! Entries expire lazily: an expired entry reads as absent and is dropped the
//! next time its command is touched. [`CooldownTracker::spawn_sweeper`] adds a
//! periodic purge so users who never come back do not accumulate.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Shortest interval the background sweeper runs at
pub const MIN_SWEEP_PERIOD: Duration = Duration::from_secs(1);

/// Outcome of a cooldown check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownStatus {
    Ready,
    Active { remaining: Duration },
}

impl CooldownStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, CooldownStatus::Ready)
    }
}

/// command name -> user id -> expiry
type Timestamps = HashMap<String, HashMap<String, Instant>>;

#[derive(Default)]
pub struct CooldownTracker {
    entries: Mutex<Timestamps>,
}

impl CooldownTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// `Ready` when the user may run the command now
    pub fn check(&self, command: &str, user_id: &str) -> CooldownStatus {
        let mut entries = self.lock();
        Self::status(&mut entries, command, user_id, Instant::now())
    }

    /// Start (or restart) the window for this user
    pub fn record(&self, command: &str, user_id: &str, cooldown: Duration) {
        let mut entries = self.lock();
        entries
            .entry(command.to_string())
            .or_default()
            .insert(user_id.to_string(), Instant::now() + cooldown);
    }

    /// Check and record under a single lock.
    ///
    /// Returns `Active` without touching the entry when the window is still open.
    pub fn try_acquire(&self, command: &str, user_id: &str, cooldown: Duration) -> CooldownStatus {
        let now = Instant::now();
        let mut entries = self.lock();

        let status = Self::status(&mut entries, command, user_id, now);
        if status.is_ready() {
            entries
                .entry(command.to_string())
                .or_default()
                .insert(user_id.to_string(), now + cooldown);
        }
        status
    }

    /// Expiry of a live entry
    pub fn entry(&self, command: &str, user_id: &str) -> Option<Instant> {
        let now = Instant::now();
        let mut entries = self.lock();
        match Self::status(&mut entries, command, user_id, now) {
            CooldownStatus::Ready => None,
            CooldownStatus::Active { remaining } => Some(now + remaining),
        }
    }

    /// Drop every expired entry, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.lock();
        let mut removed = 0;

        entries.retain(|_, users| {
            let before = users.len();
            users.retain(|_, expiry| *expiry > now);
            removed += before - users.len();
            !users.is_empty()
        });

        removed
    }

    /// Number of stored entries, expired ones included
    pub fn len(&self) -> usize {
        self.lock().values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Purge expired entries every `period` until the task is aborted.
    /// A zero period is raised to [`MIN_SWEEP_PERIOD`].
    pub fn spawn_sweeper(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        if period < MIN_SWEEP_PERIOD {
            tracing::warn!(?period, "cooldown sweep period too short, using {:?}", MIN_SWEEP_PERIOD);
        }
        let period = period.max(MIN_SWEEP_PERIOD);
        let tracker = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(tracker) = tracker.upgrade() else {
                    break;
                };
                let removed = tracker.purge_expired();
                if removed > 0 {
                    tracing::debug!(removed, "purged expired cooldowns");
                }
            }
        })
    }

    fn status(entries: &mut Timestamps, command: &str, user_id: &str, now: Instant) -> CooldownStatus {
        let Some(users) = entries.get_mut(command) else {
            return CooldownStatus::Ready;
        };

        match users.get(user_id) {
            Some(expiry) if *expiry > now => CooldownStatus::Active {
                remaining: *expiry - now,
            },
            Some(_) => {
                users.remove(user_id);
                if users.is_empty() {
                    entries.remove(command);
                }
                CooldownStatus::Ready
            }
            None => CooldownStatus::Ready,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Timestamps> {
        // The map is always left consistent, so a poisoned lock is still usable.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

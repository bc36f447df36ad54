//! The healing daemon: restores HP to registered heroes on a fixed tick.
//!
//! Each registered hero gets its own task that reads the hero record,
//! applies one heal, persists the store, and sleeps. A loop ends when the
//! hero reaches full health, dies, disappears from the store, or is
//! explicitly stopped. Unexpected store errors are logged and retried
//! after a short pause, indefinitely.
//!
//! The save file is shared with the web process, which damages and creates
//! heroes behind the daemon's back. Every operation reloads the store from
//! disk before reading, so heals apply to fresh state and a save never
//! writes back a stale world.
//!
//! The registry (hero id -> last heal time) is persisted to
//! `healing_state.json` so healing resumes across daemon restarts, and a
//! status snapshot is published for other processes. State-file I/O errors
//! are never fatal; the registry just starts empty or goes unsaved.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::channel::{CommandChannel, DaemonCommand, DaemonStatus, HealingStatus};
use crate::config::Config;
use crate::hero::HeroId;
use crate::store::{write_atomic, GameStore, StoreError};

/// Tunables for the daemon, split out from [`Config`] so tests can run
/// with millisecond ticks.
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub heal_interval: Duration,
    pub heal_amount: i32,
    pub sweep_interval: Duration,
    pub retry_interval: Duration,
    pub state_path: PathBuf,
    pub command_path: PathBuf,
    pub status_path: PathBuf,
}

impl DaemonConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            heal_interval: config.heal_interval,
            heal_amount: config.heal_amount,
            sweep_interval: config.sweep_interval,
            retry_interval: config.retry_interval,
            state_path: config.state_path(),
            command_path: config.command_path(),
            status_path: config.status_path(),
        }
    }
}

/// A hero's entry in the persisted healing state.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct HealState {
    last_heal: DateTime<Utc>,
    active: bool,
}

struct HealEntry {
    last_heal: DateTime<Utc>,
    task: Option<JoinHandle<()>>,
}

/// Outcome of one heal-loop iteration.
enum Tick {
    Healed {
        name: String,
        old_health: i32,
        new_health: i32,
        max_health: i32,
    },
    Full(String),
    Dead(String),
    Gone,
    Retry(StoreError),
}

/// Shared handle to the game store.
pub type SharedStore = Arc<Mutex<GameStore>>;

/// The daemon itself. Cheap to clone; clones share the registry.
#[derive(Clone)]
pub struct HealingDaemon {
    store: SharedStore,
    registry: Arc<Mutex<HashMap<HeroId, HealEntry>>>,
    config: Arc<DaemonConfig>,
    channel: CommandChannel,
}

impl HealingDaemon {
    pub fn new(store: SharedStore, config: DaemonConfig) -> Self {
        let channel = CommandChannel::new(&config.command_path);
        Self {
            store,
            registry: Arc::new(Mutex::new(HashMap::new())),
            config: Arc::new(config),
            channel,
        }
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    /// Load persisted healing state and restart loops for active entries.
    ///
    /// Heroes that no longer need healing stop again on their first tick.
    pub async fn resume(&self) {
        let state = match self.load_state().await {
            Ok(state) => state,
            Err(err) => {
                warn!(%err, "could not load healing state, starting empty");
                return;
            }
        };
        let count = state.len();
        for (hero_id, entry) in state {
            if !entry.active {
                continue;
            }
            if let Err(err) = self.start_hero_healing(hero_id).await {
                warn!(hero_id, %err, "could not resume healing");
            }
        }
        if count > 0 {
            info!(heroes = count, "loaded healing state");
        }
    }

    async fn load_state(&self) -> Result<HashMap<HeroId, HealState>, std::io::Error> {
        match fs::read_to_string(&self.config.state_path).await {
            Ok(content) => Ok(serde_json::from_str(&content).unwrap_or_default()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(HashMap::new()),
            Err(err) => Err(err),
        }
    }

    /// Persist the registry. Failures are logged, never fatal.
    async fn save_state(&self) {
        let state: HashMap<HeroId, HealState> = {
            let registry = self.registry.lock().await;
            registry
                .iter()
                .map(|(id, entry)| {
                    (
                        *id,
                        HealState {
                            last_heal: entry.last_heal,
                            active: true,
                        },
                    )
                })
                .collect()
        };
        let content = match serde_json::to_string_pretty(&state) {
            Ok(content) => content,
            Err(err) => {
                warn!(%err, "could not serialize healing state");
                return;
            }
        };
        if let Err(err) = write_atomic(&self.config.state_path, &content).await {
            warn!(%err, "could not save healing state");
        }
    }

    /// Register a hero and start its healing loop.
    ///
    /// Returns Ok(false) if the hero is already at full health (nothing
    /// registered), Ok(true) if a loop is running (newly started or
    /// already present).
    pub async fn start_hero_healing(&self, hero_id: HeroId) -> Result<bool, StoreError> {
        let hero = {
            let mut store = self.store.lock().await;
            store.reload().await?;
            store.hero(hero_id)?.clone()
        };
        if hero.is_full_health() {
            debug!(hero = %hero.name, "already at full health");
            return Ok(false);
        }

        let mut registry = self.registry.lock().await;
        if registry.contains_key(&hero_id) {
            debug!(hero = %hero.name, "already being healed");
            return Ok(true);
        }

        // Register before spawning so the loop's membership check cannot
        // race a fast first iteration.
        registry.insert(
            hero_id,
            HealEntry {
                last_heal: Utc::now(),
                task: None,
            },
        );
        drop(registry);

        let daemon = self.clone();
        let task = tokio::spawn(async move {
            daemon.heal_loop(hero_id).await;
        });
        {
            let mut registry = self.registry.lock().await;
            match registry.get_mut(&hero_id) {
                Some(entry) => entry.task = Some(task),
                // Stopped before we got here.
                None => task.abort(),
            }
        }

        self.save_state().await;
        info!(hero = %hero.name, hero_id, "started healing");
        Ok(true)
    }

    /// Deregister a hero and cancel its loop.
    pub async fn stop_hero_healing(&self, hero_id: HeroId) -> bool {
        let entry = {
            let mut registry = self.registry.lock().await;
            registry.remove(&hero_id)
        };
        match entry {
            Some(entry) => {
                if let Some(task) = entry.task {
                    task.abort();
                }
                self.save_state().await;
                info!(hero_id, "stopped healing");
                true
            }
            None => false,
        }
    }

    /// Deregister from within the hero's own loop (no abort).
    async fn finish_healing(&self, hero_id: HeroId) {
        let removed = {
            let mut registry = self.registry.lock().await;
            registry.remove(&hero_id).is_some()
        };
        if removed {
            self.save_state().await;
        }
    }

    pub async fn is_healing(&self, hero_id: HeroId) -> bool {
        self.registry.lock().await.contains_key(&hero_id)
    }

    pub async fn healing_count(&self) -> usize {
        self.registry.lock().await.len()
    }

    async fn heal_loop(&self, hero_id: HeroId) {
        loop {
            if !self.is_healing(hero_id).await {
                break;
            }

            // Reload, heal, and persist under one store lock so a concurrent
            // damage or rest can never be overwritten by a stale heal, and
            // writes from the web process are picked up before each tick.
            let tick = {
                let mut store = self.store.lock().await;
                let fetched = match store.reload().await {
                    Ok(()) => store.hero(hero_id).cloned(),
                    Err(err) => Err(err),
                };
                match fetched {
                    Err(StoreError::HeroNotFound(_)) => Tick::Gone,
                    Err(err) => Tick::Retry(err),
                    Ok(hero) if hero.is_full_health() => Tick::Full(hero.name),
                    Ok(hero) if hero.is_dead() => Tick::Dead(hero.name),
                    Ok(mut hero) => {
                        let old_health = hero.current_health;
                        hero.heal(self.config.heal_amount);
                        let name = hero.name.clone();
                        let new_health = hero.current_health;
                        let max_health = hero.max_health;
                        let persisted = match store.put_hero(hero) {
                            Ok(()) => store.save().await,
                            Err(err) => Err(err),
                        };
                        match persisted {
                            Ok(()) => Tick::Healed {
                                name,
                                old_health,
                                new_health,
                                max_health,
                            },
                            Err(err) => Tick::Retry(err),
                        }
                    }
                }
            };

            match tick {
                Tick::Gone => {
                    warn!(hero_id, "hero no longer exists, stopping healing");
                    self.finish_healing(hero_id).await;
                    break;
                }
                Tick::Full(name) => {
                    info!(hero = %name, "fully healed, stopping");
                    self.finish_healing(hero_id).await;
                    break;
                }
                Tick::Dead(name) => {
                    info!(hero = %name, "hero is dead, stopping healing");
                    self.finish_healing(hero_id).await;
                    break;
                }
                Tick::Retry(err) => {
                    warn!(hero_id, %err, "error healing hero, retrying");
                    tokio::time::sleep(self.config.retry_interval).await;
                }
                Tick::Healed {
                    name,
                    old_health,
                    new_health,
                    max_health,
                } => {
                    debug!(hero = %name, old_health, new_health, max_health, "healed hero");
                    {
                        let mut registry = self.registry.lock().await;
                        if let Some(entry) = registry.get_mut(&hero_id) {
                            entry.last_heal = Utc::now();
                        }
                    }
                    self.save_state().await;
                    tokio::time::sleep(self.config.heal_interval).await;
                }
            }
        }
    }

    /// Instantly restore a hero to full health, stopping any loop.
    ///
    /// Returns Ok(false) if the hero was already full.
    pub async fn rest_hero(&self, hero_id: HeroId) -> Result<bool, StoreError> {
        let rested = {
            let mut store = self.store.lock().await;
            store.reload().await?;
            let mut hero = store.hero(hero_id)?.clone();
            if hero.is_full_health() {
                debug!(hero = %hero.name, "already at full health");
                false
            } else {
                let old_health = hero.current_health;
                hero.current_health = hero.max_health;
                let name = hero.name.clone();
                let max = hero.max_health;
                store.put_hero(hero)?;
                store.save().await?;
                info!(hero = %name, old_health, new_health = max, "hero rested");
                true
            }
        };
        if rested {
            self.stop_hero_healing(hero_id).await;
        }
        Ok(rested)
    }

    /// Damage a hero, then start healing if it survived below max.
    /// Damaging a hero to zero stops any active loop.
    pub async fn damage_hero(&self, hero_id: HeroId, amount: i32) -> Result<(), StoreError> {
        let (needs_healing, dead) = {
            let mut store = self.store.lock().await;
            store.reload().await?;
            let mut hero = store.hero(hero_id)?.clone();
            let old_health = hero.current_health;
            let needs_healing = hero.take_damage(amount);
            info!(
                hero = %hero.name,
                old_health,
                new_health = hero.current_health,
                max_health = hero.max_health,
                "damaged hero"
            );
            let dead = hero.is_dead();
            store.put_hero(hero)?;
            store.save().await?;
            (needs_healing, dead)
        };

        if dead {
            self.stop_hero_healing(hero_id).await;
        } else if needs_healing {
            self.start_hero_healing(hero_id).await?;
        }
        Ok(())
    }

    /// Snapshot the healing registry.
    pub async fn status(&self) -> DaemonStatus {
        let entries: Vec<(HeroId, DateTime<Utc>)> = {
            let registry = self.registry.lock().await;
            registry
                .iter()
                .map(|(id, entry)| (*id, entry.last_heal))
                .collect()
        };

        let mut store = self.store.lock().await;
        if let Err(err) = store.reload().await {
            warn!(%err, "could not reload store for status snapshot");
        }
        let mut healing = Vec::with_capacity(entries.len());
        for (hero_id, last_heal) in entries {
            let (name, current_health, max_health) = match store.hero(hero_id) {
                Ok(hero) => (hero.name.clone(), hero.current_health, hero.max_health),
                Err(_) => ("<missing>".to_string(), 0, 0),
            };
            healing.push(HealingStatus {
                hero_id,
                name,
                current_health,
                max_health,
                last_heal: Some(last_heal),
            });
        }
        healing.sort_by_key(|h| h.hero_id);

        DaemonStatus {
            running: true,
            updated_at: Utc::now(),
            healing,
        }
    }

    /// Write the status snapshot to `daemon_status.json`.
    pub async fn publish_status(&self) {
        let status = self.status().await;
        if let Err(err) = status.write(&self.config.status_path).await {
            warn!(%err, "could not write daemon status");
        }
    }

    /// Apply a command received over the file channel.
    pub async fn apply_command(&self, command: DaemonCommand) -> Result<(), StoreError> {
        match command {
            DaemonCommand::StartHealing { hero_id } => {
                self.start_hero_healing(hero_id).await.map(|_| ())
            }
            DaemonCommand::StopHealing { hero_id } => {
                self.stop_hero_healing(hero_id).await;
                Ok(())
            }
            DaemonCommand::RestHero { hero_id } => self.rest_hero(hero_id).await.map(|_| ()),
            DaemonCommand::DamageHero { hero_id, amount } => {
                self.damage_hero(hero_id, amount).await
            }
        }
    }

    /// One passive-mode iteration: drain the command slot, then register
    /// every alive, out-of-combat hero below max health.
    pub async fn sweep(&self) {
        match self.channel.take().await {
            Ok(Some(pending)) => {
                info!(command = ?pending.command, "received daemon command");
                if let Err(err) = self.apply_command(pending.command).await {
                    warn!(%err, "error applying daemon command");
                }
            }
            Ok(None) => {}
            Err(err) => warn!(%err, "error polling command file"),
        }

        let candidates: Vec<HeroId> = {
            let mut store = self.store.lock().await;
            match store.reload().await {
                Ok(()) => store
                    .heroes()
                    .filter(|h| !h.in_combat && !h.is_dead() && !h.is_full_health())
                    .map(|h| h.id)
                    .collect(),
                Err(err) => {
                    warn!(%err, "could not reload store for sweep");
                    Vec::new()
                }
            }
        };
        for hero_id in candidates {
            if self.is_healing(hero_id).await {
                continue;
            }
            if let Err(err) = self.start_hero_healing(hero_id).await {
                warn!(hero_id, %err, "error starting passive healing");
            }
        }

        self.publish_status().await;
    }

    /// Passive mode: sweep forever. Runs until the task is cancelled.
    pub async fn run_passive(&self) {
        info!(
            interval_secs = self.config.sweep_interval.as_secs(),
            "passive healing mode started"
        );
        loop {
            self.sweep().await;
            tokio::time::sleep(self.config.sweep_interval).await;
        }
    }

    /// Cancel all loops and save state for the next start.
    pub async fn shutdown(&self) {
        let tasks: Vec<JoinHandle<()>> = {
            let mut registry = self.registry.lock().await;
            registry
                .values_mut()
                .filter_map(|entry| entry.task.take())
                .collect()
        };
        for task in tasks {
            task.abort();
        }
        self.save_state().await;
        let status = DaemonStatus {
            running: false,
            updated_at: Utc::now(),
            healing: Vec::new(),
        };
        if let Err(err) = status.write(&self.config.status_path).await {
            warn!(%err, "could not write daemon status");
        }
        info!("healing daemon shut down");
    }
}

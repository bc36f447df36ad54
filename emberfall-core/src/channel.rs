//! File-based signaling between the web process and the healing daemon.
//!
//! The command file is a single slot: each send overwrites the previous
//! command and there is no acknowledgement, so only the most recent command
//! is ever visible. Writes are atomic (temp file + rename) and the daemon
//! consumes a command by renaming the file away before reading it, so a
//! poll never observes a torn file or applies a command twice.
//!
//! The status file flows the other way: the daemon overwrites it with a
//! snapshot of its healing registry for anyone who cares to look.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;

use crate::hero::HeroId;
use crate::store::write_atomic;

/// Errors from channel file operations.
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A command for the healing daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum DaemonCommand {
    StartHealing { hero_id: HeroId },
    StopHealing { hero_id: HeroId },
    RestHero { hero_id: HeroId },
    DamageHero { hero_id: HeroId, amount: i32 },
}

/// A command as stored in the file, with its send time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingCommand {
    #[serde(flatten)]
    pub command: DaemonCommand,
    pub timestamp: DateTime<Utc>,
}

/// The single-slot command file.
#[derive(Debug, Clone)]
pub struct CommandChannel {
    path: PathBuf,
}

impl CommandChannel {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrite the slot with a new command. Last write wins.
    pub async fn send(&self, command: DaemonCommand) -> Result<(), ChannelError> {
        let pending = PendingCommand {
            command,
            timestamp: Utc::now(),
        };
        let content = serde_json::to_string(&pending)?;
        write_atomic(&self.path, &content).await?;
        tracing::debug!(?command, "sent daemon command");
        Ok(())
    }

    /// Take the pending command, if any, consuming the slot.
    pub async fn take(&self) -> Result<Option<PendingCommand>, ChannelError> {
        let taken = self.path.with_extension("taken");
        match fs::rename(&self.path, &taken).await {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        }
        let content = fs::read_to_string(&taken).await?;
        fs::remove_file(&taken).await?;
        let pending: PendingCommand = serde_json::from_str(&content)?;
        Ok(Some(pending))
    }
}

/// One hero's entry in the daemon status snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealingStatus {
    pub hero_id: HeroId,
    pub name: String,
    pub current_health: i32,
    pub max_health: i32,
    pub last_heal: Option<DateTime<Utc>>,
}

/// Snapshot of the daemon's healing registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonStatus {
    pub running: bool,
    pub updated_at: DateTime<Utc>,
    pub healing: Vec<HealingStatus>,
}

impl DaemonStatus {
    /// Write the snapshot, overwriting any previous one.
    pub async fn write(&self, path: &Path) -> Result<(), ChannelError> {
        let content = serde_json::to_string_pretty(self)?;
        write_atomic(path, &content).await?;
        Ok(())
    }

    /// Read the last snapshot, or None if the daemon never wrote one.
    pub async fn read(path: &Path) -> Result<Option<Self>, ChannelError> {
        match fs::read_to_string(path).await {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn take_on_empty_slot_is_none() {
        let dir = TempDir::new().unwrap();
        let channel = CommandChannel::new(dir.path().join("daemon_commands.json"));
        assert!(channel.take().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn last_write_wins() {
        let dir = TempDir::new().unwrap();
        let channel = CommandChannel::new(dir.path().join("daemon_commands.json"));

        channel
            .send(DaemonCommand::StartHealing { hero_id: 1 })
            .await
            .unwrap();
        channel
            .send(DaemonCommand::DamageHero { hero_id: 2, amount: 30 })
            .await
            .unwrap();

        let pending = channel.take().await.unwrap().expect("a command is pending");
        assert_eq!(
            pending.command,
            DaemonCommand::DamageHero { hero_id: 2, amount: 30 }
        );
        // Consumed: the slot is empty again.
        assert!(channel.take().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn command_wire_format() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("daemon_commands.json");
        let channel = CommandChannel::new(&path);
        channel
            .send(DaemonCommand::StartHealing { hero_id: 42 })
            .await
            .unwrap();

        let raw = tokio::fs::read_to_string(&path).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["command"], "start_healing");
        assert_eq!(value["hero_id"], 42);
        assert!(value["timestamp"].is_string());
    }

    #[tokio::test]
    async fn status_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("daemon_status.json");
        assert!(DaemonStatus::read(&path).await.unwrap().is_none());

        let status = DaemonStatus {
            running: true,
            updated_at: Utc::now(),
            healing: vec![HealingStatus {
                hero_id: 1,
                name: "Aldric".to_string(),
                current_health: 40,
                max_health: 120,
                last_heal: None,
            }],
        };
        status.write(&path).await.unwrap();

        let read = DaemonStatus::read(&path).await.unwrap().unwrap();
        assert!(read.running);
        assert_eq!(read.healing.len(), 1);
        assert_eq!(read.healing[0].name, "Aldric");
    }
}

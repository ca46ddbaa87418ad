//! Background writer for the aura notification log.
//!
//! The simulation worker hands notifications over an mpsc channel with
//! `try_send`, so a slow disk never stalls a simulation step. This worker
//! appends one JSON object per line and flushes whenever the channel drains.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs::OpenOptions;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::mpsc;
use tracing::{error, info};

use aura_core::AuraNotification;

use crate::api::{Result, RuntimeError};

/// One line of the aura log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuraLogEntry {
    /// Simulation clock when the notification was published.
    pub at_ms: u64,
    pub notification: AuraNotification,
}

pub struct AuraLogWorker {
    path: PathBuf,
    writer: BufWriter<tokio::fs::File>,
    entry_rx: mpsc::Receiver<AuraLogEntry>,
    written: u64,
}

impl AuraLogWorker {
    /// Opens (or creates) the log file in append mode.
    pub async fn open(path: impl AsRef<Path>, entry_rx: mpsc::Receiver<AuraLogEntry>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(RuntimeError::AuraLog)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(RuntimeError::AuraLog)?;

        Ok(Self {
            path,
            writer: BufWriter::new(file),
            entry_rx,
            written: 0,
        })
    }

    /// Main worker loop. Ends when every sender is gone.
    pub async fn run(mut self) {
        info!(target: "runtime::aura_log", path = %self.path.display(), "aura log worker started");

        while let Some(entry) = self.entry_rx.recv().await {
            self.write(&entry).await;
            while let Ok(entry) = self.entry_rx.try_recv() {
                self.write(&entry).await;
            }
            if let Err(e) = self.writer.flush().await {
                error!(target: "runtime::aura_log", error = %e, "failed to flush aura log");
            }
        }

        if let Err(e) = self.writer.flush().await {
            error!(target: "runtime::aura_log", error = %e, "failed to flush aura log");
        }
        info!(target: "runtime::aura_log", written = self.written, "aura log worker stopped");
    }

    async fn write(&mut self, entry: &AuraLogEntry) {
        let mut line = match serde_json::to_vec(entry) {
            Ok(line) => line,
            Err(e) => {
                error!(target: "runtime::aura_log", error = %e, "failed to encode aura log entry");
                return;
            }
        };
        line.push(b'\n');
        match self.writer.write_all(&line).await {
            Ok(()) => self.written += 1,
            Err(e) => error!(target: "runtime::aura_log", error = %e, "failed to write aura log entry"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aura_core::{AuraId, RemoveMode, SpellId, UnitId};

    #[tokio::test]
    async fn entries_become_json_lines() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("logs").join("auras.jsonl");
        let (tx, rx) = mpsc::channel(4);
        let worker = AuraLogWorker::open(&path, rx).await.expect("open log");
        let task = tokio::spawn(worker.run());

        let entry = AuraLogEntry {
            at_ms: 1_500,
            notification: AuraNotification::Removed {
                aura: AuraId(3),
                unit: UnitId(2),
                spell: SpellId(44457),
                mode: RemoveMode::Expire,
            },
        };
        tx.send(entry.clone()).await.expect("send entry");
        drop(tx);
        task.await.expect("worker finished");

        let contents = tokio::fs::read_to_string(&path).await.expect("read log");
        let lines: Vec<AuraLogEntry> = contents
            .lines()
            .map(|line| serde_json::from_str(line).expect("valid json line"))
            .collect();
        assert_eq!(lines, vec![entry]);
    }
}

//! Append-only run audit trail.
//!
//! One JSON line per finished run. The log is a process-wide shared
//! resource, so appends go through a single writer task fed by a channel —
//! concurrent runs can never interleave inside one entry. Recording is
//! strictly best-effort: a full queue, a closed writer, or an I/O failure
//! is logged with `warn!` and never reaches the run's own error path.

use chrono::{DateTime, Utc};
use quizforge_core::run::{AgentRun, RunState};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

/// Characters of the goal kept in a record.
const GOAL_PREVIEW_CHARS: usize = 120;

/// One audit entry, serialized as a single JSON line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub run_id: String,
    pub pipeline: String,
    pub goal_preview: String,
    /// Terminal state label plus failure detail, if any.
    pub outcome: String,
    pub iterations: usize,
    pub recorded_at: DateTime<Utc>,
}

impl AuditRecord {
    /// Build a record from a finished run.
    pub fn from_run(pipeline: &str, run: &AgentRun) -> Self {
        let outcome = match &run.state {
            RunState::Failed(failure) => format!("failed: {failure}"),
            other => other.label().to_string(),
        };
        Self {
            run_id: run.id.to_string(),
            pipeline: pipeline.to_string(),
            goal_preview: preview(&run.goal),
            outcome,
            iterations: run.iterations(),
            recorded_at: Utc::now(),
        }
    }
}

fn preview(goal: &str) -> String {
    let trimmed = goal.trim();
    if trimmed.chars().count() <= GOAL_PREVIEW_CHARS {
        trimmed.to_string()
    } else {
        trimmed.chars().take(GOAL_PREVIEW_CHARS).collect()
    }
}

enum WriterMessage {
    Record(Box<AuditRecord>),
    Flush(oneshot::Sender<()>),
}

/// Handle to the audit log. Cheap to clone; all clones feed the same
/// writer task.
#[derive(Clone)]
pub struct AuditLog {
    tx: mpsc::UnboundedSender<WriterMessage>,
}

impl AuditLog {
    /// Open the log at `path` and spawn the writer task. The parent
    /// directory is created if missing.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(writer_task(path, rx));
        Self { tx }
    }

    /// Queue a record. Fire-and-forget: a closed writer is warned about,
    /// never surfaced.
    pub fn record(&self, record: AuditRecord) {
        if self
            .tx
            .send(WriterMessage::Record(Box::new(record)))
            .is_err()
        {
            warn!("audit writer is gone; dropping record");
        }
    }

    /// Wait until everything queued so far has been written. Used for
    /// graceful shutdown; normal recording never waits.
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(WriterMessage::Flush(done_tx)).is_ok() {
            let _ = done_rx.await;
        }
    }
}

/// The single writer: drains the queue and appends one line per record.
async fn writer_task(path: PathBuf, mut rx: mpsc::UnboundedReceiver<WriterMessage>) {
    while let Some(message) = rx.recv().await {
        match message {
            WriterMessage::Record(record) => {
                if let Err(e) = append_record(&path, &record).await {
                    warn!(path = %path.display(), error = %e, "audit append failed");
                } else {
                    debug!(run_id = %record.run_id, outcome = %record.outcome, "audit recorded");
                }
            }
            WriterMessage::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
}

async fn append_record(path: &Path, record: &AuditRecord) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let line = serde_json::to_string(record)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(line.as_bytes()).await?;
    file.write_all(b"\n").await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizforge_core::run::AgentRun;

    fn finished_run(goal: &str) -> AgentRun {
        let mut run = AgentRun::new(goal, "prompt");
        run.finish(RunState::Exhausted);
        run
    }

    #[tokio::test]
    async fn records_are_appended_as_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runs.jsonl");
        let log = AuditLog::open(&path);

        log.record(AuditRecord::from_run("flashcards", &finished_run("goal one")));
        log.record(AuditRecord::from_run("rating", &finished_run("goal two")));
        log.flush().await;

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: AuditRecord = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first.pipeline, "flashcards");
        assert_eq!(first.outcome, "exhausted");
        assert_eq!(first.goal_preview, "goal one");
    }

    #[tokio::test]
    async fn long_goals_are_previewed() {
        let goal = "x".repeat(500);
        let record = AuditRecord::from_run("flashcards", &finished_run(&goal));
        assert_eq!(record.goal_preview.chars().count(), GOAL_PREVIEW_CHARS);
    }

    #[tokio::test]
    async fn unwritable_path_never_panics() {
        // Appends to a path whose parent cannot be created still only warn.
        let log = AuditLog::open("/dev/null/not-a-dir/runs.jsonl");
        log.record(AuditRecord::from_run("flashcards", &finished_run("goal")));
        log.flush().await;
    }
}

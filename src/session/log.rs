// ABOUTME: JSONL transcript: appends each completed turn's entries to a per-session file.
// ABOUTME: Stores transcripts in ~/.local/share/deskchat/sessions/<session_id>.jsonl.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::session::ChatEntry;

/// A single JSONL line: when it was written and the conversation entry.
#[derive(Debug, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub session_id: String,
    pub entry: ChatEntry,
}

/// Appends conversation entries as JSONL lines to a transcript file.
pub struct TranscriptLogger {
    writer: BufWriter<File>,
    session_id: String,
    pub path: PathBuf,
}

impl TranscriptLogger {
    /// Open the transcript for a session in the default sessions directory.
    pub fn new(session_id: &str) -> anyhow::Result<Self> {
        Self::new_in_dir(&Config::sessions_dir(), session_id)
    }

    /// Open the transcript for a session in a specific directory.
    pub fn new_in_dir(dir: &Path, session_id: &str) -> anyhow::Result<Self> {
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}.jsonl", session_id));
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            session_id: session_id.to_string(),
            path,
        })
    }

    /// Append entries and flush.
    pub fn log_entries(&mut self, entries: &[ChatEntry]) -> anyhow::Result<()> {
        let timestamp = Utc::now().to_rfc3339();
        for entry in entries {
            let line = serde_json::to_string(&LogEntry {
                timestamp: timestamp.clone(),
                session_id: self.session_id.clone(),
                entry: entry.clone(),
            })?;
            writeln!(self.writer, "{}", line)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

//! Prediction Output
//!
//! Writes the latest run to `data.json` and prepends an entry to the
//! prediction history file consumed by the web page. History updates are a
//! read-modify-write of the full list, guarded by a mutex so concurrent
//! runs sharing one sink cannot interleave.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Mutex;
use tracing::{info, warn};

use crate::config::OutputConfig;
use crate::types::{BlizzardError, PredictionResult, Result};

/// One row in the published history file. `actual` is filled in by hand
/// after the day happens; new entries always start null.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    /// Calendar date of the prediction, `YYYY-MM-DD`
    pub id: String,
    pub timestamp: DateTime<Utc>,
    /// The decision text, or null when no explicit verdict was produced
    pub prediction: Option<String>,
    /// Whether a snow day actually happened; maintained out of band
    pub actual: Option<bool>,
    /// The closing message of the transcript
    pub details: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct HistoryFile {
    predictions: Vec<HistoryEntry>,
}

/// Result sink for prediction artifacts.
pub struct ResultSink {
    config: OutputConfig,
    history_lock: Mutex<()>,
}

impl ResultSink {
    pub fn new(config: OutputConfig) -> Self {
        Self {
            config,
            history_lock: Mutex::new(()),
        }
    }

    /// Persist one run: latest-prediction document plus a history entry.
    pub fn write(&self, result: &PredictionResult) -> Result<()> {
        fs::create_dir_all(&self.config.data_dir)?;

        let data_path = self.config.data_path();
        fs::write(&data_path, serde_json::to_string_pretty(result)?)?;
        info!("Wrote prediction to {}", data_path.display());

        self.prepend_history(result)?;
        Ok(())
    }

    /// Read the published history, newest first. A missing file is an empty
    /// history, not an error.
    pub fn read_history(&self) -> Result<Vec<HistoryEntry>> {
        Ok(load_history(&self.config.history_path()).predictions)
    }

    fn prepend_history(&self, result: &PredictionResult) -> Result<()> {
        let _guard = self
            .history_lock
            .lock()
            .map_err(|_| BlizzardError::Output("history lock poisoned".to_string()))?;

        let path = self.config.history_path();
        let mut history = load_history(&path);

        let details = result
            .conversation
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default();

        history.predictions.insert(
            0,
            HistoryEntry {
                id: result.timestamp.format("%Y-%m-%d").to_string(),
                timestamp: result.timestamp,
                prediction: result.decision.clone(),
                actual: None,
                details,
            },
        );

        fs::write(&path, serde_json::to_string_pretty(&history)?)?;
        info!(
            entries = history.predictions.len(),
            "Updated {}",
            path.display()
        );
        Ok(())
    }
}

/// Load the history file, starting fresh on a missing or corrupt file.
fn load_history(path: &Path) -> HistoryFile {
    match fs::read_to_string(path) {
        Ok(text) if !text.trim().is_empty() => match serde_json::from_str(&text) {
            Ok(history) => history,
            Err(e) => {
                warn!("History file {} is invalid, starting fresh: {}", path.display(), e);
                HistoryFile::default()
            }
        },
        _ => HistoryFile::default(),
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::session::result::HistoryEntry;

const SCHEMA_VERSION: u32 = 1;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HistoryData {
    pub schema_version: u32,
    pub entries: Vec<HistoryEntry>,
}

impl Default for HistoryData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            entries: Vec::new(),
        }
    }
}

impl HistoryData {
    /// Check if loaded data has a stale schema version and needs reset.
    pub fn needs_reset(&self) -> bool {
        self.schema_version != SCHEMA_VERSION
    }

    /// Totals over all entries: (correct judgments, all judgments).
    pub fn tally(&self) -> (usize, usize) {
        self.entries
            .iter()
            .map(|e| e.verdict.tally())
            .fold((0, 0), |(c, t), (ec, et)| (c + ec, t + et))
    }

    pub fn accuracy(&self) -> Option<f64> {
        let (correct, total) = self.tally();
        (total > 0).then(|| correct as f64 / total as f64)
    }
}

pub const EXPORT_VERSION: u32 = 1;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExportData {
    pub brick_export_version: u32,
    pub exported_at: DateTime<Utc>,
    pub config: Config,
    pub history: HistoryData,
}

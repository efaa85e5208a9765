use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use chrono::Utc;
use serde::{Serialize, de::DeserializeOwned};

use crate::config::Config;
use crate::session::result::HistoryEntry;
use crate::store::schema::{EXPORT_VERSION, ExportData, HistoryData};

const HISTORY_FILE: &str = "history.json";

pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("brick");
        Self::with_base_dir(base_dir)
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    fn load<T: DeserializeOwned + Default>(&self, name: &str) -> T {
        let path = self.file_path(name);
        if !path.exists() {
            return T::default();
        }
        match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|err| {
                tracing::warn!(path = %path.display(), "unreadable store file, starting fresh: {err}");
                T::default()
            }),
            Err(_) => T::default(),
        }
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        write_atomic(&self.file_path(name), data)
    }

    /// History with a stale schema is discarded rather than migrated.
    pub fn load_history(&self) -> HistoryData {
        let data: HistoryData = self.load(HISTORY_FILE);
        if data.needs_reset() {
            tracing::warn!(version = data.schema_version, "history schema changed, resetting");
            return HistoryData::default();
        }
        data
    }

    pub fn save_history(&self, data: &HistoryData) -> Result<()> {
        self.save(HISTORY_FILE, data)
    }

    pub fn append_history(&self, entry: HistoryEntry) -> Result<HistoryData> {
        let mut data = self.load_history();
        data.entries.push(entry);
        self.save_history(&data)?;
        Ok(data)
    }

    pub fn export_all(&self, config: &Config) -> ExportData {
        ExportData {
            brick_export_version: EXPORT_VERSION,
            exported_at: Utc::now(),
            config: config.clone(),
            history: self.load_history(),
        }
    }

    pub fn export_to(&self, config: &Config, path: &Path) -> Result<()> {
        write_atomic(path, &self.export_all(config))
    }

    /// Replace local history with the one in an export file.
    pub fn import_from(&self, path: &Path) -> Result<ExportData> {
        let content = fs::read_to_string(path)?;
        let data: ExportData = serde_json::from_str(&content)?;
        if data.brick_export_version != EXPORT_VERSION {
            bail!(
                "Unsupported export version: {} (expected {})",
                data.brick_export_version,
                EXPORT_VERSION
            );
        }
        self.save_history(&data.history)?;
        Ok(data)
    }
}

/// Write JSON to a temp file next to `path`, then rename over it.
fn write_atomic<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    let tmp_path = path.with_extension("tmp");

    let json = serde_json::to_string_pretty(data)?;
    let mut file = fs::File::create(&tmp_path)?;
    file.write_all(json.as_bytes())?;
    file.sync_all()?;

    fs::rename(&tmp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::result::Verdict;
    use tempfile::TempDir;

    fn make_test_store() -> (TempDir, JsonStore) {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        (dir, store)
    }

    fn entry(sentence: &str, is_correct: bool) -> HistoryEntry {
        HistoryEntry {
            recorded_at: Utc::now(),
            sentence: sentence.to_string(),
            user_translation: "answer".to_string(),
            reference: "reference".to_string(),
            verdict: Verdict::Whole { is_correct },
        }
    }

    #[test]
    fn missing_history_loads_empty() {
        let (_dir, store) = make_test_store();
        assert!(store.load_history().entries.is_empty());
    }

    #[test]
    fn append_persists_entries_in_order() {
        let (_dir, store) = make_test_store();
        store.append_history(entry("Eins.", true)).unwrap();
        let data = store.append_history(entry("Zwei.", false)).unwrap();
        assert_eq!(data.entries.len(), 2);

        let reloaded = store.load_history();
        let sentences: Vec<&str> = reloaded.entries.iter().map(|e| e.sentence.as_str()).collect();
        assert_eq!(sentences, vec!["Eins.", "Zwei."]);
        assert!(!store.file_path("history.tmp").exists());
    }

    #[test]
    fn corrupt_history_starts_fresh() {
        let (_dir, store) = make_test_store();
        fs::write(store.file_path(HISTORY_FILE), "not json").unwrap();
        assert!(store.load_history().entries.is_empty());
    }

    #[test]
    fn export_then_import_round_trips_history() {
        let (dir, store) = make_test_store();
        store.append_history(entry("Eins.", true)).unwrap();
        let export_path = dir.path().join("export.json");
        store.export_to(&Config::default(), &export_path).unwrap();

        let (_dir2, other) = make_test_store();
        let imported = other.import_from(&export_path).unwrap();
        assert_eq!(imported.brick_export_version, EXPORT_VERSION);
        assert_eq!(other.load_history().entries[0].sentence, "Eins.");
    }

    #[test]
    fn import_rejects_unknown_version() {
        let (dir, store) = make_test_store();
        let mut export = store.export_all(&Config::default());
        export.brick_export_version = 99;
        let path = dir.path().join("future.json");
        fs::write(&path, serde_json::to_string(&export).unwrap()).unwrap();

        let err = store.import_from(&path).unwrap_err().to_string();
        assert!(err.contains("Unsupported export version"));
        assert!(err.contains("99"));
    }
}

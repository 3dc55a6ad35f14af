//! Durable storage for the single timer record

use std::{
    fs,
    path::PathBuf,
    sync::Mutex,
};
use anyhow::Context;
use serde::{Deserialize, Serialize};

use super::TimerState;

/// Key/value persistence for exactly one `TimerState`
pub trait StateStore: Send {
    /// Read the stored record, `None` when nothing has been written yet
    fn load(&self) -> anyhow::Result<Option<TimerState>>;

    /// Replace the stored record wholesale
    fn save(&self, state: &TimerState) -> anyhow::Result<()>;
}

/// On-disk layout: one named record
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreFile {
    timer_state: Option<TimerState>,
}

/// JSON file store, written through a temp file and renamed into place
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl StateStore for JsonFileStore {
    fn load(&self) -> anyhow::Result<Option<TimerState>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        let file: StoreFile = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse {}", self.path.display()))?;
        Ok(file.timer_state)
    }

    fn save(&self, state: &TimerState) -> anyhow::Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        let file = StoreFile { timer_state: Some(state.clone()) };
        let raw = serde_json::to_string_pretty(&file)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, raw).with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        Ok(())
    }
}

/// Volatile store, used when no state file is wanted
#[derive(Debug, Default)]
pub struct MemoryStore {
    record: Mutex<Option<TimerState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> anyhow::Result<Option<TimerState>> {
        self.record
            .lock()
            .map(|record| record.clone())
            .map_err(|e| anyhow::anyhow!("Failed to lock memory store: {}", e))
    }

    fn save(&self, state: &TimerState) -> anyhow::Result<()> {
        let mut record = self.record
            .lock()
            .map_err(|e| anyhow::anyhow!("Failed to lock memory store: {}", e))?;
        *record = Some(state.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_loads_as_none() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("timer-state.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn saved_record_is_read_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("timer-state.json");
        let store = JsonFileStore::new(&path);

        let mut state = TimerState::new();
        state.input_minutes = 3;
        state.pause_at(0);
        store.save(&state).unwrap();

        assert_eq!(store.load().unwrap(), Some(state));
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"timerState\""));
        assert!(raw.contains("\"inputMinutes\": 3"));
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("timer-state.json");
        fs::write(&path, "{not json").unwrap();
        assert!(JsonFileStore::new(path).load().is_err());
    }

    #[test]
    fn memory_store_replaces_record() {
        let store = MemoryStore::new();
        assert!(store.load().unwrap().is_none());
        let mut state = TimerState::new();
        store.save(&state).unwrap();
        state.finish();
        store.save(&state).unwrap();
        assert_eq!(store.load().unwrap(), Some(state));
    }
}

use std::collections::HashMap;

use serde_json::Value;

use crate::error::ImpactError;
use crate::impact::ProgramInputs;
use crate::ImpactResult;

/// Fixed key the active scenario is stored under.
pub const SCENARIO_KEY: &str = "trade_simulator";

/// String key-value storage, in the shape of a browser local store.
pub trait KeyValueBackend {
    fn get(&self, key: &str) -> ImpactResult<Option<String>>;
    fn set(&mut self, key: &str, value: String) -> ImpactResult<()>;
    fn remove(&mut self, key: &str) -> ImpactResult<()>;
}

/// In-process backend, for embedding hosts and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    entries: HashMap<String, String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueBackend for MemoryBackend {
    fn get(&self, key: &str) -> ImpactResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> ImpactResult<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> ImpactResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Saves and restores the full parameter record as one JSON value.
#[derive(Debug, Clone)]
pub struct ScenarioStore<B: KeyValueBackend> {
    backend: B,
}

impl<B: KeyValueBackend> ScenarioStore<B> {
    pub fn new(backend: B) -> Self {
        ScenarioStore { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    /// The stored scenario, or `None` when nothing has been saved.
    ///
    /// A stored record must be complete; use [`ScenarioStore::load_or`] to
    /// accept partial or damaged records.
    pub fn load(&self) -> ImpactResult<Option<ProgramInputs>> {
        match self.backend.get(SCENARIO_KEY)? {
            Some(raw) => {
                let inputs = serde_json::from_str(&raw).map_err(|e| {
                    ImpactError::Storage(format!("Stored scenario is unreadable: {e}"))
                })?;
                Ok(Some(inputs))
            }
            None => Ok(None),
        }
    }

    /// The stored scenario merged field by field over `defaults`.
    ///
    /// Fields missing from the record keep their default. An unreadable
    /// record, or one that no longer fits the parameter shape, yields the
    /// defaults unchanged.
    pub fn load_or(&self, defaults: &ProgramInputs) -> ImpactResult<ProgramInputs> {
        let Some(raw) = self.backend.get(SCENARIO_KEY)? else {
            return Ok(defaults.clone());
        };

        let merged = serde_json::from_str::<Value>(&raw)
            .map_err(ImpactError::from)
            .and_then(|record| defaults.merged_with(&record));

        match merged {
            Ok(inputs) => Ok(inputs),
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable stored scenario");
                Ok(defaults.clone())
            }
        }
    }

    pub fn save(&mut self, inputs: &ProgramInputs) -> ImpactResult<()> {
        let raw = serde_json::to_string(inputs)?;
        self.backend.set(SCENARIO_KEY, raw)?;
        tracing::info!(key = SCENARIO_KEY, "saved scenario");
        Ok(())
    }

    /// Forget the stored scenario so the host falls back to its defaults.
    pub fn clear(&mut self) -> ImpactResult<()> {
        self.backend.remove(SCENARIO_KEY)?;
        tracing::info!(key = SCENARIO_KEY, "cleared scenario");
        Ok(())
    }
}

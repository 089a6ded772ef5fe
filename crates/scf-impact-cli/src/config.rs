use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;

use scf_impact_core::impact::{EvaluationPolicy, ProgramInputs};

/// Config file read from the working directory when `--config` is absent.
const DEFAULT_CONFIG_FILE: &str = "scfi.yaml";
/// Scenario store file used when the config names none.
const DEFAULT_STORE_FILE: &str = "scfi_store.json";

/// On-disk YAML shape. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    store_path: Option<PathBuf>,
    policy: Option<EvaluationPolicy>,
    /// Full or partial scenario record, merged over the reference scenario.
    defaults: Option<Value>,
}

/// Resolved settings shared by every subcommand.
#[derive(Debug, Clone)]
pub struct Settings {
    pub store_path: PathBuf,
    pub policy: EvaluationPolicy,
    pub defaults: ProgramInputs,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            store_path: PathBuf::from(DEFAULT_STORE_FILE),
            policy: EvaluationPolicy::default(),
            defaults: ProgramInputs::reference_scenario(),
        }
    }
}

/// Load settings from `path`, or from `scfi.yaml` if present.
///
/// A missing file yields the built-in settings; a malformed one is an error.
pub fn load(path: Option<&str>) -> Result<Settings, Box<dyn std::error::Error>> {
    let path = Path::new(path.unwrap_or(DEFAULT_CONFIG_FILE));
    if !path.is_file() {
        tracing::debug!(path = %path.display(), "no config file, using built-in settings");
        return Ok(Settings::default());
    }

    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;
    let settings = parse(&contents)
        .map_err(|e| format!("Invalid config '{}': {}", path.display(), e))?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(settings)
}

fn parse(contents: &str) -> Result<Settings, Box<dyn std::error::Error>> {
    if contents.trim().is_empty() {
        return Ok(Settings::default());
    }
    let file: ConfigFile = serde_yaml::from_str(contents)?;
    let mut settings = Settings::default();

    if let Some(store_path) = file.store_path {
        settings.store_path = store_path;
    }
    if let Some(policy) = file.policy {
        settings.policy = policy;
    }
    if let Some(defaults) = file.defaults {
        settings.defaults = settings.defaults.merged_with(&defaults)?;
    }
    Ok(settings)
}

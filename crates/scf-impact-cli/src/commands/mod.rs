pub mod evaluate;
pub mod scenario;
pub mod sensitivity;

use rust_decimal::Decimal;
use serde_json::Value;

use scf_impact_core::impact::ProgramInputs;
use scf_impact_core::store::ScenarioStore;

use crate::config::Settings;
use crate::input;
use crate::store::FileBackend;

/// Open the file-backed scenario store named by the settings.
pub fn open_store(settings: &Settings) -> ScenarioStore<FileBackend> {
    ScenarioStore::new(FileBackend::new(&settings.store_path))
}

/// Resolve the scenario a command works on.
///
/// Precedence: `--input` file, piped stdin, the stored scenario (with
/// `--stored`), then the configured defaults. File and stdin records may be
/// partial; they are merged over the defaults.
pub fn resolve_inputs(
    path: Option<&str>,
    stored: bool,
    settings: &Settings,
) -> Result<ProgramInputs, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        let record = input::file::read_json_value(path)?;
        return Ok(settings.defaults.merged_with(&record)?);
    }
    if let Some(record) = input::stdin::read_stdin()? {
        return Ok(settings.defaults.merged_with(&record)?);
    }
    if stored {
        return Ok(open_store(settings).load_or(&settings.defaults)?);
    }
    Ok(settings.defaults.clone())
}

/// Apply `name=value` overrides, e.g. `program.new_dpo=120`.
pub fn apply_overrides(
    inputs: ProgramInputs,
    overrides: &[String],
) -> Result<ProgramInputs, Box<dyn std::error::Error>> {
    let mut inputs = inputs;
    for item in overrides {
        let (name, raw) = item
            .split_once('=')
            .ok_or_else(|| format!("Override must be name=value, got '{}'", item))?;
        let value: Decimal = raw
            .trim()
            .parse()
            .map_err(|e| format!("Invalid value for '{}': {}", name, e))?;
        inputs = inputs.with_field(name.trim(), value)?;
    }
    Ok(inputs)
}

/// Insert `key` into the top level of a JSON object.
pub fn attach(value: &mut Value, key: &str, extra: Value) {
    if let Some(map) = value.as_object_mut() {
        map.insert(key.to_string(), extra);
    }
}

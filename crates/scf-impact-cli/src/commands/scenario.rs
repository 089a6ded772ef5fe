use clap::{Args, Subcommand};
use serde_json::{json, Value};

use crate::commands::open_store;
use crate::config::Settings;
use crate::input;

/// Arguments for managing the stored scenario
#[derive(Args)]
pub struct ScenarioArgs {
    #[command(subcommand)]
    pub action: ScenarioAction,
}

#[derive(Subcommand)]
pub enum ScenarioAction {
    /// Print the stored scenario merged over the defaults
    Show,
    /// Store a scenario read from a file or stdin
    Save {
        /// Path to JSON scenario (full or partial record)
        #[arg(long)]
        input: Option<String>,
    },
    /// Forget the stored scenario
    Reset,
}

pub fn run_scenario(
    args: ScenarioArgs,
    settings: &Settings,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mut store = open_store(settings);
    match args.action {
        ScenarioAction::Show => {
            let inputs = store.load_or(&settings.defaults)?;
            Ok(serde_json::to_value(inputs)?)
        }
        ScenarioAction::Save { input: path } => {
            let record = if let Some(ref path) = path {
                input::file::read_json_value(path)?
            } else if let Some(data) = input::stdin::read_stdin()? {
                data
            } else {
                return Err("--input <file.json> or stdin required to save a scenario".into());
            };
            let inputs = settings.defaults.merged_with(&record)?;
            store.save(&inputs)?;
            Ok(json!({
                "saved": true,
                "store_path": store.backend().path().display().to_string(),
                "scenario": inputs,
            }))
        }
        ScenarioAction::Reset => {
            store.clear()?;
            Ok(json!({
                "reset": true,
                "store_path": store.backend().path().display().to_string(),
            }))
        }
    }
}

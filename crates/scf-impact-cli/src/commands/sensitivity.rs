use clap::Args;
use serde_json::Value;

use scf_impact_core::sensitivity::sweep::{self, SensitivityInput, SensitivityVariable};

use crate::commands::{apply_overrides, resolve_inputs};
use crate::config::Settings;

/// Arguments for sensitivity analysis
#[derive(Args)]
pub struct SensitivityArgs {
    /// First sensitivity variable in format name:min:max:step
    /// (e.g. "new_dpo:60:120:15")
    #[arg(long)]
    pub var1: String,

    /// Second sensitivity variable (optional, creates a 2D table)
    #[arg(long)]
    pub var2: Option<String>,

    /// Output field to report
    #[arg(long, default_value = "total_annual_benefit")]
    pub metric: String,

    /// Path to JSON base scenario (full or partial record)
    #[arg(long)]
    pub input: Option<String>,

    /// Sweep around the stored scenario instead of the defaults
    #[arg(long)]
    pub stored: bool,

    /// Override one base input before sweeping (repeatable)
    #[arg(long = "set", value_name = "NAME=VALUE")]
    pub overrides: Vec<String>,
}

fn parse_sens_var(arg: &str) -> Result<SensitivityVariable, Box<dyn std::error::Error>> {
    let parts: Vec<&str> = arg.split(':').collect();
    if parts.len() != 4 {
        return Err(format!(
            "Sensitivity variable must be name:min:max:step, got '{}'",
            arg
        )
        .into());
    }
    Ok(SensitivityVariable {
        name: parts[0].to_string(),
        min: parts[1].parse()?,
        max: parts[2].parse()?,
        step: parts[3].parse()?,
    })
}

pub fn run_sensitivity(
    args: SensitivityArgs,
    settings: &Settings,
) -> Result<Value, Box<dyn std::error::Error>> {
    let variable_1 = parse_sens_var(&args.var1)?;
    let variable_2 = args.var2.as_deref().map(parse_sens_var).transpose()?;

    let base_inputs = resolve_inputs(args.input.as_deref(), args.stored, settings)?;
    let base_inputs = apply_overrides(base_inputs, &args.overrides)?;

    let input = SensitivityInput {
        base_inputs,
        variable_1,
        variable_2,
        output_metric: args.metric,
        policy: settings.policy.clone(),
    };
    let result = sweep::run_sensitivity(&input)?;
    Ok(serde_json::to_value(result)?)
}

use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;

use scf_impact_core::impact::{
    analyze_program_impact, EvaluationPolicy, ImpactAnalysisInput, ZeroDenominator,
};

use crate::commands::{apply_overrides, attach, open_store, resolve_inputs};
use crate::config::Settings;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PolicyArg {
    /// Substitute the fallback value for an undefined DPO or shipment size
    Fallback,
    /// Fail when DPO or shipment size would divide by zero
    Reject,
}

impl From<PolicyArg> for ZeroDenominator {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Fallback => ZeroDenominator::Fallback,
            PolicyArg::Reject => ZeroDenominator::Reject,
        }
    }
}

/// Arguments for scenario evaluation
#[derive(Args)]
pub struct EvaluateArgs {
    /// Path to JSON scenario (full or partial record)
    #[arg(long)]
    pub input: Option<String>,

    /// Evaluate the stored scenario instead of the defaults
    #[arg(long)]
    pub stored: bool,

    /// Zero-denominator policy (overrides the config)
    #[arg(long)]
    pub policy: Option<PolicyArg>,

    /// Value substituted for an undefined DPO or shipment size
    #[arg(long)]
    pub fallback: Option<Decimal>,

    /// Override one input, e.g. --set program.new_dpo=120 (repeatable)
    #[arg(long = "set", value_name = "NAME=VALUE")]
    pub overrides: Vec<String>,

    /// Save the evaluated scenario to the store
    #[arg(long)]
    pub save: bool,
}

pub fn run_evaluate(
    args: EvaluateArgs,
    settings: &Settings,
) -> Result<Value, Box<dyn std::error::Error>> {
    let inputs = resolve_inputs(args.input.as_deref(), args.stored, settings)?;
    let inputs = apply_overrides(inputs, &args.overrides)?;

    let mut policy: EvaluationPolicy = settings.policy.clone();
    if let Some(arg) = args.policy {
        policy.zero_denominator = arg.into();
    }
    if let Some(fallback) = args.fallback {
        policy.fallback_value = fallback;
    }

    let analysis = ImpactAnalysisInput { inputs, policy };
    let output = analyze_program_impact(&analysis)?;

    if args.save {
        open_store(settings).save(&analysis.inputs)?;
    }

    let lines = serde_json::to_value(output.result.statement_lines())?;
    let mut value = serde_json::to_value(output)?;
    attach(&mut value, "statement_lines", lines);
    Ok(value)
}

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ImpactError;
use crate::types::{Currency, Days, Headcount, Money, Percent};
use crate::ImpactResult;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// Reported (unadjusted) financial statement figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActualStatement {
    /// Turnover / revenue.
    pub turnover: Money,
    pub cost_of_sales: Money,
    /// May be negative (loss-making year).
    pub operating_profit: Money,
    /// Net interest payable.
    pub net_interest: Money,
    pub trade_payables: Money,
    /// Net financial debt.
    pub net_debt: Money,
    pub equity: Money,
    /// Free cash flow from operations.
    pub cash_from_operations: Money,
    /// Display label only.
    pub currency: Currency,
}

/// Current operating costs the program can reduce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OperationalCosts {
    /// International shipments per year.
    pub international_shipments: Decimal,
    /// Customs / broker fee per shipment.
    pub fee_per_shipment: Money,
    pub ap_headcount: Headcount,
    pub trade_compliance_headcount: Headcount,
    /// Fully loaded cost per head per year.
    pub avg_salary_cost: Money,
}

/// Trade finance program assumptions. Percentages are whole numbers (50 = 50%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProgramAssumptions {
    /// Share of cost of sales addressable by the program.
    pub relevant_spend_pct: Percent,
    /// Share of relevant spend with international suppliers.
    pub international_spend_pct: Percent,
    /// Target payment term after the program.
    pub new_dpo: Days,
    /// Funding base rate, in percent.
    pub funding_base_rate: Percent,
    /// Funder spread over the base rate, in basis points.
    pub funding_spread_bps: Decimal,
    /// Days after invoice before the supplier can be paid early.
    pub free_days: Days,
    /// Early-payment discount offered by suppliers.
    pub discount_pct: Percent,
    pub uptake_pct: Percent,
    pub acceleration_pct: Percent,
    /// Annual platform fee, in currency units.
    pub platform_cost: Money,
    /// Share of the program funded from the buyer's own cash.
    pub treasury_funding_pct: Percent,
}

/// Operational efficiency assumptions, in whole percentages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EfficiencyAssumptions {
    pub ap_efficiency_pct: Percent,
    pub trade_efficiency_pct: Percent,
    pub customs_savings_pct: Percent,
}

/// The complete parameter record for one scenario.
///
/// The engine applies no defaults of its own: every field must be supplied.
/// Hosts that want defaults start from [`ProgramInputs::reference_scenario`]
/// and overlay their own values with [`ProgramInputs::merged_with`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProgramInputs {
    pub statement: ActualStatement,
    pub operations: OperationalCosts,
    pub program: ProgramAssumptions,
    pub efficiency: EfficiencyAssumptions,
}

/// Section names, in the order fields are searched by bare name.
pub const INPUT_SECTIONS: [&str; 4] = ["statement", "operations", "program", "efficiency"];

impl ProgramInputs {
    /// The reference scenario used as the host's default record.
    pub fn reference_scenario() -> Self {
        ProgramInputs {
            statement: ActualStatement {
                turnover: dec!(1291.6),
                cost_of_sales: dec!(707.4),
                operating_profit: dec!(-39.6),
                net_interest: dec!(29.9),
                trade_payables: dec!(94.9),
                net_debt: dec!(511.1),
                equity: dec!(320.8),
                cash_from_operations: dec!(-170.3),
                currency: Currency::GBP,
            },
            operations: OperationalCosts {
                international_shipments: dec!(2000),
                fee_per_shipment: dec!(0.0025),
                ap_headcount: dec!(8),
                trade_compliance_headcount: dec!(4),
                avg_salary_cost: dec!(0.065),
            },
            program: ProgramAssumptions {
                relevant_spend_pct: dec!(50),
                international_spend_pct: dec!(60),
                new_dpo: dec!(90),
                funding_base_rate: dec!(4.25),
                funding_spread_bps: dec!(500),
                free_days: dec!(7),
                discount_pct: dec!(3.5),
                uptake_pct: dec!(70),
                acceleration_pct: dec!(80),
                platform_cost: dec!(0),
                treasury_funding_pct: dec!(0),
            },
            efficiency: EfficiencyAssumptions {
                ap_efficiency_pct: dec!(40),
                trade_efficiency_pct: dec!(60),
                customs_savings_pct: dec!(75),
            },
        }
    }

    /// Overlay a partial JSON record onto these inputs.
    ///
    /// Objects merge key by key, anything else replaces the base value, so a
    /// record holding only `{"program": {"new_dpo": "120"}}` changes one field.
    pub fn merged_with(&self, overrides: &Value) -> ImpactResult<ProgramInputs> {
        if !overrides.is_object() {
            return Err(ImpactError::InvalidInput {
                field: "inputs".into(),
                reason: "Override record must be a JSON object".into(),
            });
        }
        let mut base = serde_json::to_value(self)?;
        merge_json(&mut base, overrides, "")?;
        Ok(serde_json::from_value(base)?)
    }

    /// Return a copy with one numeric field replaced.
    ///
    /// `field` is either `section.name` or a bare field name, which is looked
    /// up across all sections.
    pub fn with_field(&self, field: &str, value: Decimal) -> ImpactResult<ProgramInputs> {
        let mut json = serde_json::to_value(self)?;
        set_input_field(&mut json, field, value)?;
        Ok(serde_json::from_value(json)?)
    }
}

// ---------------------------------------------------------------------------
// JSON helpers
// ---------------------------------------------------------------------------

/// Overlay `overrides` onto `base`. Keys absent from `base` are rejected so a
/// misspelt or misplaced field cannot be dropped silently.
fn merge_json(base: &mut Value, overrides: &Value, path: &str) -> ImpactResult<()> {
    match (base, overrides) {
        (Value::Object(base_map), Value::Object(over_map)) => {
            for (key, over_val) in over_map {
                let field = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                let base_val = base_map
                    .get_mut(key)
                    .ok_or_else(|| ImpactError::InvalidInput {
                        field: field.clone(),
                        reason: "Unknown input field".into(),
                    })?;
                merge_json(base_val, over_val, &field)?;
            }
        }
        (base, over) => *base = over.clone(),
    }
    Ok(())
}

fn set_input_field(json: &mut Value, field: &str, value: Decimal) -> ImpactResult<()> {
    let (section, name) = resolve_input_field(json, field)?;
    if let Some(map) = json.get_mut(section).and_then(Value::as_object_mut) {
        map.insert(name.to_string(), Value::String(value.to_string()));
    }
    Ok(())
}

fn resolve_input_field<'a>(json: &Value, field: &'a str) -> ImpactResult<(&'static str, &'a str)> {
    let unknown = || ImpactError::InvalidInput {
        field: field.to_string(),
        reason: "Unknown input field".into(),
    };

    if let Some((section, name)) = field.split_once('.') {
        let section = INPUT_SECTIONS
            .iter()
            .copied()
            .find(|s| *s == section)
            .ok_or_else(unknown)?;
        let present = json
            .get(section)
            .and_then(|s| s.get(name))
            .is_some();
        return if present { Ok((section, name)) } else { Err(unknown()) };
    }

    INPUT_SECTIONS
        .iter()
        .copied()
        .find(|section| json.get(*section).and_then(|s| s.get(field)).is_some())
        .map(|section| (section, field))
        .ok_or_else(unknown)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

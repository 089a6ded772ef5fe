//! Input sanity checks applied by hosts before evaluation.
//!
//! [`crate::impact::evaluate`] never calls these. It is total over any record
//! that passes them: the magnitude bounds keep every intermediate product and
//! quotient inside `Decimal` range. They back
//! [`crate::impact::analyze_program_impact`] and the sensitivity sweep, which
//! is where out-of-range values surface as `InvalidInput`.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::engine::EvaluationPolicy;
use super::inputs::ProgramInputs;
use crate::error::ImpactError;
use crate::ImpactResult;

const MAX_PERCENT: Decimal = dec!(100);
/// Largest absolute value accepted for any input.
pub const MAX_MAGNITUDE: Decimal = dec!(100000000);
/// Smallest non-zero absolute value accepted for a divisor input.
pub const MIN_DIVISOR: Decimal = dec!(0.01);

/// Validate a full parameter record, returning the first violation found.
pub fn validate_inputs(inputs: &ProgramInputs) -> ImpactResult<()> {
    let st = &inputs.statement;
    let ops = &inputs.operations;
    let program = &inputs.program;
    let eff = &inputs.efficiency;

    for (field, value) in [
        ("program.relevant_spend_pct", program.relevant_spend_pct),
        ("program.international_spend_pct", program.international_spend_pct),
        ("program.discount_pct", program.discount_pct),
        ("program.uptake_pct", program.uptake_pct),
        ("program.acceleration_pct", program.acceleration_pct),
        ("program.treasury_funding_pct", program.treasury_funding_pct),
        ("efficiency.ap_efficiency_pct", eff.ap_efficiency_pct),
        ("efficiency.trade_efficiency_pct", eff.trade_efficiency_pct),
        ("efficiency.customs_savings_pct", eff.customs_savings_pct),
    ] {
        check_percent(field, value)?;
    }

    for (field, value) in [
        ("program.new_dpo", program.new_dpo),
        ("program.free_days", program.free_days),
        ("program.funding_base_rate", program.funding_base_rate),
        ("program.funding_spread_bps", program.funding_spread_bps),
        ("program.platform_cost", program.platform_cost),
        ("operations.international_shipments", ops.international_shipments),
        ("operations.fee_per_shipment", ops.fee_per_shipment),
        ("operations.ap_headcount", ops.ap_headcount),
        ("operations.trade_compliance_headcount", ops.trade_compliance_headcount),
        ("operations.avg_salary_cost", ops.avg_salary_cost),
    ] {
        check_non_negative(field, value)?;
    }

    for (field, value) in [
        ("statement.turnover", st.turnover),
        ("statement.cost_of_sales", st.cost_of_sales),
        ("statement.operating_profit", st.operating_profit),
        ("statement.net_interest", st.net_interest),
        ("statement.trade_payables", st.trade_payables),
        ("statement.net_debt", st.net_debt),
        ("statement.equity", st.equity),
        ("statement.cash_from_operations", st.cash_from_operations),
        ("program.new_dpo", program.new_dpo),
        ("program.free_days", program.free_days),
        ("program.funding_base_rate", program.funding_base_rate),
        ("program.funding_spread_bps", program.funding_spread_bps),
        ("program.platform_cost", program.platform_cost),
        ("operations.international_shipments", ops.international_shipments),
        ("operations.fee_per_shipment", ops.fee_per_shipment),
        ("operations.ap_headcount", ops.ap_headcount),
        ("operations.trade_compliance_headcount", ops.trade_compliance_headcount),
        ("operations.avg_salary_cost", ops.avg_salary_cost),
    ] {
        check_magnitude(field, value)?;
    }

    check_divisor("statement.cost_of_sales", st.cost_of_sales)?;
    check_divisor("operations.international_shipments", ops.international_shipments)?;

    Ok(())
}

/// The fallback value stands in for current DPO, so it shares the input bounds.
pub fn validate_policy(policy: &EvaluationPolicy) -> ImpactResult<()> {
    check_magnitude("policy.fallback_value", policy.fallback_value)
}

fn check_magnitude(field: &str, value: Decimal) -> ImpactResult<()> {
    if value.abs() > MAX_MAGNITUDE {
        return Err(ImpactError::InvalidInput {
            field: field.to_string(),
            reason: format!("Magnitude must not exceed {MAX_MAGNITUDE}, got {value}"),
        });
    }
    Ok(())
}

fn check_divisor(field: &str, value: Decimal) -> ImpactResult<()> {
    if !value.is_zero() && value.abs() < MIN_DIVISOR {
        return Err(ImpactError::InvalidInput {
            field: field.to_string(),
            reason: format!("Must be zero or at least {MIN_DIVISOR} in magnitude, got {value}"),
        });
    }
    Ok(())
}

fn check_percent(field: &str, value: Decimal) -> ImpactResult<()> {
    if value < Decimal::ZERO || value > MAX_PERCENT {
        return Err(ImpactError::InvalidInput {
            field: field.to_string(),
            reason: format!("Percentage must be between 0 and 100, got {value}"),
        });
    }
    Ok(())
}

fn check_non_negative(field: &str, value: Decimal) -> ImpactResult<()> {
    if value < Decimal::ZERO {
        return Err(ImpactError::InvalidInput {
            field: field.to_string(),
            reason: format!("Value must be non-negative, got {value}"),
        });
    }
    Ok(())
}

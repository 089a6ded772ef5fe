use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::engine::EvaluationPolicy;
use super::inputs::{ActualStatement, OperationalCosts, ProgramAssumptions};
use super::{pct, DAYS_IN_YEAR};
use crate::types::{Days, Money};

/// Addressable spend and the current payment-term baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendAnalysis {
    /// Cost of sales addressable by the program.
    pub relevant_spend: Money,
    pub international_spend: Money,
    pub domestic_spend: Money,
    /// International spend per shipment.
    pub avg_shipment_size: Money,
    /// Days payable outstanding before the program.
    pub current_dpo: Days,
    /// Cost of sales was zero, so `current_dpo` is the policy fallback.
    pub current_dpo_guarded: bool,
    /// No international shipments, so `avg_shipment_size` is the policy fallback.
    pub avg_shipment_size_guarded: bool,
}

/// Derive relevant, international and domestic spend plus the current DPO.
pub fn analyze_spend(
    statement: &ActualStatement,
    operations: &OperationalCosts,
    program: &ProgramAssumptions,
    policy: &EvaluationPolicy,
) -> SpendAnalysis {
    let relevant_spend = statement.cost_of_sales * pct(program.relevant_spend_pct);
    let international_spend = relevant_spend * pct(program.international_spend_pct);
    let domestic_spend = relevant_spend * (Decimal::ONE - pct(program.international_spend_pct));

    let avg_shipment_size_guarded = operations.international_shipments <= Decimal::ZERO;
    let avg_shipment_size = if avg_shipment_size_guarded {
        policy.fallback_value
    } else {
        international_spend / operations.international_shipments
    };

    let current_dpo_guarded = statement.cost_of_sales.is_zero();
    let current_dpo = if current_dpo_guarded {
        policy.fallback_value
    } else {
        (statement.trade_payables / statement.cost_of_sales) * DAYS_IN_YEAR
    };

    if current_dpo_guarded || avg_shipment_size_guarded {
        tracing::warn!(
            current_dpo_guarded,
            avg_shipment_size_guarded,
            fallback = %policy.fallback_value,
            "zero denominator in spend analysis, using fallback"
        );
    }

    SpendAnalysis {
        relevant_spend,
        international_spend,
        domestic_spend,
        avg_shipment_size,
        current_dpo,
        current_dpo_guarded,
        avg_shipment_size_guarded,
    }
}

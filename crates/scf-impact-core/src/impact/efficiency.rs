use serde::{Deserialize, Serialize};

use super::inputs::{EfficiencyAssumptions, OperationalCosts};
use super::pct;
use crate::types::{Headcount, Money};

/// Headcount and customs-fee savings from operational efficiency.
///
/// FTE figures stay fractional; rounding is a presentation concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EfficiencySavings {
    pub ap_headcount_saved: Headcount,
    pub trade_headcount_saved: Headcount,
    pub total_fte_saved: Headcount,
    pub ap_salary_savings: Money,
    pub trade_salary_savings: Money,
    pub total_headcount_savings: Money,
    pub annual_customs_fees: Money,
    pub customs_cost_savings: Money,
    /// Headcount plus customs savings.
    pub total_efficiency_savings: Money,
}

pub fn calculate_efficiency_savings(
    operations: &OperationalCosts,
    efficiency: &EfficiencyAssumptions,
) -> EfficiencySavings {
    let ap_headcount_saved = operations.ap_headcount * pct(efficiency.ap_efficiency_pct);
    let trade_headcount_saved =
        operations.trade_compliance_headcount * pct(efficiency.trade_efficiency_pct);
    let total_fte_saved = ap_headcount_saved + trade_headcount_saved;
    let total_headcount_savings = total_fte_saved * operations.avg_salary_cost;

    let annual_customs_fees = operations.international_shipments * operations.fee_per_shipment;
    let customs_cost_savings = annual_customs_fees * pct(efficiency.customs_savings_pct);

    EfficiencySavings {
        ap_headcount_saved,
        trade_headcount_saved,
        total_fte_saved,
        ap_salary_savings: ap_headcount_saved * operations.avg_salary_cost,
        trade_salary_savings: trade_headcount_saved * operations.avg_salary_cost,
        total_headcount_savings,
        annual_customs_fees,
        customs_cost_savings,
        total_efficiency_savings: total_headcount_savings + customs_cost_savings,
    }
}

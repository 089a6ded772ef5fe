use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::inputs::ProgramAssumptions;
use super::spend::SpendAnalysis;
use super::{pct, BPS, DAYS_IN_YEAR};
use crate::types::{Money, Rate};

/// P&L effect of early-payment discounts funded by a third party.
///
/// Benefits are positive and costs negative. A negative
/// `net_discount_benefit` is a valid outcome, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountBenefit {
    /// Base rate plus spread, as a decimal.
    pub total_funding_rate: Rate,
    pub income_from_discounts: Money,
    /// Non-positive whenever the funded period is non-negative.
    pub funding_cost_to_suppliers: Money,
    pub platform_cost: Money,
    pub net_discount_benefit: Money,
}

/// Total funding rate: base rate in percent plus spread in basis points.
pub fn total_funding_rate(program: &ProgramAssumptions) -> Rate {
    pct(program.funding_base_rate) + program.funding_spread_bps / BPS
}

pub fn calculate_discount_benefit(
    program: &ProgramAssumptions,
    spend: &SpendAnalysis,
) -> DiscountBenefit {
    let total_funding_rate = total_funding_rate(program);
    let uptake = pct(program.uptake_pct);

    let income_from_discounts = pct(program.discount_pct) * uptake * spend.relevant_spend;

    // Only the externally funded, accelerated share of uptake carries a funding cost.
    let funded_days = program.new_dpo - program.free_days;
    let funding_cost_to_suppliers = -total_funding_rate * (funded_days / DAYS_IN_YEAR)
        * spend.relevant_spend
        * uptake
        * (Decimal::ONE - pct(program.treasury_funding_pct))
        * pct(program.acceleration_pct);

    let net_discount_benefit =
        income_from_discounts + funding_cost_to_suppliers - program.platform_cost;

    DiscountBenefit {
        total_funding_rate,
        income_from_discounts,
        funding_cost_to_suppliers,
        platform_cost: program.platform_cost,
        net_discount_benefit,
    }
}

//! Financial impact of a supply chain finance program.
//!
//! Evaluation runs in five stages, each depending only on the ones before it:
//! spend analysis, discount benefit, working capital, operational efficiency,
//! and finally the statement adjustment that ties them together.

pub mod discount;
pub mod efficiency;
pub mod engine;
pub mod inputs;
pub mod spend;
pub mod statements;
pub mod validation;
pub mod working_capital;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

pub use engine::{
    analyze_program_impact, evaluate, evaluate_with_policy, BenefitSummary, EvaluationPolicy,
    ImpactAnalysisInput, ImpactMetrics, ZeroDenominator,
};
pub use inputs::{
    ActualStatement, EfficiencyAssumptions, OperationalCosts, ProgramAssumptions, ProgramInputs,
};

/// Working-capital day-count basis.
pub(crate) const DAYS_IN_YEAR: Decimal = dec!(365);
/// Basis points divisor.
pub(crate) const BPS: Decimal = dec!(10000);
/// Whole-percentage divisor.
pub(crate) const PERCENT: Decimal = dec!(100);

/// Convert a whole percentage (50) into a rate (0.5).
pub(crate) fn pct(value: Decimal) -> Decimal {
    value / PERCENT
}

/// Ratio guarded against a zero or vanishing denominator; yields zero instead.
pub(crate) fn ratio_or_zero(numerator: Decimal, denominator: Decimal) -> Decimal {
    numerator.checked_div(denominator).unwrap_or(Decimal::ZERO)
}

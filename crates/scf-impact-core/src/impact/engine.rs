use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

use super::discount::{calculate_discount_benefit, DiscountBenefit};
use super::efficiency::{calculate_efficiency_savings, EfficiencySavings};
use super::inputs::ProgramInputs;
use super::spend::{analyze_spend, SpendAnalysis};
use super::statements::{adjust_statements, AdjustedStatements, StatementLine};
use super::validation::{validate_inputs, validate_policy};
use super::working_capital::{calculate_working_capital, WorkingCapitalImpact};
use crate::error::ImpactError;
use crate::types::{with_metadata, ComputationOutput, Currency, Headcount, Money};
use crate::ImpactResult;

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// What to do when current DPO or average shipment size has a zero denominator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroDenominator {
    /// Substitute `EvaluationPolicy::fallback_value`.
    #[default]
    Fallback,
    /// Substitute the fallback during evaluation, but fail the analysis.
    Reject,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationPolicy {
    #[serde(default)]
    pub zero_denominator: ZeroDenominator,
    #[serde(default)]
    pub fallback_value: Decimal,
}

impl Default for EvaluationPolicy {
    fn default() -> Self {
        EvaluationPolicy {
            zero_denominator: ZeroDenominator::Fallback,
            fallback_value: Decimal::ZERO,
        }
    }
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Headline annual benefit figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenefitSummary {
    pub net_discount_benefit: Money,
    pub total_headcount_savings: Money,
    pub customs_cost_savings: Money,
    pub total_pl_impact: Money,
    pub working_capital_released: Money,
    pub working_capital_value: Money,
    pub total_annual_benefit: Money,
    pub total_fte_saved: Headcount,
}

/// Every derived figure from one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactMetrics {
    pub currency: Currency,
    pub spend: SpendAnalysis,
    pub discount: DiscountBenefit,
    pub working_capital: WorkingCapitalImpact,
    pub efficiency: EfficiencySavings,
    pub statements: AdjustedStatements,
    pub summary: BenefitSummary,
}

impl ImpactMetrics {
    pub fn statement_lines(&self) -> Vec<StatementLine> {
        self.statements.lines()
    }

    /// Look up a numeric output by field name, e.g. `adjusted_leverage`.
    ///
    /// Sections are searched depth-first in declaration order; names that
    /// appear in several sections carry the same value in each.
    pub fn metric(&self, name: &str) -> Option<Decimal> {
        let json = serde_json::to_value(self).ok()?;
        find_metric(&json, name)
    }
}

fn find_metric(json: &Value, name: &str) -> Option<Decimal> {
    let map = json.as_object()?;
    if let Some(found) = map.get(name) {
        return match found {
            Value::String(s) => s.parse().ok(),
            Value::Number(n) => n.to_string().parse().ok(),
            _ => None,
        };
    }
    map.values()
        .filter(|v| v.is_object())
        .find_map(|v| find_metric(v, name))
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Evaluate a scenario with the default zero-fallback policy.
///
/// Pure: no I/O and no state. Total over every record accepted by
/// [`validate_inputs`]; zero denominators fall back instead of failing.
pub fn evaluate(inputs: &ProgramInputs) -> ImpactMetrics {
    evaluate_with_policy(inputs, &EvaluationPolicy::default())
}

pub fn evaluate_with_policy(inputs: &ProgramInputs, policy: &EvaluationPolicy) -> ImpactMetrics {
    let spend = analyze_spend(
        &inputs.statement,
        &inputs.operations,
        &inputs.program,
        policy,
    );
    let discount = calculate_discount_benefit(&inputs.program, &spend);
    let working_capital = calculate_working_capital(&inputs.program, &spend);
    let efficiency = calculate_efficiency_savings(&inputs.operations, &inputs.efficiency);
    let statements = adjust_statements(&inputs.statement, &discount, &working_capital, &efficiency);

    let summary = BenefitSummary {
        net_discount_benefit: discount.net_discount_benefit,
        total_headcount_savings: efficiency.total_headcount_savings,
        customs_cost_savings: efficiency.customs_cost_savings,
        total_pl_impact: statements.income_statement.total_pl_impact,
        working_capital_released: working_capital.working_capital_released,
        working_capital_value: statements.balance_sheet.working_capital_value,
        total_annual_benefit: statements.balance_sheet.total_annual_benefit,
        total_fte_saved: efficiency.total_fte_saved,
    };

    tracing::debug!(
        relevant_spend = %spend.relevant_spend,
        net_discount_benefit = %summary.net_discount_benefit,
        working_capital_released = %summary.working_capital_released,
        total_annual_benefit = %summary.total_annual_benefit,
        "evaluated program impact"
    );

    ImpactMetrics {
        currency: inputs.statement.currency.clone(),
        spend,
        discount,
        working_capital,
        efficiency,
        statements,
        summary,
    }
}

// ---------------------------------------------------------------------------
// Analysis envelope
// ---------------------------------------------------------------------------

/// Host-facing request: a scenario plus the division policy to apply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpactAnalysisInput {
    pub inputs: ProgramInputs,
    #[serde(default)]
    pub policy: EvaluationPolicy,
}

/// Validate, evaluate and wrap a scenario in the standard output envelope.
pub fn analyze_program_impact(
    input: &ImpactAnalysisInput,
) -> ImpactResult<ComputationOutput<ImpactMetrics>> {
    let start = Instant::now();

    validate_inputs(&input.inputs)?;
    validate_policy(&input.policy)?;
    let metrics = evaluate_with_policy(&input.inputs, &input.policy);

    if input.policy.zero_denominator == ZeroDenominator::Reject {
        if metrics.spend.current_dpo_guarded {
            return Err(ImpactError::DivisionByZero {
                context: "current DPO (trade payables / cost of sales)".into(),
            });
        }
        if metrics.spend.avg_shipment_size_guarded {
            return Err(ImpactError::DivisionByZero {
                context: "average shipment size (international spend / shipments)".into(),
            });
        }
    }

    let warnings = collect_warnings(&input.inputs, &input.policy, &metrics);
    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Supply chain finance impact -- discount benefit, DPO extension and efficiency, 365-day basis",
        &serde_json::json!({
            "day_count": "365",
            "currency": input.inputs.statement.currency.code(),
            "zero_denominator": input.policy.zero_denominator,
            "fallback_value": input.policy.fallback_value.to_string(),
        }),
        warnings,
        elapsed,
        metrics,
    ))
}

fn collect_warnings(
    inputs: &ProgramInputs,
    policy: &EvaluationPolicy,
    metrics: &ImpactMetrics,
) -> Vec<String> {
    let mut warnings = Vec::new();

    if metrics.spend.current_dpo_guarded {
        warnings.push(format!(
            "Cost of sales is zero; current DPO set to {}",
            policy.fallback_value
        ));
    }
    if metrics.spend.avg_shipment_size_guarded {
        warnings.push(format!(
            "No international shipments; average shipment size set to {}",
            policy.fallback_value
        ));
    }
    if metrics.discount.net_discount_benefit < Decimal::ZERO {
        warnings.push(
            "Net discount benefit is negative: funding and platform costs exceed discount income"
                .into(),
        );
    }
    if inputs.program.new_dpo < metrics.spend.current_dpo {
        warnings.push(format!(
            "New DPO target ({}) is below current DPO ({}); working capital is consumed",
            inputs.program.new_dpo,
            metrics.spend.current_dpo.round_dp(1)
        ));
    }
    if inputs.program.free_days > inputs.program.new_dpo {
        warnings.push("Free days exceed the new DPO target; funding cost turns positive".into());
    }
    if metrics.statements.income_statement.adjusted_ebitda.is_zero() {
        warnings.push("Adjusted EBITDA is zero; adjusted leverage reported as 0".into());
    }
    if metrics.statements.balance_sheet.adjusted_equity.is_zero() {
        warnings.push("Adjusted equity is zero; adjusted solvency reported as 0".into());
    }

    warnings
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn analysis_input(inputs: ProgramInputs) -> ImpactAnalysisInput {
        ImpactAnalysisInput {
            inputs,
            policy: EvaluationPolicy::default(),
        }
    }

    #[test]
    fn test_evaluate_is_idempotent() {
        let inputs = ProgramInputs::reference_scenario();
        assert_eq!(evaluate(&inputs), evaluate(&inputs));
    }

    #[test]
    fn test_summary_matches_sections() {
        let m = evaluate(&ProgramInputs::reference_scenario());
        assert_eq!(m.summary.net_discount_benefit, m.discount.net_discount_benefit);
        assert_eq!(
            m.summary.total_pl_impact,
            m.discount.net_discount_benefit
                + m.efficiency.total_headcount_savings
                + m.efficiency.customs_cost_savings
        );
        assert_eq!(
            m.summary.working_capital_value,
            m.working_capital.working_capital_released * m.discount.total_funding_rate
        );
        assert_eq!(m.currency, Currency::GBP);
    }

    #[test]
    fn test_metric_lookup() {
        let m = evaluate(&ProgramInputs::reference_scenario());
        assert_eq!(m.metric("relevant_spend"), Some(dec!(353.7)));
        assert_eq!(
            m.metric("adjusted_leverage"),
            Some(m.statements.ratios.adjusted_leverage)
        );
        assert_eq!(
            m.metric("total_annual_benefit"),
            Some(m.summary.total_annual_benefit)
        );
        assert_eq!(m.metric("no_such_metric"), None);
        // Booleans are not metrics
        assert_eq!(m.metric("current_dpo_guarded"), None);
    }

    #[test]
    fn test_analysis_envelope() {
        let out = analyze_program_impact(&analysis_input(ProgramInputs::reference_scenario()))
            .unwrap();
        assert!(out.methodology.contains("365-day"));
        assert_eq!(out.assumptions["currency"], "GBP");
        assert!(out.warnings.is_empty(), "unexpected warnings: {:?}", out.warnings);
        assert_eq!(out.result, evaluate(&ProgramInputs::reference_scenario()));
    }

    #[test]
    fn test_analysis_rejects_invalid_inputs() {
        let mut inputs = ProgramInputs::reference_scenario();
        inputs.efficiency.customs_savings_pct = dec!(150);
        let err = analyze_program_impact(&analysis_input(inputs)).unwrap_err();
        assert!(matches!(err, ImpactError::InvalidInput { .. }));
    }

    #[test]
    fn test_fallback_policy_warns() {
        let mut inputs = ProgramInputs::reference_scenario();
        inputs.statement.cost_of_sales = Decimal::ZERO;
        let out = analyze_program_impact(&analysis_input(inputs)).unwrap();
        assert!(out.warnings.iter().any(|w| w.contains("current DPO")));
        assert!(out.result.spend.current_dpo.is_zero());
    }

    #[test]
    fn test_reject_policy_fails_on_zero_cost_of_sales() {
        let mut inputs = ProgramInputs::reference_scenario();
        inputs.statement.cost_of_sales = Decimal::ZERO;
        let input = ImpactAnalysisInput {
            inputs,
            policy: EvaluationPolicy {
                zero_denominator: ZeroDenominator::Reject,
                fallback_value: Decimal::ZERO,
            },
        };
        match analyze_program_impact(&input).unwrap_err() {
            ImpactError::DivisionByZero { context } => assert!(context.contains("DPO")),
            other => panic!("Expected DivisionByZero, got {other:?}"),
        }
    }

    #[test]
    fn test_reject_policy_fails_on_zero_shipments() {
        let mut inputs = ProgramInputs::reference_scenario();
        inputs.operations.international_shipments = Decimal::ZERO;
        let input = ImpactAnalysisInput {
            inputs,
            policy: EvaluationPolicy {
                zero_denominator: ZeroDenominator::Reject,
                fallback_value: Decimal::ZERO,
            },
        };
        assert!(matches!(
            analyze_program_impact(&input),
            Err(ImpactError::DivisionByZero { .. })
        ));
    }

    #[test]
    fn test_out_of_range_magnitudes_fail_cleanly() {
        let mut inputs = ProgramInputs::reference_scenario();
        inputs.operations.international_shipments = dec!(1000000000000000);
        inputs.operations.fee_per_shipment = dec!(100000000000000);
        assert!(matches!(
            analyze_program_impact(&analysis_input(inputs)),
            Err(ImpactError::InvalidInput { .. })
        ));

        let mut inputs = ProgramInputs::reference_scenario();
        inputs.operations.international_shipments = dec!(0.000000000000000000000000001);
        assert!(matches!(
            analyze_program_impact(&analysis_input(inputs)),
            Err(ImpactError::InvalidInput { .. })
        ));

        let input = ImpactAnalysisInput {
            inputs: ProgramInputs::reference_scenario(),
            policy: EvaluationPolicy {
                zero_denominator: ZeroDenominator::Fallback,
                fallback_value: dec!(100000000000000000000),
            },
        };
        match analyze_program_impact(&input).unwrap_err() {
            ImpactError::InvalidInput { field, .. } => assert_eq!(field, "policy.fallback_value"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_extreme_valid_inputs_evaluate() {
        // Every input at the edge of its accepted range
        let mut inputs = ProgramInputs::reference_scenario();
        let max = dec!(100000000);
        inputs.statement.trade_payables = max;
        inputs.statement.cost_of_sales = dec!(0.01);
        inputs.statement.turnover = max;
        inputs.statement.net_debt = max;
        inputs.program.relevant_spend_pct = dec!(100);
        inputs.program.new_dpo = max;
        inputs.program.funding_base_rate = max;
        inputs.program.funding_spread_bps = max;
        inputs.operations.international_shipments = dec!(0.01);
        inputs.operations.fee_per_shipment = max;
        inputs.operations.ap_headcount = max;
        inputs.operations.avg_salary_cost = max;
        assert!(analyze_program_impact(&analysis_input(inputs)).is_ok());
    }

    #[test]
    fn test_warns_when_target_below_current_dpo() {
        let mut inputs = ProgramInputs::reference_scenario();
        inputs.program.new_dpo = dec!(30);
        let out = analyze_program_impact(&analysis_input(inputs)).unwrap();
        assert!(out.warnings.iter().any(|w| w.contains("below current DPO")));
    }

    #[test]
    fn test_warns_on_negative_discount_benefit() {
        let mut inputs = ProgramInputs::reference_scenario();
        inputs.program.platform_cost = dec!(25);
        let out = analyze_program_impact(&analysis_input(inputs)).unwrap();
        assert!(out.warnings.iter().any(|w| w.contains("Net discount benefit")));
    }

    #[test]
    fn test_policy_deserializes_with_defaults() {
        let policy: EvaluationPolicy = serde_json::from_str(r#"{"zero_denominator":"reject"}"#)
            .unwrap();
        assert_eq!(policy.zero_denominator, ZeroDenominator::Reject);
        assert!(policy.fallback_value.is_zero());

        let input: ImpactAnalysisInput = serde_json::from_value(serde_json::json!({
            "inputs": serde_json::to_value(ProgramInputs::reference_scenario()).unwrap()
        }))
        .unwrap();
        assert_eq!(input.policy, EvaluationPolicy::default());
    }
}

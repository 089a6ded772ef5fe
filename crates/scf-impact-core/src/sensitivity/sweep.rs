use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::ImpactError;
use crate::impact::validation::{validate_inputs, validate_policy};
use crate::impact::{evaluate_with_policy, EvaluationPolicy, ProgramInputs};
use crate::types::{with_metadata, ComputationOutput};
use crate::ImpactResult;

/// Upper bound on evaluations in one sweep.
const MAX_GRID_POINTS: usize = 10_000;

/// An input field swept from `min` to `max` in `step` increments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityVariable {
    /// `section.field` or a bare input field name, e.g. `new_dpo`.
    pub name: String,
    pub min: Decimal,
    pub max: Decimal,
    pub step: Decimal,
}

/// Input for a one- or two-way sensitivity sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityInput {
    pub base_inputs: ProgramInputs,
    pub variable_1: SensitivityVariable,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variable_2: Option<SensitivityVariable>,
    /// Output field to report, e.g. `total_annual_benefit`.
    pub output_metric: String,
    #[serde(default)]
    pub policy: EvaluationPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityRow {
    pub variable_1_value: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variable_2_value: Option<Decimal>,
    pub output_value: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityOutput {
    pub variable_1_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variable_2_name: Option<String>,
    pub variable_1_values: Vec<Decimal>,
    pub variable_2_values: Vec<Decimal>,
    pub output_metric: String,
    /// Output at the unmodified base inputs.
    pub base_case_value: Decimal,
    pub results: Vec<SensitivityRow>,
    /// Matrix[i][j] = output at variable_1_values[i], variable_2_values[j].
    /// Empty for a one-way sweep.
    pub matrix: Vec<Vec<Decimal>>,
}

/// Generate the sweep values for a sensitivity variable from min to max with step.
fn generate_sweep_values(var: &SensitivityVariable) -> ImpactResult<Vec<Decimal>> {
    if var.step <= Decimal::ZERO {
        return Err(ImpactError::InvalidInput {
            field: format!("variable:{}", var.name),
            reason: "Step must be positive".into(),
        });
    }
    if var.min > var.max {
        return Err(ImpactError::InvalidInput {
            field: format!("variable:{}", var.name),
            reason: "Min must be <= max".into(),
        });
    }

    let mut values = Vec::new();
    let mut current = var.min;
    while current <= var.max {
        values.push(current);
        if values.len() > MAX_GRID_POINTS {
            return Err(too_many_points());
        }
        current += var.step;
    }
    // Ensure max is included if step doesn't land exactly on it
    if let Some(&last) = values.last() {
        if last < var.max {
            values.push(var.max);
        }
    }

    Ok(values)
}

fn too_many_points() -> ImpactError {
    ImpactError::InvalidInput {
        field: "variables".into(),
        reason: format!("Sweep exceeds {MAX_GRID_POINTS} evaluations"),
    }
}

/// Re-evaluate the scenario across one or two swept inputs.
pub fn run_sensitivity(
    input: &SensitivityInput,
) -> ImpactResult<ComputationOutput<SensitivityOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_inputs(&input.base_inputs)?;
    validate_policy(&input.policy)?;
    let base = evaluate_with_policy(&input.base_inputs, &input.policy);
    let base_case_value = base
        .metric(&input.output_metric)
        .ok_or_else(|| ImpactError::InvalidInput {
            field: "output_metric".into(),
            reason: format!("Unknown output metric '{}'", input.output_metric),
        })?;

    let v1_values = generate_sweep_values(&input.variable_1)?;
    let v2_values = match &input.variable_2 {
        Some(var) => generate_sweep_values(var)?,
        None => Vec::new(),
    };
    if v1_values.len() * v2_values.len().max(1) > MAX_GRID_POINTS {
        return Err(too_many_points());
    }

    let point = |v1: Decimal, v2: Option<Decimal>| -> ImpactResult<SensitivityRow> {
        let mut inputs = input.base_inputs.with_field(&input.variable_1.name, v1)?;
        if let (Some(var), Some(v2)) = (&input.variable_2, v2) {
            inputs = inputs.with_field(&var.name, v2)?;
        }
        validate_inputs(&inputs)?;
        let metrics = evaluate_with_policy(&inputs, &input.policy);
        let output_value = metrics.metric(&input.output_metric).unwrap_or_default();
        Ok(SensitivityRow {
            variable_1_value: v1,
            variable_2_value: v2,
            output_value,
        })
    };

    let mut results = Vec::new();
    let mut matrix = Vec::new();
    if input.variable_2.is_some() {
        for &v1 in &v1_values {
            let mut row = Vec::with_capacity(v2_values.len());
            for &v2 in &v2_values {
                let r = point(v1, Some(v2))?;
                row.push(r.output_value);
                results.push(r);
            }
            matrix.push(row);
        }
    } else {
        for &v1 in &v1_values {
            results.push(point(v1, None)?);
        }
    }

    if let Some(var) = &input.variable_2 {
        if var.name == input.variable_1.name {
            warnings.push(format!(
                "Both variables sweep '{}'; the second value overrides the first",
                var.name
            ));
        }
    }

    let output = SensitivityOutput {
        variable_1_name: input.variable_1.name.clone(),
        variable_2_name: input.variable_2.as_ref().map(|v| v.name.clone()),
        variable_1_values: v1_values,
        variable_2_values: v2_values,
        output_metric: input.output_metric.clone(),
        base_case_value,
        results,
        matrix,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Sensitivity sweep of supply chain finance impact",
        &serde_json::json!({
            "variable_1": input.variable_1.name,
            "variable_2": input.variable_2.as_ref().map(|v| v.name.clone()),
            "output_metric": input.output_metric,
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impact::evaluate;
    use rust_decimal_macros::dec;

    fn var(name: &str, min: Decimal, max: Decimal, step: Decimal) -> SensitivityVariable {
        SensitivityVariable {
            name: name.into(),
            min,
            max,
            step,
        }
    }

    fn one_way(variable: SensitivityVariable, metric: &str) -> SensitivityInput {
        SensitivityInput {
            base_inputs: ProgramInputs::reference_scenario(),
            variable_1: variable,
            variable_2: None,
            output_metric: metric.into(),
            policy: EvaluationPolicy::default(),
        }
    }

    #[test]
    fn test_sweep_values_include_max() {
        let values = generate_sweep_values(&var("x", dec!(0), dec!(10), dec!(4))).unwrap();
        assert_eq!(values, vec![dec!(0), dec!(4), dec!(8), dec!(10)]);
    }

    #[test]
    fn test_sweep_rejects_bad_ranges() {
        assert!(generate_sweep_values(&var("x", dec!(0), dec!(10), dec!(0))).is_err());
        assert!(generate_sweep_values(&var("x", dec!(5), dec!(1), dec!(1))).is_err());
        assert!(generate_sweep_values(&var("x", dec!(0), dec!(1000000), dec!(1))).is_err());
    }

    #[test]
    fn test_one_way_sweep_matches_direct_evaluation() {
        let input = one_way(
            var("new_dpo", dec!(60), dec!(120), dec!(30)),
            "working_capital_released",
        );
        let out = run_sensitivity(&input).unwrap().result;

        assert_eq!(out.results.len(), 3);
        assert!(out.matrix.is_empty());
        for row in &out.results {
            let inputs = ProgramInputs::reference_scenario()
                .with_field("new_dpo", row.variable_1_value)
                .unwrap();
            let expected = evaluate(&inputs).working_capital.working_capital_released;
            assert_eq!(row.output_value, expected);
        }
        // Longer terms release more cash
        assert!(out.results[0].output_value < out.results[2].output_value);
    }

    #[test]
    fn test_base_case_value() {
        let input = one_way(
            var("uptake_pct", dec!(0), dec!(100), dec!(50)),
            "total_annual_benefit",
        );
        let out = run_sensitivity(&input).unwrap().result;
        let base = evaluate(&ProgramInputs::reference_scenario());
        assert_eq!(out.base_case_value, base.summary.total_annual_benefit);
    }

    #[test]
    fn test_two_way_matrix_shape() {
        let mut input = one_way(
            var("discount_pct", dec!(1), dec!(5), dec!(2)),
            "net_discount_benefit",
        );
        input.variable_2 = Some(var("program.uptake_pct", dec!(50), dec!(100), dec!(25)));
        let out = run_sensitivity(&input).unwrap().result;

        assert_eq!(out.variable_1_values.len(), 3);
        assert_eq!(out.variable_2_values.len(), 3);
        assert_eq!(out.matrix.len(), 3);
        assert!(out.matrix.iter().all(|row| row.len() == 3));
        assert_eq!(out.results.len(), 9);
        // Higher discount and higher uptake both raise the benefit
        assert!(out.matrix[0][0] < out.matrix[2][2]);
    }

    #[test]
    fn test_sweep_point_out_of_range_is_an_error() {
        let input = one_way(
            var("international_shipments", dec!(0), dec!(0.001), dec!(0.001)),
            "customs_cost_savings",
        );
        match run_sensitivity(&input) {
            Err(ImpactError::InvalidInput { field, .. }) => {
                assert_eq!(field, "operations.international_shipments")
            }
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_metric_and_field() {
        let input = one_way(var("new_dpo", dec!(60), dec!(90), dec!(30)), "bogus");
        assert!(run_sensitivity(&input).is_err());

        let input = one_way(
            var("bogus_field", dec!(60), dec!(90), dec!(30)),
            "total_annual_benefit",
        );
        assert!(run_sensitivity(&input).is_err());
    }
}

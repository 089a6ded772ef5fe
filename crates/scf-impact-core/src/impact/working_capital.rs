use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::inputs::ProgramAssumptions;
use super::spend::SpendAnalysis;
use super::{pct, DAYS_IN_YEAR};
use crate::types::{Days, Money};

/// Balance-sheet effect of extending payment terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkingCapitalImpact {
    /// Net change in trade payables.
    pub additional_dpo: Money,
    /// Same amount as `additional_dpo`, read as the cash-flow effect.
    pub working_capital_released: Money,
    /// Financing capacity needed to support the program.
    pub scf_facility_size: Money,
    /// New DPO target minus current DPO.
    pub dpo_extension_days: Days,
}

pub fn calculate_working_capital(
    program: &ProgramAssumptions,
    spend: &SpendAnalysis,
) -> WorkingCapitalImpact {
    let relevant = spend.relevant_spend;
    let current_dpo = spend.current_dpo;
    let treasury = pct(program.treasury_funding_pct);
    let acceleration = pct(program.acceleration_pct);

    // Treasury-funded extension nets against the headline payables gain.
    let additional_dpo = relevant * ((program.new_dpo - current_dpo) / DAYS_IN_YEAR)
        * (Decimal::ONE - treasury)
        - relevant * ((current_dpo - program.free_days) / DAYS_IN_YEAR) * treasury * acceleration;

    let scf_facility_size = relevant * ((program.new_dpo - program.free_days) / DAYS_IN_YEAR)
        * pct(program.uptake_pct)
        * acceleration
        * (Decimal::ONE - treasury);

    WorkingCapitalImpact {
        additional_dpo,
        working_capital_released: additional_dpo,
        scf_facility_size,
        dpo_extension_days: program.new_dpo - current_dpo,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impact::engine::EvaluationPolicy;
    use crate::impact::inputs::ProgramInputs;
    use crate::impact::spend::analyze_spend;
    use rust_decimal_macros::dec;

    fn run(inputs: &ProgramInputs) -> (SpendAnalysis, WorkingCapitalImpact) {
        let spend = analyze_spend(
            &inputs.statement,
            &inputs.operations,
            &inputs.program,
            &EvaluationPolicy::default(),
        );
        let wc = calculate_working_capital(&inputs.program, &spend);
        (spend, wc)
    }

    fn assert_close(actual: Decimal, expected: Decimal) {
        let diff = (actual - expected).abs();
        assert!(diff < dec!(0.000000001), "expected {expected}, got {actual}");
    }

    #[test]
    fn test_reference_additional_dpo() {
        // No treasury funding: 353.7 * (90 - 48.9659...) / 365
        let (_, wc) = run(&ProgramInputs::reference_scenario());
        assert_close(wc.additional_dpo, dec!(39.763698630136986301));
        assert_eq!(wc.working_capital_released, wc.additional_dpo);
    }

    #[test]
    fn test_reference_facility_size() {
        // 353.7 * 83/365 * 0.7 * 0.8
        let (_, wc) = run(&ProgramInputs::reference_scenario());
        assert_close(wc.scf_facility_size, dec!(45.041030136986301370));
    }

    #[test]
    fn test_dpo_extension_days() {
        let (spend, wc) = run(&ProgramInputs::reference_scenario());
        assert_eq!(wc.dpo_extension_days, dec!(90) - spend.current_dpo);
    }

    #[test]
    fn test_treasury_funding_nets_against_release() {
        let mut inputs = ProgramInputs::reference_scenario();
        inputs.program.treasury_funding_pct = dec!(50);
        let (spend, wc) = run(&inputs);

        let relevant = spend.relevant_spend;
        let dpo = spend.current_dpo;
        let expected = relevant * ((dec!(90) - dpo) / dec!(365)) * dec!(0.5)
            - relevant * ((dpo - dec!(7)) / dec!(365)) * dec!(0.5) * dec!(0.8);
        assert_close(wc.additional_dpo, expected);

        let (_, baseline) = run(&ProgramInputs::reference_scenario());
        assert!(wc.additional_dpo < baseline.additional_dpo);
        assert!(wc.scf_facility_size < baseline.scf_facility_size);
    }

    #[test]
    fn test_full_treasury_funding_zero_facility() {
        let mut inputs = ProgramInputs::reference_scenario();
        inputs.program.treasury_funding_pct = dec!(100);
        let (_, wc) = run(&inputs);
        assert!(wc.scf_facility_size.is_zero());
    }

    #[test]
    fn test_shorter_target_releases_negative_working_capital() {
        let mut inputs = ProgramInputs::reference_scenario();
        inputs.program.new_dpo = dec!(30);
        let (_, wc) = run(&inputs);
        assert!(wc.working_capital_released < Decimal::ZERO);
        assert!(wc.dpo_extension_days < Decimal::ZERO);
    }
}

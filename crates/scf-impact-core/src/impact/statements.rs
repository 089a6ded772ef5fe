use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::discount::DiscountBenefit;
use super::efficiency::EfficiencySavings;
use super::inputs::ActualStatement;
use super::ratio_or_zero;
use super::working_capital::WorkingCapitalImpact;
use crate::types::{Money, Multiple, Rate};

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Actual and pro-forma income statement lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeStatementImpact {
    pub turnover: Money,
    pub cost_of_sales: Money,
    pub adjusted_cost_of_sales: Money,
    pub gross_profit: Money,
    pub adjusted_gross_profit: Money,
    pub operating_profit: Money,
    pub adjusted_operating_profit: Money,
    pub net_interest: Money,
    pub net_income: Money,
    pub adjusted_net_income: Money,
    /// Gross profit less operating profit, used as a D&A proxy.
    pub estimated_da: Money,
    pub ebitda: Money,
    pub adjusted_ebitda: Money,
    /// Net discount benefit plus headcount and customs savings.
    pub total_pl_impact: Money,
}

/// Actual and pro-forma balance sheet and cash-flow lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceSheetImpact {
    pub trade_payables: Money,
    pub adjusted_trade_payables: Money,
    pub net_debt: Money,
    pub adjusted_net_debt: Money,
    pub equity: Money,
    pub adjusted_equity: Money,
    pub cash_from_operations: Money,
    pub adjusted_fcf: Money,
    /// Carry value of released cash at the program funding rate.
    pub working_capital_value: Money,
    pub total_annual_benefit: Money,
}

/// Credit ratios before and after the program. Zero denominators yield zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioComparison {
    /// Net debt / EBITDA.
    pub leverage: Multiple,
    pub adjusted_leverage: Multiple,
    /// Net debt / equity.
    pub solvency: Multiple,
    pub adjusted_solvency: Multiple,
    pub ebitda_margin: Rate,
    pub adjusted_ebitda_margin: Rate,
    pub fcf_to_sales: Rate,
    pub adjusted_fcf_to_sales: Rate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustedStatements {
    pub income_statement: IncomeStatementImpact,
    pub balance_sheet: BalanceSheetImpact,
    pub ratios: RatioComparison,
}

/// One row of the actual vs. adjusted comparison table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementLine {
    pub label: String,
    pub actual: Decimal,
    pub adjusted: Decimal,
    pub change: Decimal,
}

impl StatementLine {
    fn new(label: &str, actual: Decimal, adjusted: Decimal) -> Self {
        StatementLine {
            label: label.to_string(),
            actual,
            adjusted,
            change: adjusted - actual,
        }
    }
}

// ---------------------------------------------------------------------------
// Adjustment
// ---------------------------------------------------------------------------

/// Combine the benefit stages into adjusted statements and ratios.
///
/// Every adjusted line is the actual line plus its benefit term, and every
/// ratio is taken from lines already computed here, so the table and the
/// benefit summary cannot drift apart.
pub fn adjust_statements(
    statement: &ActualStatement,
    discount: &DiscountBenefit,
    working_capital: &WorkingCapitalImpact,
    efficiency: &EfficiencySavings,
) -> AdjustedStatements {
    let income_statement = adjust_income_statement(statement, discount, efficiency);
    let balance_sheet = adjust_balance_sheet(
        statement,
        discount,
        working_capital,
        income_statement.total_pl_impact,
    );
    let ratios = compare_ratios(statement, &income_statement, &balance_sheet);

    AdjustedStatements {
        income_statement,
        balance_sheet,
        ratios,
    }
}

fn adjust_income_statement(
    statement: &ActualStatement,
    discount: &DiscountBenefit,
    efficiency: &EfficiencySavings,
) -> IncomeStatementImpact {
    let net_discount_benefit = discount.net_discount_benefit;
    let total_pl_impact = net_discount_benefit
        + efficiency.total_headcount_savings
        + efficiency.customs_cost_savings;

    let adjusted_cost_of_sales = statement.cost_of_sales - net_discount_benefit;
    let gross_profit = statement.turnover - statement.cost_of_sales;
    let adjusted_gross_profit = statement.turnover - adjusted_cost_of_sales;

    let adjusted_operating_profit = statement.operating_profit + total_pl_impact;
    let net_income = statement.operating_profit - statement.net_interest;
    let adjusted_net_income = adjusted_operating_profit - statement.net_interest;

    let estimated_da = gross_profit - statement.operating_profit;
    let ebitda = statement.operating_profit + estimated_da;
    let adjusted_ebitda = adjusted_operating_profit + estimated_da;

    IncomeStatementImpact {
        turnover: statement.turnover,
        cost_of_sales: statement.cost_of_sales,
        adjusted_cost_of_sales,
        gross_profit,
        adjusted_gross_profit,
        operating_profit: statement.operating_profit,
        adjusted_operating_profit,
        net_interest: statement.net_interest,
        net_income,
        adjusted_net_income,
        estimated_da,
        ebitda,
        adjusted_ebitda,
        total_pl_impact,
    }
}

fn adjust_balance_sheet(
    statement: &ActualStatement,
    discount: &DiscountBenefit,
    working_capital: &WorkingCapitalImpact,
    total_pl_impact: Money,
) -> BalanceSheetImpact {
    let released = working_capital.working_capital_released;
    let working_capital_value = released * discount.total_funding_rate;

    BalanceSheetImpact {
        trade_payables: statement.trade_payables,
        adjusted_trade_payables: statement.trade_payables + working_capital.additional_dpo,
        net_debt: statement.net_debt,
        adjusted_net_debt: statement.net_debt - released,
        equity: statement.equity,
        adjusted_equity: statement.equity + total_pl_impact,
        cash_from_operations: statement.cash_from_operations,
        adjusted_fcf: statement.cash_from_operations + released,
        working_capital_value,
        total_annual_benefit: total_pl_impact + working_capital_value,
    }
}

fn compare_ratios(
    statement: &ActualStatement,
    income: &IncomeStatementImpact,
    balance: &BalanceSheetImpact,
) -> RatioComparison {
    let turnover = statement.turnover;

    RatioComparison {
        leverage: ratio_or_zero(balance.net_debt, income.ebitda),
        adjusted_leverage: ratio_or_zero(balance.adjusted_net_debt, income.adjusted_ebitda),
        solvency: ratio_or_zero(balance.net_debt, balance.equity),
        adjusted_solvency: ratio_or_zero(balance.adjusted_net_debt, balance.adjusted_equity),
        ebitda_margin: ratio_or_zero(income.ebitda, turnover),
        adjusted_ebitda_margin: ratio_or_zero(income.adjusted_ebitda, turnover),
        fcf_to_sales: ratio_or_zero(balance.cash_from_operations, turnover),
        adjusted_fcf_to_sales: ratio_or_zero(balance.adjusted_fcf, turnover),
    }
}

impl AdjustedStatements {
    /// The actual vs. adjusted comparison table, statement lines then ratios.
    pub fn lines(&self) -> Vec<StatementLine> {
        let is = &self.income_statement;
        let bs = &self.balance_sheet;
        let r = &self.ratios;

        vec![
            StatementLine::new("Turnover", is.turnover, is.turnover),
            StatementLine::new("Cost of sales", is.cost_of_sales, is.adjusted_cost_of_sales),
            StatementLine::new("Gross profit", is.gross_profit, is.adjusted_gross_profit),
            StatementLine::new(
                "Operating profit",
                is.operating_profit,
                is.adjusted_operating_profit,
            ),
            StatementLine::new("Net interest", is.net_interest, is.net_interest),
            StatementLine::new("Net income", is.net_income, is.adjusted_net_income),
            StatementLine::new("EBITDA", is.ebitda, is.adjusted_ebitda),
            StatementLine::new(
                "Trade payables",
                bs.trade_payables,
                bs.adjusted_trade_payables,
            ),
            StatementLine::new("Net debt", bs.net_debt, bs.adjusted_net_debt),
            StatementLine::new("Equity", bs.equity, bs.adjusted_equity),
            StatementLine::new("Free cash flow", bs.cash_from_operations, bs.adjusted_fcf),
            StatementLine::new("Net debt / EBITDA", r.leverage, r.adjusted_leverage),
            StatementLine::new("Net debt / equity", r.solvency, r.adjusted_solvency),
            StatementLine::new("EBITDA margin", r.ebitda_margin, r.adjusted_ebitda_margin),
            StatementLine::new("FCF / sales", r.fcf_to_sales, r.adjusted_fcf_to_sales),
        ]
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    use crate::types::Currency;

    fn statement() -> ActualStatement {
        ActualStatement {
            turnover: dec!(1000),
            cost_of_sales: dec!(600),
            operating_profit: dec!(100),
            net_interest: dec!(20),
            trade_payables: dec!(80),
            net_debt: dec!(300),
            equity: dec!(250),
            cash_from_operations: dec!(50),
            currency: Currency::USD,
        }
    }

    fn discount(net: Decimal) -> DiscountBenefit {
        DiscountBenefit {
            total_funding_rate: dec!(0.1),
            income_from_discounts: net,
            funding_cost_to_suppliers: Decimal::ZERO,
            platform_cost: Decimal::ZERO,
            net_discount_benefit: net,
        }
    }

    fn working_capital(released: Decimal) -> WorkingCapitalImpact {
        WorkingCapitalImpact {
            additional_dpo: released,
            working_capital_released: released,
            scf_facility_size: Decimal::ZERO,
            dpo_extension_days: Decimal::ZERO,
        }
    }

    fn efficiency(headcount: Decimal, customs: Decimal) -> EfficiencySavings {
        EfficiencySavings {
            ap_headcount_saved: Decimal::ZERO,
            trade_headcount_saved: Decimal::ZERO,
            total_fte_saved: Decimal::ZERO,
            ap_salary_savings: Decimal::ZERO,
            trade_salary_savings: Decimal::ZERO,
            total_headcount_savings: headcount,
            annual_customs_fees: customs,
            customs_cost_savings: customs,
            total_efficiency_savings: headcount + customs,
        }
    }

    fn adjusted() -> AdjustedStatements {
        adjust_statements(
            &statement(),
            &discount(dec!(10)),
            &working_capital(dec!(40)),
            &efficiency(dec!(2), dec!(3)),
        )
    }

    #[test]
    fn test_income_statement_lines() {
        let is = adjusted().income_statement;
        assert_eq!(is.total_pl_impact, dec!(15));
        assert_eq!(is.adjusted_cost_of_sales, dec!(590));
        assert_eq!(is.gross_profit, dec!(400));
        assert_eq!(is.adjusted_gross_profit, dec!(410));
        assert_eq!(is.adjusted_operating_profit, dec!(115));
        assert_eq!(is.net_income, dec!(80));
        assert_eq!(is.adjusted_net_income, dec!(95));
        // D&A proxy = 400 - 100; EBITDA collapses back to gross profit
        assert_eq!(is.estimated_da, dec!(300));
        assert_eq!(is.ebitda, dec!(400));
        assert_eq!(is.adjusted_ebitda, dec!(415));
    }

    #[test]
    fn test_balance_sheet_lines() {
        let bs = adjusted().balance_sheet;
        assert_eq!(bs.adjusted_trade_payables, dec!(120));
        assert_eq!(bs.adjusted_net_debt, dec!(260));
        assert_eq!(bs.adjusted_equity, dec!(265));
        assert_eq!(bs.adjusted_fcf, dec!(90));
        assert_eq!(bs.working_capital_value, dec!(4));
        assert_eq!(bs.total_annual_benefit, dec!(19));
    }

    #[test]
    fn test_ratios_use_adjusted_lines() {
        let r = adjusted().ratios;
        assert_eq!(r.leverage, dec!(0.75));
        assert_eq!(r.adjusted_leverage, dec!(260) / dec!(415));
        assert_eq!(r.solvency, dec!(1.2));
        assert_eq!(r.adjusted_solvency, dec!(260) / dec!(265));
        assert_eq!(r.ebitda_margin, dec!(0.4));
        assert_eq!(r.adjusted_ebitda_margin, dec!(0.415));
        assert_eq!(r.fcf_to_sales, dec!(0.05));
        assert_eq!(r.adjusted_fcf_to_sales, dec!(0.09));
    }

    #[test]
    fn test_zero_turnover_ratios_are_zero() {
        let mut s = statement();
        s.turnover = Decimal::ZERO;
        let r = adjust_statements(
            &s,
            &discount(dec!(10)),
            &working_capital(dec!(40)),
            &efficiency(dec!(2), dec!(3)),
        )
        .ratios;
        assert!(r.ebitda_margin.is_zero());
        assert!(r.adjusted_ebitda_margin.is_zero());
        assert!(r.fcf_to_sales.is_zero());
        assert!(r.adjusted_fcf_to_sales.is_zero());
    }

    #[test]
    fn test_zero_equity_and_ebitda_guarded() {
        let mut s = statement();
        s.equity = Decimal::ZERO;
        // Gross profit 0 makes EBITDA 0
        s.turnover = s.cost_of_sales;
        let r = adjust_statements(
            &s,
            &discount(Decimal::ZERO),
            &working_capital(dec!(40)),
            &efficiency(Decimal::ZERO, Decimal::ZERO),
        )
        .ratios;
        assert!(r.leverage.is_zero());
        assert!(r.adjusted_leverage.is_zero());
        assert!(r.solvency.is_zero());
        assert!(r.adjusted_solvency.is_zero());
    }

    #[test]
    fn test_comparison_lines_changes() {
        let lines = adjusted().lines();
        assert_eq!(lines.len(), 15);

        let find = |label: &str| lines.iter().find(|l| l.label == label).unwrap().clone();
        assert_eq!(find("Turnover").change, Decimal::ZERO);
        assert_eq!(find("Cost of sales").change, dec!(-10));
        assert_eq!(find("Gross profit").change, dec!(10));
        assert_eq!(find("Equity").change, dec!(15));
        assert_eq!(find("Net debt").change, dec!(-40));
        assert_eq!(find("Free cash flow").change, dec!(40));
    }
}

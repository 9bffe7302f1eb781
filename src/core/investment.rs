use serde::Serialize;

use super::error::EngineError;
use super::rates::{MAX_PROJECTION_YEARS, MONTHS_PER_YEAR};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthStep {
    pub opening_value: f64,
    pub annual_return: f64,
    pub contribution: f64,
    pub closing_value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentYear {
    pub year: u32,
    pub investment_value: f64,
    pub annual_growth: f64,
    pub annual_contribution: f64,
    pub cumulative_contributions: f64,
    pub cumulative_gains: f64,
    /// Cumulative gains over cumulative contributions, as a fraction.
    pub return_on_contributions: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalReturn {
    pub initial_amount: f64,
    pub final_amount: f64,
    pub total_gain: f64,
    pub percentage_return: f64,
    pub multiple: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositInvestment {
    pub initial_investment: f64,
    pub annual_return_rate: f64,
    pub years: u32,
    pub final_value: f64,
    pub yearly_growth: Vec<InvestmentYear>,
    pub return_metrics: TotalReturn,
    pub average_annual_return: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DollarCostAveraging {
    pub monthly_amount: f64,
    pub annual_contribution: f64,
    pub total_contributed: f64,
    pub final_value: f64,
    pub total_gain: f64,
    pub return_percentage: f64,
    pub years: u32,
}

/// One year of growth: the return accrues on the opening balance and the
/// contribution lands afterwards.
pub fn grow_one_year(opening_value: f64, annual_return_rate: f64, contribution: f64) -> GrowthStep {
    let annual_return = opening_value * annual_return_rate;
    GrowthStep {
        opening_value,
        annual_return,
        contribution,
        closing_value: opening_value + annual_return + contribution,
    }
}

/// Value after `years` of growth with an end-of-year `contribution`.
pub fn compound_growth(
    initial_amount: f64,
    annual_return_rate: f64,
    years: u32,
    contribution: f64,
) -> f64 {
    (0..years).fold(initial_amount, |value, _| {
        grow_one_year(value, annual_return_rate, contribution).closing_value
    })
}

pub fn yearly_investment_growth(
    initial_amount: f64,
    annual_return_rate: f64,
    years: u32,
    contribution: f64,
) -> Result<Vec<InvestmentYear>, EngineError> {
    check_years(years)?;

    let mut value = initial_amount;
    let mut cumulative_contributions = initial_amount;
    let mut rows = Vec::with_capacity(years as usize);
    for year in 1..=years {
        let step = grow_one_year(value, annual_return_rate, contribution);
        value = step.closing_value;
        cumulative_contributions += contribution;
        let cumulative_gains = value - cumulative_contributions;

        rows.push(InvestmentYear {
            year,
            investment_value: value,
            annual_growth: step.annual_return,
            annual_contribution: contribution,
            cumulative_contributions,
            cumulative_gains,
            return_on_contributions: if cumulative_contributions > 0.0 {
                cumulative_gains / cumulative_contributions
            } else {
                0.0
            },
        });
    }
    Ok(rows)
}

pub fn total_return(initial_amount: f64, final_amount: f64) -> TotalReturn {
    let total_gain = final_amount - initial_amount;
    let (percentage_return, multiple) = if initial_amount > 0.0 {
        (total_gain / initial_amount, final_amount / initial_amount)
    } else {
        (0.0, 0.0)
    };

    TotalReturn {
        initial_amount,
        final_amount,
        total_gain,
        percentage_return,
        multiple,
    }
}

/// Growth of a property deposit invested once and left alone.
pub fn equivalent_deposit_investment(
    deposit: f64,
    annual_return_rate: f64,
    years: u32,
) -> Result<DepositInvestment, EngineError> {
    let yearly_growth = yearly_investment_growth(deposit, annual_return_rate, years, 0.0)?;
    let final_value = compound_growth(deposit, annual_return_rate, years, 0.0);
    let return_metrics = total_return(deposit, final_value);

    Ok(DepositInvestment {
        initial_investment: deposit,
        annual_return_rate,
        years,
        final_value,
        yearly_growth,
        return_metrics,
        average_annual_return: if years > 0 {
            return_metrics.percentage_return / years as f64
        } else {
            0.0
        },
    })
}

/// Investing `monthly_amount` every month from nothing, credited yearly.
pub fn dollar_cost_averaging(
    monthly_amount: f64,
    annual_return_rate: f64,
    years: u32,
) -> DollarCostAveraging {
    let annual_contribution = monthly_amount * MONTHS_PER_YEAR;
    let final_value = compound_growth(0.0, annual_return_rate, years, annual_contribution);
    let total_contributed = annual_contribution * years as f64;
    let total_gain = final_value - total_contributed;

    DollarCostAveraging {
        monthly_amount,
        annual_contribution,
        total_contributed,
        final_value,
        total_gain,
        return_percentage: if total_contributed > 0.0 {
            total_gain / total_contributed
        } else {
            0.0
        },
        years,
    }
}

fn check_years(years: u32) -> Result<(), EngineError> {
    if years > MAX_PROJECTION_YEARS {
        return Err(EngineError::invalid(
            "years",
            format!("{years} years exceeds the {MAX_PROJECTION_YEARS}-year limit"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn growth_step_applies_return_before_contribution() {
        let step = grow_one_year(10_000.0, 0.10, 500.0);
        assert_approx(step.annual_return, 1_000.0);
        assert_approx(step.closing_value, 11_500.0);
        assert_eq!(step.opening_value, 10_000.0);
    }

    #[test]
    fn compound_growth_matches_hand_calculation() {
        assert_approx(compound_growth(1_000.0, 0.10, 2, 0.0), 1_210.0);
        // (1000 * 1.1 + 100) * 1.1 + 100
        assert_approx(compound_growth(1_000.0, 0.10, 2, 100.0), 1_420.0);
        assert_eq!(compound_growth(1_000.0, 0.10, 0, 100.0), 1_000.0);
    }

    #[test]
    fn yearly_table_tracks_contributions_and_gains() {
        let rows = yearly_investment_growth(1_000.0, 0.10, 3, 100.0).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].year, 1);
        assert_approx(rows[0].investment_value, 1_200.0);
        assert_approx(rows[0].annual_growth, 100.0);
        assert_approx(rows[0].cumulative_contributions, 1_100.0);
        assert_approx(rows[0].cumulative_gains, 100.0);
        assert_approx(rows[0].return_on_contributions, 100.0 / 1_100.0);
        assert_approx(
            rows[2].investment_value,
            compound_growth(1_000.0, 0.10, 3, 100.0),
        );
    }

    #[test]
    fn yearly_table_rejects_overlong_horizons() {
        assert!(yearly_investment_growth(1_000.0, 0.07, MAX_PROJECTION_YEARS, 0.0).is_ok());
        assert!(yearly_investment_growth(1_000.0, 0.07, 4_000_000_000, 0.0).is_err());
        assert!(equivalent_deposit_investment(1_000.0, 0.07, MAX_PROJECTION_YEARS + 1).is_err());
    }

    #[test]
    fn empty_investment_has_no_return_ratios() {
        let rows = yearly_investment_growth(0.0, 0.07, 2, 0.0).unwrap();
        assert!(rows.iter().all(|row| row.return_on_contributions == 0.0));

        let metrics = total_return(0.0, 500.0);
        assert_eq!(metrics.percentage_return, 0.0);
        assert_eq!(metrics.multiple, 0.0);
        assert_approx(metrics.total_gain, 500.0);
    }

    #[test]
    fn total_return_reports_gain_and_multiple() {
        let metrics = total_return(50_000.0, 125_000.0);
        assert_approx(metrics.total_gain, 75_000.0);
        assert_approx(metrics.percentage_return, 1.5);
        assert_approx(metrics.multiple, 2.5);
    }

    #[test]
    fn deposit_investment_summarises_growth() {
        let deposit = equivalent_deposit_investment(160_000.0, 0.07, 10).unwrap();
        assert_eq!(deposit.yearly_growth.len(), 10);
        assert_approx(
            deposit.final_value,
            deposit.yearly_growth[9].investment_value,
        );
        assert_approx(
            deposit.return_metrics.percentage_return,
            deposit.final_value / 160_000.0 - 1.0,
        );
        assert_approx(
            deposit.average_annual_return,
            deposit.return_metrics.percentage_return / 10.0,
        );

        let no_years = equivalent_deposit_investment(160_000.0, 0.07, 0).unwrap();
        assert_eq!(no_years.final_value, 160_000.0);
        assert_eq!(no_years.average_annual_return, 0.0);
        assert!(no_years.yearly_growth.is_empty());
    }

    #[test]
    fn dollar_cost_averaging_from_nothing() {
        let dca = dollar_cost_averaging(1_000.0, 0.0, 5);
        assert_approx(dca.annual_contribution, 12_000.0);
        assert_approx(dca.total_contributed, 60_000.0);
        assert_approx(dca.final_value, 60_000.0);
        assert_approx(dca.total_gain, 0.0);

        let growing = dollar_cost_averaging(1_000.0, 0.10, 2);
        // 12000 credited at the end of year one, grows 10%, plus 12000.
        assert_approx(growing.final_value, 25_200.0);
        assert_approx(growing.return_percentage, 1_200.0 / 24_000.0);

        assert_eq!(dollar_cost_averaging(0.0, 0.07, 10).return_percentage, 0.0);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_zero_return_only_accumulates_contributions(
            initial in 0.0f64..1_000_000.0,
            contribution in 0.0f64..100_000.0,
            years in 0u32..=MAX_PROJECTION_YEARS,
        ) {
            let value = compound_growth(initial, 0.0, years, contribution);
            let expected = initial + contribution * years as f64;
            prop_assert!((value - expected).abs() <= 1e-9 * expected.max(1.0));
        }

        #[test]
        fn prop_positive_returns_keep_gains_non_negative(
            initial in 0.0f64..1_000_000.0,
            rate in 0.0f64..0.2,
            contribution in 0.0f64..50_000.0,
            years in 1u32..=50,
        ) {
            let rows = yearly_investment_growth(initial, rate, years, contribution).unwrap();
            let mut previous = initial;
            for row in &rows {
                prop_assert!(row.cumulative_gains >= -1e-6);
                prop_assert!(row.investment_value >= previous - 1e-6);
                previous = row.investment_value;
            }
        }
    }
}

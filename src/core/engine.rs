use super::error::EngineError;
use super::investment::grow_one_year;
use super::mortgage::{annual_interest_portion, monthly_payment, remaining_balance};
use super::rates::{MONTHS_PER_YEAR, WEEKS_PER_YEAR};
use super::stamp_duty::stamp_duty;
use super::tax::{capital_gains_tax, marginal_rate, negative_gearing_benefit};
use super::types::{
    AfterTaxPosition, Comparison, ComparisonInputs, IncomeProfile, ScenarioInputs, ScenarioResult,
    Strategy, StrategySet, YearRecord,
};

#[derive(Debug, Clone, Copy)]
struct PurchaseTerms {
    deposit: f64,
    stamp_duty: f64,
    total_upfront: f64,
    loan_amount: f64,
    monthly_payment: f64,
}

impl PurchaseTerms {
    fn new(inputs: &ScenarioInputs) -> Result<Self, EngineError> {
        let deposit = inputs.property_price * inputs.deposit_fraction;
        let stamp_duty = stamp_duty(inputs.property_price, inputs.is_first_home_buyer);
        let loan_amount = inputs.property_price - deposit;
        let monthly_payment =
            monthly_payment(loan_amount, inputs.interest_rate, inputs.loan_term_years)?;

        Ok(Self {
            deposit,
            stamp_duty,
            total_upfront: deposit + stamp_duty + inputs.upfront_costs,
            loan_amount,
            monthly_payment,
        })
    }

    /// No repayments are due once the loan term has run out.
    fn annual_payment(&self, inputs: &ScenarioInputs, year: u32) -> f64 {
        if year <= inputs.loan_term_years {
            self.monthly_payment * MONTHS_PER_YEAR
        } else {
            0.0
        }
    }

    fn remaining_balance(&self, inputs: &ScenarioInputs, year: u32) -> f64 {
        remaining_balance(
            self.loan_amount,
            inputs.interest_rate,
            inputs.loan_term_years,
            year,
        )
    }

    fn into_result(
        self,
        strategy: Strategy,
        inputs: &ScenarioInputs,
        yearly: Vec<YearRecord>,
    ) -> ScenarioResult {
        ScenarioResult {
            strategy,
            property_price: inputs.property_price,
            deposit: self.deposit,
            stamp_duty: self.stamp_duty,
            upfront_costs: inputs.upfront_costs,
            total_upfront_cost: self.total_upfront,
            loan_amount: self.loan_amount,
            monthly_payment: self.monthly_payment,
            yearly_analysis: yearly,
        }
    }
}

fn grown(base: f64, rate: f64, year: u32) -> f64 {
    base * (1.0 + rate).powi(year as i32)
}

fn annual_from_weekly(weekly: f64, inflation: f64, year: u32) -> f64 {
    grown(weekly * WEEKS_PER_YEAR, inflation, year)
}

/// Percentage return on net cash invested; 0 when nothing is invested.
fn roi_percent(net_worth: f64, net_cash_invested: f64) -> f64 {
    if net_cash_invested > 0.0 {
        (net_worth - net_cash_invested) / net_cash_invested * 100.0
    } else {
        0.0
    }
}

/// Mortgage repayment plus property expenses for a home bought with `inputs`.
fn owner_housing_cost(inputs: &ScenarioInputs, terms: &PurchaseTerms, year: u32) -> f64 {
    let property_value = grown(inputs.property_price, inputs.property_growth_rate, year);
    terms.annual_payment(inputs, year) + property_value * inputs.property_expenses_rate
}

pub fn project_scenario(
    strategy: Strategy,
    inputs: &ScenarioInputs,
) -> Result<ScenarioResult, EngineError> {
    match strategy {
        Strategy::BuyToLive => project_buy_to_live(inputs),
        Strategy::BuyToRent => project_buy_to_rent(inputs),
        Strategy::RentAndInvest => project_rent_and_invest(inputs, None),
    }
}

pub fn project_buy_to_live(inputs: &ScenarioInputs) -> Result<ScenarioResult, EngineError> {
    inputs.validate()?;
    let terms = PurchaseTerms::new(inputs)?;

    let mut yearly = Vec::with_capacity(inputs.horizon_years as usize);
    let mut cumulative_costs = terms.total_upfront;
    let cumulative_income = 0.0;

    for year in 1..=inputs.horizon_years {
        let property_value = grown(inputs.property_price, inputs.property_growth_rate, year);
        let remaining = terms.remaining_balance(inputs, year);
        let annual_mortgage_payment = terms.annual_payment(inputs, year);
        let annual_property_expenses = property_value * inputs.property_expenses_rate;
        let annual_housing_cost = annual_mortgage_payment + annual_property_expenses;

        cumulative_costs += annual_housing_cost;
        let net_cash_invested = cumulative_costs - cumulative_income;
        let net_worth = property_value - remaining;

        yearly.push(YearRecord {
            year,
            asset_value: property_value,
            remaining_balance: remaining,
            net_worth,
            cumulative_costs,
            cumulative_income,
            net_cash_invested,
            annual_mortgage_payment,
            annual_property_expenses,
            annual_housing_cost,
            roi_percent: roi_percent(net_worth, net_cash_invested),
            ..YearRecord::default()
        });
    }

    let result = terms.into_result(Strategy::BuyToLive, inputs, yearly);
    log_projection(&result);
    Ok(result)
}

pub fn project_buy_to_rent(inputs: &ScenarioInputs) -> Result<ScenarioResult, EngineError> {
    inputs.validate()?;
    let terms = PurchaseTerms::new(inputs)?;
    let income = inputs.income_profile();

    let mut yearly = Vec::with_capacity(inputs.horizon_years as usize);
    let mut cumulative_costs = terms.total_upfront;
    let mut cumulative_income = 0.0;
    let mut cumulative_negative_gearing = 0.0;
    let mut cumulative_rent_paid = 0.0;

    for year in 1..=inputs.horizon_years {
        let property_value = grown(inputs.property_price, inputs.property_growth_rate, year);
        let annual_rental_income =
            annual_from_weekly(inputs.weekly_rental_income, inputs.rental_inflation_rate, year);
        let annual_personal_rent =
            annual_from_weekly(inputs.weekly_rent, inputs.rental_inflation_rate, year);

        let remaining = terms.remaining_balance(inputs, year);
        let annual_mortgage_interest = annual_interest_portion(
            terms.loan_amount,
            inputs.interest_rate,
            inputs.loan_term_years,
            year,
        );
        let annual_mortgage_payment = terms.annual_payment(inputs, year);
        let annual_property_expenses = property_value * inputs.property_expenses_rate;

        let marginal_tax_rate = marginal_rate(income.income_in_year(year));
        let deductible_expenses = annual_mortgage_interest + annual_property_expenses;
        let property_loss = (deductible_expenses - annual_rental_income).max(0.0);
        let benefit =
            negative_gearing_benefit(deductible_expenses, annual_rental_income, marginal_tax_rate);
        cumulative_negative_gearing += benefit;

        let annual_costs = annual_mortgage_payment + annual_property_expenses + annual_personal_rent;
        let annual_income = annual_rental_income + benefit;
        cumulative_costs += annual_costs;
        cumulative_income += annual_income;
        cumulative_rent_paid += annual_personal_rent;
        let net_cash_invested = cumulative_costs - cumulative_income;

        // Tax refunds are held as wealth alongside the equity.
        let net_worth = property_value - remaining + cumulative_negative_gearing;

        yearly.push(YearRecord {
            year,
            asset_value: property_value,
            remaining_balance: remaining,
            net_worth,
            cumulative_costs,
            cumulative_income,
            net_cash_invested,
            annual_mortgage_payment,
            annual_mortgage_interest,
            annual_property_expenses,
            annual_housing_cost: annual_costs - annual_income,
            annual_rental_income,
            annual_personal_rent,
            annual_net_cash_flow: annual_income - annual_costs,
            cumulative_rent_paid,
            marginal_tax_rate,
            deductible_expenses,
            property_loss,
            negative_gearing_benefit: benefit,
            cumulative_negative_gearing,
            roi_percent: roi_percent(net_worth, net_cash_invested),
            ..YearRecord::default()
        });
    }

    let result = terms.into_result(Strategy::BuyToRent, inputs, yearly);
    log_projection(&result);
    Ok(result)
}

/// Rents and invests what buying would have cost.
///
/// `equivalent_costs` is the per-year housing cost of an owner-occupier
/// (normally Buy to Live's `annual_housing_cost` series). Without it the cost
/// is derived from `inputs` the same way Buy to Live computes it. Years past
/// the end of a supplied series contribute nothing.
pub fn project_rent_and_invest(
    inputs: &ScenarioInputs,
    equivalent_costs: Option<&[f64]>,
) -> Result<ScenarioResult, EngineError> {
    inputs.validate()?;
    let terms = PurchaseTerms::new(inputs)?;

    let initial_investment = terms.total_upfront;
    let mut portfolio_value = initial_investment;
    let mut cumulative_contributions = initial_investment;
    let mut cumulative_costs = initial_investment;
    let cumulative_income = 0.0;
    let mut cumulative_rent_paid = 0.0;
    let mut yearly = Vec::with_capacity(inputs.horizon_years as usize);

    for year in 1..=inputs.horizon_years {
        let annual_rent = annual_from_weekly(inputs.weekly_rent, inputs.rental_inflation_rate, year);
        let equivalent_cost = match equivalent_costs {
            Some(series) => series.get(year as usize - 1).copied(),
            None => Some(owner_housing_cost(inputs, &terms, year)),
        };
        // Only the positive residual is invested; the portfolio is never drawn down for rent.
        let contribution = equivalent_cost
            .map(|cost| (cost - annual_rent).max(0.0))
            .unwrap_or(0.0);

        let step = grow_one_year(portfolio_value, inputs.stock_return_rate, contribution);
        portfolio_value = step.closing_value;

        cumulative_contributions += contribution;
        cumulative_rent_paid += annual_rent;
        cumulative_costs += annual_rent + contribution;
        let net_cash_invested = cumulative_costs - cumulative_income;
        let net_worth = portfolio_value;

        yearly.push(YearRecord {
            year,
            asset_value: portfolio_value,
            net_worth,
            cumulative_costs,
            cumulative_income,
            net_cash_invested,
            annual_housing_cost: annual_rent,
            annual_personal_rent: annual_rent,
            equivalent_property_cost: equivalent_cost.unwrap_or(0.0),
            annual_net_investment: contribution,
            annual_investment_return: step.annual_return,
            cumulative_contributions,
            cumulative_rent_paid,
            roi_percent: roi_percent(net_worth, net_cash_invested),
            ..YearRecord::default()
        });
    }

    let result = ScenarioResult {
        strategy: Strategy::RentAndInvest,
        property_price: inputs.property_price,
        deposit: terms.deposit,
        stamp_duty: terms.stamp_duty,
        upfront_costs: inputs.upfront_costs,
        total_upfront_cost: initial_investment,
        loan_amount: 0.0,
        monthly_payment: 0.0,
        yearly_analysis: yearly,
    };
    log_projection(&result);
    Ok(result)
}

/// Returns a copy of `result` with the after-tax position filled in for
/// every year. The marginal rate is taken from that year's grown salary and
/// every year is treated as a long-term holding.
///
/// The cost bases differ between strategies: an investment property is
/// measured against its purchase price alone (stamp duty and upfront costs
/// are not added), while a portfolio is measured against every dollar
/// contributed to it. A main residence is exempt.
pub fn with_capital_gains_tax(result: &ScenarioResult, income: &IncomeProfile) -> ScenarioResult {
    let mut after_tax = result.clone();

    for record in &mut after_tax.yearly_analysis {
        let capital_gain = match result.strategy {
            Strategy::BuyToLive => 0.0,
            Strategy::BuyToRent => record.asset_value - result.property_price,
            Strategy::RentAndInvest => record.asset_value - record.cumulative_contributions,
        };
        let cgt_liability = match result.strategy {
            Strategy::BuyToLive => 0.0,
            Strategy::BuyToRent | Strategy::RentAndInvest => {
                let rate = marginal_rate(income.income_in_year(record.year));
                capital_gains_tax(capital_gain, rate, true)
            }
        };
        let net_worth_after_tax = record.net_worth - cgt_liability;

        record.after_tax = Some(AfterTaxPosition {
            capital_gain,
            cgt_liability,
            net_worth_after_tax,
            roi_after_tax_percent: roi_percent(net_worth_after_tax, record.net_cash_invested),
        });
    }

    after_tax
}

pub fn apply_capital_gains_tax(
    buy_to_live: &ScenarioResult,
    buy_to_rent: &ScenarioResult,
    rent_and_invest: &ScenarioResult,
    income: &IncomeProfile,
) -> (ScenarioResult, ScenarioResult, ScenarioResult) {
    (
        with_capital_gains_tax(buy_to_live, income),
        with_capital_gains_tax(buy_to_rent, income),
        with_capital_gains_tax(rent_and_invest, income),
    )
}

/// Projects all three strategies, feeding Buy to Live's housing costs into
/// Rent and Invest, and taxes the results with Buy to Rent's salary path.
pub fn compare_strategies(inputs: &ComparisonInputs) -> Result<Comparison, EngineError> {
    let buy_to_live = project_buy_to_live(&inputs.buy_to_live)?;
    let buy_to_rent = project_buy_to_rent(&inputs.buy_to_rent)?;
    let housing_costs: Vec<f64> = buy_to_live
        .yearly_analysis
        .iter()
        .map(|record| record.annual_housing_cost)
        .collect();
    let rent_and_invest = project_rent_and_invest(&inputs.rent_and_invest, Some(&housing_costs))?;

    let income = inputs.buy_to_rent.income_profile();
    let (btl_after_tax, btr_after_tax, ri_after_tax) =
        apply_capital_gains_tax(&buy_to_live, &buy_to_rent, &rent_and_invest, &income);

    let after_tax = StrategySet {
        buy_to_live: btl_after_tax,
        buy_to_rent: btr_after_tax,
        rent_and_invest: ri_after_tax,
    };
    let best_strategy = best_after_tax(&after_tax);
    tracing::debug!(best = best_strategy.label(), "strategies compared");

    Ok(Comparison {
        current_marginal_rate: marginal_rate(income.gross_income),
        pre_tax: StrategySet {
            buy_to_live,
            buy_to_rent,
            rent_and_invest,
        },
        after_tax,
        best_strategy,
    })
}

/// Highest final after-tax net worth; earlier strategies win ties.
fn best_after_tax(set: &StrategySet) -> Strategy {
    let mut best = Strategy::BuyToLive;
    let mut best_value = f64::NEG_INFINITY;
    for strategy in Strategy::ALL {
        let value = set
            .get(strategy)
            .final_net_worth_after_tax()
            .unwrap_or(f64::NEG_INFINITY);
        if value > best_value {
            best = strategy;
            best_value = value;
        }
    }
    best
}

fn log_projection(result: &ScenarioResult) {
    tracing::debug!(
        strategy = result.strategy.label(),
        years = result.yearly_analysis.len(),
        final_net_worth = result.final_net_worth(),
        "projection complete"
    );
}

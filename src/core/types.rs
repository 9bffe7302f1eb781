use serde::Serialize;

use super::error::EngineError;
use super::rates::MAX_PROJECTION_YEARS;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    BuyToLive,
    BuyToRent,
    RentAndInvest,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [
        Strategy::BuyToLive,
        Strategy::BuyToRent,
        Strategy::RentAndInvest,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Strategy::BuyToLive => "Buy to Live",
            Strategy::BuyToRent => "Buy to Rent",
            Strategy::RentAndInvest => "Rent and Invest",
        }
    }
}

/// Scalars describing one strategy. Rates are decimal fractions.
///
/// `property_price` is the home price for Buy to Live, the investment
/// property price for Buy to Rent and the equivalent property price for
/// Rent and Invest. `weekly_rental_income` is only read by Buy to Rent and
/// `stock_return_rate` only by Rent and Invest.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioInputs {
    pub property_price: f64,
    pub deposit_fraction: f64,
    pub interest_rate: f64,
    pub loan_term_years: u32,
    pub horizon_years: u32,
    pub property_growth_rate: f64,
    pub rental_inflation_rate: f64,
    pub property_expenses_rate: f64,
    pub upfront_costs: f64,
    pub is_first_home_buyer: bool,
    pub gross_income: f64,
    pub salary_growth_rate: f64,
    pub weekly_rental_income: f64,
    pub weekly_rent: f64,
    pub stock_return_rate: f64,
}

impl Default for ScenarioInputs {
    fn default() -> Self {
        Self {
            property_price: 800_000.0,
            deposit_fraction: 0.20,
            interest_rate: 0.06,
            loan_term_years: 30,
            horizon_years: 30,
            property_growth_rate: 0.05,
            rental_inflation_rate: 0.03,
            property_expenses_rate: 0.01,
            upfront_costs: 3_000.0,
            is_first_home_buyer: false,
            gross_income: 100_000.0,
            salary_growth_rate: 0.03,
            weekly_rental_income: 575.0,
            weekly_rent: 460.0,
            stock_return_rate: 0.07,
        }
    }
}

impl ScenarioInputs {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.loan_term_years == 0 {
            return Err(EngineError::invalid(
                "loan_term_years",
                "loan term must be at least one year",
            ));
        }

        if self.horizon_years == 0 {
            return Err(EngineError::invalid(
                "horizon_years",
                "analysis horizon must be at least one year",
            ));
        }

        for (field, value) in [
            ("loan_term_years", self.loan_term_years),
            ("horizon_years", self.horizon_years),
        ] {
            if value > MAX_PROJECTION_YEARS {
                return Err(EngineError::invalid(
                    field,
                    format!("{value} years exceeds the {MAX_PROJECTION_YEARS}-year limit"),
                ));
            }
        }

        for (field, value) in [
            ("property_price", self.property_price),
            ("deposit_fraction", self.deposit_fraction),
            ("interest_rate", self.interest_rate),
            ("property_growth_rate", self.property_growth_rate),
            ("rental_inflation_rate", self.rental_inflation_rate),
            ("property_expenses_rate", self.property_expenses_rate),
            ("upfront_costs", self.upfront_costs),
            ("gross_income", self.gross_income),
            ("salary_growth_rate", self.salary_growth_rate),
            ("weekly_rental_income", self.weekly_rental_income),
            ("weekly_rent", self.weekly_rent),
            ("stock_return_rate", self.stock_return_rate),
        ] {
            if !value.is_finite() {
                return Err(EngineError::invalid(field, format!("{value} is not finite")));
            }
        }

        if !(0.0..=1.0).contains(&self.deposit_fraction) {
            return Err(EngineError::invalid(
                "deposit_fraction",
                format!("{} must be between 0 and 1", self.deposit_fraction),
            ));
        }

        for (field, value) in [
            ("property_price", self.property_price),
            ("interest_rate", self.interest_rate),
            ("property_expenses_rate", self.property_expenses_rate),
            ("upfront_costs", self.upfront_costs),
            ("gross_income", self.gross_income),
            ("weekly_rental_income", self.weekly_rental_income),
            ("weekly_rent", self.weekly_rent),
        ] {
            if value < 0.0 {
                return Err(EngineError::invalid(field, format!("{value} is negative")));
            }
        }

        for (field, value) in [
            ("property_growth_rate", self.property_growth_rate),
            ("rental_inflation_rate", self.rental_inflation_rate),
            ("salary_growth_rate", self.salary_growth_rate),
            ("stock_return_rate", self.stock_return_rate),
        ] {
            if value <= -1.0 {
                return Err(EngineError::invalid(
                    field,
                    format!("{value} must be greater than -1"),
                ));
            }
        }

        Ok(())
    }

    pub fn income_profile(&self) -> IncomeProfile {
        IncomeProfile {
            gross_income: self.gross_income,
            salary_growth_rate: self.salary_growth_rate,
        }
    }
}

/// Salary path used to pick the marginal tax rate for a projection year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeProfile {
    pub gross_income: f64,
    pub salary_growth_rate: f64,
}

impl IncomeProfile {
    pub fn income_in_year(&self, year: u32) -> f64 {
        self.gross_income * (1.0 + self.salary_growth_rate).powi(year as i32)
    }
}

#[derive(Debug, Clone)]
pub struct ComparisonInputs {
    pub buy_to_live: ScenarioInputs,
    pub buy_to_rent: ScenarioInputs,
    pub rent_and_invest: ScenarioInputs,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AfterTaxPosition {
    pub capital_gain: f64,
    pub cgt_liability: f64,
    pub net_worth_after_tax: f64,
    pub roi_after_tax_percent: f64,
}

/// One projection year. Fields a strategy does not use stay at zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearRecord {
    pub year: u32,
    /// Property value, or portfolio value for Rent and Invest.
    pub asset_value: f64,
    pub remaining_balance: f64,
    pub net_worth: f64,
    pub cumulative_costs: f64,
    pub cumulative_income: f64,
    pub net_cash_invested: f64,

    pub annual_mortgage_payment: f64,
    pub annual_mortgage_interest: f64,
    pub annual_property_expenses: f64,
    pub annual_housing_cost: f64,
    pub annual_rental_income: f64,
    pub annual_personal_rent: f64,
    pub annual_net_cash_flow: f64,

    pub equivalent_property_cost: f64,
    pub annual_net_investment: f64,
    pub annual_investment_return: f64,
    pub cumulative_contributions: f64,
    pub cumulative_rent_paid: f64,

    pub marginal_tax_rate: f64,
    pub deductible_expenses: f64,
    pub property_loss: f64,
    pub negative_gearing_benefit: f64,
    pub cumulative_negative_gearing: f64,

    pub roi_percent: f64,

    #[serde(flatten)]
    pub after_tax: Option<AfterTaxPosition>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioResult {
    pub strategy: Strategy,
    pub property_price: f64,
    pub deposit: f64,
    pub stamp_duty: f64,
    pub upfront_costs: f64,
    pub total_upfront_cost: f64,
    pub loan_amount: f64,
    pub monthly_payment: f64,
    pub yearly_analysis: Vec<YearRecord>,
}

impl ScenarioResult {
    pub fn final_record(&self) -> Option<&YearRecord> {
        self.yearly_analysis.last()
    }

    pub fn final_net_worth(&self) -> f64 {
        self.final_record().map_or(0.0, |record| record.net_worth)
    }

    pub fn total_negative_gearing_benefits(&self) -> f64 {
        self.final_record()
            .map_or(0.0, |record| record.cumulative_negative_gearing)
    }

    /// Liability in the final year; `None` before the capital gains pass.
    pub fn capital_gains_tax(&self) -> Option<f64> {
        self.final_record()
            .and_then(|record| record.after_tax)
            .map(|position| position.cgt_liability)
    }

    pub fn final_net_worth_after_tax(&self) -> Option<f64> {
        self.final_record()
            .and_then(|record| record.after_tax)
            .map(|position| position.net_worth_after_tax)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategySet {
    pub buy_to_live: ScenarioResult,
    pub buy_to_rent: ScenarioResult,
    pub rent_and_invest: ScenarioResult,
}

impl StrategySet {
    pub fn get(&self, strategy: Strategy) -> &ScenarioResult {
        match strategy {
            Strategy::BuyToLive => &self.buy_to_live,
            Strategy::BuyToRent => &self.buy_to_rent,
            Strategy::RentAndInvest => &self.rent_and_invest,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    pub current_marginal_rate: f64,
    pub pre_tax: StrategySet,
    pub after_tax: StrategySet,
    pub best_strategy: Strategy,
}

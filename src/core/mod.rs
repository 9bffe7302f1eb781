mod engine;
mod error;
mod investment;
mod mortgage;
mod rates;
mod stamp_duty;
mod tax;
mod types;

pub use engine::{
    apply_capital_gains_tax, compare_strategies, project_buy_to_live, project_buy_to_rent,
    project_rent_and_invest, project_scenario, with_capital_gains_tax,
};
pub use error::EngineError;
pub use investment::{
    DepositInvestment, DollarCostAveraging, GrowthStep, InvestmentYear, TotalReturn,
    compound_growth, dollar_cost_averaging, equivalent_deposit_investment, grow_one_year,
    total_return, yearly_investment_growth,
};
pub use mortgage::{
    AmortizationRow, PaymentBreakdown, amortization_schedule, annual_interest_portion,
    monthly_payment, payment_breakdown, remaining_balance,
};
pub use rates::MAX_PROJECTION_YEARS;
pub use stamp_duty::{StampDutyBreakdown, base_stamp_duty, stamp_duty, stamp_duty_breakdown};
pub use tax::{
    TaxSummary, capital_gains_tax, income_tax, marginal_rate, medicare_levy,
    negative_gearing_benefit, tax_summary,
};
pub use types::{
    AfterTaxPosition, Comparison, ComparisonInputs, IncomeProfile, ScenarioInputs, ScenarioResult,
    Strategy, StrategySet, YearRecord,
};

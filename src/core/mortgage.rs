use serde::Serialize;

use super::error::EngineError;
use super::rates::{MAX_PROJECTION_YEARS, MONTHS_PER_YEAR};

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentBreakdown {
    pub principal: f64,
    pub annual_rate: f64,
    pub loan_term_years: u32,
    pub monthly_payment: f64,
    pub total_payments: f64,
    pub total_interest: f64,
    pub interest_to_principal_ratio: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AmortizationRow {
    pub year: u32,
    pub annual_payment: f64,
    pub annual_interest: f64,
    pub annual_principal: f64,
    pub remaining_balance: f64,
    pub cumulative_interest: f64,
    pub cumulative_principal: f64,
}

/// Fixed monthly repayment for a fully amortizing loan.
///
/// Falls back to straight-line repayment when `annual_rate` is zero and
/// returns 0 for a non-positive principal.
pub fn monthly_payment(principal: f64, annual_rate: f64, years: u32) -> Result<f64, EngineError> {
    if years == 0 {
        return Err(EngineError::invalid(
            "loan_term_years",
            "loan term must be at least one year",
        ));
    }
    if years > MAX_PROJECTION_YEARS {
        return Err(EngineError::invalid(
            "loan_term_years",
            format!("{years} years exceeds the {MAX_PROJECTION_YEARS}-year limit"),
        ));
    }
    Ok(level_payment(principal, annual_rate, years))
}

fn level_payment(principal: f64, annual_rate: f64, years: u32) -> f64 {
    if principal <= 0.0 {
        return 0.0;
    }

    let num_payments = years as f64 * MONTHS_PER_YEAR;
    if annual_rate == 0.0 {
        return principal / num_payments;
    }

    let monthly_rate = annual_rate / MONTHS_PER_YEAR;
    let compounded = (1.0 + monthly_rate).powi(num_payments as i32);
    principal * (monthly_rate * compounded) / (compounded - 1.0)
}

/// Outstanding balance after `years_paid` whole years of repayments.
pub fn remaining_balance(principal: f64, annual_rate: f64, years: u32, years_paid: u32) -> f64 {
    if years_paid >= years || principal <= 0.0 {
        return 0.0;
    }

    let num_payments = years as f64 * MONTHS_PER_YEAR;
    let payments_made = years_paid as f64 * MONTHS_PER_YEAR;

    if annual_rate == 0.0 {
        return (principal - principal / num_payments * payments_made).max(0.0);
    }

    let growth = 1.0 + annual_rate / MONTHS_PER_YEAR;
    let compounded_total = growth.powi(num_payments as i32);
    let compounded_paid = growth.powi(payments_made as i32);
    let balance = principal * (compounded_total - compounded_paid) / (compounded_total - 1.0);
    balance.max(0.0)
}

/// Interest charged during loan year `year` (1-based).
///
/// Each month's interest is charged on the balance at the start of that
/// month, walking the schedule forward from the first repayment. The walk
/// performs the same floating-point steps as re-simulating every month from
/// inception, so results match that formulation exactly.
pub fn annual_interest_portion(principal: f64, annual_rate: f64, years: u32, year: u32) -> f64 {
    if year == 0 || year > years || annual_rate == 0.0 || principal <= 0.0 {
        return 0.0;
    }

    let monthly_rate = annual_rate / MONTHS_PER_YEAR;
    let payment = level_payment(principal, annual_rate, years);
    let first_month = u64::from(year - 1) * 12;
    let end_month = u64::from(year) * 12;

    let mut balance = principal;
    let mut annual_interest = 0.0;
    for month in 0..end_month {
        if month >= first_month && balance > 0.0 {
            annual_interest += balance * monthly_rate;
        }
        if balance > 0.0 {
            let interest = balance * monthly_rate;
            balance -= payment - interest;
        }
    }
    annual_interest
}

pub fn payment_breakdown(
    principal: f64,
    annual_rate: f64,
    years: u32,
) -> Result<PaymentBreakdown, EngineError> {
    let monthly_payment = monthly_payment(principal, annual_rate, years)?;
    let total_payments = monthly_payment * years as f64 * MONTHS_PER_YEAR;
    let total_interest = total_payments - principal;

    Ok(PaymentBreakdown {
        principal,
        annual_rate,
        loan_term_years: years,
        monthly_payment,
        total_payments,
        total_interest,
        interest_to_principal_ratio: if principal > 0.0 {
            total_interest / principal
        } else {
            0.0
        },
    })
}

/// Year-by-year schedule, truncated to `max_years` when given.
pub fn amortization_schedule(
    principal: f64,
    annual_rate: f64,
    years: u32,
    max_years: Option<u32>,
) -> Result<Vec<AmortizationRow>, EngineError> {
    let monthly_payment = monthly_payment(principal, annual_rate, years)?;
    let annual_payment = monthly_payment * MONTHS_PER_YEAR;
    let last_year = max_years.unwrap_or(years).min(years);

    let mut cumulative_interest = 0.0;
    let mut schedule = Vec::with_capacity(last_year as usize);
    for year in 1..=last_year {
        let annual_interest = annual_interest_portion(principal, annual_rate, years, year);
        let remaining = remaining_balance(principal, annual_rate, years, year);
        cumulative_interest += annual_interest;

        schedule.push(AmortizationRow {
            year,
            annual_payment,
            annual_interest,
            annual_principal: annual_payment - annual_interest,
            remaining_balance: remaining,
            cumulative_interest,
            cumulative_principal: principal - remaining,
        });
    }
    Ok(schedule)
}

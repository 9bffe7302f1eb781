use serde::Serialize;

use super::rates::{
    Bracket, CGT_DISCOUNT_RATE, INCOME_TAX_BRACKETS, MEDICARE_LEVY_RATE, MEDICARE_LEVY_THRESHOLD,
};

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxSummary {
    pub taxable_income: f64,
    pub income_tax: f64,
    pub medicare_levy: f64,
    pub marginal_rate: f64,
    pub average_rate: f64,
    pub after_tax_income: f64,
}

/// First bracket whose ceiling is at or above `income`. Fractional incomes
/// between one ceiling and the next floor (18,200.5) take the higher bracket.
fn bracket_for(income: f64) -> Option<&'static Bracket> {
    INCOME_TAX_BRACKETS
        .iter()
        .find(|bracket| income <= bracket.max)
}

pub fn medicare_levy(taxable_income: f64) -> f64 {
    if taxable_income > MEDICARE_LEVY_THRESHOLD {
        taxable_income * MEDICARE_LEVY_RATE
    } else {
        0.0
    }
}

/// Rate on the next dollar earned, including the Medicare levy once the
/// income is above the levy threshold.
pub fn marginal_rate(taxable_income: f64) -> f64 {
    if taxable_income <= 0.0 {
        return INCOME_TAX_BRACKETS[0].rate;
    }

    let levy = if taxable_income > MEDICARE_LEVY_THRESHOLD {
        MEDICARE_LEVY_RATE
    } else {
        0.0
    };
    let bracket_rate = bracket_for(taxable_income)
        .map(|bracket| bracket.rate)
        .unwrap_or(INCOME_TAX_BRACKETS[INCOME_TAX_BRACKETS.len() - 1].rate);
    bracket_rate + levy
}

/// Progressive income tax plus the Medicare levy on the whole income.
pub fn income_tax(taxable_income: f64) -> f64 {
    if taxable_income <= 0.0 {
        return 0.0;
    }

    let bracket_tax = INCOME_TAX_BRACKETS
        .iter()
        .rev()
        .find(|bracket| taxable_income > bracket.min)
        .map(|bracket| bracket.amount(taxable_income))
        .unwrap_or(0.0);

    (bracket_tax + medicare_levy(taxable_income)).max(0.0)
}

pub fn capital_gains_tax(gain: f64, marginal_rate: f64, held_over_twelve_months: bool) -> f64 {
    if gain <= 0.0 {
        return 0.0;
    }

    let taxable_gain = if held_over_twelve_months {
        gain * CGT_DISCOUNT_RATE
    } else {
        gain
    };
    taxable_gain * marginal_rate
}

/// Tax saved by deducting a rental loss. Positively geared properties get
/// nothing back and pay nothing extra here.
pub fn negative_gearing_benefit(
    deductible_expenses: f64,
    rental_income: f64,
    marginal_rate: f64,
) -> f64 {
    (deductible_expenses - rental_income).max(0.0) * marginal_rate
}

pub fn tax_summary(taxable_income: f64) -> TaxSummary {
    let income_tax = income_tax(taxable_income);

    TaxSummary {
        taxable_income,
        income_tax,
        medicare_levy: medicare_levy(taxable_income),
        marginal_rate: marginal_rate(taxable_income),
        average_rate: if taxable_income > 0.0 {
            income_tax / taxable_income
        } else {
            0.0
        },
        after_tax_income: taxable_income - income_tax,
    }
}

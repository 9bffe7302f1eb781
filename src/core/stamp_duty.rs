use serde::Serialize;

use super::rates::{
    FHB_EXEMPT_THRESHOLD, FHB_FULL_THRESHOLD, STAMP_DUTY_BRACKETS, STAMP_DUTY_MIN_AMOUNT,
};

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StampDutyBreakdown {
    pub property_price: f64,
    pub base_stamp_duty: f64,
    pub is_first_home_buyer: bool,
    pub fhb_savings: f64,
    pub final_stamp_duty: f64,
    pub effective_rate: f64,
}

/// Standard duty from the bracket table, before any concession.
pub fn base_stamp_duty(property_price: f64) -> f64 {
    let duty = STAMP_DUTY_BRACKETS
        .iter()
        .rev()
        .find(|bracket| property_price > bracket.min)
        .map(|bracket| bracket.amount(property_price))
        .unwrap_or(0.0);

    duty.max(STAMP_DUTY_MIN_AMOUNT)
}

pub fn stamp_duty(property_price: f64, is_first_home_buyer: bool) -> f64 {
    if property_price <= 0.0 {
        return 0.0;
    }

    let base = base_stamp_duty(property_price);
    if !is_first_home_buyer {
        return base;
    }

    if property_price <= FHB_EXEMPT_THRESHOLD {
        0.0
    } else if property_price <= FHB_FULL_THRESHOLD {
        let concession_range = FHB_FULL_THRESHOLD - FHB_EXEMPT_THRESHOLD;
        base * (property_price - FHB_EXEMPT_THRESHOLD) / concession_range
    } else {
        base
    }
}

pub fn stamp_duty_breakdown(property_price: f64, is_first_home_buyer: bool) -> StampDutyBreakdown {
    let base = base_stamp_duty(property_price);
    let final_duty = stamp_duty(property_price, is_first_home_buyer);

    StampDutyBreakdown {
        property_price,
        base_stamp_duty: base,
        is_first_home_buyer,
        fhb_savings: if is_first_home_buyer {
            base - final_duty
        } else {
            0.0
        },
        final_stamp_duty: final_duty,
        effective_rate: if property_price > 0.0 {
            final_duty / property_price
        } else {
            0.0
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, proptest};

    fn assert_approx_tol(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    #[test]
    fn reference_prices() {
        assert_approx_tol(stamp_duty(500_000.0, false), 17_029.0, 1e-6);
        assert_approx_tol(stamp_duty(15_000.0, false), 15_001.0 * 0.0125, 1e-9);
        assert_approx_tol(stamp_duty(1_500_000.0, false), 49_069.0 + 0.055 * 288_000.0, 1e-6);
    }

    #[test]
    fn tiny_prices_pay_the_minimum() {
        assert_eq!(base_stamp_duty(100.0), STAMP_DUTY_MIN_AMOUNT);
        assert_eq!(stamp_duty(100.0, false), STAMP_DUTY_MIN_AMOUNT);
    }

    #[test]
    fn non_positive_price_pays_nothing() {
        assert_eq!(stamp_duty(0.0, false), 0.0);
        assert_eq!(stamp_duty(-5.0, true), 0.0);
    }

    #[test]
    fn bracket_floor_is_exclusive() {
        // 17,001 is not above its own floor, so it still falls in the bottom bracket.
        assert_approx_tol(base_stamp_duty(17_001.0), 17_001.0 * 0.0125, 1e-9);
        assert_approx_tol(base_stamp_duty(17_002.0), 212.0 + 0.015 * 2.0, 1e-9);
    }

    #[test]
    fn rounded_bases_dip_only_at_17001_and_97001() {
        let dip_17 = base_stamp_duty(17_001.0) - base_stamp_duty(17_001.5);
        let dip_97 = base_stamp_duty(97_001.0) - base_stamp_duty(97_001.5);
        assert!(dip_17 > 0.0 && dip_17 < 1.0, "dip at 17,001 was {dip_17}");
        assert!(dip_97 > 0.0 && dip_97 < 1.0, "dip at 97,001 was {dip_97}");

        for floor in [36_001.0, 364_001.0, 1_212_001.0, 3_636_001.0] {
            assert!(
                base_stamp_duty(floor + 0.5) >= base_stamp_duty(floor),
                "duty fell crossing {floor}"
            );
        }
    }

    #[test]
    fn first_home_buyer_concession_boundaries() {
        assert_eq!(stamp_duty(700_000.0, true), 0.0);
        assert_eq!(stamp_duty(800_000.0, true), 0.0);
        assert_approx_tol(
            stamp_duty(900_000.0, true),
            base_stamp_duty(900_000.0) * 0.5,
            1e-9,
        );
        assert_approx_tol(
            stamp_duty(1_000_000.0, true),
            base_stamp_duty(1_000_000.0),
            1e-9,
        );
        assert_eq!(
            stamp_duty(1_200_000.0, true),
            stamp_duty(1_200_000.0, false)
        );
    }

    #[test]
    fn breakdown_reports_savings_and_effective_rate() {
        let breakdown = stamp_duty_breakdown(900_000.0, true);
        assert_approx_tol(
            breakdown.fhb_savings,
            breakdown.base_stamp_duty - breakdown.final_stamp_duty,
            1e-9,
        );
        assert_approx_tol(
            breakdown.effective_rate,
            breakdown.final_stamp_duty / 900_000.0,
            1e-12,
        );

        let not_fhb = stamp_duty_breakdown(900_000.0, false);
        assert_eq!(not_fhb.fhb_savings, 0.0);
        assert_eq!(stamp_duty_breakdown(0.0, false).effective_rate, 0.0);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(256))]

        // Bracket bases are published rounded to whole dollars. Crossing 17,001
        // the duty falls from 212.51 to 212.02 (next base 212), and crossing
        // 97,001 from 1,564.50 to 1,564.05 (next base 1,564). Every other
        // boundary carries over exactly or steps up.
        #[test]
        fn prop_base_duty_is_non_decreasing_within_a_dollar(
            low in 1.0f64..5_000_000.0,
            step in 0.0f64..500_000.0,
        ) {
            let high = low + step;
            prop_assert!(base_stamp_duty(high) >= base_stamp_duty(low) - 1.0);
        }

        #[test]
        fn prop_bottom_bracket_respects_minimum(price in 0.01f64..=17_000.0) {
            prop_assert!(base_stamp_duty(price) >= STAMP_DUTY_MIN_AMOUNT);
        }

        #[test]
        fn prop_first_home_buyer_never_pays_more(price in 1.0f64..5_000_000.0) {
            let fhb = stamp_duty(price, true);
            prop_assert!(fhb >= 0.0);
            prop_assert!(fhb <= stamp_duty(price, false) + 1e-9);
        }
    }
}

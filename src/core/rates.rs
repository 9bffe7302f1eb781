//! Australian 2023-24 tax and NSW-style stamp duty tables.
//!
//! Brackets are ordered by `min` and do not overlap. The amount owed inside a
//! bracket is `base + rate * (min(value, max) - min + 1)`, which is how the
//! published tables quote whole-dollar thresholds.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bracket {
    pub min: f64,
    pub max: f64,
    pub rate: f64,
    pub base: f64,
}

impl Bracket {
    const fn new(min: f64, max: f64, rate: f64, base: f64) -> Self {
        Self {
            min,
            max,
            rate,
            base,
        }
    }

    pub fn amount(&self, value: f64) -> f64 {
        self.base + self.rate * (value.min(self.max) - self.min + 1.0)
    }
}

pub static INCOME_TAX_BRACKETS: [Bracket; 5] = [
    Bracket::new(0.0, 18_200.0, 0.0, 0.0),
    Bracket::new(18_201.0, 45_000.0, 0.19, 0.0),
    Bracket::new(45_001.0, 120_000.0, 0.325, 5_092.0),
    Bracket::new(120_001.0, 180_000.0, 0.37, 29_467.0),
    Bracket::new(180_001.0, f64::INFINITY, 0.45, 51_667.0),
];

pub const MEDICARE_LEVY_RATE: f64 = 0.02;
pub const MEDICARE_LEVY_THRESHOLD: f64 = 24_276.0;

/// Fraction of a capital gain that is taxed once the asset is held > 12 months.
pub const CGT_DISCOUNT_RATE: f64 = 0.5;

pub static STAMP_DUTY_BRACKETS: [Bracket; 7] = [
    Bracket::new(0.0, 17_000.0, 0.0125, 0.0),
    Bracket::new(17_001.0, 36_000.0, 0.015, 212.0),
    Bracket::new(36_001.0, 97_000.0, 0.0175, 497.0),
    Bracket::new(97_001.0, 364_000.0, 0.035, 1_564.0),
    Bracket::new(364_001.0, 1_212_000.0, 0.045, 10_909.0),
    Bracket::new(1_212_001.0, 3_636_000.0, 0.055, 49_069.0),
    Bracket::new(3_636_001.0, f64::INFINITY, 0.07, 182_390.0),
];

/// Floor applied to duty falling in the bottom bracket.
pub const STAMP_DUTY_MIN_AMOUNT: f64 = 20.0;

pub const FHB_EXEMPT_THRESHOLD: f64 = 800_000.0;
pub const FHB_FULL_THRESHOLD: f64 = 1_000_000.0;

pub const WEEKS_PER_YEAR: f64 = 52.0;
pub const MONTHS_PER_YEAR: f64 = 12.0;

/// Longest loan term or projection horizon accepted, in years.
pub const MAX_PROJECTION_YEARS: u32 = 100;

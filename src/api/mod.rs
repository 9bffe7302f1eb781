use axum::{
    Router,
    extract::{Json, Query},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::{
    AmortizationRow, Comparison, ComparisonInputs, DepositInvestment, MAX_PROJECTION_YEARS,
    PaymentBreakdown, ScenarioInputs, StampDutyBreakdown, Strategy, StrategySet, TaxSummary,
    amortization_schedule, compare_strategies, equivalent_deposit_investment, payment_breakdown,
    stamp_duty_breakdown, tax_summary,
};

const MIN_PROPERTY_PRICE: f64 = 100_000.0;
const MAX_PROPERTY_PRICE: f64 = 50_000_000.0;
const MAX_GROSS_INCOME: f64 = 10_000_000.0;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ComparePayload {
    btl_property_price: Option<f64>,
    btr_property_price: Option<f64>,
    ri_equivalent_property_price: Option<f64>,

    deposit_percent: Option<f64>,
    interest_rate: Option<f64>,
    loan_term_years: Option<u32>,
    horizon_years: Option<u32>,
    upfront_costs: Option<f64>,
    first_home_buyer: Option<bool>,

    property_growth_rate: Option<f64>,
    rental_inflation_rate: Option<f64>,
    property_expenses_rate: Option<f64>,
    stock_return_rate: Option<f64>,

    gross_income: Option<f64>,
    salary_growth_rate: Option<f64>,
    weekly_rental_income: Option<f64>,
    weekly_rent: Option<f64>,

    years: Option<u32>,
}

#[derive(Parser, Debug)]
#[command(
    name = "rentbuy",
    about = "Compare buying a home, buying an investment property and renting while investing (Australian tax rules)"
)]
struct Cli {
    #[arg(long, default_value_t = 800_000.0, help = "Price of the home bought to live in")]
    btl_property_price: f64,
    #[arg(long, default_value_t = 600_000.0, help = "Price of the investment property")]
    btr_property_price: f64,
    #[arg(
        long,
        default_value_t = 800_000.0,
        help = "Price of the property a renter would otherwise have bought"
    )]
    ri_equivalent_property_price: f64,
    #[arg(long, default_value_t = 20.0, help = "Deposit in percent of the price")]
    deposit_percent: f64,
    #[arg(long, default_value_t = 6.0, help = "Annual mortgage rate in percent, e.g. 6")]
    interest_rate: f64,
    #[arg(long, default_value_t = 30)]
    loan_term_years: u32,
    #[arg(long, default_value_t = 30, help = "Number of years to project")]
    horizon_years: u32,
    #[arg(long, default_value_t = 3_000.0, help = "Legal and inspection costs at purchase")]
    upfront_costs: f64,
    #[arg(long, help = "Apply the first home buyer stamp duty concession")]
    first_home_buyer: bool,
    #[arg(long, default_value_t = 5.0, help = "Annual property growth in percent")]
    property_growth_rate: f64,
    #[arg(long, default_value_t = 3.0, help = "Annual rent increase in percent")]
    rental_inflation_rate: f64,
    #[arg(
        long,
        default_value_t = 1.0,
        help = "Rates, insurance and maintenance in percent of property value"
    )]
    property_expenses_rate: f64,
    #[arg(long, default_value_t = 7.0, help = "Annual portfolio return in percent")]
    stock_return_rate: f64,
    #[arg(long, default_value_t = 100_000.0)]
    gross_income: f64,
    #[arg(long, default_value_t = 3.0, help = "Annual salary growth in percent")]
    salary_growth_rate: f64,
    #[arg(long, default_value_t = 575.0, help = "Weekly rent received from the investment property")]
    weekly_rental_income: f64,
    #[arg(long, default_value_t = 460.0, help = "Weekly rent paid for your own home")]
    weekly_rent: f64,
    #[arg(long, help = "Only print the first N yearly records of each strategy")]
    years: Option<u32>,
    #[arg(long, default_value = "info", help = "Log level when RUST_LOG is not set")]
    log_level: String,
}

#[derive(Debug)]
struct ApiRequest {
    inputs: ComparisonInputs,
    years: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StrategySummary {
    strategy: Strategy,
    label: &'static str,
    final_net_worth: f64,
    final_net_worth_after_tax: f64,
    capital_gains_tax: f64,
    total_negative_gearing_benefits: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompareResponse {
    best_strategy: Strategy,
    best_strategy_label: &'static str,
    current_marginal_rate: f64,
    summaries: Vec<StrategySummary>,
    tax_summary: TaxSummary,
    home_stamp_duty: StampDutyBreakdown,
    home_loan: PaymentBreakdown,
    home_loan_schedule: Vec<AmortizationRow>,
    /// The Rent and Invest deposit invested once with no later contributions.
    deposit_only: DepositInvestment,
    comparison: Comparison,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn build_inputs(cli: Cli) -> Result<ComparisonInputs, String> {
    for (flag, value) in [
        ("--btl-property-price", cli.btl_property_price),
        ("--btr-property-price", cli.btr_property_price),
        (
            "--ri-equivalent-property-price",
            cli.ri_equivalent_property_price,
        ),
    ] {
        if !(MIN_PROPERTY_PRICE..=MAX_PROPERTY_PRICE).contains(&value) {
            return Err(format!(
                "{flag} must be between {MIN_PROPERTY_PRICE} and {MAX_PROPERTY_PRICE}"
            ));
        }
    }

    if !(0.0..=100.0).contains(&cli.deposit_percent) {
        return Err("--deposit-percent must be between 0 and 100".to_string());
    }

    for (flag, value) in [
        ("--loan-term-years", cli.loan_term_years),
        ("--horizon-years", cli.horizon_years),
    ] {
        if !(1..=MAX_PROJECTION_YEARS).contains(&value) {
            return Err(format!("{flag} must be between 1 and {MAX_PROJECTION_YEARS}"));
        }
    }

    if cli.years == Some(0) {
        return Err("--years must be > 0".to_string());
    }

    for (flag, value) in [
        ("--interest-rate", cli.interest_rate),
        ("--property-expenses-rate", cli.property_expenses_rate),
    ] {
        if !(0.0..=100.0).contains(&value) {
            return Err(format!("{flag} must be between 0 and 100"));
        }
    }

    for (flag, value) in [
        ("--property-growth-rate", cli.property_growth_rate),
        ("--rental-inflation-rate", cli.rental_inflation_rate),
        ("--stock-return-rate", cli.stock_return_rate),
        ("--salary-growth-rate", cli.salary_growth_rate),
    ] {
        if !value.is_finite() || value <= -100.0 {
            return Err(format!("{flag} must be > -100"));
        }
    }

    if !(0.0..=MAX_GROSS_INCOME).contains(&cli.gross_income) {
        return Err(format!(
            "--gross-income must be between 0 and {MAX_GROSS_INCOME}"
        ));
    }

    for (flag, value) in [
        ("--upfront-costs", cli.upfront_costs),
        ("--weekly-rental-income", cli.weekly_rental_income),
        ("--weekly-rent", cli.weekly_rent),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(format!("{flag} must be >= 0"));
        }
    }

    let shared = ScenarioInputs {
        property_price: cli.btl_property_price,
        deposit_fraction: cli.deposit_percent / 100.0,
        interest_rate: cli.interest_rate / 100.0,
        loan_term_years: cli.loan_term_years,
        horizon_years: cli.horizon_years,
        property_growth_rate: cli.property_growth_rate / 100.0,
        rental_inflation_rate: cli.rental_inflation_rate / 100.0,
        property_expenses_rate: cli.property_expenses_rate / 100.0,
        upfront_costs: cli.upfront_costs,
        is_first_home_buyer: cli.first_home_buyer,
        gross_income: cli.gross_income,
        salary_growth_rate: cli.salary_growth_rate / 100.0,
        weekly_rental_income: cli.weekly_rental_income,
        weekly_rent: cli.weekly_rent,
        stock_return_rate: cli.stock_return_rate / 100.0,
    };

    Ok(ComparisonInputs {
        buy_to_rent: ScenarioInputs {
            property_price: cli.btr_property_price,
            ..shared.clone()
        },
        rent_and_invest: ScenarioInputs {
            property_price: cli.ri_equivalent_property_price,
            ..shared.clone()
        },
        buy_to_live: shared,
    })
}

/// Parses `args`, runs the comparison and prints it as pretty JSON on stdout.
pub fn run_cli<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);
    crate::logging::init_logging(&cli.log_level);

    let years = cli.years;
    let inputs = build_inputs(cli)?;
    let response = build_compare_response(&inputs, years)?;
    let json = serde_json::to_string_pretty(&response)
        .map_err(|e| format!("Failed to serialize comparison: {e}"))?;
    println!("{json}");
    Ok(())
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route(
            "/api/compare",
            get(compare_get_handler).post(compare_post_handler),
        )
        .route("/api/health", get(health_handler))
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "rentbuy HTTP API listening");
    println!("Local access: http://127.0.0.1:{port}/api/compare");

    axum::serve(listener, app).await
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, HealthResponse { status: "ok" })
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn compare_get_handler(Query(payload): Query<ComparePayload>) -> Response {
    compare_handler_impl(payload).await
}

async fn compare_post_handler(Json(payload): Json<ComparePayload>) -> Response {
    compare_handler_impl(payload).await
}

async fn compare_handler_impl(payload: ComparePayload) -> Response {
    let request = match api_request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => {
            tracing::warn!(error = %msg, "rejected compare request");
            return error_response(StatusCode::BAD_REQUEST, &msg);
        }
    };

    match build_compare_response(&request.inputs, request.years) {
        Ok(response) => {
            tracing::info!(
                best = response.best_strategy_label,
                horizon = request.inputs.buy_to_live.horizon_years,
                "compare request served"
            );
            json_response(StatusCode::OK, response)
        }
        Err(msg) => {
            tracing::warn!(error = %msg, "comparison failed");
            error_response(StatusCode::BAD_REQUEST, &msg)
        }
    }
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn api_request_from_json(json: &str) -> Result<ApiRequest, String> {
    let payload = serde_json::from_str::<ComparePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    api_request_from_payload(payload)
}

fn api_request_from_payload(payload: ComparePayload) -> Result<ApiRequest, String> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.btl_property_price {
        cli.btl_property_price = v;
    }
    if let Some(v) = payload.btr_property_price {
        cli.btr_property_price = v;
    }
    if let Some(v) = payload.ri_equivalent_property_price {
        cli.ri_equivalent_property_price = v;
    }

    if let Some(v) = payload.deposit_percent {
        cli.deposit_percent = v;
    }
    if let Some(v) = payload.interest_rate {
        cli.interest_rate = v;
    }
    if let Some(v) = payload.loan_term_years {
        cli.loan_term_years = v;
    }
    if let Some(v) = payload.horizon_years {
        cli.horizon_years = v;
    }
    if let Some(v) = payload.upfront_costs {
        cli.upfront_costs = v;
    }
    if let Some(v) = payload.first_home_buyer {
        cli.first_home_buyer = v;
    }

    if let Some(v) = payload.property_growth_rate {
        cli.property_growth_rate = v;
    }
    if let Some(v) = payload.rental_inflation_rate {
        cli.rental_inflation_rate = v;
    }
    if let Some(v) = payload.property_expenses_rate {
        cli.property_expenses_rate = v;
    }
    if let Some(v) = payload.stock_return_rate {
        cli.stock_return_rate = v;
    }

    if let Some(v) = payload.gross_income {
        cli.gross_income = v;
    }
    if let Some(v) = payload.salary_growth_rate {
        cli.salary_growth_rate = v;
    }
    if let Some(v) = payload.weekly_rental_income {
        cli.weekly_rental_income = v;
    }
    if let Some(v) = payload.weekly_rent {
        cli.weekly_rent = v;
    }

    cli.years = payload.years;

    let years = cli.years;
    let inputs = build_inputs(cli)?;
    Ok(ApiRequest { inputs, years })
}

fn default_cli_for_api() -> Cli {
    Cli {
        btl_property_price: 800_000.0,
        btr_property_price: 600_000.0,
        ri_equivalent_property_price: 800_000.0,
        deposit_percent: 20.0,
        interest_rate: 6.0,
        loan_term_years: 30,
        horizon_years: 30,
        upfront_costs: 3_000.0,
        first_home_buyer: false,
        property_growth_rate: 5.0,
        rental_inflation_rate: 3.0,
        property_expenses_rate: 1.0,
        stock_return_rate: 7.0,
        gross_income: 100_000.0,
        salary_growth_rate: 3.0,
        weekly_rental_income: 575.0,
        weekly_rent: 460.0,
        years: None,
        log_level: "info".to_string(),
    }
}

fn build_compare_response(
    inputs: &ComparisonInputs,
    years: Option<u32>,
) -> Result<CompareResponse, String> {
    let mut comparison = compare_strategies(inputs).map_err(|e| e.to_string())?;

    let summaries = Strategy::ALL
        .into_iter()
        .map(|strategy| {
            let pre_tax = comparison.pre_tax.get(strategy);
            let after_tax = comparison.after_tax.get(strategy);
            StrategySummary {
                strategy,
                label: strategy.label(),
                final_net_worth: pre_tax.final_net_worth(),
                final_net_worth_after_tax: after_tax.final_net_worth_after_tax().unwrap_or(0.0),
                capital_gains_tax: after_tax.capital_gains_tax().unwrap_or(0.0),
                total_negative_gearing_benefits: pre_tax.total_negative_gearing_benefits(),
            }
        })
        .collect();

    let home = &inputs.buy_to_live;
    let loan = comparison.pre_tax.buy_to_live.loan_amount;
    let home_loan = payment_breakdown(loan, home.interest_rate, home.loan_term_years)
        .map_err(|e| e.to_string())?;
    let home_loan_schedule = amortization_schedule(
        loan,
        home.interest_rate,
        home.loan_term_years,
        Some(years.unwrap_or(home.horizon_years)),
    )
    .map_err(|e| e.to_string())?;

    let renter = &inputs.rent_and_invest;
    let mut deposit_only = equivalent_deposit_investment(
        comparison.pre_tax.rent_and_invest.deposit,
        renter.stock_return_rate,
        renter.horizon_years,
    )
    .map_err(|e| e.to_string())?;

    if let Some(limit) = years {
        deposit_only.yearly_growth.truncate(limit as usize);
        truncate_records(&mut comparison.pre_tax, limit);
        truncate_records(&mut comparison.after_tax, limit);
    }

    Ok(CompareResponse {
        best_strategy: comparison.best_strategy,
        best_strategy_label: comparison.best_strategy.label(),
        current_marginal_rate: comparison.current_marginal_rate,
        summaries,
        tax_summary: tax_summary(inputs.buy_to_rent.gross_income),
        home_stamp_duty: stamp_duty_breakdown(home.property_price, home.is_first_home_buyer),
        home_loan,
        home_loan_schedule,
        deposit_only,
        comparison,
    })
}

fn truncate_records(set: &mut StrategySet, limit: u32) {
    for result in [
        &mut set.buy_to_live,
        &mut set.buy_to_rent,
        &mut set.rent_and_invest,
    ] {
        result.yearly_analysis.truncate(limit as usize);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn sample_cli() -> Cli {
        default_cli_for_api()
    }

    #[test]
    fn build_inputs_converts_percent_flags_to_fractions() {
        let mut cli = sample_cli();
        cli.deposit_percent = 10.0;
        cli.interest_rate = 5.5;
        cli.stock_return_rate = 8.0;

        let inputs = build_inputs(cli).expect("valid inputs");
        assert_approx(inputs.buy_to_live.deposit_fraction, 0.10);
        assert_approx(inputs.buy_to_live.interest_rate, 0.055);
        assert_approx(inputs.rent_and_invest.stock_return_rate, 0.08);
        assert_approx(inputs.buy_to_rent.salary_growth_rate, 0.03);
    }

    #[test]
    fn build_inputs_routes_prices_to_each_strategy() {
        let mut cli = sample_cli();
        cli.btl_property_price = 900_000.0;
        cli.btr_property_price = 650_000.0;
        cli.ri_equivalent_property_price = 750_000.0;

        let inputs = build_inputs(cli).expect("valid inputs");
        assert_eq!(inputs.buy_to_live.property_price, 900_000.0);
        assert_eq!(inputs.buy_to_rent.property_price, 650_000.0);
        assert_eq!(inputs.rent_and_invest.property_price, 750_000.0);
        assert_eq!(inputs.buy_to_live.weekly_rent, inputs.rent_and_invest.weekly_rent);
    }

    #[test]
    fn build_inputs_rejects_price_out_of_range() {
        let mut cli = sample_cli();
        cli.btr_property_price = 50_000.0;
        let err = build_inputs(cli).expect_err("price below range");
        assert!(err.contains("--btr-property-price"));

        let mut cli = sample_cli();
        cli.ri_equivalent_property_price = 60_000_000.0;
        let err = build_inputs(cli).expect_err("price above range");
        assert!(err.contains("--ri-equivalent-property-price"));
    }

    #[test]
    fn build_inputs_rejects_invalid_terms_and_rates() {
        let mut cli = sample_cli();
        cli.loan_term_years = 0;
        assert!(build_inputs(cli).unwrap_err().contains("--loan-term-years"));

        let mut cli = sample_cli();
        cli.horizon_years = 0;
        assert!(build_inputs(cli).unwrap_err().contains("--horizon-years"));

        let mut cli = sample_cli();
        cli.loan_term_years = MAX_PROJECTION_YEARS + 1;
        assert!(build_inputs(cli).unwrap_err().contains("--loan-term-years"));

        let mut cli = sample_cli();
        cli.horizon_years = MAX_PROJECTION_YEARS + 1;
        assert!(build_inputs(cli).unwrap_err().contains("--horizon-years"));

        let mut cli = sample_cli();
        cli.deposit_percent = 120.0;
        assert!(build_inputs(cli).unwrap_err().contains("--deposit-percent"));

        let mut cli = sample_cli();
        cli.interest_rate = -1.0;
        assert!(build_inputs(cli).unwrap_err().contains("--interest-rate"));

        let mut cli = sample_cli();
        cli.property_growth_rate = -100.0;
        assert!(build_inputs(cli).unwrap_err().contains("--property-growth-rate"));

        let mut cli = sample_cli();
        cli.gross_income = 20_000_000.0;
        assert!(build_inputs(cli).unwrap_err().contains("--gross-income"));

        let mut cli = sample_cli();
        cli.weekly_rent = -5.0;
        assert!(build_inputs(cli).unwrap_err().contains("--weekly-rent"));

        let mut cli = sample_cli();
        cli.years = Some(0);
        assert!(build_inputs(cli).unwrap_err().contains("--years"));
    }

    #[test]
    fn cli_parses_flags_with_defaults() {
        let cli = Cli::try_parse_from([
            "rentbuy",
            "--interest-rate",
            "5.5",
            "--first-home-buyer",
            "--years",
            "5",
        ])
        .expect("flags should parse");
        assert_approx(cli.interest_rate, 5.5);
        assert!(cli.first_home_buyer);
        assert_eq!(cli.years, Some(5));
        assert_approx(cli.btl_property_price, 800_000.0);
        assert_eq!(cli.loan_term_years, 30);
    }

    #[test]
    fn api_defaults_match_cli_defaults() {
        let parsed = Cli::try_parse_from(["rentbuy"]).expect("defaults should parse");
        let from_parser = build_inputs(parsed).expect("valid inputs");
        let from_api = build_inputs(default_cli_for_api()).expect("valid inputs");
        assert_eq!(from_parser.buy_to_live, from_api.buy_to_live);
        assert_eq!(from_parser.buy_to_rent, from_api.buy_to_rent);
        assert_eq!(from_parser.rent_and_invest, from_api.rent_and_invest);
    }

    #[test]
    fn api_payload_overrides_defaults() {
        let request = api_request_from_json(
            r#"{
                "btlPropertyPrice": 950000,
                "interestRate": 5.0,
                "firstHomeBuyer": true,
                "weeklyRent": 520,
                "years": 10
            }"#,
        )
        .expect("valid payload");

        assert_eq!(request.years, Some(10));
        assert_eq!(request.inputs.buy_to_live.property_price, 950_000.0);
        assert_approx(request.inputs.buy_to_rent.interest_rate, 0.05);
        assert!(request.inputs.rent_and_invest.is_first_home_buyer);
        assert_eq!(request.inputs.rent_and_invest.weekly_rent, 520.0);
        assert_eq!(request.inputs.buy_to_rent.property_price, 600_000.0);
    }

    #[test]
    fn api_payload_errors_are_reported() {
        let err = api_request_from_json("{ not json").expect_err("malformed JSON");
        assert!(err.starts_with("Invalid API JSON payload"));

        let err = api_request_from_json(r#"{"loanTermYears": 0}"#).expect_err("zero term");
        assert!(err.contains("--loan-term-years"));
    }

    #[test]
    fn api_rejects_horizons_that_would_exhaust_memory() {
        let err = api_request_from_json(r#"{"horizonYears": 4000000000}"#)
            .expect_err("huge horizon must be rejected");
        assert!(err.contains("--horizon-years"));

        let err = api_request_from_json(r#"{"loanTermYears": 4000000000}"#)
            .expect_err("huge term must be rejected");
        assert!(err.contains("--loan-term-years"));

        let request = api_request_from_json(r#"{"horizonYears": 100, "loanTermYears": 100}"#)
            .expect("limit itself is accepted");
        let response = build_compare_response(&request.inputs, Some(1)).expect("comparison runs");
        assert_eq!(response.deposit_only.years, 100);
        assert_eq!(response.deposit_only.yearly_growth.len(), 1);
    }

    #[test]
    fn compare_response_truncates_printed_years() {
        let inputs = build_inputs(sample_cli()).expect("valid inputs");
        let response = build_compare_response(&inputs, Some(5)).expect("comparison runs");

        for strategy in Strategy::ALL {
            assert_eq!(response.comparison.pre_tax.get(strategy).yearly_analysis.len(), 5);
            assert_eq!(response.comparison.after_tax.get(strategy).yearly_analysis.len(), 5);
        }
        assert_eq!(response.home_loan_schedule.len(), 5);

        let full = build_compare_response(&inputs, None).expect("comparison runs");
        let btl_summary = &full.summaries[0];
        assert_eq!(btl_summary.strategy, Strategy::BuyToLive);
        assert_approx(
            response.summaries[0].final_net_worth,
            btl_summary.final_net_worth,
        );
        assert_approx(
            btl_summary.final_net_worth,
            full.comparison
                .pre_tax
                .buy_to_live
                .yearly_analysis
                .last()
                .expect("records")
                .net_worth,
        );
    }

    #[test]
    fn compare_response_serializes_named_fields() {
        let inputs = build_inputs(sample_cli()).expect("valid inputs");
        let response = build_compare_response(&inputs, Some(2)).expect("comparison runs");
        let json = serde_json::to_string(&response).expect("response should serialize");

        for key in [
            "\"bestStrategy\"",
            "\"bestStrategyLabel\"",
            "\"currentMarginalRate\"",
            "\"finalNetWorthAfterTax\"",
            "\"homeStampDuty\"",
            "\"fhbSavings\"",
            "\"homeLoan\"",
            "\"interestToPrincipalRatio\"",
            "\"homeLoanSchedule\"",
            "\"depositOnly\"",
            "\"averageAnnualReturn\"",
            "\"taxSummary\"",
            "\"yearlyAnalysis\"",
            "\"cgtLiability\"",
        ] {
            assert!(json.contains(key), "missing {key}");
        }
    }

    #[tokio::test]
    async fn handlers_set_status_and_cache_headers() {
        let ok = compare_handler_impl(ComparePayload::default()).await;
        assert_eq!(ok.status(), StatusCode::OK);
        assert_eq!(
            ok.headers().get(header::CACHE_CONTROL),
            Some(&HeaderValue::from_static("no-store"))
        );

        let bad = compare_handler_impl(ComparePayload {
            btl_property_price: Some(1.0),
            ..ComparePayload::default()
        })
        .await;
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);

        let missing = not_found_handler().await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        assert!(missing.headers().contains_key(header::CACHE_CONTROL));

        assert_eq!(health_handler().await.status(), StatusCode::OK);
    }
}

use axum::{
    Router,
    extract::Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::core::{
    AgeRange, Bound, ConfigError, ConfigResult, FlowConfig, InvestmentConfig, ProjectionReport,
    Simulation, SimulationConfig,
};

const SCENARIO: &str = "scenario";
const MAX_SAMPLES: usize = 1_000_000;
const MAX_HORIZON_YEARS: usize = 150;

#[derive(Parser, Debug)]
#[command(
    name = "firecast",
    about = "Monte Carlo household projection (income, expenses, investments, net worth as 90% ranges)"
)]
pub struct Cli {
    #[arg(long, help = "Path to a scenario JSON file")]
    scenario: PathBuf,
    #[arg(long, help = "Sample population size; overrides the scenario's samples")]
    simulations: Option<usize>,
    #[arg(long, help = "RNG seed for a reproducible run; overrides the scenario's seed")]
    seed: Option<u64>,
    #[arg(long, help = "Age from which retirement accounts are available")]
    retirement_age: Option<u32>,
    #[arg(long, default_value_t = false, help = "Pretty-print the JSON report")]
    pretty: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ScenarioPayload {
    current_year: Option<i32>,
    current_age: Option<u32>,
    death_age: Option<u32>,
    retirement_age: Option<u32>,
    samples: Option<usize>,
    seed: Option<u64>,

    income: Vec<ItemPayload>,
    expenses: Vec<ItemPayload>,
    non_retirement_investments: Vec<ItemPayload>,
    retirement_investments: Vec<ItemPayload>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ItemPayload {
    name: Option<String>,
    starting_amount_low: Option<f64>,
    starting_amount_high: Option<f64>,
    start_age: Option<u32>,
    end_age: Option<u32>,
    growth_low: Option<f64>,
    growth_high: Option<f64>,
    contribution_low: Option<f64>,
    contribution_high: Option<f64>,
    contribution_start_age: Option<u32>,
    contribution_end_age: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug)]
struct Scenario {
    config: SimulationConfig,
    income: Vec<FlowConfig>,
    expenses: Vec<FlowConfig>,
    non_retirement: Vec<InvestmentConfig>,
    retirement: Vec<InvestmentConfig>,
}

impl ItemPayload {
    fn label(&self) -> String {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => "unnamed item".to_string(),
        }
    }

    fn required<T: Copy>(&self, value: Option<T>, field: &'static str) -> ConfigResult<T> {
        value.ok_or_else(|| ConfigError::MissingField {
            item: self.label(),
            field,
        })
    }

    fn name(&self) -> ConfigResult<String> {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => Ok(name.to_string()),
            _ => Err(ConfigError::MissingName),
        }
    }

    fn starting_amount(&self) -> ConfigResult<Bound> {
        Ok(Bound::new(
            self.required(self.starting_amount_low, "startingAmountLow")?,
            self.required(self.starting_amount_high, "startingAmountHigh")?,
        ))
    }

    fn growth(&self) -> Option<Bound> {
        if self.growth_low.is_none() && self.growth_high.is_none() {
            return None;
        }
        Some(Bound::new(
            self.growth_low.unwrap_or(0.0),
            self.growth_high.unwrap_or(0.0),
        ))
    }

    fn into_flow(self) -> ConfigResult<FlowConfig> {
        let contribution_fields = [
            ("contributionLow", self.contribution_low.is_some_and(|v| v != 0.0)),
            ("contributionHigh", self.contribution_high.is_some_and(|v| v != 0.0)),
            (
                "contributionStartAge",
                self.contribution_start_age.is_some_and(|v| v != 0),
            ),
            (
                "contributionEndAge",
                self.contribution_end_age.is_some_and(|v| v != 0),
            ),
        ];
        if let Some(&(field, _)) = contribution_fields.iter().find(|(_, set)| *set) {
            return Err(ConfigError::ContributionOnNonInvestment {
                item: self.label(),
                field,
            });
        }

        let mut flow = FlowConfig::new(
            self.name()?,
            self.starting_amount()?,
            self.required(self.start_age, "startAge")?,
            self.end_age,
        );
        if let Some(growth) = self.growth() {
            flow = flow.with_growth(growth);
        }
        Ok(flow)
    }

    fn into_investment(self) -> ConfigResult<InvestmentConfig> {
        let mut investment = InvestmentConfig::new(
            self.name()?,
            self.starting_amount()?,
            self.required(self.start_age, "startAge")?,
            self.end_age,
        );
        if let Some(growth) = self.growth() {
            investment = investment.with_growth(growth);
        }
        let contribution = Bound::new(
            self.contribution_low.unwrap_or(0.0),
            self.contribution_high.unwrap_or(0.0),
        );
        let ages = AgeRange::new(
            self.contribution_start_age.unwrap_or(0),
            self.contribution_end_age.unwrap_or(0),
        );
        if contribution != Bound::ZERO || !ages.is_empty() {
            investment = investment.with_contribution(contribution, ages);
        }
        Ok(investment)
    }
}

fn missing(field: &'static str) -> ConfigError {
    ConfigError::MissingField {
        item: SCENARIO.to_string(),
        field,
    }
}

fn scenario_from_payload(payload: ScenarioPayload) -> Result<Scenario, String> {
    build_scenario(payload).map_err(|e| e.to_string())
}

fn build_scenario(payload: ScenarioPayload) -> ConfigResult<Scenario> {
    let mut config = SimulationConfig::new(
        payload.current_year.ok_or_else(|| missing("currentYear"))?,
        payload.current_age.ok_or_else(|| missing("currentAge"))?,
        payload.death_age.ok_or_else(|| missing("deathAge"))?,
    );
    if let Some(v) = payload.retirement_age {
        config = config.with_retirement_age(v);
    }
    if let Some(v) = payload.samples {
        config = config.with_samples(v);
    }
    if let Some(v) = payload.seed {
        config = config.with_seed(v);
    }

    Ok(Scenario {
        config,
        income: payload
            .income
            .into_iter()
            .map(ItemPayload::into_flow)
            .collect::<ConfigResult<_>>()?,
        expenses: payload
            .expenses
            .into_iter()
            .map(ItemPayload::into_flow)
            .collect::<ConfigResult<_>>()?,
        non_retirement: payload
            .non_retirement_investments
            .into_iter()
            .map(ItemPayload::into_investment)
            .collect::<ConfigResult<_>>()?,
        retirement: payload
            .retirement_investments
            .into_iter()
            .map(ItemPayload::into_investment)
            .collect::<ConfigResult<_>>()?,
    })
}

fn apply_cli_overrides(scenario: &mut Scenario, cli: &Cli) {
    if let Some(v) = cli.simulations {
        scenario.config.samples = v;
    }
    if let Some(v) = cli.seed {
        scenario.config.seed = Some(v);
    }
    if let Some(v) = cli.retirement_age {
        scenario.config.retirement_age = v;
    }
}

fn check_limits(config: &SimulationConfig) -> ConfigResult<()> {
    if config.samples > MAX_SAMPLES {
        return Err(ConfigError::LimitExceeded {
            field: "samples",
            value: config.samples,
            max: MAX_SAMPLES,
        });
    }
    let years = config.death_age.saturating_sub(config.current_age) as usize;
    if years > MAX_HORIZON_YEARS {
        return Err(ConfigError::LimitExceeded {
            field: "deathAge - currentAge",
            value: years,
            max: MAX_HORIZON_YEARS,
        });
    }
    Ok(())
}

fn run_scenario(scenario: Scenario) -> Result<ProjectionReport, String> {
    check_limits(&scenario.config).map_err(|e| e.to_string())?;
    let mut sim = Simulation::new(scenario.config).map_err(|e| e.to_string())?;
    for item in scenario.income {
        sim.add_income(item).map_err(|e| e.to_string())?;
    }
    for item in scenario.expenses {
        sim.add_expense(item).map_err(|e| e.to_string())?;
    }
    for item in scenario.non_retirement {
        sim.add_nonretirement_investment(item)
            .map_err(|e| e.to_string())?;
    }
    for item in scenario.retirement {
        sim.add_retirement_investment(item)
            .map_err(|e| e.to_string())?;
    }
    Ok(sim.run().report())
}

fn scenario_from_json(json: &str) -> Result<Scenario, String> {
    let payload = serde_json::from_str::<ScenarioPayload>(json)
        .map_err(|e| format!("Invalid scenario JSON: {e}"))?;
    scenario_from_payload(payload)
}

/// Runs the scenario file named on the command line and prints the
/// report to stdout.
pub fn run_cli() -> Result<(), String> {
    let cli = Cli::parse();
    let json = fs::read_to_string(&cli.scenario)
        .map_err(|e| format!("Failed to read {}: {e}", cli.scenario.display()))?;
    let mut scenario = scenario_from_json(&json)?;
    apply_cli_overrides(&mut scenario, &cli);

    let report = run_scenario(scenario)?;
    let rendered = if cli.pretty {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    }
    .map_err(|e| format!("Failed to serialize report: {e}"))?;
    println!("{rendered}");
    Ok(())
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/simulate", post(simulate_post_handler))
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    info!("firecast HTTP API listening on http://{addr}");
    info!("Local access: http://127.0.0.1:{port}/api/simulate");

    axum::serve(listener, app).await
}

async fn health_handler() -> impl IntoResponse {
    with_cache_control("ok")
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn simulate_post_handler(Json(payload): Json<ScenarioPayload>) -> Response {
    let report = scenario_from_payload(payload).and_then(run_scenario);
    match report {
        Ok(report) => json_response(StatusCode::OK, report),
        Err(msg) => {
            warn!("rejected scenario: {msg}");
            error_response(StatusCode::BAD_REQUEST, &msg)
        }
    }
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
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

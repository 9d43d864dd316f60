use serde::Serialize;
use tracing::info;

use super::aggregate::{self, CategoryTotals};
use super::error::{ConfigError, ConfigResult};
use super::events::SimulationEvent;
use super::registry::{InvestmentBook, register_flow};
use super::sampling::Sampler;
use super::shortfall;
use super::timeline::{Timeline, build_rows};
use super::types::{
    Bound, FlowConfig, InvestmentConfig, ItemSchedule, SimulationConfig, TimelineKind, YearPoint,
    YearRow, YearTally,
};

pub struct Simulation {
    config: SimulationConfig,
    sampler: Sampler,
    income: Timeline,
    expenses: Timeline,
    non_retirement: InvestmentBook,
    retirement: InvestmentBook,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> ConfigResult<Self> {
        if config.death_age <= config.current_age {
            return Err(ConfigError::EmptyHorizon {
                current_age: config.current_age,
                death_age: config.death_age,
            });
        }
        if config.samples == 0 {
            return Err(ConfigError::ZeroSamples);
        }
        let years = config.death_age - config.current_age;
        let last_year = i32::try_from(years)
            .ok()
            .and_then(|span| config.current_year.checked_add(span));
        if last_year.is_none() {
            return Err(ConfigError::YearOutOfRange {
                current_year: config.current_year,
                years,
            });
        }

        let rows = build_rows(config.current_year, config.current_age, config.death_age);
        Ok(Self {
            sampler: Sampler::new(config.samples, config.seed),
            income: Timeline::new(TimelineKind::Income, rows.clone()),
            expenses: Timeline::new(TimelineKind::Expenses, rows.clone()),
            non_retirement: InvestmentBook::new(TimelineKind::NonRetirement, rows.clone()),
            retirement: InvestmentBook::new(TimelineKind::Retirement, rows),
            config,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn add_income(&mut self, config: FlowConfig) -> ConfigResult<()> {
        register_flow(&mut self.income, &config, &mut self.sampler)
    }

    pub fn add_expense(&mut self, config: FlowConfig) -> ConfigResult<()> {
        register_flow(&mut self.expenses, &config, &mut self.sampler)
    }

    pub fn add_nonretirement_investment(&mut self, config: InvestmentConfig) -> ConfigResult<()> {
        self.non_retirement.register(&config, &mut self.sampler)
    }

    pub fn add_retirement_investment(&mut self, config: InvestmentConfig) -> ConfigResult<()> {
        self.retirement.register(&config, &mut self.sampler)
    }

    /// Totals income and expenses, resolves shortfalls against the
    /// investment accounts, totals both investment timelines and finally
    /// derives net worth. Each stage reads only what earlier stages wrote.
    pub fn run(mut self) -> Projection {
        let retirement_age = self.config.retirement_age;
        info!(
            current_age = self.config.current_age,
            death_age = self.config.death_age,
            samples = self.config.samples,
            "running projection"
        );

        aggregate::total(&mut self.income, &mut self.sampler);
        aggregate::total(&mut self.expenses, &mut self.sampler);

        let outcome = shortfall::resolve(
            self.income.totals().unwrap_or_default(),
            self.expenses.totals().unwrap_or_default(),
            &mut self.non_retirement,
            &mut self.retirement,
            retirement_age,
            &mut self.sampler,
        );

        aggregate::total(&mut self.non_retirement.timeline, &mut self.sampler);
        aggregate::total(&mut self.retirement.timeline, &mut self.sampler);

        let rows = self.income.rows().to_vec();
        let net_worth_bounds = aggregate::net_worth(
            &rows,
            CategoryTotals {
                income: self.income.totals().unwrap_or_default(),
                expenses: self.expenses.totals().unwrap_or_default(),
                non_retirement: self.non_retirement.timeline.totals().unwrap_or_default(),
                retirement: self.retirement.timeline.totals().unwrap_or_default(),
            },
            retirement_age,
            &mut self.sampler,
        );
        let mut net_worth = Timeline::new(TimelineKind::NetWorth, rows);
        net_worth.set_totals(net_worth_bounds);

        Projection {
            config: self.config,
            income: self.income,
            expenses: self.expenses,
            non_retirement: self.non_retirement,
            retirement: self.retirement,
            net_worth,
            tallies: outcome.tallies,
            events: outcome.events,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Projection {
    config: SimulationConfig,
    income: Timeline,
    expenses: Timeline,
    non_retirement: InvestmentBook,
    retirement: InvestmentBook,
    net_worth: Timeline,
    tallies: Vec<YearTally>,
    events: Vec<SimulationEvent>,
}

impl Projection {
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn income(&self) -> &Timeline {
        &self.income
    }

    pub fn expenses(&self) -> &Timeline {
        &self.expenses
    }

    pub fn non_retirement(&self) -> &Timeline {
        &self.non_retirement.timeline
    }

    pub fn retirement(&self) -> &Timeline {
        &self.retirement.timeline
    }

    /// Registered settings of an investment account. Names are unique
    /// per timeline only, so the kind picks the book.
    pub fn account_settings(&self, kind: TimelineKind, name: &str) -> Option<&ItemSchedule> {
        match kind {
            TimelineKind::NonRetirement => self.non_retirement.settings(name),
            TimelineKind::Retirement => self.retirement.settings(name),
            _ => None,
        }
    }

    pub fn net_worth(&self) -> &Timeline {
        &self.net_worth
    }

    pub fn net_worth_column(&self) -> Vec<YearPoint> {
        self.net_worth.total_column().unwrap_or_default()
    }

    pub fn year_tallies(&self) -> &[YearTally] {
        &self.tallies
    }

    pub fn events(&self) -> &[SimulationEvent] {
        &self.events
    }

    pub fn report(&self) -> ProjectionReport {
        ProjectionReport {
            current_year: self.config.current_year,
            current_age: self.config.current_age,
            death_age: self.config.death_age,
            retirement_age: self.config.retirement_age,
            samples: self.config.samples,
            seed: self.config.seed,
            rows: self.income.rows().to_vec(),
            income: TimelineReport::from_timeline(&self.income),
            expenses: TimelineReport::from_timeline(&self.expenses),
            non_retirement_investments: TimelineReport::from_timeline(&self.non_retirement.timeline),
            retirement_investments: TimelineReport::from_timeline(&self.retirement.timeline),
            net_worth: self.net_worth_column(),
            year_tallies: self.tallies.clone(),
            events: self.events.clone(),
            messages: self.events.iter().map(ToString::to_string).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionReport {
    pub current_year: i32,
    pub current_age: u32,
    pub death_age: u32,
    pub retirement_age: u32,
    pub samples: usize,
    pub seed: Option<u64>,
    pub rows: Vec<YearRow>,
    pub income: TimelineReport,
    pub expenses: TimelineReport,
    pub non_retirement_investments: TimelineReport,
    pub retirement_investments: TimelineReport,
    pub net_worth: Vec<YearPoint>,
    pub year_tallies: Vec<YearTally>,
    pub events: Vec<SimulationEvent>,
    pub messages: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineReport {
    pub kind: TimelineKind,
    pub items: Vec<ItemReport>,
    pub total: Vec<Bound>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemReport {
    pub name: String,
    pub amounts: Vec<Bound>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distributions: Option<Vec<Bound>>,
}

impl TimelineReport {
    fn from_timeline(timeline: &Timeline) -> Self {
        Self {
            kind: timeline.kind(),
            items: timeline
                .series()
                .iter()
                .map(|series| ItemReport {
                    name: series.name().to_string(),
                    amounts: series.amounts().to_vec(),
                    distributions: series.distributions().map(<[Bound]>::to_vec),
                })
                .collect(),
            total: timeline.totals().map(<[Bound]>::to_vec).unwrap_or_default(),
        }
    }
}

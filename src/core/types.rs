use serde::{Deserialize, Serialize};

/// A 90% confidence interval on a scalar quantity.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Bound {
    pub low: f64,
    pub high: f64,
}

impl Bound {
    pub const ZERO: Bound = Bound {
        low: 0.0,
        high: 0.0,
    };

    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    pub fn fixed(value: f64) -> Self {
        Self {
            low: value,
            high: value,
        }
    }

    pub fn midpoint(self) -> f64 {
        (self.low + self.high) / 2.0
    }

    pub fn width(self) -> f64 {
        self.high - self.low
    }

    pub fn is_ordered(self) -> bool {
        self.low <= self.high
    }

    pub fn is_finite(self) -> bool {
        self.low.is_finite() && self.high.is_finite()
    }

    pub(crate) fn clamp_non_negative(self) -> Self {
        Self {
            low: self.low.max(0.0),
            high: self.high.max(0.0),
        }
    }

    pub(crate) fn clamp_non_positive(self) -> Self {
        Self {
            low: self.low.min(0.0),
            high: self.high.min(0.0),
        }
    }
}

/// Half-open age range `[start, end)`.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct AgeRange {
    pub start: u32,
    pub end: u32,
}

impl AgeRange {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn contains(self, age: u32) -> bool {
        age >= self.start && age < self.end
    }

    pub fn is_empty(self) -> bool {
        self.end <= self.start
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimelineKind {
    Income,
    Expenses,
    NonRetirement,
    Retirement,
    NetWorth,
}

impl TimelineKind {
    pub fn label(self) -> &'static str {
        match self {
            TimelineKind::Income => "income",
            TimelineKind::Expenses => "expenses",
            TimelineKind::NonRetirement => "non-retirement investments",
            TimelineKind::Retirement => "retirement investments",
            TimelineKind::NetWorth => "net worth",
        }
    }

    pub fn is_investment(self) -> bool {
        matches!(self, TimelineKind::NonRetirement | TimelineKind::Retirement)
    }
}

#[derive(Debug, Clone)]
pub struct FlowConfig {
    pub name: String,
    pub amount: Bound,
    pub start_age: u32,
    pub end_age: Option<u32>,
    pub growth: Option<Bound>,
}

impl FlowConfig {
    pub fn new(name: impl Into<String>, amount: Bound, start_age: u32, end_age: Option<u32>) -> Self {
        Self {
            name: name.into(),
            amount,
            start_age,
            end_age,
            growth: None,
        }
    }

    pub fn with_growth(mut self, growth: Bound) -> Self {
        self.growth = Some(growth);
        self
    }
}

#[derive(Debug, Clone)]
pub struct InvestmentConfig {
    pub name: String,
    pub amount: Bound,
    pub start_age: u32,
    pub end_age: Option<u32>,
    pub growth: Option<Bound>,
    pub contribution: Option<Bound>,
    pub contribution_ages: Option<AgeRange>,
}

impl InvestmentConfig {
    pub fn new(name: impl Into<String>, amount: Bound, start_age: u32, end_age: Option<u32>) -> Self {
        Self {
            name: name.into(),
            amount,
            start_age,
            end_age,
            growth: None,
            contribution: None,
            contribution_ages: None,
        }
    }

    pub fn with_growth(mut self, growth: Bound) -> Self {
        self.growth = Some(growth);
        self
    }

    pub fn with_contribution(mut self, contribution: Bound, ages: AgeRange) -> Self {
        self.contribution = Some(contribution);
        self.contribution_ages = Some(ages);
        self
    }
}

/// Validated projection parameters. Investments keep theirs so a
/// mid-timeline draw-down can re-project the remaining years.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemSchedule {
    pub name: String,
    pub amount: Bound,
    pub active: AgeRange,
    pub growth: Bound,
    pub contribution: Bound,
    pub contribution_ages: AgeRange,
}

#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub current_year: i32,
    pub current_age: u32,
    pub death_age: u32,
    pub retirement_age: u32,
    pub samples: usize,
    pub seed: Option<u64>,
}

impl SimulationConfig {
    pub const DEFAULT_RETIREMENT_AGE: u32 = 60;
    pub const DEFAULT_SAMPLES: usize = 10_000;

    pub fn new(current_year: i32, current_age: u32, death_age: u32) -> Self {
        Self {
            current_year,
            current_age,
            death_age,
            retirement_age: Self::DEFAULT_RETIREMENT_AGE,
            samples: Self::DEFAULT_SAMPLES,
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_samples(mut self, samples: usize) -> Self {
        self.samples = samples;
        self
    }

    pub fn with_retirement_age(mut self, retirement_age: u32) -> Self {
        self.retirement_age = retirement_age;
        self
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearRow {
    pub age: u32,
    pub year: i32,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearPoint {
    pub age: u32,
    pub year: i32,
    pub low: f64,
    pub high: f64,
}

impl YearPoint {
    pub fn new(row: YearRow, bound: Bound) -> Self {
        Self {
            age: row.age,
            year: row.year,
            low: bound.low,
            high: bound.high,
        }
    }

    pub fn bound(self) -> Bound {
        Bound::new(self.low, self.high)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearTally {
    pub age: u32,
    pub year: i32,
    pub insufficient_trials: usize,
    pub sufficient_trials: usize,
}

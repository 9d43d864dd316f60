use super::error::{ConfigError, ConfigResult};
use super::sampling::Sampler;
use super::timeline::{Timeline, project};
use super::types::{AgeRange, Bound, FlowConfig, InvestmentConfig, ItemSchedule, TimelineKind, YearRow};

/// An investment timeline together with the settings each account was
/// registered with. Both are kept in registration order, which is also
/// the order accounts are drawn down in.
#[derive(Debug, Clone)]
pub struct InvestmentBook {
    pub(crate) timeline: Timeline,
    pub(crate) accounts: Vec<ItemSchedule>,
}

impl InvestmentBook {
    pub(crate) fn new(kind: TimelineKind, rows: Vec<YearRow>) -> Self {
        Self {
            timeline: Timeline::new(kind, rows),
            accounts: Vec::new(),
        }
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn accounts(&self) -> &[ItemSchedule] {
        &self.accounts
    }

    pub fn settings(&self, name: &str) -> Option<&ItemSchedule> {
        self.accounts.iter().find(|a| a.name == name)
    }

    pub(crate) fn register(&mut self, config: &InvestmentConfig, sampler: &mut Sampler) -> ConfigResult<()> {
        let schedule = validate_investment(config)?;
        insert_projected(&mut self.timeline, &schedule, sampler)?;
        self.accounts.push(schedule);
        Ok(())
    }
}

pub(crate) fn register_flow(
    timeline: &mut Timeline,
    config: &FlowConfig,
    sampler: &mut Sampler,
) -> ConfigResult<()> {
    let schedule = validate_flow(config)?;
    insert_projected(timeline, &schedule, sampler)
}

fn insert_projected(
    timeline: &mut Timeline,
    schedule: &ItemSchedule,
    sampler: &mut Sampler,
) -> ConfigResult<()> {
    if timeline.contains(&schedule.name) {
        return Err(ConfigError::DuplicateItem {
            item: schedule.name.clone(),
            timeline: timeline.kind().label(),
        });
    }

    let index = timeline.series().len();
    timeline.push_series(&schedule.name);
    let (rows, series) = timeline.split_mut();
    project(
        rows,
        series[index].amounts_mut(),
        schedule.active,
        schedule.amount,
        schedule,
        sampler,
    );
    Ok(())
}

pub(crate) fn validate_flow(config: &FlowConfig) -> ConfigResult<ItemSchedule> {
    let name = validate_name(&config.name)?;
    validate_common(
        name,
        config.amount,
        config.start_age,
        config.end_age,
        config.growth,
        Bound::ZERO,
        AgeRange::default(),
    )
}

pub(crate) fn validate_investment(config: &InvestmentConfig) -> ConfigResult<ItemSchedule> {
    let name = validate_name(&config.name)?;
    let contribution = config.contribution.unwrap_or(Bound::ZERO);
    let contribution_ages = config.contribution_ages.unwrap_or_default();
    validate_common(
        name,
        config.amount,
        config.start_age,
        config.end_age,
        config.growth,
        contribution,
        contribution_ages,
    )
}

fn validate_name(name: &str) -> ConfigResult<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::MissingName);
    }
    Ok(trimmed)
}

fn validate_common(
    name: &str,
    amount: Bound,
    start_age: u32,
    end_age: Option<u32>,
    growth: Option<Bound>,
    contribution: Bound,
    contribution_ages: AgeRange,
) -> ConfigResult<ItemSchedule> {
    let growth = growth.unwrap_or(Bound::ZERO);
    check_bound(name, "starting amount", amount)?;
    check_bound(name, "growth", growth)?;
    check_bound(name, "contribution", contribution)?;

    let one_year = start_age
        .checked_add(1)
        .ok_or_else(|| ConfigError::AgeOutOfRange {
            item: name.to_string(),
            field: "start age",
            age: start_age,
        })?;
    let end_age = match end_age {
        None => one_year,
        Some(end) if end == start_age => one_year,
        Some(end) if end < start_age => {
            return Err(ConfigError::InvertedAgeRange {
                item: name.to_string(),
                field: "active ages",
                start: start_age,
                end,
            });
        }
        Some(end) => end,
    };

    if contribution_ages.start > contribution_ages.end {
        return Err(ConfigError::InvertedAgeRange {
            item: name.to_string(),
            field: "contribution ages",
            start: contribution_ages.start,
            end: contribution_ages.end,
        });
    }

    Ok(ItemSchedule {
        name: name.to_string(),
        amount,
        active: AgeRange::new(start_age, end_age),
        growth,
        contribution,
        contribution_ages,
    })
}

fn check_bound(item: &str, field: &'static str, bound: Bound) -> ConfigResult<()> {
    if !bound.is_finite() {
        return Err(ConfigError::NonFinite {
            item: item.to_string(),
            field,
        });
    }
    if !bound.is_ordered() {
        return Err(ConfigError::InvertedBound {
            item: item.to_string(),
            field,
            low: bound.low,
            high: bound.high,
        });
    }
    Ok(())
}

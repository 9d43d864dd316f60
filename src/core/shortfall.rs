use tracing::{debug, info};

use super::events::SimulationEvent;
use super::registry::InvestmentBook;
use super::sampling::{Sampler, collapse};
use super::timeline::project;
use super::types::{AgeRange, Bound, YearTally};

#[derive(Debug, Default)]
pub(crate) struct ShortfallOutcome {
    pub tallies: Vec<YearTally>,
    pub events: Vec<SimulationEvent>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum AccountGroup {
    NonRetirement,
    Retirement,
}

#[derive(Copy, Clone, Debug)]
struct WaterfallSlot {
    group: AccountGroup,
    index: usize,
}

/// Per-trial results of walking one year's waterfall. `endings[a][t]`
/// and `distributions[a][t]` belong to the `a`-th account in waterfall
/// order; `unmet[t]` is whatever no account could cover.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Waterfall {
    pub endings: Vec<Vec<f64>>,
    pub distributions: Vec<Vec<f64>>,
    pub unmet: Vec<f64>,
}

/// Covers each year's income shortfall from investment accounts.
///
/// Within a year, income, expense and every account balance share trial
/// index `t`. Years run in chronological order and a real draw-down
/// re-projects that account's later years before the next year is
/// visited, so later years see the reduced balance.
pub(crate) fn resolve(
    income_totals: &[Bound],
    expense_totals: &[Bound],
    non_retirement: &mut InvestmentBook,
    retirement: &mut InvestmentBook,
    retirement_age: u32,
    sampler: &mut Sampler,
) -> ShortfallOutcome {
    let rows = non_retirement.timeline.rows().to_vec();
    let mut outcome = ShortfallOutcome::default();

    for (index, row) in rows.iter().enumerate() {
        let income = sampler.draw(income_totals[index]);
        let expense = sampler.draw(expense_totals[index]);
        let shortages: Vec<f64> = income.iter().zip(&expense).map(|(i, e)| i - e).collect();

        let insufficient = shortages.iter().filter(|s| **s < 0.0).count();
        let tally = YearTally {
            age: row.age,
            year: row.year,
            insufficient_trials: insufficient,
            sufficient_trials: shortages.len() - insufficient,
        };
        let event = SimulationEvent::YearTally {
            age: row.age,
            year: row.year,
            insufficient_trials: insufficient,
            total_trials: shortages.len(),
        };
        info!("{event}");
        outcome.tallies.push(tally);
        outcome.events.push(event);

        if insufficient == 0 {
            continue;
        }

        let mut waterfall = available_accounts(non_retirement, AccountGroup::NonRetirement, index);
        if row.age >= retirement_age {
            waterfall.extend(available_accounts(retirement, AccountGroup::Retirement, index));
        }
        if waterfall.is_empty() {
            debug!(age = row.age, "no funded accounts; shortfall left unresolved");
            continue;
        }

        let mut starting = Vec::with_capacity(waterfall.len());
        for slot in &waterfall {
            let book = select(slot.group, non_retirement, retirement);
            let balance = book.timeline.series()[slot.index].amounts()[index];
            starting.push(sampler.draw(balance));
        }

        let Waterfall {
            endings,
            distributions,
            unmet,
        } = walk_waterfall(&shortages, &starting);

        let uncovered = unmet.iter().filter(|u| **u < 0.0).count();
        if uncovered > 0 {
            debug!(age = row.age, uncovered, "accounts could not cover every trial");
        }

        for ((slot, mut ending), mut taken) in waterfall.iter().zip(endings).zip(distributions) {
            if taken.iter().all(|d| *d == 0.0) {
                continue;
            }

            let book = select(slot.group, non_retirement, retirement);
            let schedule = &book.accounts[slot.index];
            let (book_rows, series) = book.timeline.split_mut();
            let series = &mut series[slot.index];

            let before = series.amounts()[index];
            let after = collapse(&mut ending).clamp_non_negative();
            let distribution = collapse(&mut taken).clamp_non_positive();
            series.record_distribution(index, after, distribution);

            if distribution.low < 0.0 {
                let event = SimulationEvent::Distribution {
                    account: schedule.name.clone(),
                    age: row.age,
                    year: row.year,
                    balance_before: before,
                    balance_after: after,
                    distribution,
                };
                info!("{event}");
                outcome.events.push(event);

                project(
                    book_rows,
                    series.amounts_mut(),
                    AgeRange::new(row.age + 1, schedule.active.end),
                    after,
                    schedule,
                    sampler,
                );
            }
        }
    }

    outcome
}

fn select<'a>(
    group: AccountGroup,
    non_retirement: &'a mut InvestmentBook,
    retirement: &'a mut InvestmentBook,
) -> &'a mut InvestmentBook {
    match group {
        AccountGroup::NonRetirement => non_retirement,
        AccountGroup::Retirement => retirement,
    }
}

fn available_accounts(book: &InvestmentBook, group: AccountGroup, index: usize) -> Vec<WaterfallSlot> {
    book.timeline
        .series()
        .iter()
        .enumerate()
        .filter(|(_, series)| series.amounts()[index].high > 0.0)
        .map(|(account, _)| WaterfallSlot {
            group,
            index: account,
        })
        .collect()
}

/// Walks every trial through the accounts in order. An account can give
/// at most its (non-negative) balance; once a trial's shortage is
/// covered, the remaining accounts keep their starting balance.
pub(crate) fn walk_waterfall(shortages: &[f64], starting: &[Vec<f64>]) -> Waterfall {
    let trials = shortages.len();
    let mut endings = vec![Vec::with_capacity(trials); starting.len()];
    let mut distributions = vec![Vec::with_capacity(trials); starting.len()];
    let mut unmet = Vec::with_capacity(trials);

    for (t, shortage) in shortages.iter().enumerate() {
        let mut shortage = shortage.min(0.0);

        for (account, balances) in starting.iter().enumerate() {
            let balance = balances[t];
            if shortage == 0.0 {
                endings[account].push(balance);
                distributions[account].push(0.0);
                continue;
            }

            let available = balance.max(0.0);
            let remaining = available + shortage;
            if remaining < 0.0 {
                endings[account].push(0.0);
                distributions[account].push(-available);
                shortage = remaining;
            } else {
                endings[account].push(remaining);
                distributions[account].push(shortage);
                shortage = 0.0;
            }
        }

        unmet.push(shortage);
    }

    Waterfall {
        endings,
        distributions,
        unmet,
    }
}

use std::fmt;

use serde::Serialize;

use super::types::Bound;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SimulationEvent {
    #[serde(rename_all = "camelCase")]
    YearTally {
        age: u32,
        year: i32,
        insufficient_trials: usize,
        total_trials: usize,
    },
    #[serde(rename_all = "camelCase")]
    Distribution {
        account: String,
        age: u32,
        year: i32,
        balance_before: Bound,
        balance_after: Bound,
        distribution: Bound,
    },
}

impl fmt::Display for SimulationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationEvent::YearTally {
                age,
                year,
                insufficient_trials,
                total_trials,
            } => write!(
                f,
                "age {age} ({year}): income fell short of expenses in {insufficient_trials} of {total_trials} trials"
            ),
            SimulationEvent::Distribution {
                account,
                age,
                year,
                balance_before,
                balance_after,
                distribution,
            } => write!(
                f,
                "age {age} ({year}): distribution from {account} of ${:.0} to ${:.0}; balance ${:.0}-${:.0} -> ${:.0}-${:.0}",
                distribution.low,
                distribution.high,
                balance_before.low,
                balance_before.high,
                balance_after.low,
                balance_after.high,
            ),
        }
    }
}

use thiserror::Error;

/// Numerical outcomes (drained accounts, unfunded years) are never
/// reported through this type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("name is required for all items")]
    MissingName,

    #[error("{item}: {field} is required")]
    MissingField { item: String, field: &'static str },

    #[error("{item}: {field} must be a finite number")]
    NonFinite { item: String, field: &'static str },

    #[error("{item}: {field} low ({low}) cannot be greater than high ({high})")]
    InvertedBound {
        item: String,
        field: &'static str,
        low: f64,
        high: f64,
    },

    #[error("{item}: {field} start ({start}) cannot be greater than end ({end})")]
    InvertedAgeRange {
        item: String,
        field: &'static str,
        start: u32,
        end: u32,
    },

    #[error("{item}: {field} only applies to investments")]
    ContributionOnNonInvestment { item: String, field: &'static str },

    #[error("{item}: {field} ({age}) is out of range")]
    AgeOutOfRange {
        item: String,
        field: &'static str,
        age: u32,
    },

    #[error("{item}: already registered in {timeline}")]
    DuplicateItem { item: String, timeline: &'static str },

    #[error("death age ({death_age}) must be greater than current age ({current_age})")]
    EmptyHorizon { current_age: u32, death_age: u32 },

    #[error("sample population size must be > 0")]
    ZeroSamples,

    #[error("{years} years from {current_year} runs past the last representable year")]
    YearOutOfRange { current_year: i32, years: u32 },

    #[error("{field} ({value}) cannot exceed {max}")]
    LimitExceeded {
        field: &'static str,
        value: usize,
        max: usize,
    },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

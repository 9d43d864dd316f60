mod aggregate;
mod error;
mod events;
mod registry;
mod sampling;
mod shortfall;
mod simulation;
mod timeline;
mod types;

pub use error::{ConfigError, ConfigResult};
pub use events::SimulationEvent;
pub use registry::InvestmentBook;
pub use sampling::{Sampler, Z_90, collapse};
pub use simulation::{ItemReport, Projection, ProjectionReport, Simulation, TimelineReport};
pub use timeline::{ItemSeries, Timeline};
pub use types::{
    AgeRange, Bound, FlowConfig, InvestmentConfig, ItemSchedule, SimulationConfig, TimelineKind,
    YearPoint, YearRow, YearTally,
};

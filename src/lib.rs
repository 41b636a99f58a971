//! Counterfactual mining model: coins a fixed share of global hash power
//! would have mined since a start height, and a forward projection of the
//! same scenario under adjustable parameters.

pub mod config;
pub mod error;
pub mod feeds;
pub mod history;
pub mod power_law;
pub mod projection;
pub mod snapshot;
pub mod supply;

pub use config::{FeedEndpoints, ModelConfig, ServiceConfig};
pub use error::{ModelError, ModelResult};
pub use history::{PricePoint, SeriesPoint};
pub use power_law::PowerLawModel;
pub use projection::{project, ProjectionTable, SimulationParameters, YearlyProjectionRow};
pub use snapshot::{snapshot, AllocationShare, MarketInputs, OpportunitySnapshot, PowerMetric};
pub use supply::{HalvingEpoch, HalvingSchedule};

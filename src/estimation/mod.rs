pub mod metrics;
mod profile;
pub mod rarefaction;
mod registry;
mod snapshot;
mod species_estimator;

pub use metrics::HillOrder;
pub use profile::{EffortHistory, Profile};
pub use registry::SpeciesRegistry;
pub use snapshot::{
    Checkpoint, Metric, MetricGroup, MetricGroups, ModelSnapshot, SamplingEffort,
};
pub use species_estimator::{DEFAULT_EFFORT_TARGETS, EstimatorState, SpeciesEstimator};
pub(crate) use species_estimator::validate_config;

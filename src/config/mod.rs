mod build;
mod choices;
mod error;

pub use build::build_estimator;
pub use choices::{
    BootstrapParams, Choice, EstimatorParams, NGramParameters, RetrievalChoice, RetrievalKind,
};
pub use error::BuildError;

mod reference_sample;
mod species;

pub use reference_sample::{Model, ReferenceSample};
pub use species::{Species, SpeciesCounts};

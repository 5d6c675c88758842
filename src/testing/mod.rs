pub mod fixtures;

pub use fixtures::{cyclic_traces, random_traces, sp};

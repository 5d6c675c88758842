mod bootstrap;

pub use bootstrap::{BootstrapError, BootstrapProfiler};

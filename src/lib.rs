//! Incremental species-richness and diversity profiling for streams of traces.
//!
//! Each trace is turned into a multiset of species by a [`retrieval::RetrievalStrategy`]
//! and folded into abundance and incidence reference samples. A
//! [`estimation::SpeciesEstimator`] records Hill numbers, completeness, coverage
//! and sampling-effort estimates at a fixed checkpoint interval;
//! [`evaluation::summarize_runs`] aggregates independent runs and
//! [`tasks::BootstrapProfiler`] produces such runs by resampling.

pub mod config;
pub mod core;
pub mod estimation;
pub mod evaluation;
pub mod retrieval;
pub mod tasks;
pub mod utils;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

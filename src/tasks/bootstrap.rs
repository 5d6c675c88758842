//! Bootstrap profiling: the same species estimator run over many resamples
//! of one set of traces, summarized across replicates.
//!
//! Replicates are independent, so they are spread over scoped worker threads.
//! Each replicate draws from its own `StdRng`, seeded from the profiler's
//! master seed, so results do not depend on the number of workers.

use crate::config::BuildError;
use crate::estimation::{
    DEFAULT_EFFORT_TARGETS, MetricGroups, SpeciesEstimator, validate_config,
};
use crate::evaluation::{RunSummary, SummaryError, summarize_runs};
use crate::retrieval::{RetrievalError, RetrievalStrategy};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::num::NonZeroUsize;
use std::thread;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("replicate {replicate}: {source}")]
    Retrieval {
        replicate: usize,
        #[source]
        source: RetrievalError,
    },
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error(transparent)]
    Summary(#[from] SummaryError),
}

#[derive(Debug, Clone)]
pub struct BootstrapProfiler {
    strategy: RetrievalStrategy,
    step_size: u64,
    replicates: usize,
    seed: u64,
    effort_targets: Vec<f64>,
    metric_groups: MetricGroups,
    workers: usize,
}

impl BootstrapProfiler {
    pub fn new(
        strategy: RetrievalStrategy,
        step_size: u64,
        replicates: usize,
        seed: u64,
    ) -> Result<Self, BuildError> {
        if replicates == 0 {
            return Err(BuildError::InvalidParameter("replicates must be > 0".into()));
        }
        strategy.validate()?;
        validate_config(step_size, &[])?;

        let workers = thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1);
        Ok(Self {
            strategy,
            step_size,
            replicates,
            seed,
            effort_targets: DEFAULT_EFFORT_TARGETS.to_vec(),
            metric_groups: MetricGroups::all(),
            workers,
        })
    }

    pub fn with_targets(mut self, effort_targets: Vec<f64>) -> Result<Self, BuildError> {
        validate_config(self.step_size, &effort_targets)?;
        self.effort_targets = effort_targets;
        Ok(self)
    }

    pub fn with_metric_groups(mut self, metric_groups: MetricGroups) -> Self {
        self.metric_groups = metric_groups;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn replicates(&self) -> usize {
        self.replicates
    }

    /// Profiles every replicate and summarizes their final states.
    pub fn run<T, S>(&self, traces: &[T]) -> Result<RunSummary, BootstrapError>
    where
        T: AsRef<[S]> + Sync,
        S: AsRef<str> + Sync,
    {
        let runs = self.run_replicates(traces)?;
        let summary = summarize_runs(&runs)?;
        info!(
            "bootstrap of {} finished: {} replicates",
            self.strategy, summary.runs
        );
        Ok(summary)
    }

    /// Profiles every replicate and returns the estimators in replicate order.
    pub fn run_replicates<T, S>(
        &self,
        traces: &[T],
    ) -> Result<Vec<SpeciesEstimator>, BootstrapError>
    where
        T: AsRef<[S]> + Sync,
        S: AsRef<str> + Sync,
    {
        info!(
            "bootstrapping {} over {} traces: {} replicates on {} workers",
            self.strategy,
            traces.len(),
            self.replicates,
            self.workers
        );

        let mut master = StdRng::seed_from_u64(self.seed);
        let seeds: Vec<(usize, u64)> = (0..self.replicates).map(|i| (i, master.random())).collect();
        let chunk = self.replicates.div_ceil(self.workers);

        let results: Vec<Result<SpeciesEstimator, BootstrapError>> = thread::scope(|scope| {
            let handles: Vec<_> = seeds
                .chunks(chunk)
                .map(|batch| {
                    scope.spawn(move || {
                        batch
                            .iter()
                            .map(|&(replicate, seed)| self.replicate(traces, replicate, seed))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();

            handles
                .into_iter()
                .flat_map(|h| match h.join() {
                    Ok(batch) => batch,
                    Err(panic) => std::panic::resume_unwind(panic),
                })
                .collect()
        });

        results.into_iter().collect()
    }

    fn replicate<T, S>(
        &self,
        traces: &[T],
        replicate: usize,
        seed: u64,
    ) -> Result<SpeciesEstimator, BootstrapError>
    where
        T: AsRef<[S]>,
        S: AsRef<str>,
    {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut estimator = SpeciesEstimator::with_metrics(
            self.strategy,
            self.step_size,
            self.effort_targets.clone(),
            self.metric_groups.clone(),
        )?;

        let n = traces.len();
        for _ in 0..n {
            let trace = traces[rng.random_range(0..n)].as_ref();
            estimator
                .apply(trace)
                .map_err(|source| BootstrapError::Retrieval { replicate, source })?;
        }
        debug!(
            "replicate {replicate}: {} checkpoints, {}",
            estimator.checkpoints(),
            estimator.snapshot()
        );
        Ok(estimator)
    }
}

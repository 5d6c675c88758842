use crate::config::BuildError;
use crate::core::{Model, ReferenceSample, SpeciesCounts};
use crate::estimation::metrics::degree_of_aggregation;
use crate::estimation::profile::Profile;
use crate::estimation::rarefaction::expected_richness;
use crate::estimation::snapshot::{Checkpoint, MetricGroups, ModelSnapshot};
use crate::retrieval::{RetrievalError, RetrievalStrategy};
use log::{debug, trace};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::mpsc::Sender;
use strum_macros::Display as StrumDisplay;

/// Completeness targets profiled when none are given.
pub const DEFAULT_EFFORT_TARGETS: [f64; 3] = [0.9, 0.95, 0.99];

/// Checks the checkpoint interval and the completeness targets shared by
/// every component that builds estimators.
pub(crate) fn validate_config(step_size: u64, effort_targets: &[f64]) -> Result<(), BuildError> {
    if step_size == 0 {
        return Err(BuildError::InvalidParameter("step_size must be > 0".into()));
    }
    if let Some(bad) = effort_targets.iter().find(|g| !(**g > 0.0 && **g < 1.0)) {
        return Err(BuildError::InvalidParameter(format!(
            "completeness target must be in (0, 1), got {bad}"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, StrumDisplay)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum EstimatorState {
    /// No sample applied yet.
    Uninitialized,
    /// At least one sample applied.
    Accumulating,
}

/// Incremental diversity and completeness profiler for one species definition.
///
/// Samples are fed one at a time through [`apply`](Self::apply). Both the
/// abundance and the incidence reference samples are updated on every call,
/// and after every `step_size`-th sample a [`Checkpoint`] of all metrics is
/// appended to the profiles.
///
/// No raw sample is retained: the reference samples are sufficient for every
/// metric.
#[derive(Debug)]
pub struct SpeciesEstimator {
    strategy: RetrievalStrategy,
    step_size: u64,
    effort_targets: Vec<f64>,
    metric_groups: MetricGroups,

    abundance: ReferenceSample,
    incidence: ReferenceSample,

    abundance_profile: Profile,
    incidence_profile: Profile,
    degree_of_aggregation: Vec<f64>,

    progress_tx: Option<Sender<Checkpoint>>,
}

impl SpeciesEstimator {
    pub fn new(strategy: RetrievalStrategy, step_size: u64) -> Result<Self, BuildError> {
        Self::with_targets(strategy, step_size, DEFAULT_EFFORT_TARGETS.to_vec())
    }

    pub fn with_targets(
        strategy: RetrievalStrategy,
        step_size: u64,
        effort_targets: Vec<f64>,
    ) -> Result<Self, BuildError> {
        Self::with_metrics(strategy, step_size, effort_targets, MetricGroups::all())
    }

    /// Like [`with_targets`](Self::with_targets), computing only the metric
    /// groups in `metric_groups`. Sample counts are always recorded.
    pub fn with_metrics(
        strategy: RetrievalStrategy,
        step_size: u64,
        effort_targets: Vec<f64>,
        metric_groups: MetricGroups,
    ) -> Result<Self, BuildError> {
        strategy.validate()?;
        validate_config(step_size, &effort_targets)?;

        Ok(Self {
            strategy,
            step_size,
            abundance: ReferenceSample::new(Model::Abundance),
            incidence: ReferenceSample::new(Model::Incidence),
            abundance_profile: Profile::new(&effort_targets, metric_groups.clone()),
            incidence_profile: Profile::new(&effort_targets, metric_groups.clone()),
            degree_of_aggregation: vec![],
            effort_targets,
            metric_groups,
            progress_tx: None,
        })
    }

    /// Forwards every checkpoint to `tx` as it is recorded.
    pub fn with_progress(mut self, tx: Sender<Checkpoint>) -> Self {
        self.progress_tx = Some(tx);
        self
    }

    /// Adds one sample.
    ///
    /// A sample the strategy cannot read is rejected before any state changes,
    /// so it neither counts as an observation nor shifts the checkpoints.
    pub fn apply<S: AsRef<str>>(&mut self, trace: &[S]) -> Result<(), RetrievalError> {
        let species = self.strategy.retrieve(trace)?;
        self.apply_counts(&species);
        Ok(())
    }

    /// Adds one sample whose species were already retrieved with this
    /// estimator's strategy.
    pub(crate) fn apply_counts(&mut self, species: &SpeciesCounts) {
        self.abundance.record(species);
        self.incidence.record(species);
        trace!(
            "{}: sample {} -> {} occurrences of {} species",
            self.strategy,
            self.observations(),
            species.total(),
            species.distinct()
        );

        if self.observations() % self.step_size == 0 {
            self.push_checkpoint();
        }
    }

    /// Adds every sample of `traces` in order, stopping at the first
    /// malformed one.
    pub fn apply_all<T, S>(&mut self, traces: &[T]) -> Result<(), RetrievalError>
    where
        T: AsRef<[S]>,
        S: AsRef<str>,
    {
        for trace in traces {
            self.apply(trace.as_ref())?;
        }
        Ok(())
    }

    pub fn strategy(&self) -> RetrievalStrategy {
        self.strategy
    }

    pub fn step_size(&self) -> u64 {
        self.step_size
    }

    pub fn effort_targets(&self) -> &[f64] {
        &self.effort_targets
    }

    pub fn metric_groups(&self) -> &MetricGroups {
        &self.metric_groups
    }

    pub fn state(&self) -> EstimatorState {
        if self.observations() == 0 {
            EstimatorState::Uninitialized
        } else {
            EstimatorState::Accumulating
        }
    }

    /// Number of samples applied so far.
    #[inline]
    pub fn observations(&self) -> u64 {
        self.incidence.sample_size()
    }

    pub fn reference_sample(&self, model: Model) -> &ReferenceSample {
        match model {
            Model::Abundance => &self.abundance,
            Model::Incidence => &self.incidence,
        }
    }

    pub fn profile(&self, model: Model) -> &Profile {
        match model {
            Model::Abundance => &self.abundance_profile,
            Model::Incidence => &self.incidence_profile,
        }
    }

    pub fn degree_of_aggregation(&self) -> &[f64] {
        &self.degree_of_aggregation
    }

    /// Number of checkpoints recorded, `floor(observations / step_size)`.
    pub fn checkpoints(&self) -> usize {
        self.degree_of_aggregation.len()
    }

    /// Metrics of the current state, computed on demand.
    pub fn snapshot(&self) -> Checkpoint {
        Checkpoint {
            observations: self.observations(),
            degree_of_aggregation: degree_of_aggregation(&self.abundance, &self.incidence),
            abundance: self.compute(&self.abundance),
            incidence: self.compute(&self.incidence),
        }
    }

    /// Most recently recorded checkpoint.
    pub fn latest_checkpoint(&self) -> Option<Checkpoint> {
        let abundance = self.abundance_profile.latest()?;
        let incidence = self.incidence_profile.latest()?;
        Some(Checkpoint {
            observations: incidence.no_observations,
            degree_of_aggregation: *self.degree_of_aggregation.last()?,
            abundance,
            incidence,
        })
    }

    /// Expected richness at sample size `m` (rarefaction below the current
    /// sample size, extrapolation above it).
    pub fn expected_richness(&self, model: Model, m: u64) -> f64 {
        expected_richness(self.reference_sample(model), m)
    }

    fn compute(&self, sample: &ReferenceSample) -> ModelSnapshot {
        ModelSnapshot::compute(sample, &self.effort_targets, &self.metric_groups)
    }

    /// Writes both profiles and the aggregation history without a header.
    pub(crate) fn write_profiles(&self, f: &mut Formatter<'_>) -> FmtResult {
        writeln!(f, "Abundance")?;
        write!(f, "{}", self.abundance_profile)?;
        writeln!(f, "Incidence")?;
        write!(f, "{}", self.incidence_profile)?;
        writeln!(
            f,
            "{:<30} {:?}",
            "Degree of Aggregation:", self.degree_of_aggregation
        )
    }

    fn push_checkpoint(&mut self) {
        let checkpoint = self.snapshot();

        self.abundance_profile.push(&checkpoint.abundance);
        self.incidence_profile.push(&checkpoint.incidence);
        self.degree_of_aggregation
            .push(checkpoint.degree_of_aggregation);
        debug!("{}: {}", self.strategy, checkpoint);

        if let Some(tx) = &self.progress_tx {
            let _ = tx.send(checkpoint);
        }
    }
}

impl Display for SpeciesEstimator {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        writeln!(f, "### {} ###", self.strategy)?;
        self.write_profiles(f)
    }
}

use crate::config::BuildError;
use crate::estimation::snapshot::MetricGroups;
use crate::estimation::species_estimator::{
    DEFAULT_EFFORT_TARGETS, SpeciesEstimator, validate_config,
};
use crate::retrieval::{RetrievalError, RetrievalStrategy};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Several species definitions profiled over the same stream of samples.
///
/// Every registered estimator shares the registry's step size, completeness
/// targets and metric groups, so their checkpoints stay aligned.
#[derive(Debug)]
pub struct SpeciesRegistry {
    step_size: u64,
    effort_targets: Vec<f64>,
    metric_groups: MetricGroups,
    estimators: BTreeMap<String, SpeciesEstimator>,
}

impl SpeciesRegistry {
    pub fn new(step_size: u64) -> Result<Self, BuildError> {
        Self::with_targets(step_size, DEFAULT_EFFORT_TARGETS.to_vec())
    }

    pub fn with_targets(step_size: u64, effort_targets: Vec<f64>) -> Result<Self, BuildError> {
        validate_config(step_size, &effort_targets)?;
        Ok(Self {
            step_size,
            effort_targets,
            metric_groups: MetricGroups::all(),
            estimators: BTreeMap::new(),
        })
    }

    /// Restricts the metric groups of estimators registered from now on.
    pub fn with_metric_groups(mut self, metric_groups: MetricGroups) -> Self {
        self.metric_groups = metric_groups;
        self
    }

    pub fn register<N: Into<String>>(
        &mut self,
        id: N,
        strategy: RetrievalStrategy,
    ) -> Result<(), BuildError> {
        let id = id.into();
        if self.estimators.contains_key(&id) {
            return Err(BuildError::DuplicateSpecies(id));
        }
        let estimator = SpeciesEstimator::with_metrics(
            strategy,
            self.step_size,
            self.effort_targets.clone(),
            self.metric_groups.clone(),
        )?;
        self.estimators.insert(id, estimator);
        Ok(())
    }

    /// Feeds one sample to every registered estimator.
    ///
    /// Species are retrieved by every strategy before any estimator is
    /// updated, so a malformed sample leaves all estimators untouched.
    pub fn apply<S: AsRef<str>>(&mut self, trace: &[S]) -> Result<(), RetrievalError> {
        let retrieved = self
            .estimators
            .values()
            .map(|e| e.strategy().retrieve(trace))
            .collect::<Result<Vec<_>, _>>()?;
        for (estimator, species) in self.estimators.values_mut().zip(&retrieved) {
            estimator.apply_counts(species);
        }
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&SpeciesEstimator> {
        self.estimators.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.estimators.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SpeciesEstimator)> {
        self.estimators.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.estimators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.estimators.is_empty()
    }
}

impl Display for SpeciesRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        for (id, estimator) in &self.estimators {
            writeln!(f, "### {id} ###")?;
            estimator.write_profiles(f)?;
            writeln!(f)?;
        }
        Ok(())
    }
}

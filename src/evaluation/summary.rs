use crate::core::Model;
use crate::estimation::{Checkpoint, Metric, ModelSnapshot, SpeciesEstimator};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter, Result as FmtResult};
use strum::IntoEnumIterator;
use thiserror::Error;

/// Order statistic used for the empirical bounds: the 3rd smallest and the
/// 3rd largest value.
pub const DEFAULT_BOUND_RANK: usize = 2;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SummaryError {
    #[error("cannot summarize an empty set of runs")]
    NoRuns,
}

/// Order-statistics summary of one metric across independent runs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub min: f64,
    pub lower: f64,
    pub mean: f64,
    pub std: f64,
    pub median: f64,
    pub upper: f64,
    pub max: f64,
}

impl Summary {
    pub fn from_values(values: &[f64]) -> Result<Self, SummaryError> {
        Self::with_rank(values, DEFAULT_BOUND_RANK)
    }

    /// `lower` is the value at index `rank` of the sorted runs and `upper`
    /// its mirror from the top. At least `2 * rank + 1` values are needed for
    /// those to be meaningful; with fewer, the bounds fall back to min/max.
    pub fn with_rank(values: &[f64], rank: usize) -> Result<Self, SummaryError> {
        if values.is_empty() {
            return Err(SummaryError::NoRuns);
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let n = sorted.len();
        let min = sorted[0];
        let max = sorted[n - 1];
        let (lower, upper) = if n > 2 * rank {
            (sorted[rank], sorted[n - 1 - rank])
        } else {
            log::warn!(
                "only {n} runs, need {} for rank-{rank} bounds; using min/max",
                2 * rank + 1
            );
            (min, max)
        };

        let mean = sorted.iter().sum::<f64>() / n as f64;
        let var = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
        let median = if n % 2 == 1 {
            sorted[n / 2]
        } else {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        };

        Ok(Self {
            min,
            lower,
            mean,
            std: var.sqrt(),
            median,
            upper,
            max,
        })
    }
}

impl Display for Summary {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "min={:.4} lower={:.4} mean={:.4} std={:.4} median={:.4} upper={:.4} max={:.4}",
            self.min, self.lower, self.mean, self.std, self.median, self.upper, self.max
        )
    }
}

/// Per-model summaries of the final state of several runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub runs: usize,
    metrics: BTreeMap<Model, BTreeMap<Metric, Summary>>,
    sampling_effort: BTreeMap<Model, Vec<(f64, Summary)>>,
    pub degree_of_aggregation: Summary,
}

impl RunSummary {
    pub fn get(&self, model: Model, metric: Metric) -> Option<&Summary> {
        self.metrics.get(&model)?.get(&metric)
    }

    pub fn metrics(&self, model: Model) -> impl Iterator<Item = (Metric, &Summary)> {
        self.metrics
            .get(&model)
            .into_iter()
            .flat_map(|m| m.iter().map(|(k, v)| (*k, v)))
    }

    /// Summaries of the additional sampling effort, one per completeness target.
    pub fn sampling_effort(&self, model: Model) -> &[(f64, Summary)] {
        self.sampling_effort
            .get(&model)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl Display for RunSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        writeln!(f, "runs: {}", self.runs)?;
        for model in Model::iter() {
            writeln!(f, "{model}:")?;
            for (metric, s) in self.metrics(model) {
                writeln!(f, "     {:<25} {s}", metric.to_string())?;
            }
            for (target, s) in self.sampling_effort(model) {
                writeln!(f, "     {:<25} {s}", format!("l_{target}"))?;
            }
        }
        writeln!(f, "degree_of_aggregation:     {}", self.degree_of_aggregation)
    }
}

/// Summarizes the current state of every run.
///
/// All runs must share the same effort targets; targets are taken from the
/// first run.
pub fn summarize_runs(runs: &[SpeciesEstimator]) -> Result<RunSummary, SummaryError> {
    let finals: Vec<Checkpoint> = runs.iter().map(SpeciesEstimator::snapshot).collect();
    summarize_checkpoints(&finals)
}

pub fn summarize_checkpoints(finals: &[Checkpoint]) -> Result<RunSummary, SummaryError> {
    let Some(first) = finals.first() else {
        return Err(SummaryError::NoRuns);
    };

    let mut metrics = BTreeMap::new();
    let mut sampling_effort = BTreeMap::new();
    for model in Model::iter() {
        let pick = |c: &Checkpoint| -> ModelSnapshot {
            match model {
                Model::Abundance => c.abundance.clone(),
                Model::Incidence => c.incidence.clone(),
            }
        };
        let snapshots: Vec<ModelSnapshot> = finals.iter().map(pick).collect();

        let mut per_metric = BTreeMap::new();
        for metric in Metric::iter() {
            let values: Vec<f64> = snapshots.iter().filter_map(|s| s.value(metric)).collect();
            // Metrics of disabled groups have no values in any run.
            if values.is_empty() {
                continue;
            }
            per_metric.insert(metric, Summary::from_values(&values)?);
        }
        metrics.insert(model, per_metric);

        let mut efforts = Vec::new();
        for (i, effort) in pick(first).sampling_effort.iter().enumerate() {
            let values: Vec<f64> = snapshots
                .iter()
                .filter_map(|s| s.sampling_effort.get(i).map(|e| e.additional))
                .collect();
            efforts.push((effort.target, Summary::from_values(&values)?));
        }
        sampling_effort.insert(model, efforts);
    }

    let aggregation: Vec<f64> = finals.iter().map(|c| c.degree_of_aggregation).collect();
    Ok(RunSummary {
        runs: finals.len(),
        metrics,
        sampling_effort,
        degree_of_aggregation: Summary::from_values(&aggregation)?,
    })
}

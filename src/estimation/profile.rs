use crate::estimation::snapshot::{
    Metric, MetricGroup, MetricGroups, ModelSnapshot, SamplingEffort,
};
use std::fmt::{Display, Formatter, Result};

/// Sampling-effort history for one completeness target.
#[derive(Debug, Clone, PartialEq)]
pub struct EffortHistory {
    pub target: f64,
    values: Vec<f64>,
}

impl EffortHistory {
    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// Diversity and completeness profile of one counting model.
///
/// One append-only sequence per metric. Every sequence of an enabled metric
/// grows by exactly one entry per checkpoint, so all of them have the same
/// length; sequences of disabled metric groups stay empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    groups: MetricGroups,
    no_observations: Vec<u64>,
    sum_species_counts: Vec<u64>,
    singletons: Vec<u64>,
    doubletons: Vec<u64>,
    sample_d0: Vec<f64>,
    estimate_d0: Vec<f64>,
    sample_d1: Vec<f64>,
    estimate_d1: Vec<f64>,
    sample_d2: Vec<f64>,
    estimate_d2: Vec<f64>,
    shannon_entropy: Vec<f64>,
    completeness: Vec<f64>,
    coverage: Vec<f64>,
    sampling_effort: Vec<EffortHistory>,
}

impl Profile {
    pub fn new(effort_targets: &[f64], groups: MetricGroups) -> Self {
        let effort_targets = if groups.contains(MetricGroup::SamplingEffort) {
            effort_targets
        } else {
            &[]
        };
        Self {
            groups,
            no_observations: vec![],
            sum_species_counts: vec![],
            singletons: vec![],
            doubletons: vec![],
            sample_d0: vec![],
            estimate_d0: vec![],
            sample_d1: vec![],
            estimate_d1: vec![],
            sample_d2: vec![],
            estimate_d2: vec![],
            shannon_entropy: vec![],
            completeness: vec![],
            coverage: vec![],
            sampling_effort: effort_targets
                .iter()
                .map(|&target| EffortHistory {
                    target,
                    values: vec![],
                })
                .collect(),
        }
    }

    pub(crate) fn push(&mut self, s: &ModelSnapshot) {
        self.no_observations.push(s.no_observations);
        self.sum_species_counts.push(s.sum_species_counts);
        self.singletons.push(s.singletons);
        self.doubletons.push(s.doubletons);
        self.sample_d0.extend(s.sample_d0);
        self.estimate_d0.extend(s.estimate_d0);
        self.sample_d1.extend(s.sample_d1);
        self.estimate_d1.extend(s.estimate_d1);
        self.sample_d2.extend(s.sample_d2);
        self.estimate_d2.extend(s.estimate_d2);
        self.shannon_entropy.extend(s.shannon_entropy);
        self.completeness.extend(s.completeness);
        self.coverage.extend(s.coverage);
        for (history, effort) in self.sampling_effort.iter_mut().zip(&s.sampling_effort) {
            history.values.push(effort.additional);
        }
    }

    pub fn len(&self) -> usize {
        self.no_observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.no_observations.is_empty()
    }

    pub fn groups(&self) -> &MetricGroups {
        &self.groups
    }

    pub fn no_observations(&self) -> &[u64] {
        &self.no_observations
    }

    pub fn sum_species_counts(&self) -> &[u64] {
        &self.sum_species_counts
    }

    pub fn singletons(&self) -> &[u64] {
        &self.singletons
    }

    pub fn doubletons(&self) -> &[u64] {
        &self.doubletons
    }

    pub fn sample_d0(&self) -> &[f64] {
        &self.sample_d0
    }

    pub fn estimate_d0(&self) -> &[f64] {
        &self.estimate_d0
    }

    pub fn sample_d1(&self) -> &[f64] {
        &self.sample_d1
    }

    pub fn estimate_d1(&self) -> &[f64] {
        &self.estimate_d1
    }

    pub fn sample_d2(&self) -> &[f64] {
        &self.sample_d2
    }

    pub fn estimate_d2(&self) -> &[f64] {
        &self.estimate_d2
    }

    pub fn shannon_entropy(&self) -> &[f64] {
        &self.shannon_entropy
    }

    pub fn completeness(&self) -> &[f64] {
        &self.completeness
    }

    pub fn coverage(&self) -> &[f64] {
        &self.coverage
    }

    pub fn sampling_effort(&self) -> &[EffortHistory] {
        &self.sampling_effort
    }

    /// History of `metric`, widened to `f64`. Empty when its group is disabled.
    pub fn series(&self, metric: Metric) -> Vec<f64> {
        let widen = |v: &[u64]| -> Vec<f64> { v.iter().map(|&x| x as f64).collect() };
        match metric {
            Metric::NoObservations => widen(&self.no_observations),
            Metric::SumSpeciesCounts => widen(&self.sum_species_counts),
            Metric::Singletons => widen(&self.singletons),
            Metric::Doubletons => widen(&self.doubletons),
            Metric::SampleD0 => self.sample_d0.clone(),
            Metric::EstimateD0 => self.estimate_d0.clone(),
            Metric::SampleD1 => self.sample_d1.clone(),
            Metric::EstimateD1 => self.estimate_d1.clone(),
            Metric::SampleD2 => self.sample_d2.clone(),
            Metric::EstimateD2 => self.estimate_d2.clone(),
            Metric::ShannonEntropy => self.shannon_entropy.clone(),
            Metric::Completeness => self.completeness.clone(),
            Metric::Coverage => self.coverage.clone(),
        }
    }

    /// Rebuilds the most recent checkpoint of this profile.
    pub fn latest(&self) -> Option<ModelSnapshot> {
        let i = self.len().checked_sub(1)?;
        Some(ModelSnapshot {
            no_observations: self.no_observations[i],
            sum_species_counts: self.sum_species_counts[i],
            singletons: self.singletons[i],
            doubletons: self.doubletons[i],
            sample_d0: self.sample_d0.get(i).copied(),
            estimate_d0: self.estimate_d0.get(i).copied(),
            sample_d1: self.sample_d1.get(i).copied(),
            estimate_d1: self.estimate_d1.get(i).copied(),
            sample_d2: self.sample_d2.get(i).copied(),
            estimate_d2: self.estimate_d2.get(i).copied(),
            shannon_entropy: self.shannon_entropy.get(i).copied(),
            completeness: self.completeness.get(i).copied(),
            coverage: self.coverage.get(i).copied(),
            sampling_effort: self
                .sampling_effort
                .iter()
                .filter_map(|h| {
                    Some(SamplingEffort {
                        target: h.target,
                        additional: *h.values.get(i)?,
                    })
                })
                .collect(),
        })
    }
}

impl Display for Profile {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let rows: [(&str, Metric, String); 13] = [
            ("No Observations:", Metric::NoObservations, format!("{:?}", self.no_observations)),
            (
                "Total Species Count:",
                Metric::SumSpeciesCounts,
                format!("{:?}", self.sum_species_counts),
            ),
            ("Singletons:", Metric::Singletons, format!("{:?}", self.singletons)),
            ("Doubletons:", Metric::Doubletons, format!("{:?}", self.doubletons)),
            ("D0 - sample:", Metric::SampleD0, format!("{:?}", self.sample_d0)),
            ("D0 - estimate:", Metric::EstimateD0, format!("{:?}", self.estimate_d0)),
            ("D1 - sample:", Metric::SampleD1, format!("{:?}", self.sample_d1)),
            ("D1 - estimate:", Metric::EstimateD1, format!("{:?}", self.estimate_d1)),
            ("D2 - sample:", Metric::SampleD2, format!("{:?}", self.sample_d2)),
            ("D2 - estimate:", Metric::EstimateD2, format!("{:?}", self.estimate_d2)),
            ("Shannon Entropy:", Metric::ShannonEntropy, format!("{:?}", self.shannon_entropy)),
            ("C0:", Metric::Completeness, format!("{:?}", self.completeness)),
            ("C1:", Metric::Coverage, format!("{:?}", self.coverage)),
        ];
        for (label, metric, values) in rows {
            if self.groups.enables(metric) {
                writeln!(f, "     {label:<25} {values}")?;
            }
        }
        for h in &self.sampling_effort {
            let label = format!("l_{}:", h.target);
            writeln!(f, "     {label:<25} {:?}", h.values)?;
        }
        Ok(())
    }
}

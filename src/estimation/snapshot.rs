use crate::core::ReferenceSample;
use crate::estimation::metrics::{
    HillOrder, completeness, coverage, hill_number_asymptotic, hill_number_sample,
    sampling_effort, shannon_entropy,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::collections::btree_set::Iter;
use std::fmt::{Display, Formatter, Result};
use strum::IntoEnumIterator;
use strum_macros::{Display as StrumDisplay, EnumIter, EnumString, IntoStaticStr};

/// Scalar metrics tracked for each counting model.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    StrumDisplay,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Metric {
    NoObservations,
    SumSpeciesCounts,
    Singletons,
    Doubletons,
    SampleD0,
    EstimateD0,
    SampleD1,
    EstimateD1,
    SampleD2,
    EstimateD2,
    ShannonEntropy,
    Completeness,
    Coverage,
}

impl Metric {
    /// Group that switches this metric on or off; `None` for the sample
    /// counts, which are always recorded.
    pub fn group(self) -> Option<MetricGroup> {
        match self {
            Metric::NoObservations
            | Metric::SumSpeciesCounts
            | Metric::Singletons
            | Metric::Doubletons => None,
            Metric::SampleD0 | Metric::EstimateD0 => Some(MetricGroup::Richness),
            Metric::SampleD1 | Metric::EstimateD1 | Metric::ShannonEntropy => {
                Some(MetricGroup::Entropy)
            }
            Metric::SampleD2 | Metric::EstimateD2 => Some(MetricGroup::Simpson),
            Metric::Completeness => Some(MetricGroup::Completeness),
            Metric::Coverage => Some(MetricGroup::Coverage),
        }
    }
}

/// Optional families of metrics an estimator can be asked to profile.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    JsonSchema,
    StrumDisplay,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MetricGroup {
    /// D0: observed and Chao richness.
    Richness,
    /// D1: exponential of Shannon entropy, sample and asymptotic, and the
    /// entropy itself.
    Entropy,
    /// D2: inverse Simpson concentration, sample and asymptotic.
    Simpson,
    /// C0: completeness.
    Completeness,
    /// C1: sample coverage.
    Coverage,
    /// Additional sampling effort per completeness target.
    SamplingEffort,
}

/// Set of enabled metric groups. Defaults to every group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct MetricGroups(BTreeSet<MetricGroup>);

impl MetricGroups {
    pub fn all() -> Self {
        MetricGroup::iter().collect()
    }

    /// Only the sample counts are recorded.
    pub fn none() -> Self {
        Self(BTreeSet::new())
    }

    pub fn contains(&self, group: MetricGroup) -> bool {
        self.0.contains(&group)
    }

    pub fn enables(&self, metric: Metric) -> bool {
        metric.group().is_none_or(|g| self.contains(g))
    }

    pub fn iter(&self) -> Iter<'_, MetricGroup> {
        self.0.iter()
    }
}

impl Default for MetricGroups {
    fn default() -> Self {
        Self::all()
    }
}

impl FromIterator<MetricGroup> for MetricGroups {
    fn from_iter<I: IntoIterator<Item = MetricGroup>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Additional effort required to reach one completeness target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingEffort {
    pub target: f64,
    pub additional: f64,
}

/// All metrics of one counting model at one point of the stream.
///
/// Metrics of disabled groups are `None`; `sampling_effort` is empty when
/// that group is disabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSnapshot {
    pub no_observations: u64,
    pub sum_species_counts: u64,
    pub singletons: u64,
    pub doubletons: u64,
    pub sample_d0: Option<f64>,
    pub estimate_d0: Option<f64>,
    pub sample_d1: Option<f64>,
    pub estimate_d1: Option<f64>,
    pub sample_d2: Option<f64>,
    pub estimate_d2: Option<f64>,
    pub shannon_entropy: Option<f64>,
    pub completeness: Option<f64>,
    pub coverage: Option<f64>,
    pub sampling_effort: Vec<SamplingEffort>,
}

impl ModelSnapshot {
    pub fn compute(
        sample: &ReferenceSample,
        effort_targets: &[f64],
        groups: &MetricGroups,
    ) -> Self {
        let richness = groups.contains(MetricGroup::Richness);
        let entropy = groups.contains(MetricGroup::Entropy);
        let simpson = groups.contains(MetricGroup::Simpson);
        let effort = if groups.contains(MetricGroup::SamplingEffort) {
            effort_targets
                .iter()
                .map(|&target| SamplingEffort {
                    target,
                    additional: sampling_effort(sample, target),
                })
                .collect()
        } else {
            vec![]
        };

        Self {
            no_observations: sample.sample_size(),
            sum_species_counts: sample.species_count_sum(),
            singletons: sample.singletons(),
            doubletons: sample.doubletons(),
            sample_d0: richness.then(|| hill_number_sample(HillOrder::Zero, sample)),
            estimate_d0: richness.then(|| hill_number_asymptotic(HillOrder::Zero, sample)),
            sample_d1: entropy.then(|| hill_number_sample(HillOrder::One, sample)),
            estimate_d1: entropy.then(|| hill_number_asymptotic(HillOrder::One, sample)),
            sample_d2: simpson.then(|| hill_number_sample(HillOrder::Two, sample)),
            estimate_d2: simpson.then(|| hill_number_asymptotic(HillOrder::Two, sample)),
            shannon_entropy: entropy.then(|| shannon_entropy(sample)),
            completeness: groups
                .contains(MetricGroup::Completeness)
                .then(|| completeness(sample)),
            coverage: groups
                .contains(MetricGroup::Coverage)
                .then(|| coverage(sample)),
            sampling_effort: effort,
        }
    }

    /// Value of `metric`, `None` when its group is disabled.
    pub fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::NoObservations => Some(self.no_observations as f64),
            Metric::SumSpeciesCounts => Some(self.sum_species_counts as f64),
            Metric::Singletons => Some(self.singletons as f64),
            Metric::Doubletons => Some(self.doubletons as f64),
            Metric::SampleD0 => self.sample_d0,
            Metric::EstimateD0 => self.estimate_d0,
            Metric::SampleD1 => self.sample_d1,
            Metric::EstimateD1 => self.estimate_d1,
            Metric::SampleD2 => self.sample_d2,
            Metric::EstimateD2 => self.estimate_d2,
            Metric::ShannonEntropy => self.shannon_entropy,
            Metric::Completeness => self.completeness,
            Metric::Coverage => self.coverage,
        }
    }
}

impl Display for ModelSnapshot {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(
            f,
            "N={} f1={} f2={}",
            self.no_observations, self.singletons, self.doubletons
        )?;
        if let (Some(obs), Some(est)) = (self.sample_d0, self.estimate_d0) {
            write!(f, " S_obs={obs} S_est={est:.3}")?;
        }
        if let Some(c1) = self.coverage {
            write!(f, " C1={c1:.4}")?;
        }
        Ok(())
    }
}

/// Metrics of both counting models after `observations` samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub observations: u64,
    pub degree_of_aggregation: f64,
    pub abundance: ModelSnapshot,
    pub incidence: ModelSnapshot,
}

impl Display for Checkpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(
            f,
            "seen={}, abundance: {}, incidence: {}",
            self.observations, self.abundance, self.incidence
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Model, Species, SpeciesCounts};

    fn incidence_sample() -> ReferenceSample {
        let mut r = ReferenceSample::new(Model::Incidence);
        for unit in [["a", "b"], ["a", "c"], ["d", "e"]] {
            let s: SpeciesCounts = unit.iter().map(|x| Species::from_activities(&[*x])).collect();
            r.record(&s);
        }
        r
    }

    #[test]
    fn metric_names_are_snake_case() {
        assert_eq!(Metric::EstimateD0.to_string(), "estimate_d0");
        assert_eq!(Metric::NoObservations.to_string(), "no_observations");
        let m: Metric = "coverage".parse().unwrap();
        assert_eq!(m, Metric::Coverage);
        let g: MetricGroup = "sampling_effort".parse().unwrap();
        assert_eq!(g, MetricGroup::SamplingEffort);
    }

    #[test]
    fn every_optional_metric_belongs_to_a_group() {
        let all = MetricGroups::all();
        let none = MetricGroups::none();
        for m in Metric::iter() {
            assert!(all.enables(m), "{m}");
            assert_eq!(none.enables(m), m.group().is_none(), "{m}");
        }
        assert_eq!(MetricGroups::default(), all);
    }

    #[test]
    fn empty_snapshot_is_all_zero() {
        let s = ModelSnapshot::compute(
            &ReferenceSample::new(Model::Abundance),
            &[0.9],
            &MetricGroups::all(),
        );
        for m in Metric::iter() {
            assert_eq!(s.value(m), Some(0.0), "{m}");
        }
        assert_eq!(s.sampling_effort, vec![SamplingEffort { target: 0.9, additional: 0.0 }]);
    }

    #[test]
    fn snapshot_values_are_finite() {
        let snap = ModelSnapshot::compute(&incidence_sample(), &[0.9, 0.99], &MetricGroups::all());
        for m in Metric::iter() {
            assert!(snap.value(m).is_some_and(f64::is_finite), "{m}");
        }
        assert_eq!(snap.no_observations, 3);
        assert_eq!(snap.sum_species_counts, 6);
        assert_eq!(snap.singletons, 4);
        assert_eq!(snap.doubletons, 1);
    }

    #[test]
    fn disabled_groups_are_not_computed() {
        let groups: MetricGroups = [MetricGroup::Richness, MetricGroup::Coverage]
            .into_iter()
            .collect();
        let snap = ModelSnapshot::compute(&incidence_sample(), &[0.9], &groups);
        for m in Metric::iter() {
            assert_eq!(snap.value(m).is_some(), groups.enables(m), "{m}");
        }
        assert!(snap.sampling_effort.is_empty());
        assert_eq!(snap.sample_d0, Some(5.0));
    }

    #[test]
    fn metric_groups_serialize_as_a_list() {
        let groups: MetricGroups = serde_json::from_str(r#"["coverage", "richness"]"#).unwrap();
        assert!(groups.contains(MetricGroup::Coverage));
        assert!(!groups.contains(MetricGroup::Entropy));
        let v = serde_json::to_value(&groups).unwrap();
        assert_eq!(v, serde_json::json!(["richness", "coverage"]));
    }

    #[test]
    fn checkpoint_serializes_with_snake_case_fields() {
        let empty = ModelSnapshot::compute(
            &ReferenceSample::new(Model::Abundance),
            &[],
            &MetricGroups::all(),
        );
        let cp = Checkpoint {
            observations: 0,
            degree_of_aggregation: 0.0,
            abundance: empty.clone(),
            incidence: empty,
        };
        let v = serde_json::to_value(&cp).unwrap();
        assert_eq!(v["abundance"]["estimate_d0"].as_f64(), Some(0.0));
        assert_eq!(v["observations"].as_u64(), Some(0));
        assert!(cp.to_string().starts_with("seen=0"));
    }
}

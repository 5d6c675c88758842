use crate::core::species::{Species, SpeciesCounts};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// Counting model of a reference sample.
///
/// - `Abundance`: every occurrence of a species counts.
/// - `Incidence`: a species counts at most once per sampling unit.
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
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Model {
    Abundance,
    Incidence,
}

/// Sufficient statistic of everything observed so far under one model.
///
/// Counts are only ever incremented; a species never leaves the table.
/// `sample_size` is the number of individuals `n` for the abundance model
/// and the number of sampling units `T` for the incidence model.
#[derive(Debug, Clone)]
pub struct ReferenceSample {
    model: Model,
    counts: HashMap<Species, u64>,
    sample_size: u64,
    species_count_sum: u64,
}

impl ReferenceSample {
    pub fn new(model: Model) -> Self {
        Self {
            model,
            counts: HashMap::new(),
            sample_size: 0,
            species_count_sum: 0,
        }
    }

    pub fn model(&self) -> Model {
        self.model
    }

    /// Folds the species of one sampling unit into the table.
    pub fn record(&mut self, sample: &SpeciesCounts) {
        match self.model {
            Model::Abundance => {
                for (species, &multiplicity) in sample {
                    *self.counts.entry(species.clone()).or_insert(0) += multiplicity;
                    self.species_count_sum += multiplicity;
                }
                self.sample_size = self.species_count_sum;
            }
            Model::Incidence => {
                for (species, _) in sample {
                    *self.counts.entry(species.clone()).or_insert(0) += 1;
                }
                self.species_count_sum += sample.distinct() as u64;
                self.sample_size += 1;
            }
        }
    }

    #[inline]
    pub fn sample_size(&self) -> u64 {
        self.sample_size
    }

    /// Sum over all species counts (`n` for abundance, `U` for incidence).
    #[inline]
    pub fn species_count_sum(&self) -> u64 {
        self.species_count_sum
    }

    /// Number of distinct species observed (`S_obs`).
    #[inline]
    pub fn observed(&self) -> usize {
        self.counts.len()
    }

    pub fn count(&self, species: &Species) -> u64 {
        self.counts.get(species).copied().unwrap_or(0)
    }

    /// Number of species whose count is exactly `k`.
    pub fn frequency(&self, k: u64) -> u64 {
        self.counts.values().filter(|&&c| c == k).count() as u64
    }

    pub fn singletons(&self) -> u64 {
        self.frequency(1)
    }

    pub fn doubletons(&self) -> u64 {
        self.frequency(2)
    }

    pub fn counts(&self) -> impl Iterator<Item = u64> + '_ {
        self.counts.values().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Species, u64)> + '_ {
        self.counts.iter().map(|(s, &c)| (s, c))
    }

    /// Species sorted by descending count, ties broken by label.
    pub fn ranked(&self) -> Vec<(&Species, u64)> {
        let mut ranked: Vec<_> = self.iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

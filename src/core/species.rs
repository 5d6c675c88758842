use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::collections::hash_map::Iter;
use std::fmt::{Display, Formatter, Result};

/// Opaque species label: the ordered activities that make up one n-gram,
/// one trace variant or one single activity.
///
/// The estimator never looks inside a label; only equality, hashing and
/// ordering are used.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Species(Vec<String>);

impl Species {
    #[inline]
    pub fn new(activities: Vec<String>) -> Self {
        Self(activities)
    }

    pub fn from_activities<S: AsRef<str>>(activities: &[S]) -> Self {
        Self(activities.iter().map(|a| a.as_ref().to_string()).collect())
    }

    pub fn activities(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for Species {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "({})", self.0.join(", "))
    }
}

/// Multiset of the species retrieved from a single sample.
///
/// Multiplicity feeds the abundance table; presence alone feeds the
/// incidence table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpeciesCounts {
    counts: HashMap<Species, u64>,
}

impl SpeciesCounts {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn add(&mut self, species: Species) {
        *self.counts.entry(species).or_insert(0) += 1;
    }

    pub fn multiplicity(&self, species: &Species) -> u64 {
        self.counts.get(species).copied().unwrap_or(0)
    }

    /// Number of distinct species in the sample.
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    /// Number of species occurrences, multiplicity included.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, Species, u64> {
        self.counts.iter()
    }
}

impl FromIterator<Species> for SpeciesCounts {
    fn from_iter<I: IntoIterator<Item = Species>>(iter: I) -> Self {
        let mut counts = SpeciesCounts::new();
        for s in iter {
            counts.add(s);
        }
        counts
    }
}

impl<'a> IntoIterator for &'a SpeciesCounts {
    type Item = (&'a Species, &'a u64);
    type IntoIter = Iter<'a, Species, u64>;

    fn into_iter(self) -> Self::IntoIter {
        self.counts.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sp(a: &[&str]) -> Species {
        Species::from_activities(a)
    }

    #[test]
    fn counts_track_multiplicity_and_distinct() {
        let counts: SpeciesCounts = [sp(&["a"]), sp(&["b"]), sp(&["a"])].into_iter().collect();
        assert_eq!(counts.distinct(), 2);
        assert_eq!(counts.total(), 3);
        assert_eq!(counts.multiplicity(&sp(&["a"])), 2);
        assert_eq!(counts.multiplicity(&sp(&["c"])), 0);
    }

    #[test]
    fn empty_counts() {
        let counts = SpeciesCounts::new();
        assert!(counts.is_empty());
        assert_eq!(counts.total(), 0);
        assert_eq!(counts.iter().count(), 0);
    }

    #[test]
    fn display_joins_activities() {
        assert_eq!(sp(&["a", "b"]).to_string(), "(a, b)");
        assert_eq!(Species::new(vec![]).to_string(), "()");
    }

    #[test]
    fn species_order_is_lexicographic() {
        assert!(sp(&["a", "b"]) < sp(&["a", "c"]));
        assert!(sp(&["a"]) < sp(&["a", "a"]));
    }
}

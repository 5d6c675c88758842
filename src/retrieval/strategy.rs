use crate::config::BuildError;
use crate::core::{Species, SpeciesCounts};
use std::fmt::{Display, Formatter};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RetrievalError {
    #[error("malformed sample: activity at position {position} is empty")]
    EmptyActivity { position: usize },
}

/// Species definition applied to every sample.
///
/// A strategy maps one trace (an ordered sequence of activity labels) to the
/// multiset of species it contains. Strategies are pure: the same trace always
/// yields the same multiset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrievalStrategy {
    /// Every contiguous window of `n` activities is one species occurrence.
    NGram { n: usize },
    /// The whole trace is a single species.
    TraceVariant,
    /// Every activity is its own species.
    Activity,
}

impl RetrievalStrategy {
    pub fn n_gram(n: usize) -> Result<Self, BuildError> {
        if n == 0 {
            return Err(BuildError::InvalidParameter("n-gram width must be > 0".into()));
        }
        Ok(Self::NGram { n })
    }

    /// Re-checks the invariants enforced by the constructors, for values
    /// built directly from the enum variants.
    pub fn validate(&self) -> Result<(), BuildError> {
        match self {
            Self::NGram { n } => Self::n_gram(*n).map(|_| ()),
            Self::TraceVariant | Self::Activity => Ok(()),
        }
    }

    pub fn retrieve<S: AsRef<str>>(&self, trace: &[S]) -> Result<SpeciesCounts, RetrievalError> {
        check_activities(trace)?;

        let counts = match *self {
            Self::NGram { n } => n_grams(trace, n),
            Self::Activity => n_grams(trace, 1),
            Self::TraceVariant if trace.is_empty() => SpeciesCounts::new(),
            Self::TraceVariant => std::iter::once(Species::from_activities(trace)).collect(),
        };
        Ok(counts)
    }
}

impl Display for RetrievalStrategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NGram { n } => write!(f, "{n}-gram"),
            Self::TraceVariant => write!(f, "trace-variant"),
            Self::Activity => write!(f, "activity"),
        }
    }
}

#[inline]
fn n_grams<S: AsRef<str>>(trace: &[S], n: usize) -> SpeciesCounts {
    if n == 0 || trace.len() < n {
        return SpeciesCounts::new();
    }
    trace.windows(n).map(Species::from_activities).collect()
}

fn check_activities<S: AsRef<str>>(trace: &[S]) -> Result<(), RetrievalError> {
    match trace.iter().position(|a| a.as_ref().is_empty()) {
        Some(position) => Err(RetrievalError::EmptyActivity { position }),
        None => Ok(()),
    }
}

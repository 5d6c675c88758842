//! Expected richness at other sample sizes.
//!
//! Interpolation (rarefaction) below the observed sample size uses the
//! hypergeometric expectation; extrapolation above it follows the Chao1/Chao2
//! accumulation curve (Colwell et al. 2012).

use crate::core::ReferenceSample;
use crate::estimation::metrics::{observed_richness, undetected_richness};
use crate::utils::math::{finite_or, ln_choose};

/// Expected number of species in a sample of size `m` drawn from the same
/// population. `m` counts individuals for abundance data and sampling units
/// for incidence data.
pub fn expected_richness(sample: &ReferenceSample, m: u64) -> f64 {
    let n = sample.sample_size();
    if m == 0 || sample.is_empty() {
        return 0.0;
    }
    if m >= n {
        return extrapolate(sample, m - n);
    }

    let ln_total = ln_choose(n, m);
    sample
        .counts()
        .map(|x| {
            if n - x < m {
                1.0
            } else {
                1.0 - (ln_choose(n - x, m) - ln_total).exp()
            }
        })
        .sum()
}

/// Rarefaction/extrapolation curve evaluated at each of `sizes`.
pub fn richness_curve<I>(sample: &ReferenceSample, sizes: I) -> Vec<(u64, f64)>
where
    I: IntoIterator<Item = u64>,
{
    sizes
        .into_iter()
        .map(|m| (m, expected_richness(sample, m)))
        .collect()
}

fn extrapolate(sample: &ReferenceSample, extra: u64) -> f64 {
    let s_obs = observed_richness(sample);
    let f0 = undetected_richness(sample);
    if extra == 0 || f0 <= 0.0 {
        return s_obs;
    }

    let n = sample.sample_size() as f64;
    let f1 = sample.singletons() as f64;
    let discovery = f1 / (n * f0 + f1);
    let missed = ((-discovery).ln_1p() * extra as f64).exp();
    finite_or(s_obs + f0 * (1.0 - missed), s_obs)
}

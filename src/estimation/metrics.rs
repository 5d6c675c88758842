//! Point estimators computed from a single reference sample.
//!
//! Every function is linear in the number of distinct species observed and
//! returns a finite value for every input, including the empty sample.
//!
//! # References
//!
//! - Chao (1984), *Scandinavian Journal of Statistics* 11:265-270.
//! - Chao & Jost (2012), *Ecology* 93:2533-2547 (coverage).
//! - Chao, Wang & Jost (2013), *Methods in Ecology and Evolution* 4:1091-1100.
//! - Chao et al. (2009), *Ecology* 90:1125-1133 (additional sampling effort).
//! - Chao et al. (2014), *Ecological Monographs* 84:45-67 (incidence data).

use crate::core::{Model, ReferenceSample};
use crate::utils::math::{
    finite_or, harmonic, shifted_log_series, shifted_log_series_closed,
};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

/// Upper bound on terms of the tail series in the entropy estimator.
const MAX_SERIES_TERMS: usize = 100_000;

/// The tail series terms shrink like `(1-A)^j`; after `SERIES_DECAY / A` terms
/// they are below `e^-40` of the first one.
const SERIES_DECAY: f64 = 40.0;

/// Order `q` of a Hill number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum HillOrder {
    /// `q = 0`, species richness.
    #[strum(serialize = "D0")]
    Zero,
    /// `q = 1`, exponential of Shannon entropy.
    #[strum(serialize = "D1")]
    One,
    /// `q = 2`, inverse Simpson concentration.
    #[strum(serialize = "D2")]
    Two,
}

/// Observed richness `S_obs`.
pub fn observed_richness(sample: &ReferenceSample) -> f64 {
    sample.observed() as f64
}

/// Chao1 (abundance) / Chao2 (incidence) asymptotic richness.
///
/// - no singletons: `S_obs`
/// - no doubletons: `S_obs + f1 (f1 - 1) / 2`
/// - otherwise: `S_obs + f1 (f1 - 1) / (2 (f2 + 1))`
pub fn chao_richness(sample: &ReferenceSample) -> f64 {
    let s_obs = observed_richness(sample);
    let f1 = sample.singletons() as f64;
    let f2 = sample.doubletons() as f64;

    if f1 == 0.0 {
        s_obs
    } else if f2 == 0.0 {
        s_obs + f1 * (f1 - 1.0) / 2.0
    } else {
        s_obs + f1 * (f1 - 1.0) / (2.0 * (f2 + 1.0))
    }
}

/// Estimated number of undetected species, `f0 = S_est - S_obs`.
pub fn undetected_richness(sample: &ReferenceSample) -> f64 {
    chao_richness(sample) - observed_richness(sample)
}

/// Completeness `S_obs / S_est`, 0 without observations.
pub fn completeness(sample: &ReferenceSample) -> f64 {
    let estimate = chao_richness(sample);
    if estimate <= 0.0 {
        return 0.0;
    }
    (observed_richness(sample) / estimate).clamp(0.0, 1.0)
}

/// Sample coverage `1 - f1 / N`, where `N` is the sum of all species counts.
///
/// Returns 0 without observations.
pub fn coverage(sample: &ReferenceSample) -> f64 {
    let total = sample.species_count_sum();
    if total == 0 {
        return 0.0;
    }
    let c = 1.0 - sample.singletons() as f64 / total as f64;
    finite_or(c, 0.0).clamp(0.0, 1.0)
}

/// Shannon entropy `H = -sum p_i ln p_i` over relative counts.
pub fn shannon_entropy(sample: &ReferenceSample) -> f64 {
    let total = sample.species_count_sum() as f64;
    if total <= 0.0 {
        return 0.0;
    }

    let mut h = 0.0;
    for c in sample.counts() {
        if c > 0 {
            let p = c as f64 / total;
            h -= p * p.ln();
        }
    }
    h
}

/// Exponential of the sample Shannon entropy (`D1` of the sample).
pub fn entropy_exp(sample: &ReferenceSample) -> f64 {
    if sample.is_empty() {
        return 0.0;
    }
    shannon_entropy(sample).exp()
}

/// Inverse Simpson concentration `1 / sum p_i^2` (`D2` of the sample).
pub fn simpson_diversity(sample: &ReferenceSample) -> f64 {
    let total = sample.species_count_sum() as f64;
    if total <= 0.0 {
        return 0.0;
    }

    let concentration: f64 = sample
        .counts()
        .map(|c| {
            let p = c as f64 / total;
            p * p
        })
        .sum();
    finite_or(1.0 / concentration, 0.0)
}

/// Hill number of the observed sample.
pub fn hill_number_sample(order: HillOrder, sample: &ReferenceSample) -> f64 {
    match order {
        HillOrder::Zero => observed_richness(sample),
        HillOrder::One => entropy_exp(sample),
        HillOrder::Two => simpson_diversity(sample),
    }
}

/// Asymptotic estimate of a Hill number for the sampled population.
pub fn hill_number_asymptotic(order: HillOrder, sample: &ReferenceSample) -> f64 {
    match order {
        HillOrder::Zero => chao_richness(sample),
        HillOrder::One => {
            if sample.is_empty() {
                return 0.0;
            }
            finite_or(estimated_entropy(sample).exp(), entropy_exp(sample))
        }
        HillOrder::Two => estimated_simpson(sample),
    }
}

/// Asymptotic Shannon entropy.
///
/// Abundance data uses the Chao-Wang-Jost estimator directly. Incidence data
/// applies the same estimator to the incidence frequencies and rescales it
/// to relative incidences: `H = (T / U) H_T + ln(U / T)`.
fn estimated_entropy(sample: &ReferenceSample) -> f64 {
    let n = sample.sample_size();
    if n == 0 || sample.is_empty() {
        return 0.0;
    }
    let h = chao_wang_jost(sample, n);

    match sample.model() {
        Model::Abundance => h,
        Model::Incidence => {
            let t = n as f64;
            let u = sample.species_count_sum() as f64;
            if u <= 0.0 {
                return 0.0;
            }
            (t / u) * h + (u / t).ln()
        }
    }
}

/// `sum_{1<=X<=n-1} X/n (H_{n-1} - H_{X-1}) + f1/n sum_{j>=1} (1-A)^j / (n-1+j)`
///
/// The tail is the rearranged form of `f1/n (1-A)^{1-n} (-ln A - sum_{r<n} (1-A)^r/r)`,
/// which avoids the overflowing power when `n A` is large. When `A` is so
/// small that the series would not converge within `MAX_SERIES_TERMS`, the
/// closed form is used instead; there `(1-A)^{1-n}` stays close to `e^{n A}`.
fn chao_wang_jost(sample: &ReferenceSample, n: u64) -> f64 {
    let nf = n as f64;
    let h_n1 = harmonic(n - 1);

    let observed_part: f64 = sample
        .counts()
        .filter(|&x| x >= 1 && x < n)
        .map(|x| x as f64 / nf * (h_n1 - harmonic(x - 1)))
        .sum();

    let f1 = sample.singletons() as f64;
    let f2 = sample.doubletons() as f64;
    let a = if f2 > 0.0 {
        2.0 * f2 / ((nf - 1.0) * f1 + 2.0 * f2)
    } else if f1 > 0.0 {
        2.0 / ((nf - 1.0) * (f1 - 1.0) + 2.0)
    } else {
        1.0
    };

    let unseen_part = if a >= 1.0 {
        0.0
    } else if a * MAX_SERIES_TERMS as f64 >= SERIES_DECAY {
        f1 / nf * shifted_log_series(1.0 - a, nf - 1.0, MAX_SERIES_TERMS)
    } else {
        f1 / nf * shifted_log_series_closed(a, n)
    };

    observed_part + unseen_part
}

/// Asymptotic inverse Simpson concentration.
///
/// Falls back to the sample value when no species was seen at least twice,
/// where the estimator is unbounded.
fn estimated_simpson(sample: &ReferenceSample) -> f64 {
    let pairs: f64 = sample
        .counts()
        .map(|x| x as f64 * (x as f64 - 1.0))
        .sum();
    let n = sample.sample_size() as f64;
    if pairs <= 0.0 || n < 2.0 {
        return simpson_diversity(sample);
    }

    let estimate = match sample.model() {
        Model::Abundance => n * (n - 1.0) / pairs,
        Model::Incidence => {
            let u = sample.species_count_sum() as f64;
            (1.0 - 1.0 / n) * u * u / pairs
        }
    };
    finite_or(estimate, simpson_diversity(sample))
}

/// Additional sampling effort needed to reach completeness `target`.
///
/// Solves `S_obs + f0 (1 - (1 - f1 / (N f0 + f1))^m) = target * S_est` for `m`,
/// in individuals (abundance) or sampling units (incidence). Returns 0 when
/// the target is already reached or nothing was observed.
pub fn sampling_effort(sample: &ReferenceSample, target: f64) -> f64 {
    if sample.is_empty() || completeness(sample) >= target {
        return 0.0;
    }

    let s_est = chao_richness(sample);
    let f0 = undetected_richness(sample);
    let f1 = sample.singletons() as f64;
    let n = sample.sample_size() as f64;
    if f0 <= 0.0 || f1 <= 0.0 || n <= 0.0 {
        return 0.0;
    }

    let remaining = (1.0 - target) * s_est / f0;
    let discovery = f1 / (n * f0 + f1);
    let m = remaining.ln() / (-discovery).ln_1p();
    finite_or(m, 0.0).max(0.0)
}

/// Degree of spatial aggregation `1 - U / n`.
///
/// 0 means every species occurrence happened in a different sampling unit.
pub fn degree_of_aggregation(abundance: &ReferenceSample, incidence: &ReferenceSample) -> f64 {
    let n = abundance.species_count_sum();
    if n == 0 {
        return 0.0;
    }
    let u = incidence.species_count_sum() as f64;
    finite_or(1.0 - u / n as f64, 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Species, SpeciesCounts};
    use strum::IntoEnumIterator;

    /// Builds a reference sample from per-species counts, one unit per count.
    fn abundance(counts: &[u64]) -> ReferenceSample {
        let mut r = ReferenceSample::new(Model::Abundance);
        let mut sample = SpeciesCounts::new();
        for (i, &c) in counts.iter().enumerate() {
            for _ in 0..c {
                sample.add(Species::new(vec![format!("s{i}")]));
            }
        }
        r.record(&sample);
        r
    }

    fn incidence(units: &[&[&str]]) -> ReferenceSample {
        let mut r = ReferenceSample::new(Model::Incidence);
        for unit in units {
            let sample: SpeciesCounts = unit
                .iter()
                .map(|a| Species::from_activities(&[*a]))
                .collect();
            r.record(&sample);
        }
        r
    }

    #[test]
    fn chao_without_singletons_is_observed() {
        let r = abundance(&[10, 20, 30, 2]);
        assert_eq!(r.singletons(), 0);
        assert_eq!(chao_richness(&r), observed_richness(&r));
    }

    #[test]
    fn chao_without_doubletons_uses_bias_corrected_form() {
        let r = abundance(&[1, 1, 1, 5]);
        assert_eq!(r.doubletons(), 0);
        assert_eq!(chao_richness(&r), 4.0 + 3.0 * 2.0 / 2.0);
    }

    #[test]
    fn chao_classic_branch() {
        let r = abundance(&[1, 1, 1, 2, 7]);
        let expected = 5.0 + 3.0 * 2.0 / (2.0 * 2.0);
        assert_eq!(chao_richness(&r), expected);
    }

    #[test]
    fn single_singleton_adds_nothing() {
        let r = abundance(&[1, 3]);
        assert_eq!(chao_richness(&r), 2.0);
        assert_eq!(completeness(&r), 1.0);
    }

    #[test]
    fn empty_sample_is_degenerate_zero() {
        for model in [Model::Abundance, Model::Incidence] {
            let r = ReferenceSample::new(model);
            assert_eq!(chao_richness(&r), 0.0);
            assert_eq!(coverage(&r), 0.0);
            assert_eq!(completeness(&r), 0.0);
            assert_eq!(shannon_entropy(&r), 0.0);
            assert_eq!(sampling_effort(&r, 0.9), 0.0);
            for q in HillOrder::iter() {
                assert_eq!(hill_number_sample(q, &r), 0.0, "{q}");
                assert_eq!(hill_number_asymptotic(q, &r), 0.0, "{q}");
            }
        }
    }

    #[test]
    fn coverage_stays_in_unit_interval() {
        for counts in [
            vec![1u64],
            vec![1, 1, 1],
            vec![1, 2, 3],
            vec![5, 5, 5],
            vec![1, 1, 1, 1, 1, 1, 1, 20],
        ] {
            let c = coverage(&abundance(&counts));
            assert!((0.0..=1.0).contains(&c), "{counts:?} -> {c}");
        }
        assert_eq!(coverage(&abundance(&[1, 1])), 0.0);
        assert!((coverage(&abundance(&[1, 3])) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn incidence_coverage_uses_total_incidences() {
        let r = incidence(&[&["A", "B"], &["A", "C"]]);
        // Q1 = 2 (B, C), U = 4
        assert!((coverage(&r) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn shannon_and_simpson_uniform() {
        let r = abundance(&[25, 25, 25, 25]);
        assert!((shannon_entropy(&r) - 4f64.ln()).abs() < 1e-12);
        assert!((entropy_exp(&r) - 4.0).abs() < 1e-12);
        assert!((simpson_diversity(&r) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn single_species_has_zero_entropy() {
        let r = abundance(&[100]);
        assert_eq!(shannon_entropy(&r), 0.0);
        assert!((entropy_exp(&r) - 1.0).abs() < 1e-12);
        assert!((simpson_diversity(&r) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn entropy_estimator_without_singletons() {
        let r = abundance(&[2, 2, 2]);
        let expected = harmonic(5) - 1.0;
        assert!((estimated_entropy(&r) - expected).abs() < 1e-12);
    }

    #[test]
    fn entropy_estimator_all_distinct_variants() {
        // 500 units, each with its own species: f1 = 500, f2 = 0, A ~ 8e-6.
        let mut r = ReferenceSample::new(Model::Incidence);
        for i in 0..500 {
            let unit: SpeciesCounts =
                std::iter::once(Species::new(vec![format!("v{i}")])).collect();
            r.record(&unit);
        }
        let n = 500u64;
        let a = 2.0 / (499.0 * 499.0 + 2.0);
        let expected_h = harmonic(n - 1) + shifted_log_series_closed(a, n);
        let d1 = hill_number_asymptotic(HillOrder::One, &r);

        assert!((d1.ln() - expected_h).abs() < 1e-9, "{d1}");
        assert!((d1 - 127_508.38).abs() / 127_508.38 < 1e-3, "{d1}");
    }

    #[test]
    fn entropy_tail_is_continuous_across_evaluation_forms() {
        // A on both sides of SERIES_DECAY / MAX_SERIES_TERMS.
        for f1 in [50u64, 100] {
            let r = abundance(&vec![1; f1 as usize]);
            let n = f1;
            let a = 2.0 / ((n as f64 - 1.0) * (f1 as f64 - 1.0) + 2.0);
            let via_series = shifted_log_series(1.0 - a, n as f64 - 1.0, 10_000_000);
            let got = estimated_entropy(&r) - harmonic(n - 1);
            assert!((got - via_series).abs() < 1e-6 * via_series, "f1={f1}");
        }
    }

    #[test]
    fn asymptotic_estimates_exceed_sample_values_for_skewed_data() {
        let r = abundance(&[1, 1, 2]);
        for q in HillOrder::iter() {
            let sample = hill_number_sample(q, &r);
            let estimate = hill_number_asymptotic(q, &r);
            assert!(estimate.is_finite());
            assert!(estimate >= sample - 1e-12, "{q}: {estimate} < {sample}");
        }
    }

    #[test]
    fn simpson_estimate_falls_back_without_repeats() {
        let r = abundance(&[1, 1, 1]);
        assert_eq!(hill_number_asymptotic(HillOrder::Two, &r), simpson_diversity(&r));
    }

    #[test]
    fn simpson_estimate_abundance() {
        let r = abundance(&[2, 2]);
        // n = 4, sum X(X-1) = 4 -> 12 / 4
        assert!((hill_number_asymptotic(HillOrder::Two, &r) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn simpson_estimate_incidence() {
        let r = incidence(&[&["A", "B"], &["A", "B"]]);
        // T = 2, U = 4, sum Y(Y-1) = 4 -> 0.5 * 16 / 4
        assert!((hill_number_asymptotic(HillOrder::Two, &r) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn incidence_entropy_single_unit_equals_richness() {
        let r = incidence(&[&["A", "B", "C"]]);
        let d1 = hill_number_asymptotic(HillOrder::One, &r);
        assert!((d1 - 3.0).abs() < 1e-9, "{d1}");
    }

    #[test]
    fn sampling_effort_zero_when_target_reached() {
        let r = abundance(&[3, 4, 5]);
        assert_eq!(completeness(&r), 1.0);
        assert_eq!(sampling_effort(&r, 0.99), 0.0);
    }

    #[test]
    fn sampling_effort_grows_with_target() {
        let r = abundance(&[1, 1, 1, 1, 2, 3, 8]);
        let c = completeness(&r);
        assert!(c < 0.9);
        let l90 = sampling_effort(&r, 0.9);
        let l95 = sampling_effort(&r, 0.95);
        let l99 = sampling_effort(&r, 0.99);
        assert!(l90 > 0.0);
        assert!(l90 < l95 && l95 < l99, "{l90} {l95} {l99}");
    }

    #[test]
    fn aggregation_is_zero_when_each_occurrence_is_its_own_unit() {
        let trace: &[&[&str]] = &[&["A"], &["B"], &["A"]];
        let inc = incidence(trace);
        let mut abu = ReferenceSample::new(Model::Abundance);
        for unit in trace {
            let s: SpeciesCounts = unit.iter().map(|a| Species::from_activities(&[*a])).collect();
            abu.record(&s);
        }
        assert_eq!(degree_of_aggregation(&abu, &inc), 0.0);
        assert_eq!(
            degree_of_aggregation(
                &ReferenceSample::new(Model::Abundance),
                &ReferenceSample::new(Model::Incidence)
            ),
            0.0
        );
    }

    #[test]
    fn aggregation_reflects_repeats_within_units() {
        let unit = ["A", "A", "A", "A"];
        let s: SpeciesCounts = unit.iter().map(|a| Species::from_activities(&[*a])).collect();
        let mut abu = ReferenceSample::new(Model::Abundance);
        let mut inc = ReferenceSample::new(Model::Incidence);
        abu.record(&s);
        inc.record(&s);
        assert!((degree_of_aggregation(&abu, &inc) - 0.75).abs() < 1e-12);
    }
}

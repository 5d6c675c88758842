/// Euler–Mascheroni constant.
const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Below this index harmonic numbers are summed exactly.
const HARMONIC_EXACT_LIMIT: u64 = 64;

/// `H_m = sum_{k=1}^{m} 1/k`, with `H_0 = 0`.
///
/// Large `m` uses the asymptotic expansion, so the cost is bounded
/// independently of `m`.
pub fn harmonic(m: u64) -> f64 {
    if m <= HARMONIC_EXACT_LIMIT {
        return (1..=m).map(|k| 1.0 / k as f64).sum();
    }
    let x = m as f64;
    let x2 = x * x;
    x.ln() + EULER_GAMMA + 1.0 / (2.0 * x) - 1.0 / (12.0 * x2) + 1.0 / (120.0 * x2 * x2)
}

/// `ln C(n, k)` via `ln Γ`. Returns `-inf` when `k > n`.
pub fn ln_choose(n: u64, k: u64) -> f64 {
    if k > n {
        return f64::NEG_INFINITY;
    }
    if k == 0 || k == n {
        return 0.0;
    }
    libm::lgamma(n as f64 + 1.0) - libm::lgamma(k as f64 + 1.0) - libm::lgamma((n - k) as f64 + 1.0)
}

/// `sum_{j>=1} x^j / (m + j)` for `x` in `[0, 1)`.
///
/// Terms are accumulated until they stop contributing; `max_terms` bounds
/// the loop for `x` close to one.
pub fn shifted_log_series(x: f64, m: f64, max_terms: usize) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    let mut sum = 0.0;
    let mut power = 1.0;
    for j in 1..=max_terms {
        power *= x;
        let term = power / (m + j as f64);
        sum += term;
        if term <= sum * f64::EPSILON {
            break;
        }
    }
    sum
}

/// Closed form of `sum_{j>=1} (1-a)^j / (n - 1 + j)` for `a` in `(0, 1)`:
/// `(1-a)^{1-n} (-ln a - sum_{r=1}^{n-1} (1-a)^r / r)`.
///
/// Costs `O(n)` where the series costs `O(1/a)` terms, so it is the form to
/// use when `a` is tiny.
pub fn shifted_log_series_closed(a: f64, n: u64) -> f64 {
    if a <= 0.0 || a >= 1.0 || n == 0 {
        return 0.0;
    }
    let x = 1.0 - a;
    let mut partial = 0.0;
    let mut power = 1.0;
    for r in 1..n {
        power *= x;
        partial += power / r as f64;
    }
    let remainder = (-a.ln() - partial).max(0.0);
    remainder * (-((n - 1) as f64) * (-a).ln_1p()).exp()
}

/// Replaces NaN and infinities with `fallback`.
#[inline]
pub fn finite_or(v: f64, fallback: f64) -> f64 {
    if v.is_finite() { v } else { fallback }
}

use crate::core::Species;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const ACTIVITIES: [&str; 7] = ["a", "b", "c", "d", "e", "f", "g"];

pub fn sp(activities: &[&str]) -> Species {
    Species::from_activities(activities)
}

/// Deterministic traces of length 1..=4 cycling through a small alphabet.
pub fn cyclic_traces(n: usize) -> Vec<Vec<String>> {
    (0..n)
        .map(|i| {
            let len = 1 + i % 4;
            let stride = 1 + i % 3;
            (0..len)
                .map(|k| ACTIVITIES[(i * 3 + k * stride) % ACTIVITIES.len()].to_string())
                .collect()
        })
        .collect()
}

/// Seeded random traces with a skewed activity distribution, so that rare
/// activities show up as singletons.
pub fn random_traces(n: usize, seed: u64) -> Vec<Vec<String>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let len = rng.random_range(1..=6);
            (0..len)
                .map(|_| {
                    let r: f64 = rng.random();
                    let idx = ((r * r * r) * 40.0) as usize;
                    format!("act{idx}")
                })
                .collect()
        })
        .collect()
}

//! Seeded probe query vectors.

use crate::rng::SeededRng;

/// Build a unit-length query vector of `dimension` components from `seed`.
///
/// Components are drawn from `[-1, 1)` and then L2-normalized.
pub fn query_vector(seed: i64, dimension: usize) -> Vec<f64> {
    let mut rng = SeededRng::new(seed);
    let mut vector: Vec<f64> = (0..dimension).map(|_| rng.next_signed()).collect();
    l2_normalize(&mut vector);
    vector
}

/// Euclidean norm.
pub fn l2_norm(vector: &[f64]) -> f64 {
    vector.iter().map(|v| v * v).sum::<f64>().sqrt()
}

/// Divide every component by the vector's norm. A zero vector is left as is.
pub fn l2_normalize(vector: &mut [f64]) {
    let norm = l2_norm(vector);
    if norm == 0.0 || !norm.is_finite() {
        return;
    }
    for value in vector.iter_mut() {
        *value /= norm;
    }
}

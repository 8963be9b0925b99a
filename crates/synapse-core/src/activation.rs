use crate::concept::ConceptActivation;
use crate::constants::{DENSE_SKEW, NEIGHBOR_BOOST, NOISE_FLOOR};
use crate::random::SeededRandom;

/// Unstructured baseline: `size` draws, each raised to `DENSE_SKEW`.
pub fn generate_dense(size: usize, seed: &str) -> Vec<f64> {
    let mut rng = SeededRandom::new(seed);
    (0..size).map(|_| rng.draw().powf(DENSE_SKEW)).collect()
}

/// Concept-driven vector: low-amplitude noise with a peak per concept.
///
/// Concepts are applied strictly in list order. Each one overwrites its own
/// slot with its intensity, then raises its neighbor (`index + 1`, or
/// `index - 1` at the upper edge) to at least `intensity * NEIGHBOR_BOOST`.
/// A later concept landing on an earlier concept's slot wins.
///
/// Concepts whose index is outside `[0, size)` are skipped.
pub fn generate_sparse(size: usize, seed: &str, concepts: &[ConceptActivation]) -> Vec<f64> {
    let mut rng = SeededRandom::new(seed);
    let mut activations: Vec<f64> = (0..size).map(|_| rng.draw() * NOISE_FLOOR).collect();

    for concept in concepts {
        let index = concept.index;
        if index >= size {
            continue;
        }
        activations[index] = concept.intensity;

        let neighbor = if index + 1 < size {
            Some(index + 1)
        } else {
            index.checked_sub(1)
        };
        if let Some(n) = neighbor {
            activations[n] = activations[n].max(concept.intensity * NEIGHBOR_BOOST);
        }
    }

    activations
}

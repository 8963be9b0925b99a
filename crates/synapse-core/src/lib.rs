//! Synapse Monitor simulation core.
//!
//! Produces illustrative "dense" (transformer-style) and "sparse"
//! (concept-driven) activation vectors from string seeds. Everything here is
//! deterministic: the same seed, size and concept list always produce the
//! same vectors, bit for bit.
//!
//! Zero I/O: pure functions with no opinions about transport or the LLM
//! collaborator that may supply scenario plans.

pub mod activation;
pub mod concept;
pub mod constants;
pub mod error;
pub mod indexer;
pub mod payload;
pub mod plan;
pub mod random;
pub mod samples;

pub use activation::{generate_dense, generate_sparse};
pub use concept::{
    ConceptActivation, ConceptDraft, RawConcept, lenient_concepts, normalize_indexed_concepts,
    sanitize_concepts,
};
pub use constants::{
    DEFAULT_HATCHLING_SIZE, DEFAULT_TRANSFORMER_SIZE, MAX_CONCEPTS, NEIGHBOR_BOOST, NOISE_FLOOR,
};
pub use error::{Result, SynapseError};
pub use indexer::{assign_indices, label_index};
pub use payload::{DenseTrace, NetworkSizes, SimulatedActivationPayload, SparseTrace};
pub use plan::{ScenarioPlan, build_context};
pub use random::{SeededRandom, fold_hash};
pub use samples::{SampleDefinition, SampleKey, SampleSummary, catalog};

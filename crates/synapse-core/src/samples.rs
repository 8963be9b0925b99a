//! Hand-authored scenarios with explicit concept indices.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::activation::{generate_dense, generate_sparse};
use crate::concept::ConceptActivation;
use crate::constants::{DEFAULT_HATCHLING_SIZE, DEFAULT_TRANSFORMER_SIZE};
use crate::payload::{DenseTrace, SimulatedActivationPayload, SparseTrace};

pub const SAMPLE_DISCLAIMER: &str = "Conceptual simulation referencing Kosowski et al. (2025) for inspiration; activations remain illustrative and non-empirical.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SampleKey {
    Sample1,
    Sample2,
    Sample3,
    Sample4,
}

impl SampleKey {
    /// Dashboard display order.
    pub const DISPLAY_ORDER: [SampleKey; 4] = [
        SampleKey::Sample4,
        SampleKey::Sample1,
        SampleKey::Sample2,
        SampleKey::Sample3,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SampleKey::Sample1 => "sample1",
            SampleKey::Sample2 => "sample2",
            SampleKey::Sample3 => "sample3",
            SampleKey::Sample4 => "sample4",
        }
    }

    /// Resolve a user-supplied key; anything unrecognized maps to `sample1`.
    pub fn resolve(key: Option<&str>) -> Self {
        key.and_then(|k| k.parse().ok()).unwrap_or(SampleKey::Sample1)
    }

    pub fn definition(self) -> &'static SampleDefinition {
        match self {
            SampleKey::Sample1 => &SAMPLE_1,
            SampleKey::Sample2 => &SAMPLE_2,
            SampleKey::Sample3 => &SAMPLE_3,
            SampleKey::Sample4 => &SAMPLE_4,
        }
    }
}

impl fmt::Display for SampleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SampleKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "sample1" => Ok(SampleKey::Sample1),
            "sample2" => Ok(SampleKey::Sample2),
            "sample3" => Ok(SampleKey::Sample3),
            "sample4" => Ok(SampleKey::Sample4),
            other => Err(format!("unknown sample '{other}'")),
        }
    }
}

#[derive(Debug)]
pub struct SampleConcept {
    pub index: usize,
    pub label: &'static str,
    pub description: &'static str,
    pub intensity: f64,
    pub rationale: Option<&'static str>,
}

impl SampleConcept {
    fn to_activation(&self) -> ConceptActivation {
        ConceptActivation {
            index: self.index,
            label: self.label.to_string(),
            description: self.description.to_string(),
            intensity: self.intensity,
            rationale: self.rationale.map(str::to_string),
        }
    }
}

#[derive(Debug)]
pub struct SampleDefinition {
    pub key: SampleKey,
    pub title: &'static str,
    pub text: &'static str,
    pub context: &'static str,
    pub transformer_size: usize,
    pub hatchling_size: usize,
    pub dense_seed: &'static str,
    pub sparse_seed: &'static str,
    pub language: Option<&'static str>,
    pub notes: Option<&'static str>,
    pub concepts: &'static [SampleConcept],
}

impl SampleDefinition {
    pub fn concepts(&self) -> Vec<ConceptActivation> {
        self.concepts.iter().map(SampleConcept::to_activation).collect()
    }

    /// Run both generators with this sample's seeds and fixed indices.
    pub fn simulate(&self) -> SimulatedActivationPayload {
        let concepts = self.concepts();
        let dense = generate_dense(self.transformer_size, self.dense_seed);
        let sparse = generate_sparse(self.hatchling_size, self.sparse_seed, &concepts);

        SimulatedActivationPayload {
            sample_id: self.key.to_string(),
            text: self.text.to_string(),
            context: self.context.to_string(),
            title: None,
            language: self.language.map(str::to_string),
            notes: self.notes.map(str::to_string),
            generated_by: None,
            disclaimer: SAMPLE_DISCLAIMER.to_string(),
            transformer: DenseTrace {
                size: self.transformer_size,
                activations: dense,
            },
            hatchling: SparseTrace {
                size: self.hatchling_size,
                activations: sparse,
                concepts,
            },
        }
    }
}

/// One entry of the sample picker.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SampleSummary {
    pub id: &'static str,
    pub title: &'static str,
    pub text: &'static str,
}

pub fn catalog() -> Vec<SampleSummary> {
    SampleKey::DISPLAY_ORDER
        .iter()
        .map(|key| {
            let def = key.definition();
            SampleSummary {
                id: key.as_str(),
                title: def.title,
                text: def.text,
            }
        })
        .collect()
}

static SAMPLE_1: SampleDefinition = SampleDefinition {
    key: SampleKey::Sample1,
    title: "Sample 1 • English",
    text: "The US Dollar has appreciated with respect to the British Pound.",
    context: "Currency appreciation statement (English).",
    transformer_size: DEFAULT_TRANSFORMER_SIZE,
    hatchling_size: DEFAULT_HATCHLING_SIZE,
    dense_seed: "usd-pound-english",
    sparse_seed: "currency-cross-lingual",
    language: Some("English"),
    notes: None,
    concepts: &[
        SampleConcept {
            index: 42,
            label: "Currency Synapse",
            description: "Hypothetical neuron that fires for currency concepts across languages.",
            intensity: 1.0,
            rationale: None,
        },
        SampleConcept {
            index: 128,
            label: "Country Synapse",
            description: "Signals the presence of country or nationality cues (e.g. British).",
            intensity: 0.72,
            rationale: None,
        },
    ],
};

static SAMPLE_2: SampleDefinition = SampleDefinition {
    key: SampleKey::Sample2,
    title: "Sample 2 • French",
    text: "Le dollar américain s'est apprécié par rapport à la livre sterling.",
    context: "Currency appreciation statement (French).",
    transformer_size: DEFAULT_TRANSFORMER_SIZE,
    hatchling_size: DEFAULT_HATCHLING_SIZE,
    dense_seed: "usd-pound-french",
    sparse_seed: "currency-cross-lingual",
    language: Some("French"),
    notes: None,
    concepts: &[
        SampleConcept {
            index: 42,
            label: "Currency Synapse",
            description: "Same hypothetical neuron as Sample 1, highlighting cross-language concept binding.",
            intensity: 1.0,
            rationale: None,
        },
        SampleConcept {
            index: 144,
            label: "Language Synapse",
            description: "Tracks discourse language shift without changing the underlying concept.",
            intensity: 0.58,
            rationale: None,
        },
    ],
};

static SAMPLE_3: SampleDefinition = SampleDefinition {
    key: SampleKey::Sample3,
    title: "Sample 3 • Rumor",
    text: "Belgium's prime minister confirmed the unfounded rumors...",
    context: "Rumor confirmation statement (English).",
    transformer_size: DEFAULT_TRANSFORMER_SIZE,
    hatchling_size: DEFAULT_HATCHLING_SIZE,
    dense_seed: "rumor-confirmation",
    sparse_seed: "rumor-signal",
    language: Some("English"),
    notes: None,
    concepts: &[
        SampleConcept {
            index: 72,
            label: "Rumor Synapse",
            description: "Flags speculative or rumor-labeled language elements.",
            intensity: 0.88,
            rationale: None,
        },
        SampleConcept {
            index: 188,
            label: "Authority Synapse",
            description: "Highlights authoritative confirmation cues (e.g. prime minister).",
            intensity: 0.63,
            rationale: None,
        },
    ],
};

static SAMPLE_4: SampleDefinition = SampleDefinition {
    key: SampleKey::Sample4,
    title: "Sample 4 • BDH Abstract",
    text: "BDH couples strong theoretical foundations and inherent interpretability without sacrificing Transformer-like performance.",
    context: "Abstract excerpt from 'The Dragon Hatchling: The Missing Link between the Transformer and Models of the Brain' (arXiv:2509.26507).",
    transformer_size: DEFAULT_TRANSFORMER_SIZE,
    hatchling_size: DEFAULT_HATCHLING_SIZE,
    dense_seed: "bdh-abstract",
    sparse_seed: "bdh-theory-link",
    language: Some("English"),
    notes: Some(
        "Highlights the paper's claim that BDH uses a scale-free, locally interacting neuron graph with excitatory/inhibitory circuits and Hebbian plasticity to mirror brain attention while matching Transformer scaling laws.",
    ),
    concepts: &[
        SampleConcept {
            index: 18,
            label: "Scale-Free Topology",
            description: "Captures the heavy-tailed, high-modularity neuron graph BDH relies on for distributed reasoning.",
            intensity: 0.92,
            rationale: Some("Linked to Section 5 of the paper discussing modularity and scale-free structure."),
        },
        SampleConcept {
            index: 57,
            label: "Excitatory/Inhibitory Loop",
            description: "Represents the paired circuits with integrate-and-fire thresholding that emulate biological attention.",
            intensity: 0.83,
            rationale: Some("Grounded in Section 2.5 that expresses BDH as brain-like oscillator circuits."),
        },
        SampleConcept {
            index: 142,
            label: "Hebbian Working Memory",
            description: "Illustrates synaptic plasticity over hundreds of tokens acting as BDH's reasoning memory.",
            intensity: 0.78,
            rationale: Some("Draws from the abstract's emphasis on potentiation-driven memory without external buffers."),
        },
    ],
};

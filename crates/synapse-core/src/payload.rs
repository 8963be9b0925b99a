use serde::{Deserialize, Serialize};

use crate::concept::ConceptActivation;
use crate::constants::{DEFAULT_HATCHLING_SIZE, DEFAULT_TRANSFORMER_SIZE};

/// Vector lengths for the two simulated networks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkSizes {
    pub transformer: usize,
    pub hatchling: usize,
}

impl Default for NetworkSizes {
    fn default() -> Self {
        Self {
            transformer: DEFAULT_TRANSFORMER_SIZE,
            hatchling: DEFAULT_HATCHLING_SIZE,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DenseTrace {
    pub size: usize,
    pub activations: Vec<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SparseTrace {
    pub size: usize,
    pub activations: Vec<f64>,
    pub concepts: Vec<ConceptActivation>,
}

/// Everything the dashboard needs to render one scenario.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulatedActivationPayload {
    pub sample_id: String,
    pub text: String,
    pub context: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_by: Option<String>,
    pub disclaimer: String,
    pub transformer: DenseTrace,
    pub hatchling: SparseTrace,
}

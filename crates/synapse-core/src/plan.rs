use serde::{Deserialize, Serialize};

use crate::activation::{generate_dense, generate_sparse};
use crate::concept::{
    RawConcept, lenient_concepts, lenient_string, lenient_string_or_default, sanitize_concepts,
};
use crate::error::Result;
use crate::indexer::assign_indices;
use crate::payload::{DenseTrace, NetworkSizes, SimulatedActivationPayload, SparseTrace};

pub const GENERATED_BY: &str = "openrouter";

pub const PLAN_DISCLAIMER: &str = "LLM-generated scenario based on user guidance. The Dragon Hatchling framing remains speculative fiction.";

/// Scenario plan as returned by the LLM in JSON mode.
///
/// Every field defaults, and `null` or wrong-typed values read as missing, so
/// a partially compliant model response still produces a payload.
/// Sanitization happens in [`ScenarioPlan::into_payload`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioPlan {
    #[serde(deserialize_with = "lenient_string_or_default")]
    pub title: String,
    #[serde(deserialize_with = "lenient_string_or_default")]
    pub primary_text: String,
    #[serde(deserialize_with = "lenient_string")]
    pub alternate_text: Option<String>,
    #[serde(deserialize_with = "lenient_string_or_default")]
    pub context: String,
    #[serde(deserialize_with = "lenient_concepts")]
    pub concepts: Vec<RawConcept>,
    #[serde(deserialize_with = "lenient_string_or_default")]
    pub transformer_seed: String,
    #[serde(deserialize_with = "lenient_string_or_default")]
    pub hatchling_seed: String,
    #[serde(deserialize_with = "lenient_string")]
    pub notes: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub language: Option<String>,
}

impl ScenarioPlan {
    /// Sanitize, index and generate. Fails only for a zero hatchling size.
    pub fn into_payload(
        self,
        sample_id: String,
        sizes: NetworkSizes,
    ) -> Result<SimulatedActivationPayload> {
        let drafts = sanitize_concepts(&self.concepts);
        let concepts = assign_indices(drafts, sizes.hatchling)?;

        let dense = generate_dense(sizes.transformer, &self.transformer_seed);
        let sparse = generate_sparse(sizes.hatchling, &self.hatchling_seed, &concepts);
        let context = build_context(&self.context, self.alternate_text.as_deref());

        Ok(SimulatedActivationPayload {
            sample_id,
            text: self.primary_text,
            context,
            title: Some(self.title).filter(|t| !t.trim().is_empty()),
            language: self.language,
            notes: self.notes,
            generated_by: Some(GENERATED_BY.to_string()),
            disclaimer: PLAN_DISCLAIMER.to_string(),
            transformer: DenseTrace {
                size: sizes.transformer,
                activations: dense,
            },
            hatchling: SparseTrace {
                size: sizes.hatchling,
                activations: sparse,
                concepts,
            },
        })
    }
}

/// Context paragraph, followed by the alternate phrasing when present.
pub fn build_context(context: &str, alternate_text: Option<&str>) -> String {
    let alternate = alternate_text
        .filter(|a| !a.is_empty())
        .map(|a| format!("Alternate phrasing: {a}"));

    std::iter::once(context.to_string())
        .chain(alternate)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

//! Concept descriptors and the sanitization applied to untrusted input.
//!
//! Concepts reach the core from two untrusted places: LLM scenario plans and
//! explain requests coming back from the dashboard. Both arrive as
//! [`RawConcept`] and are defaulted and clamped here instead of failing the
//! request.

use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::{DEFAULT_EXPLAIN_INTENSITY, DEFAULT_PLAN_INTENSITY, MAX_CONCEPTS};

pub const UNNAMED_LABEL: &str = "Unnamed Concept";
pub const MISSING_DESCRIPTION: &str = "No description provided.";

/// A labeled unit of meaning pinned to one slot of a sparse vector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConceptActivation {
    pub index: usize,
    pub label: String,
    pub description: String,
    pub intensity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

/// A sanitized concept that has not been assigned a sparse index yet.
#[derive(Clone, Debug, PartialEq)]
pub struct ConceptDraft {
    pub label: String,
    pub description: String,
    pub intensity: f64,
    pub rationale: Option<String>,
}

impl ConceptDraft {
    pub fn with_index(self, index: usize) -> ConceptActivation {
        ConceptActivation {
            index,
            label: self.label,
            description: self.description,
            intensity: self.intensity,
            rationale: self.rationale,
        }
    }
}

/// Wire shape for concepts from untrusted sources. Every field is optional
/// and a value of the wrong type reads as absent. `intensity` also accepts a
/// numeric string.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawConcept {
    #[serde(default, deserialize_with = "lenient_index")]
    pub index: Option<usize>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub rationale: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub intensity: Option<f64>,
}

impl From<&ConceptDraft> for RawConcept {
    fn from(d: &ConceptDraft) -> Self {
        Self {
            index: None,
            label: Some(d.label.clone()),
            description: Some(d.description.clone()),
            rationale: d.rationale.clone(),
            intensity: Some(d.intensity),
        }
    }
}

impl From<&ConceptActivation> for RawConcept {
    fn from(c: &ConceptActivation) -> Self {
        Self {
            index: Some(c.index),
            label: Some(c.label.clone()),
            description: Some(c.description.clone()),
            rationale: c.rationale.clone(),
            intensity: Some(c.intensity),
        }
    }
}

/// Any non-array reads as an empty list, and any element that is not an
/// object reads as an empty concept.
pub fn lenient_concepts<'de, D>(deserializer: D) -> Result<Vec<RawConcept>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Array(items)) => items
            .into_iter()
            .map(|item| serde_json::from_value(item).unwrap_or_default())
            .collect(),
        _ => Vec::new(),
    })
}

pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        _ => None,
    })
}

pub(crate) fn lenient_string_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_string(deserializer)?.unwrap_or_default())
}

/// Non-negative integers only; `-1` and `42.0` read as absent.
fn lenient_index<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_u64().and_then(|i| usize::try_from(i).ok()),
        _ => None,
    })
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Clamp to [0, 1]; missing or non-finite values take `default`.
pub fn clamp_intensity(value: Option<f64>, default: f64) -> f64 {
    value
        .filter(|v| v.is_finite())
        .unwrap_or(default)
        .clamp(0.0, 1.0)
}

fn trimmed_or(value: Option<&str>, fallback: &str) -> String {
    match value.map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => fallback.to_string(),
    }
}

fn trimmed_opt(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Sanitize LLM-authored concepts into index-free drafts.
///
/// An empty list yields a single placeholder so the sparse view always has
/// something to pin. Otherwise at most [`MAX_CONCEPTS`] entries are kept.
pub fn sanitize_concepts(raw: &[RawConcept]) -> Vec<ConceptDraft> {
    if raw.is_empty() {
        return vec![ConceptDraft {
            label: "Fallback Concept".to_string(),
            description: "LLM failed to provide a concept; using a placeholder node.".to_string(),
            intensity: 0.75,
            rationale: Some("Use this to illustrate mismatch scenarios.".to_string()),
        }];
    }

    raw.iter()
        .take(MAX_CONCEPTS)
        .map(|c| ConceptDraft {
            label: trimmed_or(c.label.as_deref(), UNNAMED_LABEL),
            description: trimmed_or(c.description.as_deref(), MISSING_DESCRIPTION),
            intensity: clamp_intensity(c.intensity, DEFAULT_PLAN_INTENSITY),
            rationale: trimmed_opt(c.rationale.as_deref()),
        })
        .collect()
}

/// Normalize concepts that already carry indices (explain requests).
///
/// Missing indices default to 0; the caller only uses them for display.
pub fn normalize_indexed_concepts(raw: &[RawConcept]) -> Vec<ConceptActivation> {
    if raw.is_empty() {
        return vec![ConceptActivation {
            index: 0,
            label: "Unknown Concept".to_string(),
            description: "No concept metadata was provided for this sample.".to_string(),
            intensity: DEFAULT_EXPLAIN_INTENSITY,
            rationale: None,
        }];
    }

    raw.iter()
        .take(MAX_CONCEPTS)
        .map(|c| ConceptActivation {
            index: c.index.unwrap_or(0),
            label: trimmed_or(c.label.as_deref(), UNNAMED_LABEL),
            description: trimmed_or(c.description.as_deref(), MISSING_DESCRIPTION),
            intensity: clamp_intensity(c.intensity, DEFAULT_EXPLAIN_INTENSITY),
            rationale: trimmed_opt(c.rationale.as_deref()),
        })
        .collect()
}

//! Prompt construction for the two LLM-backed routes.

use synapse_core::ConceptActivation;

use crate::client::ChatMessage;

pub const SPECULATIVE_SYSTEM_PROMPT: &str = "You are a careful assistant helping users explore a speculative \"Dragon Hatchling\" narrative.
- Explain concepts plainly.
- Surface caveats when the story departs from verifiable science.
- Remind readers that BDH details are user-supplied fiction when relevant.
- Use any provided context to ground outputs, otherwise acknowledge the gap.
- When helpful, cite highlights from Kosowski et al. (2025), \"The Dragon Hatchling: The Missing Link between the Transformer and Models of the Brain\" (arXiv:2509.26507).
- Key takeaways you can lean on: BDH is modeled as a scale-free graph of locally interacting neuron particles, couples excitatory and inhibitory circuits with integrate-and-fire thresholds, relies on Hebbian plasticity for working memory, and yields sparse, positive, monosemantic activations that rival GPT-2 era Transformers.
";

/// Used when a simulate request carries no prompt.
pub const DEFAULT_PROMPT: &str = "Show how BDH's scale-free neuron graph coordinates excitatory and inhibitory loops, using Hebbian plasticity to sustain a reasoning concept over time.";

const PLAN_GUIDELINES: &[&str] = &[
    "Guidelines:",
    "- Focus on one or two core concepts that map to interpretable neurons.",
    "- Provide intensities between 0.5 and 1.0 for key concepts and lower values for supporting cues.",
    "- If you reference multiple languages, mention them in `language` and include the secondary sentence in `alternate_text`.",
    "- Seeds should be stable lower-case strings (e.g., 'currency-cross-lingual').",
    "- When possible, connect the scenario to the published BDH claims (scale-free topology, excitatory/inhibitory loops, Hebbian working memory, sparse positive activations).",
];

/// Schema shown to the model; mirrors `synapse_core::ScenarioPlan`.
fn plan_schema() -> String {
    let schema = serde_json::json!({
        "title": "string",
        "primary_text": "string",
        "alternate_text": "string optional",
        "context": "string",
        "concepts": [{
            "label": "string",
            "description": "string",
            "rationale": "string optional",
            "intensity": "float 0-1"
        }],
        "transformer_seed": "short string",
        "hatchling_seed": "short string",
        "notes": "string optional",
        "language": "string optional"
    });
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}

/// Messages asking the model for a scenario plan in strict JSON.
pub fn simulation_messages(prompt: &str, language_hint: Option<&str>) -> Vec<ChatMessage> {
    let mut lines = vec![
        "You produce scenario descriptions that highlight how a Dragon Hatchling style sparse model might behave.".to_string(),
        "Return ONLY strict JSON following this schema:".to_string(),
        plan_schema(),
    ];
    lines.extend(PLAN_GUIDELINES.iter().map(|l| l.to_string()));
    if let Some(hint) = language_hint.filter(|h| !h.is_empty()) {
        lines.push(format!("Language preference: {hint}."));
    }

    vec![
        ChatMessage::system(format!(
            "{SPECULATIVE_SYSTEM_PROMPT}\nRespond only with JSON matching the documented schema."
        )),
        ChatMessage::user(format!("Prompt: {prompt}\n\n{}", lines.join("\n"))),
    ]
}

/// A rendered scenario the user wants explained.
#[derive(Clone, Debug, PartialEq)]
pub struct ExplainInput {
    pub sample_id: String,
    pub text: String,
    pub context: Option<String>,
    pub concepts: Vec<ConceptActivation>,
}

/// Messages asking for a short didactic explanation of the activations.
pub fn explanation_messages(input: &ExplainInput) -> Vec<ChatMessage> {
    let summary = input
        .concepts
        .iter()
        .map(|c| {
            format!(
                "- {} (index {}, intensity {:.2}): {}",
                c.label, c.index, c.intensity, c.description
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let rationales = input
        .concepts
        .iter()
        .filter_map(|c| {
            c.rationale
                .as_deref()
                .map(|r| format!("• {}: {r}", c.label))
        })
        .collect::<Vec<_>>()
        .join("\n");

    let mut sections = vec![
        format!("Sample ID: {}", input.sample_id),
        format!("Sample text: {}", input.text),
    ];
    if let Some(ctx) = input.context.as_deref().filter(|c| !c.is_empty()) {
        sections.push(format!("Additional context: {ctx}"));
    }
    sections.push("Concept activations:".to_string());
    sections.push(summary);
    if !rationales.is_empty() {
        sections.push(format!("Existing rationales:\n{rationales}"));
    }
    sections.push(
        "Instructions: Provide a concise explanation (2-3 paragraphs) of why these concept synapses activated, referencing the sample text. Reinforce that the BDH framing is speculative.".to_string(),
    );

    vec![
        ChatMessage::system(format!(
            "{SPECULATIVE_SYSTEM_PROMPT}\nAdopt a didactic tone suitable for an interactive visualization."
        )),
        ChatMessage::user(sections.join("\n\n")),
    ]
}

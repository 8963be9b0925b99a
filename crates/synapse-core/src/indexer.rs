use crate::concept::{ConceptActivation, ConceptDraft};
use crate::error::{Result, SynapseError};
use crate::random::fold_hash;

/// Map a label to a stable slot in `[0, size)`.
///
/// Case-insensitive: the label is lower-cased before folding. Distinct
/// labels may collide; callers accept that and let the last one win.
pub fn label_index(label: &str, size: usize) -> Result<usize> {
    if size == 0 {
        return Err(SynapseError::ZeroSize);
    }
    let hash = fold_hash(&label.to_lowercase());
    Ok((u64::from(hash) % size as u64) as usize)
}

/// Assign every draft its label-derived index, preserving list order.
pub fn assign_indices(drafts: Vec<ConceptDraft>, size: usize) -> Result<Vec<ConceptActivation>> {
    drafts
        .into_iter()
        .map(|d| {
            let index = label_index(&d.label, size)?;
            Ok(d.with_index(index))
        })
        .collect()
}

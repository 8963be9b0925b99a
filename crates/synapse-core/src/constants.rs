/// Dense ("transformer") vector length used by the built-in scenarios.
pub const DEFAULT_TRANSFORMER_SIZE: usize = 768;

/// Sparse ("hatchling") vector length used by the built-in scenarios.
pub const DEFAULT_HATCHLING_SIZE: usize = 256;

/// Exponent applied to every dense draw. Values above 1 skew toward zero
/// while keeping the full [0, 1] range.
pub const DENSE_SKEW: f64 = 1.2;

/// Amplitude of the sparse background noise.
pub const NOISE_FLOOR: f64 = 0.08;

/// Fraction of a concept's intensity written to its neighbor slot.
pub const NEIGHBOR_BOOST: f64 = 0.35;

/// Sanitized concept lists are capped at this many entries.
pub const MAX_CONCEPTS: usize = 6;

/// Multiplier of the string-folding hash shared by seeds and labels.
pub const FOLD_MULTIPLIER: u32 = 31;

/// Linear congruential step: `state * LCG_MULTIPLIER + LCG_INCREMENT (mod 2^32)`.
pub const LCG_MULTIPLIER: u32 = 1_664_525;
pub const LCG_INCREMENT: u32 = 1_013_904_223;

/// Intensity assigned when the LLM omits one.
pub const DEFAULT_PLAN_INTENSITY: f64 = 0.7;

/// Intensity assigned when an explain request omits one.
pub const DEFAULT_EXPLAIN_INTENSITY: f64 = 0.5;

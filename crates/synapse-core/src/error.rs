use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynapseError {
    /// A sparse network of size zero has no valid index to hash into.
    ZeroSize,
}

impl fmt::Display for SynapseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SynapseError::ZeroSize => {
                write!(f, "cannot assign concept indices in a network of size 0")
            }
        }
    }
}

impl std::error::Error for SynapseError {}

pub type Result<T> = std::result::Result<T, SynapseError>;

use thiserror::Error;

/// Errors raised by the scoring core.
///
/// Missing per-action numbers never end up here; those degrade to the neutral
/// value instead. These variants are caller or configuration bugs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("unknown role '{role}' (known roles: {})", known.join(", "))]
    InvalidRole { role: String, known: Vec<String> },

    #[error("invalid weights for role '{role}': {reason}")]
    InvalidWeights { role: String, reason: String },

    #[error("role '{role}' is listed more than once")]
    DuplicateRole { role: String },

    #[error("role weight table is empty")]
    EmptyRoleTable,
}

//! Error types for the `ramp-models` crate.
//!
//! All fallible validation in this crate returns variants of [`ModelError`].

/// Errors produced when constructing or validating model types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// Neither `addresses` nor `blockchains` was supplied on a session request.
    #[error("Missing required parameters")]
    MissingParameters,

    /// A destination wallet carried an empty address.
    #[error("invalid destination wallet: {reason}")]
    InvalidWallet {
        /// Human-readable explanation.
        reason: String,
    },

    /// The private-key material was neither an EC PEM nor base64 Ed25519 bytes.
    #[error("unsupported key material: {reason}")]
    UnsupportedKeyMaterial {
        /// Human-readable explanation.
        reason: String,
    },

    /// A required credential field was empty.
    #[error("missing credential field: {field}")]
    MissingCredentialField {
        /// The name of the missing field.
        field: String,
    },
}

//! Error types for agent synthesis
//!
//! Generation is a one-shot deterministic transform, so every error is fatal
//! for the run that raised it and none is worth retrying.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Which list of a signature a field belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldRole {
    /// Parameters; synthesized names are `arg<N>`.
    Input,
    /// Return values; synthesized names are `val<N>`.
    Output,
}

impl FieldRole {
    /// Prefix for positional names synthesized in this list.
    pub fn prefix(self) -> &'static str {
        match self {
            FieldRole::Input => "arg",
            FieldRole::Output => "val",
        }
    }
}

impl fmt::Display for FieldRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldRole::Input => f.write_str("inputs"),
            FieldRole::Output => f.write_str("outputs"),
        }
    }
}

/// Failure taxonomy, independent of the message details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// The named interface is absent from the input.
    SchemaNotFound,
    /// A requested constructor is absent from the input.
    ConstructorNotFound,
    /// Two fields of one message shape resolved to the same name.
    DuplicateFieldName,
    /// The signature cannot be expressed as an agent protocol.
    UnsupportedSignatureShape,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ErrorKind::SchemaNotFound => "SchemaNotFound",
            ErrorKind::ConstructorNotFound => "ConstructorNotFound",
            ErrorKind::DuplicateFieldName => "DuplicateFieldName",
            ErrorKind::UnsupportedSignatureShape => "UnsupportedSignatureShape",
        };
        f.write_str(text)
    }
}

/// Errors raised while synthesizing an agent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SynthError {
    /// Interface not present in the schema pool
    #[error("interface `{0}` not found in the supplied schemas")]
    SchemaNotFound(String),

    /// Constructor not present in the schema pool
    #[error("constructor `{0}` not found in the supplied schemas")]
    ConstructorNotFound(String),

    /// Normalization produced the same name twice
    #[error("duplicate field name `{field}` in the {role} of `{signature}`")]
    DuplicateFieldName {
        /// Signature being normalized
        signature: String,
        /// List holding the duplicate
        role: FieldRole,
        /// Offending name
        field: String,
    },

    /// Signature cannot be turned into a message protocol
    #[error("unsupported signature shape in `{signature}`: {detail}")]
    UnsupportedSignatureShape {
        /// Signature (or interface) being processed
        signature: String,
        /// What is wrong with it
        detail: String,
    },
}

impl SynthError {
    /// Taxonomy entry for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SynthError::SchemaNotFound(_) => ErrorKind::SchemaNotFound,
            SynthError::ConstructorNotFound(_) => ErrorKind::ConstructorNotFound,
            SynthError::DuplicateFieldName { .. } => ErrorKind::DuplicateFieldName,
            SynthError::UnsupportedSignatureShape { .. } => ErrorKind::UnsupportedSignatureShape,
        }
    }

    pub(crate) fn unsupported(signature: &str, detail: impl Into<String>) -> Self {
        SynthError::UnsupportedSignatureShape {
            signature: signature.to_string(),
            detail: detail.into(),
        }
    }
}

/// Convenience result alias for synthesis operations
pub type SynthResult<T> = std::result::Result<T, SynthError>;

//! Errors raised while building a printer or walking its children.

use thiserror::Error;

use crate::host::HostError;

/// Why a value could not be formatted.
///
/// A failure only ever affects the value being formatted. "No printer for
/// this type" is not an error; see [`crate::dispatch::lookup`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// The type name does not carry a usable template parameter list.
    #[error("malformed type {type_name}: {reason}")]
    MalformedType { type_name: String, reason: String },

    /// A dynamic extent could not be read back from the object.
    #[error("cannot resolve dynamic {what} from {field}: {reason}")]
    UnresolvedDynamicDimension {
        what: &'static str,
        field: String,
        reason: String,
    },

    /// The host failed to answer a query.
    #[error(transparent)]
    Host(#[from] HostError),
}

impl FormatError {
    pub(crate) fn malformed(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        FormatError::MalformedType {
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FormatError>;

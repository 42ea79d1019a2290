//! Narrow capability traits over a debugger's type and memory subsystem.
//!
//! The printers never talk to a debugger directly. Everything they need is
//! expressed by two traits:
//!
//! - [`TypeDescriptor`]: a static type (tag, qualifiers, template arguments)
//! - [`Value`]: a live object in the inspected process (fields, pointers)
//!
//! An adapter implements both for whatever native API the host exposes.
//! The crate ships [`snapshot`], an offline adapter over a YAML image of
//! types and memory, used by the CLI and by tests.
//!
//! All operations are read-only. Nothing here allocates or writes
//! inspected-process memory.

pub mod chain;
pub mod snapshot;

pub use chain::{LookupChain, LookupFn, PrinterChain};
pub use snapshot::{Snapshot, SnapshotType, SnapshotValue};

use std::fmt;
use thiserror::Error;

/// Errors reported by a host adapter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("no field named {field:?} in {type_name}")]
    MissingField { type_name: String, field: String },
    #[error("type {type_name} has no template argument {index}")]
    MissingTemplateArgument { type_name: String, index: usize },
    #[error("template argument {index} of {type_name} is not a {expected}")]
    TemplateArgumentKind {
        type_name: String,
        index: usize,
        expected: &'static str,
    },
    #[error("{0} is not a pointer")]
    NotAPointer(String),
    #[error("{0} is not a reference")]
    NotAReference(String),
    #[error("{0} is not an integer")]
    NotAnInteger(String),
    #[error("cannot cast {from} to {to}")]
    BadCast { from: String, to: String },
    #[error("cannot read {type_name} at {address:#x}")]
    UnreadableMemory { address: u64, type_name: String },
    #[error("unknown type {0}")]
    UnknownType(String),
}

/// Broad classification of a type, mirroring what debuggers report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCode {
    Scalar,
    Struct,
    Pointer,
    Reference,
    Typedef,
    Array,
}

/// A template argument: either a type or an integral constant.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateArgument<T> {
    Type(T),
    Value(i64),
}

impl<T: TypeDescriptor> TemplateArgument<T> {
    /// Unwrap a type argument, reporting `owner`/`index` on mismatch.
    pub fn into_type(self, owner: &T, index: usize) -> Result<T, HostError> {
        match self {
            TemplateArgument::Type(t) => Ok(t),
            TemplateArgument::Value(_) => Err(HostError::TemplateArgumentKind {
                type_name: owner.to_string(),
                index,
                expected: "type",
            }),
        }
    }

    /// Unwrap an integral argument, reporting `owner`/`index` on mismatch.
    pub fn into_value(self, owner: &T, index: usize) -> Result<i64, HostError> {
        match self {
            TemplateArgument::Value(v) => Ok(v),
            TemplateArgument::Type(_) => Err(HostError::TemplateArgumentKind {
                type_name: owner.to_string(),
                index,
                expected: "constant",
            }),
        }
    }
}

/// Static type description provided by the host.
///
/// `Display` renders the type's full name as the debugger prints it.
pub trait TypeDescriptor: Clone + fmt::Display {
    /// Classification of this type.
    fn code(&self) -> TypeCode;

    /// The struct/class tag, if the type has one.
    fn tag(&self) -> Option<String>;

    /// The referenced type of a reference.
    fn target(&self) -> Result<Self, HostError>;

    /// This type with `const`/`volatile` removed.
    fn unqualified(&self) -> Self;

    /// This type with every typedef layer resolved.
    fn strip_typedefs(&self) -> Self;

    /// Template argument `index`, as a type or an integral constant.
    fn template_argument(&self, index: usize) -> Result<TemplateArgument<Self>, HostError>;

    /// Pointer-to-this type.
    fn pointer(&self) -> Self;
}

/// A read-only handle to a live value in the inspected process.
///
/// `Display` renders the value the way the host would by default; pointer
/// values render as an address.
pub trait Value: Clone + fmt::Display {
    type Type: TypeDescriptor;

    /// The declared type of this value.
    fn value_type(&self) -> Self::Type;

    /// Member `name` of a struct value.
    fn field(&self, name: &str) -> Result<Self, HostError>;

    /// Reinterpret this value as `target`, e.g. an inline array as a pointer
    /// to its first element.
    fn cast(&self, target: &Self::Type) -> Result<Self, HostError>;

    /// The object a pointer value points at.
    fn dereference(&self) -> Result<Self, HostError>;

    /// A pointer value advanced by `count` pointee elements.
    fn offset(&self, count: i64) -> Result<Self, HostError>;

    /// This value as a signed integer.
    fn to_i64(&self) -> Result<i64, HostError>;
}

/// Strip a reference layer, then qualifiers and typedefs.
pub fn canonical_type<T: TypeDescriptor>(ty: &T) -> Result<T, HostError> {
    let ty = if ty.code() == TypeCode::Reference {
        ty.target()?
    } else {
        ty.clone()
    };
    Ok(ty.unqualified().strip_typedefs())
}

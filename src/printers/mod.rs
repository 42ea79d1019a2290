//! Printers for the three supported kinds.
//!
//! - [`DensePrinter`]: `Matrix` and `Array`, contiguous owned storage
//! - [`RefPrinter`]: `Ref`, a strided view over someone else's storage
//! - [`QuaternionPrinter`]: `Quaternion`, four coefficients
//!
//! Every printer offers a one-line summary and a lazy sequence of labelled
//! children. Building a printer resolves everything it needs up front, so a
//! printer that exists can always be walked.

mod cursor;
mod dense;
mod quaternion;
mod strided;

pub use cursor::ElementCursor;
pub use dense::DensePrinter;
pub use quaternion::{Coefficients, QuaternionPrinter};
pub use strided::RefPrinter;

use std::fmt;

use crate::error::Result;
use crate::host::{TypeCode, TypeDescriptor, Value};

/// One labelled element of a formatted value.
#[derive(Debug, Clone)]
pub struct Child<V> {
    pub label: String,
    pub value: V,
}

/// What the host sees of a constructed printer.
pub trait ValuePrinter<V: Value> {
    type Children: Iterator<Item = Result<Child<V>>>;

    /// One-line description: kind, element type, shape, data address.
    fn summary(&self) -> String;

    /// A fresh walk over the elements.
    fn children(&self) -> Self::Children;

    /// How many children a complete walk yields.
    fn num_children(&self) -> usize;
}

/// Resolve an element buffer to a pointer to its first element.
///
/// Fixed-size storage is a struct wrapping an inline `array`; dynamic
/// storage is already a pointer.
pub(crate) fn element_pointer<V: Value>(data: V, element: &V::Type) -> Result<V> {
    let ty = data.value_type().unqualified().strip_typedefs();
    if ty.code() == TypeCode::Struct {
        Ok(data.field("array")?.cast(&element.pointer())?)
    } else {
        Ok(data)
    }
}

/// A printer of any supported kind.
pub enum Printer<V: Value> {
    Dense(DensePrinter<V>),
    Ref(RefPrinter<V>),
    Quaternion(QuaternionPrinter<V>),
}

/// Children of any supported kind.
pub enum Children<V: Value> {
    Elements(ElementCursor<V>),
    Coefficients(Coefficients<V>),
}

impl<V: Value> Iterator for Children<V> {
    type Item = Result<Child<V>>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Children::Elements(it) => it.next(),
            Children::Coefficients(it) => it.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Children::Elements(it) => it.size_hint(),
            Children::Coefficients(it) => it.size_hint(),
        }
    }
}

impl<V: Value> ValuePrinter<V> for Printer<V> {
    type Children = Children<V>;

    fn summary(&self) -> String {
        match self {
            Printer::Dense(p) => p.summary(),
            Printer::Ref(p) => p.summary(),
            Printer::Quaternion(p) => p.summary(),
        }
    }

    fn children(&self) -> Children<V> {
        match self {
            Printer::Dense(p) => Children::Elements(p.children()),
            Printer::Ref(p) => Children::Elements(p.children()),
            Printer::Quaternion(p) => Children::Coefficients(p.children()),
        }
    }

    fn num_children(&self) -> usize {
        match self {
            Printer::Dense(p) => p.num_children(),
            Printer::Ref(p) => p.num_children(),
            Printer::Quaternion(p) => p.num_children(),
        }
    }
}

impl<V: Value> fmt::Debug for Printer<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Printer::Dense(_) => "Dense",
            Printer::Ref(_) => "Ref",
            Printer::Quaternion(_) => "Quaternion",
        };
        f.debug_struct("Printer")
            .field("kind", &kind)
            .field("summary", &self.summary())
            .finish()
    }
}

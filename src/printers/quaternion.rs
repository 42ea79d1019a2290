//! Quaternions: four coefficients stored as x, y, z, w.

use crate::error::{FormatError, Result};
use crate::host::{canonical_type, TypeDescriptor, Value};
use crate::introspect::element_type;

use super::{Child, ValuePrinter};

/// Coefficient names in storage order.
const COEFFICIENTS: [&str; 4] = ["x", "y", "z", "w"];

/// Printer for `Quaternion` values.
pub struct QuaternionPrinter<V: Value> {
    label: String,
    element: V::Type,
    data: V,
}

impl<V: Value> QuaternionPrinter<V> {
    pub fn new(label: impl Into<String>, value: V) -> Result<Self> {
        let ty = canonical_type(&value.value_type())?;
        let element = element_type(&ty)?;
        // Coefficients always sit in a fixed-size inline array.
        let data = value
            .field("m_coeffs")?
            .field("m_storage")?
            .field("m_data")?
            .field("array")?
            .cast(&element.pointer())?;
        Ok(Self {
            label: label.into(),
            element,
            data,
        })
    }
}

impl<V: Value> ValuePrinter<V> for QuaternionPrinter<V> {
    type Children = Coefficients<V>;

    fn summary(&self) -> String {
        format!("{}<{}> (data ptr: {})", self.label, self.element, self.data)
    }

    fn children(&self) -> Coefficients<V> {
        Coefficients {
            data: self.data.clone(),
            index: 0,
            pending: None,
        }
    }

    fn num_children(&self) -> usize {
        COEFFICIENTS.len()
    }
}

/// The four labelled coefficients of a quaternion.
pub struct Coefficients<V: Value> {
    data: V,
    index: usize,
    pending: Option<FormatError>,
}

impl<V: Value> Iterator for Coefficients<V> {
    type Item = Result<Child<V>>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(err) = self.pending.take() {
            self.index = COEFFICIENTS.len();
            return Some(Err(err));
        }
        let name = COEFFICIENTS.get(self.index)?;
        let value = match self.data.dereference() {
            Ok(value) => value,
            Err(err) => {
                self.index = COEFFICIENTS.len();
                return Some(Err(err.into()));
            }
        };
        self.index += 1;
        if self.index < COEFFICIENTS.len() {
            match self.data.offset(1) {
                Ok(next) => self.data = next,
                Err(err) => self.pending = Some(err.into()),
            }
        }
        Some(Ok(Child {
            label: format!("[{}]", name),
            value,
        }))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = COEFFICIENTS.len().saturating_sub(self.index);
        (0, Some(remaining + self.pending.is_some() as usize))
    }
}

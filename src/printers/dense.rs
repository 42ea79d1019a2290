//! Matrices and arrays that own one contiguous buffer.

use crate::error::Result;
use crate::host::{canonical_type, Value};
use crate::introspect::{dense_shape, element_type, ShapeInfo};

use super::{element_pointer, ElementCursor, ValuePrinter};

/// Printer for `Matrix` and `Array` values.
pub struct DensePrinter<V: Value> {
    label: String,
    element: V::Type,
    shape: ShapeInfo,
    data: V,
}

impl<V: Value> DensePrinter<V> {
    /// Build a printer for `value`; `label` is the qualified kind name used in
    /// the summary, e.g. `Eigen::Matrix`.
    pub fn new(label: impl Into<String>, value: V) -> Result<Self> {
        let ty = canonical_type(&value.value_type())?;
        let shape = dense_shape(&value, &ty)?;
        let element = element_type(&ty)?;
        let data = value.field("m_storage")?.field("m_data")?;
        let data = element_pointer(data, &element)?;
        Ok(Self {
            label: label.into(),
            element,
            shape,
            data,
        })
    }

    pub fn shape(&self) -> &ShapeInfo {
        &self.shape
    }
}

impl<V: Value> ValuePrinter<V> for DensePrinter<V> {
    type Children = ElementCursor<V>;

    fn summary(&self) -> String {
        format!(
            "{}<{},{},{},{}> (data ptr: {})",
            self.label, self.element, self.shape.rows, self.shape.cols, self.shape.order, self.data
        )
    }

    fn children(&self) -> ElementCursor<V> {
        ElementCursor::new(self.shape, self.data.clone())
    }

    fn num_children(&self) -> usize {
        self.shape.len()
    }
}

//! Reference views over externally owned storage with explicit strides.

use crate::error::Result;
use crate::host::{canonical_type, Value};
use crate::introspect::{element_type, ref_shape, ShapeInfo};

use super::{element_pointer, ElementCursor, ValuePrinter};

/// Printer for `Ref` values.
///
/// Template argument 0 of the view is the referenced plain type, which in
/// turn supplies the element type, the declared sizes and the options.
pub struct RefPrinter<V: Value> {
    label: String,
    element: V::Type,
    shape: ShapeInfo,
    data: V,
}

impl<V: Value> RefPrinter<V> {
    pub fn new(label: impl Into<String>, value: V) -> Result<Self> {
        let ty = canonical_type(&value.value_type())?;
        let referenced = canonical_type(&element_type(&ty)?)?;
        let element = element_type(&referenced)?;
        let shape = ref_shape(&value, &referenced)?;
        let data = element_pointer(value.field("m_data")?, &element)?;
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

impl<V: Value> ValuePrinter<V> for RefPrinter<V> {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FormatError;
    use crate::host::{Snapshot, SnapshotValue};
    use crate::introspect::StorageOrder;

    const SNAPSHOT: &str = r#"
types:
  "Eigen::Matrix<int, -1, -1, 0, -1, -1>":
    template_args: [{ type: int }, { value: -1 }, { value: -1 }, { value: 0 }]
  "Eigen::Matrix<int, 2, 2, 1, 2, 2>":
    template_args: [{ type: int }, { value: 2 }, { value: 2 }, { value: 1 }]
  "Eigen::Ref<Eigen::Matrix<int, -1, -1, 0, -1, -1>, 0, Eigen::OuterStride<-1> >":
    template_args:
      - { type: "Eigen::Matrix<int, -1, -1, 0, -1, -1>" }
      - { value: 0 }
      - { type: "Eigen::OuterStride<-1>" }
    fields:
      - { name: m_data, type: "int *" }
      - { name: m_rows, type: Extent }
      - { name: m_cols, type: Extent }
      - { name: m_stride, type: "Eigen::OuterStride<-1>" }
  "Eigen::Ref<const Eigen::Matrix<int, 2, 2, 1, 2, 2>, 0, Eigen::Stride<8, 2> >":
    template_args:
      - { type: "const Eigen::Matrix<int, 2, 2, 1, 2, 2>" }
    fields:
      - { name: m_data, type: "int *" }
      - { name: m_stride, type: FixedStride }
  RefAlias:
    code: typedef
    target: "Eigen::Ref<Eigen::Matrix<int, -1, -1, 0, -1, -1>, 0, Eigen::OuterStride<-1> >"
  FixedStride:
    code: typedef
    target: "Eigen::Stride<8, 2>"
  "Eigen::Stride<8, 2>":
    template_args: [{ value: 8 }, { value: 2 }]
  "Eigen::OuterStride<-1>":
    template_args: [{ value: -1 }, { value: 0 }]
    fields: [{ name: m_outer, type: Extent }]
  Extent:
    fields: [{ name: m_value, type: long }]
  "Eigen::Matrix<int, -1, -1, 1, -1, -1>":
    template_args: [{ type: int }, { value: -1 }, { value: -1 }, { value: 1 }]
  "Eigen::Stride<-1, -1>":
    template_args: [{ value: -1 }, { value: -1 }]
    fields:
      - { name: m_outer, type: Extent }
      - { name: m_inner, type: Extent }
  "Eigen::InnerStride<-1>":
    template_args: [{ value: 0 }, { value: -1 }]
    fields: [{ name: m_inner, type: Extent }]
  "Eigen::Ref<Eigen::Matrix<int, -1, -1, 0, -1, -1>, 0, Eigen::Stride<-1, -1> >":
    template_args: [{ type: "Eigen::Matrix<int, -1, -1, 0, -1, -1>" }]
    fields:
      - { name: m_data, type: "int *" }
      - { name: m_rows, type: Extent }
      - { name: m_cols, type: Extent }
      - { name: m_stride, type: "Eigen::Stride<-1, -1>" }
  "Eigen::Ref<Eigen::Matrix<int, -1, -1, 1, -1, -1>, 0, Eigen::Stride<-1, -1> >":
    template_args: [{ type: "Eigen::Matrix<int, -1, -1, 1, -1, -1>" }]
    fields:
      - { name: m_data, type: "int *" }
      - { name: m_rows, type: Extent }
      - { name: m_cols, type: Extent }
      - { name: m_stride, type: "Eigen::Stride<-1, -1>" }
  "Eigen::Ref<Eigen::Matrix<int, -1, -1, 0, -1, -1>, 0, Eigen::InnerStride<-1> >":
    template_args: [{ type: "Eigen::Matrix<int, -1, -1, 0, -1, -1>" }]
    fields:
      - { name: m_data, type: "int *" }
      - { name: m_rows, type: Extent }
      - { name: m_cols, type: Extent }
      - { name: m_stride, type: "Eigen::InnerStride<-1>" }
memory:
  - { at: 1024, type: int, data: [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19] }
variables:
  - name: block
    type: "RefAlias"
    value:
      m_data: { ptr: 1024 }
      m_rows: { m_value: 2 }
      m_cols: { m_value: 2 }
      m_stride: { m_outer: { m_value: 5 } }
  - name: rowmajor
    type: "Eigen::Ref<const Eigen::Matrix<int, 2, 2, 1, 2, 2>, 0, Eigen::Stride<8, 2> >"
    value:
      m_data: { ptr: 1024 }
      m_stride: {}
  - name: no_rows
    type: "RefAlias"
    value:
      m_data: { ptr: 1024 }
      m_cols: { m_value: 2 }
      m_stride: { m_outer: { m_value: 5 } }
  - name: runtime_col
    type: "Eigen::Ref<Eigen::Matrix<int, -1, -1, 0, -1, -1>, 0, Eigen::Stride<-1, -1> >"
    value:
      m_data: { ptr: 1024 }
      m_rows: { m_value: 3 }
      m_cols: { m_value: 2 }
      m_stride: { m_outer: { m_value: 7 }, m_inner: { m_value: 2 } }
  - name: runtime_row
    type: "Eigen::Ref<Eigen::Matrix<int, -1, -1, 1, -1, -1>, 0, Eigen::Stride<-1, -1> >"
    value:
      m_data: { ptr: 1024 }
      m_rows: { m_value: 3 }
      m_cols: { m_value: 2 }
      m_stride: { m_outer: { m_value: 7 }, m_inner: { m_value: 2 } }
  - name: inner_only
    type: "Eigen::Ref<Eigen::Matrix<int, -1, -1, 0, -1, -1>, 0, Eigen::InnerStride<-1> >"
    value:
      m_data: { ptr: 1024 }
      m_rows: { m_value: 2 }
      m_cols: { m_value: 3 }
      m_stride: { m_inner: { m_value: 3 } }
  - name: huge_inner
    type: "Eigen::Ref<Eigen::Matrix<int, -1, -1, 0, -1, -1>, 0, Eigen::InnerStride<-1> >"
    value:
      m_data: { ptr: 1024 }
      m_rows: { m_value: 1099511627776 }
      m_cols: { m_value: 1 }
      m_stride: { m_inner: { m_value: 1099511627776 } }
"#;

    fn variable(name: &str) -> SnapshotValue {
        Snapshot::from_yaml(SNAPSHOT).unwrap().variable(name).unwrap()
    }

    fn pairs(printer: &RefPrinter<SnapshotValue>) -> Vec<(String, i64)> {
        printer
            .children()
            .map(|child| {
                let child = child.unwrap();
                (child.label, child.value.to_i64().unwrap())
            })
            .collect()
    }

    #[test]
    fn test_outer_stride_skips_between_columns() {
        let printer = RefPrinter::new("Eigen::Ref", variable("block")).unwrap();
        assert_eq!(printer.shape().inner_stride, 1);
        assert_eq!(printer.shape().outer_stride, 5);
        assert_eq!(
            pairs(&printer),
            vec![
                ("[0,0]".to_string(), 0),
                ("[1,0]".to_string(), 1),
                ("[0,1]".to_string(), 5),
                ("[1,1]".to_string(), 6),
            ]
        );
        assert_eq!(
            printer.summary(),
            "Eigen::Ref<int,2,2,ColMajor> (data ptr: 0x400)"
        );
    }

    #[test]
    fn test_row_major_uses_inner_stride_along_rows() {
        let printer = RefPrinter::new("Eigen::Ref", variable("rowmajor")).unwrap();
        assert_eq!(printer.shape().order, StorageOrder::RowMajor);
        assert_eq!(
            pairs(&printer),
            vec![
                ("[0,0]".to_string(), 0),
                ("[0,1]".to_string(), 2),
                ("[1,0]".to_string(), 8),
                ("[1,1]".to_string(), 10),
            ]
        );
    }

    #[test]
    fn test_missing_runtime_rows() {
        match RefPrinter::new("Eigen::Ref", variable("no_rows")) {
            Err(FormatError::UnresolvedDynamicDimension { what, field, .. }) => {
                assert_eq!(what, "rows");
                assert_eq!(field, "m_rows.m_value");
            }
            Err(other) => panic!("unexpected error {:?}", other),
            Ok(p) => panic!("expected failure, got {}", p.summary()),
        }
    }

    /// Offsets `fast * inner + slow * outer` in walk order.
    fn expected_offsets(printer: &RefPrinter<SnapshotValue>) -> Vec<i64> {
        let shape = printer.shape();
        let mut offsets = Vec::new();
        for slow in 0..shape.slow_len() {
            for fast in 0..shape.fast_len() {
                offsets.push(fast as i64 * shape.inner_stride + slow as i64 * shape.outer_stride);
            }
        }
        offsets
    }

    #[test]
    fn test_runtime_inner_and_outer_strides() {
        for (name, order) in [
            ("runtime_col", StorageOrder::ColMajor),
            ("runtime_row", StorageOrder::RowMajor),
        ] {
            let printer = RefPrinter::new("Eigen::Ref", variable(name)).unwrap();
            assert_eq!(printer.shape().order, order);
            assert_eq!(printer.shape().inner_stride, 2);
            assert_eq!(printer.shape().outer_stride, 7);
            let values: Vec<i64> = pairs(&printer).into_iter().map(|(_, v)| v).collect();
            assert_eq!(values, expected_offsets(&printer), "{}", name);
        }

        let row = RefPrinter::new("Eigen::Ref", variable("runtime_row")).unwrap();
        let labels: Vec<String> = pairs(&row).into_iter().map(|(l, _)| l).collect();
        assert_eq!(labels, ["[0,0]", "[0,1]", "[1,0]", "[1,1]", "[2,0]", "[2,1]"]);
        let values: Vec<i64> = pairs(&row).into_iter().map(|(_, v)| v).collect();
        assert_eq!(values, vec![0, 2, 7, 9, 14, 16]);
    }

    #[test]
    fn test_runtime_inner_stride_with_natural_outer() {
        let printer = RefPrinter::new("Eigen::Ref", variable("inner_only")).unwrap();
        assert_eq!(printer.shape().inner_stride, 3);
        assert_eq!(printer.shape().outer_stride, 6);
        let values: Vec<i64> = pairs(&printer).into_iter().map(|(_, v)| v).collect();
        assert_eq!(values, vec![0, 3, 6, 9, 12, 15]);
    }

    #[test]
    fn test_overflowing_natural_stride_is_unresolved() {
        match RefPrinter::new("Eigen::Ref", variable("huge_inner")) {
            Err(FormatError::UnresolvedDynamicDimension { what, .. }) => {
                assert_eq!(what, "outer stride");
            }
            Err(other) => panic!("unexpected error {:?}", other),
            Ok(p) => panic!("expected failure, got {}", p.summary()),
        }
    }
}

//! Shape and layout recovery from type descriptions and live objects.
//!
//! Dense matrices and arrays carry their sizes as non-type template
//! parameters that most hosts do not expose, so those are parsed back out of
//! the type name. Reference views expose the same quantities as ordinary
//! template arguments of the referenced type. Either way a declared size of
//! [`DYNAMIC`] is replaced by the runtime value stored in the object.

use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;

use crate::error::{FormatError, Result};
use crate::host::{TypeDescriptor, Value};

/// Declared size meaning "stored in the object at runtime".
pub const DYNAMIC: i64 = -1;

/// Bit of the options parameter that selects row-major storage.
const ROW_MAJOR_BIT: i64 = 0x1;

lazy_static! {
    /// Outermost template parameter list of a type name.
    static ref TEMPLATE_LIST: Regex = Regex::new(r"<.*>").unwrap();
}

/// Memory order of a 2-D object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageOrder {
    /// Consecutive elements walk down a column.
    ColMajor,
    /// Consecutive elements walk along a row.
    RowMajor,
}

impl StorageOrder {
    /// Decode the storage order from an options bitmask.
    pub fn from_options(options: i64) -> Self {
        if options & ROW_MAJOR_BIT != 0 {
            StorageOrder::RowMajor
        } else {
            StorageOrder::ColMajor
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageOrder::ColMajor => "ColMajor",
            StorageOrder::RowMajor => "RowMajor",
        }
    }
}

impl fmt::Display for StorageOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Resolved logical shape and memory layout of an object.
///
/// `inner_stride` separates neighbours along the fast axis (rows for
/// column-major, columns for row-major); `outer_stride` separates the starts
/// of consecutive sweeps along the slow axis. Both are in elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeInfo {
    pub rows: usize,
    pub cols: usize,
    pub order: StorageOrder,
    pub outer_stride: i64,
    pub inner_stride: i64,
}

impl ShapeInfo {
    /// Shape of an object whose elements are packed with no gaps.
    pub fn dense(rows: usize, cols: usize, order: StorageOrder) -> Self {
        let mut shape = Self {
            rows,
            cols,
            order,
            outer_stride: 0,
            inner_stride: 1,
        };
        shape.outer_stride = shape.fast_len() as i64;
        shape
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.rows.saturating_mul(self.cols)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Extent of the axis that varies fastest in memory.
    pub fn fast_len(&self) -> usize {
        match self.order {
            StorageOrder::ColMajor => self.rows,
            StorageOrder::RowMajor => self.cols,
        }
    }

    /// Extent of the axis that varies slowest in memory.
    pub fn slow_len(&self) -> usize {
        match self.order {
            StorageOrder::ColMajor => self.cols,
            StorageOrder::RowMajor => self.rows,
        }
    }

    /// Map (fast, slow) indices to (row, col).
    pub fn coords(&self, fast: usize, slow: usize) -> (usize, usize) {
        match self.order {
            StorageOrder::ColMajor => (fast, slow),
            StorageOrder::RowMajor => (slow, fast),
        }
    }

    /// Coordinate label of the element at (row, col).
    ///
    /// Column vectors are labelled by row and row vectors by column; a 1x1
    /// object counts as a column vector.
    pub fn label(&self, row: usize, col: usize) -> String {
        if self.cols == 1 {
            format!("[{}]", row)
        } else if self.rows == 1 {
            format!("[{}]", col)
        } else {
            format!("[{},{}]", row, col)
        }
    }
}

/// A size as declared in a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extent {
    Fixed(usize),
    Dynamic,
}

impl Extent {
    /// Interpret a declared size; anything negative except [`DYNAMIC`] is malformed.
    pub fn from_declared(value: i64, type_name: &str, what: &str) -> Result<Self> {
        if value == DYNAMIC {
            return Ok(Extent::Dynamic);
        }
        usize::try_from(value).map(Extent::Fixed).map_err(|_| {
            FormatError::malformed(type_name, format!("{} must be >= 0, got {}", what, value))
        })
    }
}

/// Sizes and options declared by a dense type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeclaredShape {
    pub rows: Extent,
    pub cols: Extent,
    pub options: i64,
}

/// Split the outermost `<...>` of a type name into whitespace-free fields.
pub fn template_parameters(type_name: &str) -> Result<Vec<String>> {
    let list = TEMPLATE_LIST
        .find(type_name)
        .ok_or_else(|| FormatError::malformed(type_name, "no template parameter list"))?;
    let inner = &list.as_str()[1..list.as_str().len() - 1];
    Ok(inner
        .split(',')
        .map(|field| field.chars().filter(|c| !c.is_whitespace()).collect())
        .collect())
}

/// Parse an integer literal with an optional sign and radix prefix.
pub fn parse_integer(text: &str) -> Option<i64> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let lower = digits.to_ascii_lowercase();
    let (radix, digits) = match lower.get(..2) {
        Some("0x") => (16, &lower[2..]),
        Some("0o") => (8, &lower[2..]),
        Some("0b") => (2, &lower[2..]),
        _ => (10, lower.as_str()),
    };
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return None;
    }
    let magnitude = i64::from_str_radix(digits, radix).ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Recover rows, cols and options from a dense type name such as
/// `Eigen::Matrix<double, -1, 3, 0, -1, 3>`.
///
/// Options default to 0 when the name lists fewer than four parameters.
pub fn parse_dense_declaration(type_name: &str) -> Result<DeclaredShape> {
    let params = template_parameters(type_name)?;
    if params.len() < 3 {
        return Err(FormatError::malformed(
            type_name,
            format!("expected at least 3 template parameters, found {}", params.len()),
        ));
    }
    let number = |index: usize, what: &str| {
        parse_integer(&params[index]).ok_or_else(|| {
            FormatError::malformed(
                type_name,
                format!("{} parameter {:?} is not an integer", what, params[index]),
            )
        })
    };
    let rows = Extent::from_declared(number(1, "rows")?, type_name, "rows")?;
    let cols = Extent::from_declared(number(2, "cols")?, type_name, "cols")?;
    let options = if params.len() > 3 {
        number(3, "options")?
    } else {
        0
    };
    Ok(DeclaredShape {
        rows,
        cols,
        options,
    })
}

/// Template argument 0 of `ty`, which names the element type.
pub fn element_type<T: TypeDescriptor>(ty: &T) -> Result<T> {
    Ok(ty.template_argument(0)?.into_type(ty, 0)?)
}

/// Integral template argument `index` of `ty`.
fn integral_argument<T: TypeDescriptor>(ty: &T, index: usize) -> Result<i64> {
    Ok(ty.template_argument(index)?.into_value(ty, index)?)
}

/// Follow a chain of field names from `value`.
fn field_path<V: Value>(value: &V, path: &[&str]) -> Result<V> {
    let mut current = value.clone();
    for name in path {
        current = current.field(name)?;
    }
    Ok(current)
}

/// Read a non-negative runtime integer stored at `path`.
fn read_runtime<V: Value>(value: &V, path: &[&str], what: &'static str) -> Result<i64> {
    let unresolved = |reason: String| FormatError::UnresolvedDynamicDimension {
        what,
        field: path.join("."),
        reason,
    };
    let read = field_path(value, path)
        .and_then(|field| Ok(field.to_i64()?))
        .map_err(|e| unresolved(e.to_string()))?;
    if read < 0 {
        return Err(unresolved(format!("runtime value {} is negative", read)));
    }
    Ok(read)
}

fn resolve_extent<V: Value>(
    extent: Extent,
    value: &V,
    path: &[&str],
    what: &'static str,
) -> Result<usize> {
    match extent {
        Extent::Fixed(n) => Ok(n),
        Extent::Dynamic => Ok(read_runtime(value, path, what)? as usize),
    }
}

/// Check that a `rows` x `cols` object has an element count that fits in
/// `usize`. Runtime sizes of an uninitialised object can be arbitrary.
fn check_element_count(rows: usize, cols: usize, fields: &[&str]) -> Result<()> {
    match rows.checked_mul(cols) {
        Some(_) => Ok(()),
        None => Err(FormatError::UnresolvedDynamicDimension {
            what: "size",
            field: fields.join(", "),
            reason: format!("{} x {} elements overflow", rows, cols),
        }),
    }
}

/// Shape of a dense matrix or array whose canonical type is `ty`.
pub fn dense_shape<V: Value>(value: &V, ty: &V::Type) -> Result<ShapeInfo> {
    let name = ty
        .tag()
        .ok_or_else(|| FormatError::malformed(ty.to_string(), "type has no name"))?;
    let declared = parse_dense_declaration(&name)?;
    let rows = resolve_extent(declared.rows, value, &["m_storage", "m_rows"], "rows")?;
    let cols = resolve_extent(declared.cols, value, &["m_storage", "m_cols"], "cols")?;
    check_element_count(rows, cols, &["m_storage.m_rows", "m_storage.m_cols"])?;
    let shape = ShapeInfo::dense(rows, cols, StorageOrder::from_options(declared.options));
    log::trace!("{}: resolved dense shape {:?}", name, shape);
    Ok(shape)
}

/// Shape of a reference view whose referenced plain type is `referenced`.
///
/// Strides come from the canonical type of the `m_stride` member. A stride
/// of 0 means "natural": 1 for the inner stride, the packed sweep length for
/// the outer stride.
pub fn ref_shape<V: Value>(value: &V, referenced: &V::Type) -> Result<ShapeInfo> {
    let type_name = referenced.to_string();
    let rows = Extent::from_declared(integral_argument(referenced, 1)?, &type_name, "rows")?;
    let cols = Extent::from_declared(integral_argument(referenced, 2)?, &type_name, "cols")?;
    let options = integral_argument(referenced, 3)?;
    let rows = resolve_extent(rows, value, &["m_rows", "m_value"], "rows")?;
    let cols = resolve_extent(cols, value, &["m_cols", "m_value"], "cols")?;
    check_element_count(rows, cols, &["m_rows.m_value", "m_cols.m_value"])?;

    let stride = value.field("m_stride")?;
    let stride_type = stride.value_type().unqualified().strip_typedefs();
    let mut outer = integral_argument(&stride_type, 0)?;
    let mut inner = integral_argument(&stride_type, 1)?;
    if outer == DYNAMIC {
        outer = read_runtime(&stride, &["m_outer", "m_value"], "outer stride")?;
    }
    if inner == DYNAMIC {
        inner = read_runtime(&stride, &["m_inner", "m_value"], "inner stride")?;
    }

    let mut shape = ShapeInfo::dense(rows, cols, StorageOrder::from_options(options));
    shape.inner_stride = if inner == 0 { 1 } else { inner };
    shape.outer_stride = if outer == 0 {
        let fast_len = shape.fast_len() as i64;
        shape.inner_stride.checked_mul(fast_len).ok_or_else(|| {
            FormatError::UnresolvedDynamicDimension {
                what: "outer stride",
                field: "m_stride".to_string(),
                reason: format!(
                    "natural stride {} x {} overflows",
                    shape.inner_stride, fast_len
                ),
            }
        })?
    } else {
        outer
    };
    log::trace!("{}: resolved view shape {:?}", type_name, shape);
    Ok(shape)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{Snapshot, TypeDescriptor};

    #[test]
    fn test_template_parameters_strip_whitespace() {
        let params = template_parameters("Eigen::Matrix<double, -1, 3, 0, -1, 3>").unwrap();
        assert_eq!(params, vec!["double", "-1", "3", "0", "-1", "3"]);
    }

    #[test]
    fn test_template_parameters_requires_brackets() {
        let err = template_parameters("Eigen::MatrixXd").unwrap_err();
        assert!(matches!(err, FormatError::MalformedType { .. }));
    }

    #[test]
    fn test_parse_integer() {
        assert_eq!(parse_integer("42"), Some(42));
        assert_eq!(parse_integer("-1"), Some(-1));
        assert_eq!(parse_integer("0x10"), Some(16));
        assert_eq!(parse_integer("0b101"), Some(5));
        assert_eq!(parse_integer("-0x2"), Some(-2));
        assert_eq!(parse_integer(""), None);
        assert_eq!(parse_integer("--1"), None);
        assert_eq!(parse_integer("RowMajor"), None);
    }

    #[test]
    fn test_dense_declaration_with_options() {
        let declared = parse_dense_declaration("Eigen::Matrix<float, 4, -1, 1, 4, -1>").unwrap();
        assert_eq!(declared.rows, Extent::Fixed(4));
        assert_eq!(declared.cols, Extent::Dynamic);
        assert_eq!(StorageOrder::from_options(declared.options), StorageOrder::RowMajor);
    }

    #[test]
    fn test_dense_declaration_defaults_options() {
        let declared = parse_dense_declaration("Eigen::Array<int, 2, 2>").unwrap();
        assert_eq!(declared.options, 0);
        assert_eq!(StorageOrder::from_options(declared.options), StorageOrder::ColMajor);
    }

    #[test]
    fn test_dense_declaration_too_few_fields() {
        let err = parse_dense_declaration("Eigen::Matrix<int, 2>").unwrap_err();
        assert!(matches!(err, FormatError::MalformedType { .. }));
    }

    #[test]
    fn test_dense_declaration_rejects_negative_sizes() {
        let err = parse_dense_declaration("Eigen::Matrix<int, -3, 2>").unwrap_err();
        assert!(err.to_string().contains("rows must be >= 0"));
    }

    #[test]
    fn test_labels() {
        let column = ShapeInfo::dense(3, 1, StorageOrder::ColMajor);
        assert_eq!(column.label(2, 0), "[2]");
        let row = ShapeInfo::dense(1, 3, StorageOrder::RowMajor);
        assert_eq!(row.label(0, 2), "[2]");
        let scalar = ShapeInfo::dense(1, 1, StorageOrder::ColMajor);
        assert_eq!(scalar.label(0, 0), "[0]");
        let matrix = ShapeInfo::dense(2, 2, StorageOrder::ColMajor);
        assert_eq!(matrix.label(1, 0), "[1,0]");
    }

    #[test]
    fn test_dense_strides() {
        let col = ShapeInfo::dense(2, 3, StorageOrder::ColMajor);
        assert_eq!((col.inner_stride, col.outer_stride), (1, 2));
        let row = ShapeInfo::dense(2, 3, StorageOrder::RowMajor);
        assert_eq!((row.inner_stride, row.outer_stride), (1, 3));
    }

    const DYNAMIC_SNAPSHOT: &str = r#"
types:
  "Eigen::Matrix<double, -1, 1, 0, -1, 1>":
    template_args: [{ type: double }]
    fields: [{ name: m_storage, type: VectorStorage }]
  VectorStorage:
    fields:
      - { name: m_data, type: "double *" }
      - { name: m_rows, type: long }
  "Eigen::Matrix<double, -1, -1, 0, -1, -1>":
    template_args: [{ type: double }]
    fields: [{ name: m_storage, type: MatrixStorage }]
  MatrixStorage:
    fields:
      - { name: m_data, type: "double *" }
      - { name: m_rows, type: long }
      - { name: m_cols, type: long }
variables:
  - name: v
    type: "Eigen::Matrix<double, -1, 1, 0, -1, 1>"
    value: { m_storage: { m_data: { ptr: 64 }, m_rows: 5 } }
  - name: broken
    type: "Eigen::Matrix<double, -1, 1, 0, -1, 1>"
    value: { m_storage: { m_data: { ptr: 64 }, m_rows: -4 } }
  - name: garbage
    type: "Eigen::Matrix<double, -1, -1, 0, -1, -1>"
    value: { m_storage: { m_data: { ptr: 64 }, m_rows: 4294967296, m_cols: 4294967296 } }
"#;

    #[test]
    fn test_dynamic_rows_read_from_object() {
        let snap = Snapshot::from_yaml(DYNAMIC_SNAPSHOT).unwrap();
        let v = snap.variable("v").unwrap();
        let ty = v.value_type();
        let shape = dense_shape(&v, &ty).unwrap();
        assert_eq!(shape.rows, 5);
        assert_eq!(shape.cols, 1);
        assert_eq!(element_type(&ty).unwrap().to_string(), "double");
    }

    #[test]
    fn test_negative_runtime_size_is_unresolved() {
        let snap = Snapshot::from_yaml(DYNAMIC_SNAPSHOT).unwrap();
        let broken = snap.variable("broken").unwrap();
        let err = dense_shape(&broken, &broken.value_type()).unwrap_err();
        match err {
            FormatError::UnresolvedDynamicDimension { what, field, .. } => {
                assert_eq!(what, "rows");
                assert_eq!(field, "m_storage.m_rows");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_overflowing_element_count_is_unresolved() {
        let snap = Snapshot::from_yaml(DYNAMIC_SNAPSHOT).unwrap();
        let garbage = snap.variable("garbage").unwrap();
        let err = dense_shape(&garbage, &garbage.value_type()).unwrap_err();
        match err {
            FormatError::UnresolvedDynamicDimension { what, field, .. } => {
                assert_eq!(what, "size");
                assert_eq!(field, "m_storage.m_rows, m_storage.m_cols");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_len_saturates() {
        let shape = ShapeInfo::dense(usize::MAX, 2, StorageOrder::ColMajor);
        assert_eq!(shape.len(), usize::MAX);
    }
}

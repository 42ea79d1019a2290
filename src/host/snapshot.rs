//! Offline host adapter over a YAML image of types, memory and variables.
//!
//! A snapshot stands in for a paused process. It is what the CLI formats
//! and what the tests drive the printers with.
//!
//! ```yaml
//! types:
//!   "Eigen::Matrix<int, 2, 3, 0, 2, 3>":
//!     template_args: [{ type: int }, { value: 2 }, { value: 3 }]
//!     fields: [{ name: m_storage, type: "Storage" }]
//!   Storage:
//!     fields: [{ name: m_data, type: "int *" }]
//! memory:
//!   - { at: 4096, type: int, data: [1, 2, 3, 4, 5, 6] }
//! variables:
//!   - name: m
//!     type: "Eigen::Matrix<int, 2, 3, 0, 2, 3>"
//!     value: { m_storage: { m_data: { ptr: 4096 } } }
//! ```
//!
//! Type names ending in `*` are pointers and names ending in `&` are
//! references to the prefix type; a leading `const ` is a qualifier.
//! Built-in scalars (`int`, `double`, ...) need no declaration.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use super::{HostError, TemplateArgument, TypeCode, TypeDescriptor, Value};

/// Size of pointers and references in the snapshot's address space.
const POINTER_SIZE: u64 = 8;

/// Maximum typedef chain followed before giving up.
const MAX_TYPEDEF_DEPTH: usize = 32;

/// Built-in scalar types and their sizes in bytes.
fn builtin_scalar_size(name: &str) -> Option<u64> {
    let size = match name {
        "bool" | "char" | "signed char" | "unsigned char" => 1,
        "short" | "unsigned short" => 2,
        "int" | "unsigned int" | "float" => 4,
        "long" | "unsigned long" | "long long" | "unsigned long long" | "double" => 8,
        "long double" => 16,
        _ => return None,
    };
    Some(size)
}

// =============================================================================
// File format
// =============================================================================

/// Top-level snapshot document.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SnapshotFile {
    #[serde(default)]
    pub types: BTreeMap<String, TypeDef>,
    #[serde(default)]
    pub memory: Vec<Region>,
    #[serde(default)]
    pub variables: Vec<Variable>,
}

/// Declared kind of a named type. Pointers and references are derived
/// from the name and never declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DefCode {
    #[default]
    Struct,
    Scalar,
    Typedef,
    Array,
}

/// A named type.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct TypeDef {
    #[serde(default)]
    pub code: DefCode,
    /// Size in bytes (defaults to 8 for declared types).
    #[serde(default)]
    pub size: Option<u64>,
    /// Aliased type for typedefs, element type for arrays.
    #[serde(default)]
    pub target: Option<String>,
    /// Struct tag when it differs from the declared name.
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub template_args: Vec<TemplateArgDef>,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

/// A template argument as written in the snapshot: `{ type: int }` or
/// `{ value: 3 }`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TemplateArgDef {
    Type {
        #[serde(rename = "type")]
        name: String,
    },
    Value {
        value: i64,
    },
}

/// A struct member and its type name.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldDef {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

/// A run of scalars of one type at a base address.
#[derive(Debug, Clone, Deserialize)]
pub struct Region {
    pub at: u64,
    #[serde(rename = "type")]
    pub type_name: String,
    pub data: Vec<Scalar>,
}

/// A named variable in the snapshot.
#[derive(Debug, Clone, Deserialize)]
pub struct Variable {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub value: Node,
}

/// A scalar stored in memory or inline.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Int(i64),
    Float(f64),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(v) => write!(f, "{}", v),
            Scalar::Float(v) => write!(f, "{}", v),
        }
    }
}

/// `{ ptr: addr }`: a pointer holding `addr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PointerNode {
    pub ptr: u64,
}

/// `{ at: addr }`: an object that lives in memory at `addr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InMemoryNode {
    pub at: u64,
}

/// Inline value tree of a variable.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Scalar(Scalar),
    Pointer(PointerNode),
    InMemory(InMemoryNode),
    Struct(BTreeMap<String, Node>),
}

// =============================================================================
// Snapshot
// =============================================================================

/// A loaded snapshot. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Snapshot {
    file: Rc<SnapshotFile>,
}

impl Snapshot {
    /// Parse a snapshot from YAML text.
    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        let file: SnapshotFile = serde_yaml::from_str(content)?;
        let snap = Self::new(file);
        for region in &snap.file.memory {
            if snap.type_named(&region.type_name).size() == 0 {
                anyhow::bail!(
                    "memory region at {:#x} has zero-sized element type {}",
                    region.at,
                    region.type_name
                );
            }
        }
        Ok(snap)
    }

    /// Parse a snapshot from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    pub fn new(file: SnapshotFile) -> Self {
        Self {
            file: Rc::new(file),
        }
    }

    /// A type by name. Unknown names are accepted and behave as empty structs.
    pub fn type_named(&self, name: &str) -> SnapshotType {
        SnapshotType {
            snap: self.clone(),
            name: normalize_type_name(name),
        }
    }

    /// Names of all variables, in declaration order.
    pub fn variable_names(&self) -> Vec<String> {
        self.file.variables.iter().map(|v| v.name.clone()).collect()
    }

    /// The variable called `name`.
    pub fn variable(&self, name: &str) -> Option<SnapshotValue> {
        self.file
            .variables
            .iter()
            .find(|v| v.name == name)
            .map(|v| SnapshotValue::from_node(self.type_named(&v.type_name), v.value.clone()))
    }

    /// A `pointee *` value holding `address`.
    pub fn pointer_value(&self, pointee: &str, address: u64) -> SnapshotValue {
        SnapshotValue::pointer_to(self.type_named(pointee).pointer(), address)
    }

    fn def(&self, name: &str) -> Option<&TypeDef> {
        self.file.types.get(name)
    }

    /// Read the scalar of type `ty` at `address`.
    fn read(&self, address: u64, ty: &SnapshotType) -> Result<Scalar, HostError> {
        let unreadable = || HostError::UnreadableMemory {
            address,
            type_name: ty.name.clone(),
        };
        let size = ty.size();
        for region in &self.file.memory {
            if address < region.at {
                continue;
            }
            let element_size = self.type_named(&region.type_name).size();
            if element_size == 0 {
                continue;
            }
            let delta = address - region.at;
            if delta % element_size != 0 {
                continue;
            }
            let index = (delta / element_size) as usize;
            if let Some(scalar) = region.data.get(index) {
                if element_size != size {
                    return Err(unreadable());
                }
                return Ok(*scalar);
            }
        }
        Err(unreadable())
    }
}

/// Collapse runs of whitespace so `"int  *"` and `"int *"` name one type.
fn normalize_type_name(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}

// =============================================================================
// Types
// =============================================================================

/// Structural reading of a type name.
enum Shape<'a> {
    Reference(&'a str),
    Pointer(&'a str),
    Const(&'a str),
    Named(&'a str),
}

/// A type in a snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotType {
    snap: Snapshot,
    name: String,
}

impl SnapshotType {
    fn shape(&self) -> Shape<'_> {
        let name = self.name.as_str();
        if let Some(inner) = name.strip_suffix('&') {
            Shape::Reference(inner.trim_end())
        } else if let Some(inner) = name.strip_suffix('*') {
            Shape::Pointer(inner.trim_end())
        } else if let Some(inner) = name.strip_prefix("const ") {
            Shape::Const(inner)
        } else {
            Shape::Named(name)
        }
    }

    fn named(&self, name: &str) -> SnapshotType {
        self.snap.type_named(name)
    }

    fn def(&self) -> Option<&TypeDef> {
        match self.shape() {
            Shape::Named(name) => self.snap.def(name),
            _ => None,
        }
    }

    /// This type with references, qualifiers and typedefs removed.
    fn resolved(&self) -> SnapshotType {
        let mut current = self.clone();
        for _ in 0..MAX_TYPEDEF_DEPTH {
            let next = match current.shape() {
                Shape::Reference(inner) => current.named(inner),
                _ => current.unqualified().strip_typedefs().unqualified(),
            };
            if next.name == current.name {
                break;
            }
            current = next;
        }
        current
    }

    /// Pointee of a pointer type.
    fn pointee(&self) -> Result<SnapshotType, HostError> {
        match self.resolved().shape() {
            Shape::Pointer(inner) => Ok(self.named(inner)),
            _ => Err(HostError::NotAPointer(self.name.clone())),
        }
    }

    /// Size in bytes.
    pub fn size(&self) -> u64 {
        match self.shape() {
            Shape::Reference(_) | Shape::Pointer(_) => POINTER_SIZE,
            Shape::Const(inner) => self.named(inner).size(),
            Shape::Named(name) => match self.snap.def(name) {
                Some(def) if def.code == DefCode::Typedef && def.size.is_none() => {
                    let aliased = self.strip_typedefs();
                    if aliased.name == self.name {
                        8
                    } else {
                        aliased.size()
                    }
                }
                Some(def) => def.size.unwrap_or(8),
                None => builtin_scalar_size(name).unwrap_or(8),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for SnapshotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl TypeDescriptor for SnapshotType {
    fn code(&self) -> TypeCode {
        match self.shape() {
            Shape::Reference(_) => TypeCode::Reference,
            Shape::Pointer(_) => TypeCode::Pointer,
            Shape::Const(inner) => self.named(inner).code(),
            Shape::Named(name) => match self.snap.def(name) {
                Some(def) => match def.code {
                    DefCode::Struct => TypeCode::Struct,
                    DefCode::Scalar => TypeCode::Scalar,
                    DefCode::Typedef => TypeCode::Typedef,
                    DefCode::Array => TypeCode::Array,
                },
                None if builtin_scalar_size(name).is_some() => TypeCode::Scalar,
                None => TypeCode::Struct,
            },
        }
    }

    fn tag(&self) -> Option<String> {
        match self.shape() {
            Shape::Const(inner) => self.named(inner).tag(),
            Shape::Named(name) => match self.snap.def(name) {
                Some(def) if def.code == DefCode::Struct => {
                    Some(def.tag.clone().unwrap_or_else(|| name.to_string()))
                }
                Some(_) => None,
                None if builtin_scalar_size(name).is_some() => None,
                None => Some(name.to_string()),
            },
            _ => None,
        }
    }

    fn target(&self) -> Result<Self, HostError> {
        match self.shape() {
            Shape::Reference(inner) => Ok(self.named(inner)),
            _ => Err(HostError::NotAReference(self.name.clone())),
        }
    }

    fn unqualified(&self) -> Self {
        match self.shape() {
            Shape::Const(inner) => self.named(inner).unqualified(),
            _ => self.clone(),
        }
    }

    fn strip_typedefs(&self) -> Self {
        let mut current = self.clone();
        for _ in 0..MAX_TYPEDEF_DEPTH {
            let next = match current.shape() {
                Shape::Const(inner) => {
                    let stripped = current.named(inner).strip_typedefs();
                    return current.named(&format!("const {}", stripped.name));
                }
                Shape::Named(name) => match current.snap.def(name) {
                    Some(TypeDef {
                        code: DefCode::Typedef,
                        target: Some(target),
                        ..
                    }) => current.named(target),
                    _ => return current,
                },
                _ => return current,
            };
            current = next;
        }
        current
    }

    fn template_argument(&self, index: usize) -> Result<TemplateArgument<Self>, HostError> {
        let missing = || HostError::MissingTemplateArgument {
            type_name: self.name.clone(),
            index,
        };
        let def = self.def().ok_or_else(missing)?;
        match def.template_args.get(index).ok_or_else(missing)? {
            TemplateArgDef::Type { name } => Ok(TemplateArgument::Type(self.named(name))),
            TemplateArgDef::Value { value } => Ok(TemplateArgument::Value(*value)),
        }
    }

    fn pointer(&self) -> Self {
        self.named(&format!("{} *", self.name))
    }
}

// =============================================================================
// Values
// =============================================================================

#[derive(Debug, Clone)]
enum Place {
    Inline(Node),
    Memory(u64),
}

/// A value in a snapshot: an inline node or an object at an address.
#[derive(Debug, Clone)]
pub struct SnapshotValue {
    ty: SnapshotType,
    place: Place,
}

impl SnapshotValue {
    fn from_node(ty: SnapshotType, node: Node) -> Self {
        let place = match node {
            Node::InMemory(InMemoryNode { at }) => Place::Memory(at),
            other => Place::Inline(other),
        };
        Self { ty, place }
    }

    fn snap(&self) -> &Snapshot {
        &self.ty.snap
    }

    fn pointer_to(ty: SnapshotType, address: u64) -> Self {
        Self {
            ty,
            place: Place::Inline(Node::Pointer(PointerNode { ptr: address })),
        }
    }

    /// The address held by a pointer value.
    pub fn address(&self) -> Result<u64, HostError> {
        if self.ty.resolved().code() != TypeCode::Pointer {
            return Err(HostError::NotAPointer(self.ty.name.clone()));
        }
        match &self.place {
            Place::Inline(Node::Pointer(p)) => Ok(p.ptr),
            Place::Inline(Node::Scalar(Scalar::Int(v))) => Ok(*v as u64),
            Place::Memory(at) => match self.snap().read(*at, &self.ty)? {
                Scalar::Int(v) => Ok(v as u64),
                Scalar::Float(_) => Err(HostError::NotAPointer(self.ty.name.clone())),
            },
            _ => Err(HostError::NotAPointer(self.ty.name.clone())),
        }
    }

    /// The scalar this value holds, reading memory if needed.
    pub fn scalar(&self) -> Result<Scalar, HostError> {
        match &self.place {
            Place::Inline(Node::Scalar(s)) => Ok(*s),
            Place::Memory(at) => self.snap().read(*at, &self.ty),
            _ => Err(HostError::NotAnInteger(self.ty.name.clone())),
        }
    }
}

impl Value for SnapshotValue {
    type Type = SnapshotType;

    fn value_type(&self) -> SnapshotType {
        self.ty.clone()
    }

    fn field(&self, name: &str) -> Result<Self, HostError> {
        let missing = || HostError::MissingField {
            type_name: self.ty.name.clone(),
            field: name.to_string(),
        };
        let canonical = self.ty.resolved();
        let def = match (canonical.def(), canonical.shape()) {
            (Some(def), _) => def,
            (None, Shape::Named(name)) if builtin_scalar_size(name).is_none() => {
                return Err(HostError::UnknownType(name.to_string()));
            }
            (None, _) => return Err(missing()),
        };
        let field = def.fields.iter().find(|f| f.name == name).ok_or_else(missing)?;
        let field_type = canonical.named(&field.type_name);
        match &self.place {
            Place::Inline(Node::Struct(members)) => {
                let node = members.get(name).cloned().ok_or_else(missing)?;
                Ok(Self::from_node(field_type, node))
            }
            Place::Memory(at) => Err(HostError::UnreadableMemory {
                address: *at,
                type_name: self.ty.name.clone(),
            }),
            _ => Err(missing()),
        }
    }

    fn cast(&self, target: &SnapshotType) -> Result<Self, HostError> {
        let bad_cast = || HostError::BadCast {
            from: self.ty.name.clone(),
            to: target.name.clone(),
        };
        let source = self.ty.resolved();
        let wanted = target.resolved();
        if wanted.code() == TypeCode::Pointer {
            let address = match (&self.place, source.code()) {
                (_, TypeCode::Pointer) => self.address()?,
                // Arrays and in-memory objects decay to their address.
                (Place::Memory(at), _) => *at,
                (Place::Inline(Node::Scalar(Scalar::Int(v))), TypeCode::Scalar) => *v as u64,
                _ => return Err(bad_cast()),
            };
            return Ok(Self::pointer_to(target.clone(), address));
        }
        if source.code() == TypeCode::Scalar && wanted.code() == TypeCode::Scalar
            || source.name == wanted.name
        {
            return Ok(Self {
                ty: target.clone(),
                place: self.place.clone(),
            });
        }
        Err(bad_cast())
    }

    fn dereference(&self) -> Result<Self, HostError> {
        let pointee = self.ty.pointee()?;
        let address = self.address()?;
        if pointee.resolved().code() == TypeCode::Scalar {
            // Scalars are read eagerly so unreadable memory surfaces here.
            let scalar = self.snap().read(address, &pointee)?;
            return Ok(Self {
                ty: pointee,
                place: Place::Inline(Node::Scalar(scalar)),
            });
        }
        Ok(Self {
            ty: pointee,
            place: Place::Memory(address),
        })
    }

    fn offset(&self, count: i64) -> Result<Self, HostError> {
        let pointee = self.ty.pointee()?;
        let address = self.address()?;
        let moved = address as i128 + count as i128 * pointee.size() as i128;
        let moved = u64::try_from(moved).map_err(|_| HostError::UnreadableMemory {
            address,
            type_name: pointee.name.clone(),
        })?;
        Ok(Self::pointer_to(self.ty.clone(), moved))
    }

    fn to_i64(&self) -> Result<i64, HostError> {
        match self.scalar() {
            Ok(Scalar::Int(v)) => Ok(v),
            _ => Err(HostError::NotAnInteger(self.to_string())),
        }
    }
}

impl fmt::Display for SnapshotValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Ok(address) = self.address() {
            return write!(f, "{:#x}", address);
        }
        match &self.place {
            Place::Inline(Node::Scalar(s)) => write!(f, "{}", s),
            Place::Inline(Node::Pointer(p)) => write!(f, "{:#x}", p.ptr),
            Place::Inline(Node::InMemory(InMemoryNode { at })) | Place::Memory(at) => {
                match self.snap().read(*at, &self.ty) {
                    Ok(s) => write!(f, "{}", s),
                    Err(_) => write!(f, "@{:#x}", at),
                }
            }
            Place::Inline(Node::Struct(_)) => {
                write!(f, "{{")?;
                let mut first = true;
                for (name, member) in self.members() {
                    if !first {
                        write!(f, ", ")?;
                    }
                    first = false;
                    match member {
                        Ok(value) => write!(f, "{} = {}", name, value)?,
                        Err(_) => write!(f, "{} = <unavailable>", name)?,
                    }
                }
                write!(f, "}}")
            }
        }
    }
}

impl SnapshotValue {
    /// Struct members in declaration order.
    fn members(&self) -> Vec<(String, Result<SnapshotValue, HostError>)> {
        let names: Vec<String> = self
            .ty
            .resolved()
            .def()
            .map(|def| def.fields.iter().map(|f| f.name.clone()).collect())
            .unwrap_or_default();
        names
            .into_iter()
            .map(|name| {
                let value = self.field(&name);
                (name, value)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = r#"
types:
  Pair:
    fields:
      - { name: first, type: int }
      - { name: second, type: "double *" }
  PairAlias:
    code: typedef
    target: Pair
  "Box<int, 3>":
    template_args: [{ type: int }, { value: 3 }]
    fields:
      - { name: items, type: "int[3]" }
  "int[3]":
    code: array
    target: int
    size: 12
memory:
  - { at: 256, type: double, data: [1.5, 2.5, 3.5] }
  - { at: 512, type: int, data: [10, 20, 30] }
variables:
  - name: pair
    type: "const PairAlias &"
    value: { first: 7, second: { ptr: 256 } }
  - name: boxed
    type: "Box<int, 3>"
    value: { items: { at: 512 } }
"#;

    fn snapshot() -> Snapshot {
        Snapshot::from_yaml(SNAPSHOT).unwrap()
    }

    #[test]
    fn test_type_shapes() {
        let snap = snapshot();
        let ty = snap.type_named("const PairAlias &");
        assert_eq!(ty.code(), TypeCode::Reference);

        let target = ty.target().unwrap();
        assert_eq!(target.to_string(), "const PairAlias");
        assert_eq!(target.code(), TypeCode::Typedef);

        let canonical = target.unqualified().strip_typedefs();
        assert_eq!(canonical.to_string(), "Pair");
        assert_eq!(canonical.code(), TypeCode::Struct);
        assert_eq!(canonical.tag().as_deref(), Some("Pair"));
    }

    #[test]
    fn test_builtin_scalars_have_no_tag() {
        let snap = snapshot();
        let ty = snap.type_named("double");
        assert_eq!(ty.code(), TypeCode::Scalar);
        assert_eq!(ty.tag(), None);
        assert_eq!(ty.size(), 8);
        assert_eq!(ty.pointer().code(), TypeCode::Pointer);
    }

    #[test]
    fn test_template_arguments() {
        let snap = snapshot();
        let ty = snap.type_named("Box<int, 3>");
        match ty.template_argument(0).unwrap() {
            TemplateArgument::Type(t) => assert_eq!(t.to_string(), "int"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            ty.template_argument(1).unwrap(),
            TemplateArgument::Value(3)
        ));
        assert!(matches!(
            ty.template_argument(2),
            Err(HostError::MissingTemplateArgument { index: 2, .. })
        ));
    }

    #[test]
    fn test_pointer_arithmetic_and_dereference() {
        let snap = snapshot();
        let pair = snap.variable("pair").unwrap();
        let second = pair.field("second").unwrap();
        assert_eq!(second.to_string(), "0x100");

        let third = second.offset(2).unwrap();
        assert_eq!(third.dereference().unwrap().to_string(), "3.5");
        assert_eq!(pair.field("first").unwrap().to_i64().unwrap(), 7);
    }

    #[test]
    fn test_array_decays_to_pointer() {
        let snap = snapshot();
        let boxed = snap.variable("boxed").unwrap();
        let items = boxed.field("items").unwrap();
        let ptr = items.cast(&snap.type_named("int").pointer()).unwrap();
        let values: Vec<i64> = (0..3)
            .map(|i| ptr.offset(i).unwrap().dereference().unwrap().to_i64().unwrap())
            .collect();
        assert_eq!(values, vec![10, 20, 30]);
    }

    #[test]
    fn test_unreadable_memory() {
        let snap = snapshot();
        let ptr = snap.variable("pair").unwrap().field("second").unwrap();
        let err = ptr.offset(3).unwrap().dereference().unwrap_err();
        assert!(matches!(err, HostError::UnreadableMemory { address: 280, .. }));
    }

    #[test]
    fn test_missing_field() {
        let snap = snapshot();
        let pair = snap.variable("pair").unwrap();
        assert!(matches!(
            pair.field("third"),
            Err(HostError::MissingField { .. })
        ));
    }

    #[test]
    fn test_zero_sized_region_is_rejected() {
        let yaml = "types:\n  Z:\n    size: 0\nmemory:\n  - { at: 16, type: Z, data: [1] }\n";
        let err = Snapshot::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("zero-sized"));
    }

    #[test]
    fn test_zero_sized_region_is_skipped_when_reading() {
        let file: SnapshotFile = serde_yaml::from_str(
            "types:\n  Z:\n    size: 0\nmemory:\n  - { at: 16, type: Z, data: [1] }\n  - { at: 16, type: int, data: [5, 6] }\n",
        )
        .unwrap();
        let snap = Snapshot::new(file);
        let value = snap.pointer_value("int", 20).dereference().unwrap();
        assert_eq!(value.to_i64().unwrap(), 6);
        assert!(snap.pointer_value("int", 28).dereference().is_err());
    }

    #[test]
    fn test_undeclared_struct_has_no_fields() {
        let snap = Snapshot::from_yaml(
            "variables:\n  - { name: opaque, type: Mystery, value: {} }\n",
        )
        .unwrap();
        let opaque = snap.variable("opaque").unwrap();
        assert_eq!(
            opaque.field("m_data").unwrap_err(),
            HostError::UnknownType("Mystery".to_string())
        );
    }

    #[test]
    fn test_struct_display() {
        let snap = snapshot();
        let pair = snap.variable("pair").unwrap();
        assert_eq!(pair.to_string(), "{first = 7, second = 0x100}");
    }
}

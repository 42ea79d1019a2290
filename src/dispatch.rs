//! Type-name dispatch from a value to the printer that understands it.
//!
//! The table is an ordered list of (pattern, kind) entries, tested top to
//! bottom against the value's canonical type name. The process-wide table is
//! built once and never changes afterwards.

use once_cell::sync::OnceCell;
use regex::Regex;

use crate::config::{PrinterConfig, DEFAULT_NAMESPACE};
use crate::error::Result;
use crate::host::{canonical_type, PrinterChain, TypeDescriptor, Value};
use crate::printers::{DensePrinter, Printer, QuaternionPrinter, RefPrinter};

/// Name under which [`lookup`] is installed in a host chain.
pub const PRINTER_NAME: &str = "eigenprint";

/// The kinds of value a printer exists for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrinterKind {
    Quaternion,
    Ref,
    Matrix,
    Array,
}

impl PrinterKind {
    /// Registration order of the built-in entries.
    pub const ALL: [PrinterKind; 4] = [
        PrinterKind::Quaternion,
        PrinterKind::Ref,
        PrinterKind::Matrix,
        PrinterKind::Array,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PrinterKind::Quaternion => "Quaternion",
            PrinterKind::Ref => "Ref",
            PrinterKind::Matrix => "Matrix",
            PrinterKind::Array => "Array",
        }
    }

    fn construct<V: Value>(self, label: String, value: V) -> Result<Printer<V>> {
        Ok(match self {
            PrinterKind::Quaternion => Printer::Quaternion(QuaternionPrinter::new(label, value)?),
            PrinterKind::Ref => Printer::Ref(RefPrinter::new(label, value)?),
            PrinterKind::Matrix | PrinterKind::Array => {
                Printer::Dense(DensePrinter::new(label, value)?)
            }
        })
    }
}

impl std::fmt::Display for PrinterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One row of the dispatch table.
#[derive(Debug, Clone)]
pub struct FormatterEntry {
    pattern: Regex,
    kind: PrinterKind,
    label: String,
}

impl FormatterEntry {
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn kind(&self) -> PrinterKind {
        self.kind
    }

    /// Qualified kind name shown in summaries, e.g. `Eigen::Matrix`.
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Ordered mapping from type-name pattern to printer kind.
#[derive(Debug, Clone)]
pub struct DispatchTable {
    namespace: String,
    entries: Vec<FormatterEntry>,
}

impl DispatchTable {
    /// A table with no entries.
    pub fn empty(namespace: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            entries: Vec::new(),
        }
    }

    /// The built-in table for `namespace`.
    pub fn new(namespace: &str) -> anyhow::Result<Self> {
        let escaped = regex::escape(namespace);
        PrinterKind::ALL.iter().try_fold(Self::empty(namespace), |table, kind| {
            table.with_entry(&format!("^{}::{}<.*>$", escaped, kind.as_str()), *kind)
        })
    }

    /// The built-in table for the configured namespace.
    pub fn from_config(config: &PrinterConfig) -> anyhow::Result<Self> {
        config.validate()?;
        Self::new(&config.namespace)
    }

    /// Append an entry; it is consulted after every existing entry.
    pub fn with_entry(mut self, pattern: &str, kind: PrinterKind) -> anyhow::Result<Self> {
        let regex = Regex::new(pattern)
            .map_err(|e| anyhow::anyhow!("compiling pattern {:?}: {}", pattern, e))?;
        self.entries.push(FormatterEntry {
            pattern: regex,
            kind,
            label: format!("{}::{}", self.namespace, kind.as_str()),
        });
        Ok(self)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn entries(&self) -> &[FormatterEntry] {
        &self.entries
    }

    /// First entry whose pattern matches `type_name`.
    pub fn find(&self, type_name: &str) -> Option<&FormatterEntry> {
        self.entries.iter().find(|e| e.pattern.is_match(type_name))
    }

    /// Build the printer for `value`, or `Ok(None)` if no entry claims it.
    ///
    /// References, qualifiers and typedefs are stripped before matching.
    /// Errors come from constructing the matched printer and concern this
    /// value only.
    pub fn lookup<V: Value>(&self, value: &V) -> Result<Option<Printer<V>>> {
        let ty = canonical_type(&value.value_type())?;
        let Some(type_name) = ty.tag() else {
            return Ok(None);
        };
        let Some(entry) = self.find(&type_name) else {
            log::trace!("no printer for {}", type_name);
            return Ok(None);
        };
        log::debug!("{} matched {}", type_name, entry.pattern());
        match entry.kind.construct(entry.label.clone(), value.clone()) {
            Ok(printer) => Ok(Some(printer)),
            Err(err) => {
                log::debug!("cannot build {} printer for {}: {}", entry.kind, type_name, err);
                Err(err)
            }
        }
    }
}

/// Process-wide table, built on first use.
static TABLE: OnceCell<DispatchTable> = OnceCell::new();

/// Build the process-wide table from `config`.
///
/// Only the first call builds anything; later calls return the existing
/// table unchanged.
pub fn init(config: &PrinterConfig) -> anyhow::Result<&'static DispatchTable> {
    let table = TABLE.get_or_try_init(|| DispatchTable::from_config(config))?;
    if table.namespace() != config.namespace {
        log::warn!(
            "printer table already built for namespace {}, ignoring {}",
            table.namespace(),
            config.namespace
        );
    }
    Ok(table)
}

/// The process-wide table, built for the default namespace if [`init`] was
/// never called.
pub fn table() -> &'static DispatchTable {
    TABLE.get_or_init(|| {
        DispatchTable::new(DEFAULT_NAMESPACE).expect("built-in patterns are valid regexes")
    })
}

/// Look `value` up in the process-wide table.
pub fn lookup<V: Value>(value: &V) -> Result<Option<Printer<V>>> {
    table().lookup(value)
}

/// Install [`lookup`] at the end of a host chain.
///
/// Idempotent: a chain that already holds it is left alone.
pub fn register_printers<V: Value, C: PrinterChain<V>>(chain: &mut C) {
    table();
    if chain.contains(PRINTER_NAME) {
        return;
    }
    chain.append(PRINTER_NAME, lookup::<V>);
}

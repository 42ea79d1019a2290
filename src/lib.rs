//! eigenprint - debugger pretty-printing for Eigen values.
//!
//! Given a handle to a live `Matrix`, `Array`, `Ref` or `Quaternion` inside a
//! paused process, eigenprint produces a one-line summary and a lazily
//! enumerated, labelled list of elements. It is host-agnostic: a debugger
//! integration implements the narrow traits in [`host`] and installs the
//! lookup entry point in its printer chain.
//!
//! # Architecture
//!
//! - `host`: capability traits, the printer chain and an offline YAML snapshot adapter
//! - `introspect`: template parameter parsing and shape resolution
//! - `printers`: one printer per kind plus the element cursor
//! - `dispatch`: the type-name pattern table and the lookup entry point
//! - `config`: YAML configuration
//! - `render`: output formatting (text, JSON)
//!
//! # Example
//!
//! ```no_run
//! use eigenprint::host::{LookupChain, Snapshot, SnapshotValue};
//! use eigenprint::printers::ValuePrinter;
//!
//! let snap = Snapshot::parse_file("snapshot.yaml")?;
//! let mut chain: LookupChain<SnapshotValue> = LookupChain::new();
//! eigenprint::register_printers(&mut chain);
//!
//! let value = snap.variable("m").expect("variable exists");
//! if let Some(printer) = chain.format(&value)? {
//!     println!("{}", printer.summary());
//!     for child in printer.children() {
//!         let child = child?;
//!         println!("  {} = {}", child.label, child.value);
//!     }
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod host;
pub mod introspect;
pub mod printers;
pub mod render;

pub use config::PrinterConfig;
pub use dispatch::{lookup, register_printers, DispatchTable, PrinterKind};
pub use error::{FormatError, Result};
pub use host::{HostError, PrinterChain, TypeDescriptor, Value};
pub use printers::{Child, Printer, ValuePrinter};

/// Build the process-wide dispatch table from `config`.
///
/// Call this once at startup, before the first lookup, when the defaults are
/// not wanted.
pub fn init(config: &PrinterConfig) -> anyhow::Result<()> {
    dispatch::init(config)?;
    Ok(())
}

//! The host's global chain of printer lookup functions.

use crate::error::Result;
use crate::printers::Printer;

use super::Value;

/// Entry point a host calls to ask "can you format this value?".
pub type LookupFn<V> = fn(&V) -> Result<Option<Printer<V>>>;

/// Where a host keeps its lookup functions.
pub trait PrinterChain<V: Value> {
    /// Whether a lookup function called `name` is already installed.
    fn contains(&self, name: &str) -> bool;

    /// Install `lookup` at the end of the chain.
    fn append(&mut self, name: &'static str, lookup: LookupFn<V>);
}

/// An ordered chain of named lookup functions, tried first to last.
pub struct LookupChain<V: Value> {
    entries: Vec<(&'static str, LookupFn<V>)>,
}

impl<V: Value> LookupChain<V> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Names of installed lookup functions, in order.
    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|(name, _)| *name).collect()
    }

    /// Ask each lookup function in turn; the first printer or error wins.
    ///
    /// `Ok(None)` means the host should fall back to its default rendering.
    pub fn format(&self, value: &V) -> Result<Option<Printer<V>>> {
        for (name, lookup) in &self.entries {
            if let Some(printer) = lookup(value)? {
                log::trace!("{} claimed {}", name, value.value_type());
                return Ok(Some(printer));
            }
        }
        Ok(None)
    }
}

impl<V: Value> Default for LookupChain<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Value> PrinterChain<V> for LookupChain<V> {
    fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| *n == name)
    }

    fn append(&mut self, name: &'static str, lookup: LookupFn<V>) {
        self.entries.push((name, lookup));
    }
}

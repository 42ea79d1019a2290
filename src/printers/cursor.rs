//! Element cursor shared by the dense and strided printers.

use crate::error::{FormatError, Result};
use crate::host::Value;
use crate::introspect::ShapeInfo;

use super::Child;

/// Walks a 2-D object in memory order, yielding one labelled element per step.
///
/// The pointer moves by the inner stride along the fast axis. Crossing into
/// the next sweep jumps to the previous sweep's start plus the outer stride,
/// so the element at (fast, slow) is read from `fast * inner + slow * outer`.
///
/// A host failure is yielded once and ends the walk.
pub struct ElementCursor<V: Value> {
    shape: ShapeInfo,
    sweep_start: V,
    data: V,
    fast: usize,
    slow: usize,
    emitted: usize,
    pending: Option<FormatError>,
    done: bool,
}

impl<V: Value> ElementCursor<V> {
    /// Start a walk at `data`, a pointer to the first element.
    pub fn new(shape: ShapeInfo, data: V) -> Self {
        Self {
            shape,
            sweep_start: data.clone(),
            data,
            fast: 0,
            slow: 0,
            emitted: 0,
            pending: None,
            done: shape.is_empty(),
        }
    }

    /// Current (row, col).
    fn current_coords(&self) -> (usize, usize) {
        self.shape.coords(self.fast, self.slow)
    }

    fn advance(&mut self) -> Result<()> {
        self.fast += 1;
        if self.fast >= self.shape.fast_len() {
            self.fast = 0;
            self.slow += 1;
            self.sweep_start = self.sweep_start.offset(self.shape.outer_stride)?;
            self.data = self.sweep_start.clone();
        } else {
            self.data = self.data.offset(self.shape.inner_stride)?;
        }
        Ok(())
    }
}

impl<V: Value> Iterator for ElementCursor<V> {
    type Item = Result<Child<V>>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(err) = self.pending.take() {
            self.done = true;
            return Some(Err(err));
        }
        if self.done {
            return None;
        }

        let (row, col) = self.current_coords();
        let value = match self.data.dereference() {
            Ok(value) => value,
            Err(err) => {
                self.done = true;
                return Some(Err(err.into()));
            }
        };
        let child = Child {
            label: self.shape.label(row, col),
            value,
        };

        self.emitted += 1;
        if self.emitted >= self.shape.len() {
            self.done = true;
        } else if let Err(err) = self.advance() {
            self.pending = Some(err);
        }
        Some(Ok(child))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done && self.pending.is_none() {
            return (0, Some(0));
        }
        let remaining = self.shape.len() - self.emitted + self.pending.is_some() as usize;
        (0, Some(remaining))
    }
}

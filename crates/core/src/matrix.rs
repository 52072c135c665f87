// PinLab - GPIO Pin-State Matrix
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::store::{CellStore, HeapStore};
use crate::{MatrixError, MatrixResult, PinFunction, PinState, Port};
use std::sync::Arc;

/// Owned (port x pin x function) cell state behind a single handle.
///
/// All cells live in one flat buffer addressed by linear offset; the handle
/// records the store the buffer came from so destruction returns it through
/// the same seam. A handle is either live (buffer present) or absent
/// (destroyed); no partially-built handle is ever observable.
#[derive(Debug)]
pub struct PinMatrix {
    pin_count: usize,
    cells: Option<Box<[PinState]>>,
    store: Arc<dyn CellStore>,
}

impl PinMatrix {
    /// Build a matrix with `pin_count` pins per port on the process heap.
    pub fn create(pin_count: usize) -> MatrixResult<Self> {
        Self::create_in(pin_count, Arc::new(HeapStore))
    }

    /// Build a matrix allocating through the given store.
    ///
    /// On any failure the storage acquired so far is still owned by this
    /// scope and dropped before the error is returned; the caller never
    /// sees a partially-built handle.
    pub fn create_in(pin_count: usize, store: Arc<dyn CellStore>) -> MatrixResult<Self> {
        if pin_count == 0 {
            return Err(MatrixError::InvalidArgument("pin count must be positive"));
        }

        let cell_count = Port::COUNT
            .checked_mul(pin_count)
            .and_then(|n| n.checked_mul(PinFunction::COUNT))
            .ok_or(MatrixError::OutOfMemory(usize::MAX))?;

        let cells = store
            .try_alloc(cell_count)
            .ok_or(MatrixError::OutOfMemory(cell_count))?;

        tracing::debug!(pin_count, cell_count, "pin matrix allocated");

        Ok(Self {
            pin_count,
            cells: Some(cells),
            store,
        })
    }

    pub fn pin_count(&self) -> usize {
        self.pin_count
    }

    pub fn is_live(&self) -> bool {
        self.cells.is_some()
    }

    fn cell_index(&self, port: Port, pin: usize, function: PinFunction) -> MatrixResult<usize> {
        if pin >= self.pin_count {
            return Err(MatrixError::PinOutOfRange {
                pin,
                pin_count: self.pin_count,
            });
        }
        Ok((port.index() * self.pin_count + pin) * PinFunction::COUNT + function.index())
    }

    /// Read one cell.
    pub fn get(&self, port: Port, pin: usize, function: PinFunction) -> MatrixResult<PinState> {
        let index = self.cell_index(port, pin, function)?;
        let cells = self
            .cells
            .as_ref()
            .ok_or(MatrixError::InvalidArgument("matrix has been destroyed"))?;
        Ok(cells[index])
    }

    /// Write one cell. Cells are independent; no other cell is touched.
    pub fn set(
        &mut self,
        port: Port,
        pin: usize,
        function: PinFunction,
        state: PinState,
    ) -> MatrixResult<()> {
        let index = self.cell_index(port, pin, function)?;
        let cells = self
            .cells
            .as_mut()
            .ok_or(MatrixError::InvalidArgument("matrix has been destroyed"))?;
        cells[index] = state;
        Ok(())
    }

    /// Release the cell storage and mark the handle absent.
    ///
    /// Safe to call again on an already-released handle: the second call
    /// finds nothing to release and succeeds without touching storage.
    pub fn destroy(&mut self) -> MatrixResult<()> {
        if !self.release_cells() {
            tracing::debug!("destroy on an already-released matrix; nothing to do");
        }
        Ok(())
    }

    fn release_cells(&mut self) -> bool {
        match self.cells.take() {
            Some(cells) => {
                tracing::debug!(
                    pin_count = self.pin_count,
                    cell_count = cells.len(),
                    "pin matrix released"
                );
                self.store.release(cells);
                true
            }
            None => false,
        }
    }

    /// JSON view of the full cell state, ports -> pins -> function states.
    pub fn snapshot(&self) -> serde_json::Value {
        let ports = match self.cells.as_ref() {
            Some(cells) => Port::ALL
                .iter()
                .map(|&port| PortSnapshot {
                    port,
                    pins: (0..self.pin_count)
                        .map(|pin| {
                            let base = (port.index() * self.pin_count + pin) * PinFunction::COUNT;
                            PinSnapshot {
                                output: cells[base + PinFunction::Output.index()],
                                input: cells[base + PinFunction::Input.index()],
                                alternate: cells[base + PinFunction::Alternate.index()],
                            }
                        })
                        .collect(),
                })
                .collect(),
            None => Vec::new(),
        };

        let snapshot = MatrixSnapshot {
            pin_count: self.pin_count,
            live: self.is_live(),
            ports,
        };
        serde_json::to_value(snapshot).unwrap_or(serde_json::Value::Null)
    }
}

impl Drop for PinMatrix {
    fn drop(&mut self) {
        self.release_cells();
    }
}

#[derive(Debug, serde::Serialize)]
struct MatrixSnapshot {
    pin_count: usize,
    live: bool,
    ports: Vec<PortSnapshot>,
}

#[derive(Debug, serde::Serialize)]
struct PortSnapshot {
    port: Port,
    pins: Vec<PinSnapshot>,
}

#[derive(Debug, serde::Serialize)]
struct PinSnapshot {
    output: PinState,
    input: PinState,
    alternate: PinState,
}

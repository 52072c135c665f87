// PinLab - GPIO Pin-State Matrix
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::PinState;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Source of cell buffers for a matrix.
///
/// Allocation is a primitive step: it hands back a usable buffer or declines
/// with `None`. Buffers go back to the store they came from via `release`.
pub trait CellStore: std::fmt::Debug + Send + Sync {
    /// Allocate a buffer of `cells` cells, all initialized to `Off`.
    fn try_alloc(&self, cells: usize) -> Option<Box<[PinState]>>;

    /// Return a buffer previously handed out by `try_alloc`.
    fn release(&self, cells: Box<[PinState]>);
}

/// Default store backed by the process heap.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeapStore;

impl CellStore for HeapStore {
    fn try_alloc(&self, cells: usize) -> Option<Box<[PinState]>> {
        let mut buf = Vec::new();
        if buf.try_reserve_exact(cells).is_err() {
            return None;
        }
        buf.resize(cells, PinState::Off);
        Some(buf.into_boxed_slice())
    }

    fn release(&self, cells: Box<[PinState]>) {
        drop(cells);
    }
}

/// Decorator that keeps allocation accounting in front of another store.
///
/// `live_blocks() == 0` after a create/destroy pair is the leak oracle the
/// lifecycle tests rely on.
#[derive(Debug, Default)]
pub struct CountingStore<S: CellStore> {
    inner: S,
    live_blocks: AtomicUsize,
    live_cells: AtomicUsize,
    total_allocs: AtomicUsize,
    total_releases: AtomicUsize,
}

impl<S: CellStore> CountingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            live_blocks: AtomicUsize::new(0),
            live_cells: AtomicUsize::new(0),
            total_allocs: AtomicUsize::new(0),
            total_releases: AtomicUsize::new(0),
        }
    }

    /// Buffers handed out and not yet returned.
    pub fn live_blocks(&self) -> usize {
        self.live_blocks.load(Ordering::SeqCst)
    }

    /// Cells across all live buffers.
    pub fn live_cells(&self) -> usize {
        self.live_cells.load(Ordering::SeqCst)
    }

    pub fn total_allocs(&self) -> usize {
        self.total_allocs.load(Ordering::SeqCst)
    }

    pub fn total_releases(&self) -> usize {
        self.total_releases.load(Ordering::SeqCst)
    }
}

impl<S: CellStore> CellStore for CountingStore<S> {
    fn try_alloc(&self, cells: usize) -> Option<Box<[PinState]>> {
        let buf = self.inner.try_alloc(cells)?;
        self.live_blocks.fetch_add(1, Ordering::SeqCst);
        self.live_cells.fetch_add(buf.len(), Ordering::SeqCst);
        self.total_allocs.fetch_add(1, Ordering::SeqCst);
        Some(buf)
    }

    fn release(&self, cells: Box<[PinState]>) {
        self.live_blocks.fetch_sub(1, Ordering::SeqCst);
        self.live_cells.fetch_sub(cells.len(), Ordering::SeqCst);
        self.total_releases.fetch_add(1, Ordering::SeqCst);
        self.inner.release(cells);
    }
}

#[cfg(test)]
mod tests {
    use super::{CellStore, CountingStore, HeapStore};
    use crate::PinState;

    #[test]
    fn test_heap_store_initializes_cells_off() {
        let buf = HeapStore.try_alloc(12).unwrap();
        assert_eq!(buf.len(), 12);
        assert!(buf.iter().all(|c| *c == PinState::Off));
    }

    #[test]
    fn test_heap_store_zero_cells() {
        let buf = HeapStore.try_alloc(0).unwrap();
        assert!(buf.is_empty());
    }

    #[test]
    fn test_counting_store_tracks_live_buffers() {
        let store = CountingStore::new(HeapStore);
        let a = store.try_alloc(12).unwrap();
        let b = store.try_alloc(24).unwrap();
        assert_eq!(store.live_blocks(), 2);
        assert_eq!(store.live_cells(), 36);
        assert_eq!(store.total_allocs(), 2);

        store.release(a);
        assert_eq!(store.live_blocks(), 1);
        assert_eq!(store.live_cells(), 24);

        store.release(b);
        assert_eq!(store.live_blocks(), 0);
        assert_eq!(store.live_cells(), 0);
        assert_eq!(store.total_releases(), 2);
    }
}

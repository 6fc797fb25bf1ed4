//! Buffer lifetime accounting
//!
//! Every flat engine buffer of arbitrary-precision cells is owned by a
//! [`CellBuffer`]. Construction registers the cell count with a counter and
//! `Drop` unregisters it, so the balance drains on every exit path
//! (return, error, cancellation). Operations register with the process-wide
//! counter behind [`live_cells`]; callers that need an isolated balance can
//! supply their own [`CellCounter`].

use std::sync::atomic::{AtomicIsize, Ordering};
use std::sync::Arc;

/// A live-cell balance.
#[derive(Debug, Default)]
pub struct CellCounter {
    live: AtomicIsize,
}

impl CellCounter {
    pub const fn new() -> Self {
        Self {
            live: AtomicIsize::new(0),
        }
    }

    pub fn live(&self) -> isize {
        self.live.load(Ordering::SeqCst)
    }

    fn add(&self, n: isize) {
        self.live.fetch_add(n, Ordering::SeqCst);
    }
}

static GLOBAL: CellCounter = CellCounter::new();

/// Cells currently alive across all process-wide buffers.
pub fn live_cells() -> isize {
    GLOBAL.live()
}

/// An owned flat buffer of R×C scalar cells in some engine layout.
///
/// The buffer records its logical dimensions; the stride interpretation
/// belongs to the [`crate::layout::EngineLayout`] that produced it.
#[derive(Debug)]
pub struct CellBuffer<T> {
    cells: Vec<T>,
    rows: usize,
    cols: usize,
    counter: Option<Arc<CellCounter>>,
}

impl<T> CellBuffer<T> {
    /// Take ownership of `cells` as an R×C buffer on the global counter.
    pub fn from_cells(cells: Vec<T>, rows: usize, cols: usize) -> Self {
        assert_eq!(cells.len(), rows * cols);
        GLOBAL.add(cells.len() as isize);
        Self {
            cells,
            rows,
            cols,
            counter: None,
        }
    }

    /// Same, but accounted against a caller-supplied counter.
    pub fn from_cells_counted(
        cells: Vec<T>,
        rows: usize,
        cols: usize,
        counter: Arc<CellCounter>,
    ) -> Self {
        assert_eq!(cells.len(), rows * cols);
        counter.add(cells.len() as isize);
        Self {
            cells,
            rows,
            cols,
            counter: Some(counter),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.cells
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.cells
    }
}

impl<T> Drop for CellBuffer<T> {
    fn drop(&mut self) {
        let n = self.cells.len() as isize;
        match &self.counter {
            Some(c) => c.add(-n),
            None => GLOBAL.add(-n),
        }
    }
}

//! Process-wide scratch stack for engine intermediates
//!
//! One engine keeps all of its intermediates on a single process-wide slab
//! with stack discipline. The slab has no concurrent-access support, so it
//! lives behind a mutex and every call into the engine brackets its work in
//! a [`ScratchSession`]: opening the session records the current depth, and
//! dropping it truncates back to that mark on success, error, and
//! cancellation alike.

use num_bigint::BigInt;
use std::ops::Range;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use crate::error::{Error, Result};

/// Default slab capacity, in cells.
pub const DEFAULT_CAPACITY: usize = 1 << 20;

#[derive(Debug)]
struct Slab {
    cells: Vec<BigInt>,
    capacity: usize,
}

static SCRATCH: OnceLock<Mutex<Slab>> = OnceLock::new();

fn slab() -> MutexGuard<'static, Slab> {
    SCRATCH
        .get_or_init(|| {
            Mutex::new(Slab {
                cells: Vec::new(),
                capacity: DEFAULT_CAPACITY,
            })
        })
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

/// Current depth of the scratch stack, in cells. Zero whenever no session
/// is open.
pub fn depth() -> usize {
    slab().cells.len()
}

/// Change the capacity limit. Takes effect for subsequent sessions; the
/// current depth is never truncated.
pub fn set_capacity(cells: usize) {
    slab().capacity = cells;
}

/// Exclusive access to the scratch stack, scoped to one engine call.
#[derive(Debug)]
pub struct ScratchSession {
    guard: MutexGuard<'static, Slab>,
    mark: usize,
}

impl ScratchSession {
    /// Acquire the stack and record the rewind mark.
    pub fn open() -> Self {
        let guard = slab();
        let mark = guard.cells.len();
        Self { guard, mark }
    }

    /// Push `count` zero cells, returning their range in the slab.
    pub fn alloc(&mut self, count: usize) -> Result<Range<usize>> {
        let start = self.guard.cells.len();
        let needed = start
            .checked_add(count)
            .ok_or(Error::AllocationTooLarge { rows: count, cols: 1 })?;
        if needed > self.guard.capacity {
            return Err(Error::ScratchExhausted {
                needed,
                capacity: self.guard.capacity,
            });
        }
        self.guard
            .cells
            .resize_with(needed, BigInt::default);
        Ok(start..needed)
    }

    pub fn cells(&self, range: Range<usize>) -> &[BigInt] {
        &self.guard.cells[range]
    }

    pub fn cells_mut(&mut self, range: Range<usize>) -> &mut [BigInt] {
        &mut self.guard.cells[range]
    }

    /// Depth at which this session will rewind the stack.
    pub fn mark(&self) -> usize {
        self.mark
    }
}

impl Drop for ScratchSession {
    fn drop(&mut self) {
        self.guard.cells.truncate(self.mark);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::Zero;

    #[test]
    fn session_rewinds_on_drop() {
        {
            let mut session = ScratchSession::open();
            let base = session.mark();
            let range = session.alloc(16).unwrap();
            assert_eq!(range.len(), 16);
            assert!(session.cells(range.clone()).iter().all(BigInt::is_zero));
            session.cells_mut(range)[3] = BigInt::from(9);
            assert_eq!(session.guard.cells.len(), base + 16);
        }
        assert_eq!(depth(), 0);
    }

    #[test]
    fn session_rewinds_on_error_path() {
        let result: Result<()> = (|| {
            let mut session = ScratchSession::open();
            session.alloc(8)?;
            Err(Error::Interrupted)
        })();
        assert!(matches!(result, Err(Error::Interrupted)));
        assert_eq!(depth(), 0);
    }

    #[test]
    fn capacity_is_enforced() {
        let mut session = ScratchSession::open();
        let err = session.alloc(DEFAULT_CAPACITY + 1).unwrap_err();
        assert!(matches!(err, Error::ScratchExhausted { .. }));
    }

    #[test]
    fn nested_allocations_stack() {
        let mut session = ScratchSession::open();
        let a = session.alloc(4).unwrap();
        let b = session.alloc(4).unwrap();
        assert_eq!(a.end, b.start);
    }
}

//! Cooperative cancellation of long-running engine calls
//!
//! A shared [`InterruptFlag`] can be set from any thread (or armed with a
//! checkpoint budget to model a timeout deterministically). Engines open an
//! [`InterruptGuard`] region around a blocking call and poll
//! [`InterruptGuard::checkpoint`] at safe points; a set flag surfaces as
//! [`Error::Interrupted`] and unwinds through ordinary `?` propagation, so
//! buffer leases drop and scratch sessions rewind on the cancellation path
//! exactly as on the success path.

use std::sync::atomic::{AtomicBool, AtomicIsize, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::error::{Error, Result};

#[derive(Debug)]
struct FlagInner {
    set: AtomicBool,
    /// Checkpoints remaining before the flag trips; negative = disarmed.
    budget: AtomicIsize,
    /// Open interruptible regions, for introspection.
    regions: AtomicUsize,
}

/// Shared cancellation flag.
#[derive(Debug, Clone)]
pub struct InterruptFlag {
    inner: Arc<FlagInner>,
}

impl InterruptFlag {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(FlagInner {
                set: AtomicBool::new(false),
                budget: AtomicIsize::new(-1),
                regions: AtomicUsize::new(0),
            }),
        }
    }

    /// A flag that trips on the `n`-th checkpoint. Deterministic stand-in
    /// for an external timeout; `n` must be at least 1.
    pub fn with_budget(n: usize) -> Self {
        let flag = Self::new();
        flag.inner.budget.store(n.max(1) as isize, Ordering::SeqCst);
        flag
    }

    /// Request cancellation of whatever region is (or will be) open.
    pub fn interrupt(&self) {
        self.inner.set.store(true, Ordering::SeqCst);
    }

    pub fn is_interrupted(&self) -> bool {
        self.inner.set.load(Ordering::SeqCst)
    }

    /// Reset the flag and disarm any budget.
    pub fn clear(&self) {
        self.inner.set.store(false, Ordering::SeqCst);
        self.inner.budget.store(-1, Ordering::SeqCst);
    }

    /// Number of interruptible regions currently open on this flag.
    pub fn active_regions(&self) -> usize {
        self.inner.regions.load(Ordering::SeqCst)
    }
}

impl Default for InterruptFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// Scoped interruptible region. Registers on entry, unregisters on drop.
#[derive(Debug)]
pub struct InterruptGuard<'a> {
    flag: &'a InterruptFlag,
}

impl<'a> InterruptGuard<'a> {
    pub fn enter(flag: &'a InterruptFlag) -> Self {
        flag.inner.regions.fetch_add(1, Ordering::SeqCst);
        Self { flag }
    }

    /// Safe point: returns `Err(Interrupted)` once cancellation is pending.
    pub fn checkpoint(&self) -> Result<()> {
        let inner = &self.flag.inner;
        if inner.set.load(Ordering::SeqCst) {
            return Err(Error::Interrupted);
        }
        if inner.budget.load(Ordering::SeqCst) >= 0 {
            let prev = inner.budget.fetch_sub(1, Ordering::SeqCst);
            if prev <= 1 {
                inner.set.store(true, Ordering::SeqCst);
                return Err(Error::Interrupted);
            }
        }
        Ok(())
    }
}

impl Drop for InterruptGuard<'_> {
    fn drop(&mut self) {
        self.flag.inner.regions.fetch_sub(1, Ordering::SeqCst);
    }
}

//! Lock-Free Latest-Value Slot

use std::ptr;
use std::sync::atomic::{AtomicPtr, AtomicUsize, Ordering};

/// Single-slot handoff cell.
///
/// `publish` swaps a new value in and drops whatever was there; `take`
/// swaps the slot to empty and returns the value, so a value is consumed at
/// most once.
pub struct LatestSlot<T> {
    /// Boxed value, null when empty
    value: AtomicPtr<T>,
    /// Values published (for statistics)
    published: AtomicUsize,
    /// Values replaced before anyone took them
    replaced: AtomicUsize,
}

impl<T> LatestSlot<T> {
    /// Create an empty slot
    pub fn new() -> Self {
        Self {
            value: AtomicPtr::new(ptr::null_mut()),
            published: AtomicUsize::new(0),
            replaced: AtomicUsize::new(0),
        }
    }

    /// Store a value, replacing (and dropping) any unconsumed one
    pub fn publish(&self, value: T) {
        let new = Box::into_raw(Box::new(value));
        let old = self.value.swap(new, Ordering::AcqRel);
        self.published.fetch_add(1, Ordering::Relaxed);

        if !old.is_null() {
            self.replaced.fetch_add(1, Ordering::Relaxed);
            // SAFETY: non-null pointers in the slot always come from
            // Box::into_raw and the swap gave us sole ownership
            drop(unsafe { Box::from_raw(old) });
        }
    }

    /// Take the value and leave the slot empty
    pub fn take(&self) -> Option<T> {
        let old = self.value.swap(ptr::null_mut(), Ordering::AcqRel);
        if old.is_null() {
            None
        } else {
            // SAFETY: see `publish`
            Some(*unsafe { Box::from_raw(old) })
        }
    }

    /// Take the value only if it satisfies `accept`; rejected values are
    /// dropped, never put back
    pub fn take_if(&self, accept: impl FnOnce(&T) -> bool) -> Option<T> {
        self.take().filter(accept)
    }

    /// Drop any unconsumed value
    pub fn clear(&self) {
        drop(self.take());
    }

    /// Check whether a value is waiting
    pub fn is_empty(&self) -> bool {
        self.value.load(Ordering::Acquire).is_null()
    }

    /// Get total values published (for statistics)
    pub fn published(&self) -> usize {
        self.published.load(Ordering::Relaxed)
    }

    /// Get values replaced before being taken (for statistics)
    pub fn replaced(&self) -> usize {
        self.replaced.load(Ordering::Relaxed)
    }
}

impl<T> Default for LatestSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for LatestSlot<T> {
    fn drop(&mut self) {
        self.clear();
    }
}

// SAFETY: the slot owns at most one `T` and hands it out by value, so it is
// as thread-safe as moving a `T` between threads
unsafe impl<T: Send> Send for LatestSlot<T> {}
unsafe impl<T: Send> Sync for LatestSlot<T> {}

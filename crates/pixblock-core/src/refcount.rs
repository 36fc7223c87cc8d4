/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Atomic retain/release counting
//!
//! Both the pooled blob and the image carrying it are shared between
//! consumers through an explicit retain/release protocol rather than pure
//! RAII, since reclamation has a side effect (returning blocks to a pool)
//! that must happen exactly once, at a well-defined point.

use std::sync::atomic::{AtomicUsize, Ordering};

use log::error;

/// A plain atomic reference count.
///
/// The count starts at one for the creating owner. [`RefCount::release`]
/// reports when the count reaches zero so the owner of the counted resource
/// can run its reclamation step; the counter itself holds no resource.
pub struct RefCount {
    count: AtomicUsize
}

impl RefCount {
    /// Create a new count, owned once.
    pub fn new() -> RefCount {
        RefCount {
            count: AtomicUsize::new(1)
        }
    }

    /// Return the current count.
    ///
    /// Zero means the resource was reclaimed.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    /// Increment the count.
    ///
    /// Retaining a dead count is a contract violation; debug builds assert,
    /// release builds log and carry on.
    pub fn retain(&self) {
        let previous = self.count.fetch_add(1, Ordering::AcqRel);

        debug_assert!(previous > 0, "retain on a reclaimed reference count");

        if previous == 0 {
            error!("retain called on a reference count that already reached zero");
        }
    }

    /// Decrement the count, returning `true` when this call brought it to
    /// zero, i.e. when the caller must reclaim the counted resource.
    ///
    /// The count saturates at zero; releasing past zero is a contract
    /// violation that debug builds assert on.
    pub fn release(&self) -> bool {
        let previous =
            self.count
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |c| c.checked_sub(1));

        match previous {
            Ok(1) => true,
            Ok(_) => false,
            Err(_) => {
                debug_assert!(false, "release on a reclaimed reference count");
                error!("release called on a reference count that already reached zero");
                false
            }
        }
    }
}

impl Default for RefCount {
    fn default() -> Self {
        RefCount::new()
    }
}

#[cfg(test)]
mod tests {
    use super::RefCount;

    #[test]
    fn starts_owned_once() {
        let refs = RefCount::new();
        assert_eq!(refs.count(), 1);
        assert!(refs.release());
    }

    #[test]
    fn balanced_retains_reclaim_once() {
        let refs = RefCount::new();

        for _ in 0..4 {
            refs.retain();
        }
        for _ in 0..4 {
            assert!(!refs.release());
        }
        assert!(refs.release());
        assert_eq!(refs.count(), 0);
    }
}

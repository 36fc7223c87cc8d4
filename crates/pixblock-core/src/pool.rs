/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! A pool of fixed-capacity pixel blocks
//!
//! Image buffers in this crate family are not flat arrays but ordered lists
//! of equally sized blocks borrowed from a [`BlockPool`]. The pool caches
//! blocks that come back from reclaimed buffers so repeated decode/scale
//! cycles reuse storage instead of hitting the allocator each time.
//!
//! Blocks handed out by [`BlockPool::acquire`] are always zero-filled,
//! including recycled ones, so a fresh buffer never observes pixels from a
//! previous owner.

use std::sync::{Mutex, MutexGuard, PoisonError};

use log::error;

/// A shared source of fixed-capacity `u32` blocks.
///
/// The pool is externally owned: buffers borrow blocks from it and must
/// return every block when they are reclaimed. Blocks are never resized.
///
/// Share it between consumers with an `Arc`.
pub struct BlockPool {
    capacity:   usize,
    max_cached: Option<usize>,
    free:       Mutex<Vec<Box<[u32]>>>
}

impl BlockPool {
    /// Create a pool handing out blocks of `capacity` pixels each, caching
    /// an unbounded number of recycled blocks.
    ///
    /// # Example
    /// ```
    /// use pixblock_core::pool::BlockPool;
    /// let pool = BlockPool::new(1024);
    /// assert_eq!(pool.block_capacity(), 1024);
    /// assert_eq!(pool.cached_blocks(), 0);
    /// ```
    ///
    /// # Panics
    /// If `capacity` is zero.
    pub fn new(capacity: usize) -> BlockPool {
        assert!(capacity > 0, "block capacity must be non-zero");

        BlockPool {
            capacity,
            max_cached: None,
            free: Mutex::new(Vec::new())
        }
    }

    /// Create a pool that keeps at most `max_cached` recycled blocks,
    /// dropping the rest back to the allocator.
    ///
    /// # Panics
    /// If `capacity` is zero.
    pub fn with_cache_limit(capacity: usize, max_cached: usize) -> BlockPool {
        assert!(capacity > 0, "block capacity must be non-zero");

        BlockPool {
            capacity,
            max_cached: Some(max_cached),
            free: Mutex::new(Vec::new())
        }
    }

    /// The fixed pixel capacity of every block this pool hands out.
    pub const fn block_capacity(&self) -> usize {
        self.capacity
    }

    /// Number of recycled blocks currently sitting in the cache.
    pub fn cached_blocks(&self) -> usize {
        self.free_list().len()
    }

    /// Hand out one zero-filled block of exactly
    /// [`block_capacity`](Self::block_capacity) pixels, reusing a cached
    /// block when one is available.
    pub fn acquire(&self) -> Box<[u32]> {
        let recycled = self.free_list().pop();

        match recycled {
            Some(mut block) => {
                block.fill(0);
                block
            }
            None => vec![0_u32; self.capacity].into_boxed_slice()
        }
    }

    /// Return a block to the pool.
    ///
    /// Blocks that do not match this pool's capacity are rejected (they
    /// belong to a different pool) and dropped.
    pub fn recycle(&self, block: Box<[u32]>) {
        if block.len() != self.capacity {
            debug_assert_eq!(block.len(), self.capacity, "block from a foreign pool");
            error!(
                "dropping recycled block of {} pixels, pool capacity is {}",
                block.len(),
                self.capacity
            );
            return;
        }

        let mut free = self.free_list();

        if self.max_cached.map_or(true, |limit| free.len() < limit) {
            free.push(block);
        }
    }

    fn free_list(&self) -> MutexGuard<'_, Vec<Box<[u32]>>> {
        // a poisoned free list is still a valid free list
        self.free.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

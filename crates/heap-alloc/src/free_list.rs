//! # Free List
//!
//! A doubly-linked list of free blocks kept sorted by ascending header
//! address. The address ordering is what makes coalescing on insertion
//! O(1) once the insertion point is located: a block's physical neighbors,
//! if free, are always its immediate list neighbors too.

use crate::block::{BlockHeader, HEADER_SIZE};
use std::ptr::null_mut;

pub(crate) struct FreeList {
    /// First block in address order, or null if the list is empty.
    head: *mut BlockHeader,
}

impl FreeList {
    pub(crate) const fn new() -> Self {
        Self { head: null_mut() }
    }

    #[cfg(test)]
    pub(crate) const fn head(&self) -> *mut BlockHeader {
        self.head
    }

    /// Number of blocks currently on the list. O(n).
    pub(crate) fn len(&self) -> usize {
        let mut count = 0;
        let mut cur = self.head;
        while !cur.is_null() {
            count += 1;
            cur = unsafe { BlockHeader::next(cur) };
        }
        count
    }

    /// Locate the sorted insertion point for `addr`: the first block whose
    /// address exceeds it, and that block's predecessor.
    fn find_insertion_point(&self, addr: *mut BlockHeader) -> (*mut BlockHeader, *mut BlockHeader) {
        let mut prev = null_mut();
        let mut next = self.head;
        while !next.is_null() && (next as usize) < (addr as usize) {
            prev = next;
            next = unsafe { BlockHeader::next(next) };
        }
        (prev, next)
    }

    /// Splice `block` into the list in address order, without attempting to
    /// coalesce it with its neighbors. Used by arena growth, which must not
    /// assume a newly mapped region is physically adjacent to anything.
    ///
    /// # Safety
    /// `block` must not currently be linked into any list.
    pub(crate) unsafe fn insert_sorted(&mut self, block: *mut BlockHeader) {
        let (prev, next) = self.find_insertion_point(block);
        unsafe {
            BlockHeader::set_is_free(block, true);
            BlockHeader::set_prev(block, prev);
            BlockHeader::set_next(block, next);
            if prev.is_null() {
                self.head = block;
            } else {
                BlockHeader::set_next(prev, block);
            }
            if !next.is_null() {
                BlockHeader::set_prev(next, block);
            }
        }
    }

    /// Splice `block` into the list in address order and coalesce it with
    /// either physical neighbor that is also free. Returns the (possibly
    /// merged) block that ends up holding the combined region.
    ///
    /// # Safety
    /// `block` must not currently be linked into any list.
    pub(crate) unsafe fn insert_sorted_and_coalesce(
        &mut self,
        block: *mut BlockHeader,
    ) -> *mut BlockHeader {
        unsafe {
            self.insert_sorted(block);

            let mut merged = block;

            // Coalesce forward with the successor.
            let next = BlockHeader::next(merged);
            if !next.is_null() && BlockHeader::payload_end(merged) == next.cast::<u8>() {
                BlockHeader::set_size(merged, BlockHeader::size(merged) + HEADER_SIZE + BlockHeader::size(next));
                self.unlink(next);
            }

            // Coalesce backward with the predecessor.
            let prev = BlockHeader::prev(merged);
            if !prev.is_null() && BlockHeader::payload_end(prev) == merged.cast::<u8>() {
                BlockHeader::set_size(prev, BlockHeader::size(prev) + HEADER_SIZE + BlockHeader::size(merged));
                self.unlink(merged);
                merged = prev;
            }

            merged
        }
    }

    /// Swap `old` for `new` at the same position in the list, inheriting
    /// `old`'s `prev`/`next` links. Used by `malloc`'s split rule: the
    /// remainder block takes over the candidate's slot in the free list.
    ///
    /// # Safety
    /// `old` must currently be linked into this list; `new` must not be.
    pub(crate) unsafe fn replace(&mut self, old: *mut BlockHeader, new: *mut BlockHeader) {
        unsafe {
            let prev = BlockHeader::prev(old);
            let next = BlockHeader::next(old);
            BlockHeader::set_is_free(new, true);
            BlockHeader::set_prev(new, prev);
            BlockHeader::set_next(new, next);
            if prev.is_null() {
                self.head = new;
            } else {
                BlockHeader::set_next(prev, new);
            }
            if !next.is_null() {
                BlockHeader::set_prev(next, new);
            }
        }
    }

    /// Remove `block` from the list. O(1) given its `prev`/`next` links.
    ///
    /// # Safety
    /// `block` must currently be linked into this list.
    pub(crate) unsafe fn unlink(&mut self, block: *mut BlockHeader) {
        unsafe {
            let prev = BlockHeader::prev(block);
            let next = BlockHeader::next(block);
            if prev.is_null() {
                self.head = next;
            } else {
                BlockHeader::set_next(prev, next);
            }
            if !next.is_null() {
                BlockHeader::set_prev(next, prev);
            }
            BlockHeader::set_prev(block, null_mut());
            BlockHeader::set_next(block, null_mut());
        }
    }

    /// Iterate blocks in ascending address order.
    pub(crate) const fn iter(&self) -> FreeListIter {
        FreeListIter { cur: self.head }
    }
}

pub(crate) struct FreeListIter {
    cur: *mut BlockHeader,
}

impl Iterator for FreeListIter {
    type Item = *mut BlockHeader;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cur.is_null() {
            return None;
        }
        let cur = self.cur;
        self.cur = unsafe { BlockHeader::next(cur) };
        Some(cur)
    }
}

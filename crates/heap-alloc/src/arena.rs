//! # Arena Manager
//!
//! Grows the heap by mapping anonymous, page-aligned memory from the OS.
//! Mappings are never returned to the OS — consistent with the crate's
//! never-reclaim non-goal — so the only bookkeeping kept here is a running
//! total; individual mappings are handed off to the free list as blocks and
//! never revisited.

use crate::block::{BlockHeader, HEADER_SIZE};
use crate::error::HeapError;
use heap_info::config::align_up_page;
use std::ptr;

pub(crate) struct Arena {
    total_mapped: usize,
}

impl Arena {
    pub(crate) const fn new() -> Self {
        Self {
            total_mapped: usize::MIN,
        }
    }

    pub(crate) const fn total_mapped(&self) -> usize {
        self.total_mapped
    }

    /// Map a region able to hold at least `required_bytes` (header included),
    /// rounded up to a whole number of pages, and format it as a single free
    /// block spanning the mapping. The returned block is **not** linked into
    /// any list yet — inserting it into the free list is the caller's job.
    pub(crate) fn map_region(&mut self, required_bytes: usize) -> Result<*mut BlockHeader, HeapError> {
        let region_size = align_up_page(required_bytes);

        let addr = unsafe {
            libc::mmap(
                ptr::null_mut(),
                region_size,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
                -1,
                0,
            )
        };

        if addr == libc::MAP_FAILED {
            return Err(HeapError::ArenaMapFailed {
                requested: region_size,
                source: std::io::Error::last_os_error(),
            });
        }

        self.total_mapped += region_size;

        let payload_size = region_size - HEADER_SIZE;
        let block = unsafe { BlockHeader::format_free(addr.cast::<u8>(), payload_size) };
        Ok(block)
    }
}

//! # Block Header
//!
//! Every addressable unit of the arena is a *block*: a fixed-size header
//! immediately followed by its payload.
//!
//! ```text
//! +----------------------+-------------------------+
//! |   BlockHeader         |      payload (size)     |
//! +----------------------+-------------------------+
//! ^ block addr           ^ block addr + HEADER_SIZE
//! ```
//!
//! The same `prev`/`next` pair is reused by both the free list and the
//! allocation list — a block is a member of exactly one list at a time, so
//! there is never a conflict over which list "owns" the links.
//!
//! Block addresses only carry [`heap_info::config::ALIGNMENT`] (4 bytes),
//! not this struct's own pointer-width alignment requirement — a split can
//! land a header at an address four bytes short of what a plain `(*block)
//! .field` load or store would require. Every field is therefore read and
//! written through the unaligned accessors below rather than by field
//! projection, the same way `uefi-loader`'s ELF header parsing reads structs
//! out of a byte buffer it cannot assume is aligned.

use std::ptr;

/// Header stored at the start of every block, free or allocated.
///
/// Fields are private: every access goes through the unaligned accessors
/// below, since a header's address is only guaranteed to the allocator's
/// 4-byte alignment, not to this struct's natural alignment.
#[repr(C)]
pub(crate) struct BlockHeader {
    /// Payload size in bytes, not counting this header. Always a multiple
    /// of [`heap_info::config::ALIGNMENT`].
    size: usize,
    /// `true` while this block is a member of the free list.
    is_free: bool,
    /// Previous node on whichever list this block currently belongs to.
    prev: *mut BlockHeader,
    /// Next node on whichever list this block currently belongs to.
    next: *mut BlockHeader,
}

/// Byte size of [`BlockHeader`]; every split/coalesce computation routes
/// through this constant rather than recomputing it inline.
pub(crate) const HEADER_SIZE: usize = size_of::<BlockHeader>();

impl BlockHeader {
    /// Format the memory at `addr` as a single free block with the given
    /// payload `size`, with no list linkage.
    ///
    /// # Safety
    /// `addr` must point to at least `HEADER_SIZE` writable bytes that are
    /// not otherwise in use. `addr` need only be aligned to
    /// [`heap_info::config::ALIGNMENT`], not to `BlockHeader`'s own
    /// alignment.
    #[allow(clippy::cast_ptr_alignment)]
    pub(crate) unsafe fn format_free(addr: *mut u8, size: usize) -> *mut BlockHeader {
        let header = addr.cast::<BlockHeader>();
        unsafe {
            ptr::write_unaligned(
                header,
                BlockHeader {
                    size,
                    is_free: true,
                    prev: ptr::null_mut(),
                    next: ptr::null_mut(),
                },
            );
        }
        header
    }

    /// Payload size in bytes.
    ///
    /// # Safety
    /// `block` must be a valid, live `BlockHeader` pointer.
    pub(crate) unsafe fn size(block: *mut BlockHeader) -> usize {
        unsafe { ptr::read_unaligned(ptr::addr_of!((*block).size)) }
    }

    /// # Safety
    /// `block` must be a valid, live `BlockHeader` pointer.
    pub(crate) unsafe fn set_size(block: *mut BlockHeader, size: usize) {
        unsafe { ptr::write_unaligned(ptr::addr_of_mut!((*block).size), size) }
    }

    /// `true` while this block is a member of the free list.
    ///
    /// # Safety
    /// `block` must be a valid, live `BlockHeader` pointer.
    pub(crate) unsafe fn is_free(block: *mut BlockHeader) -> bool {
        unsafe { ptr::read_unaligned(ptr::addr_of!((*block).is_free)) }
    }

    /// # Safety
    /// `block` must be a valid, live `BlockHeader` pointer.
    pub(crate) unsafe fn set_is_free(block: *mut BlockHeader, is_free: bool) {
        unsafe { ptr::write_unaligned(ptr::addr_of_mut!((*block).is_free), is_free) }
    }

    /// Previous node on whichever list `block` currently belongs to.
    ///
    /// # Safety
    /// `block` must be a valid, live `BlockHeader` pointer.
    pub(crate) unsafe fn prev(block: *mut BlockHeader) -> *mut BlockHeader {
        unsafe { ptr::read_unaligned(ptr::addr_of!((*block).prev)) }
    }

    /// # Safety
    /// `block` must be a valid, live `BlockHeader` pointer.
    pub(crate) unsafe fn set_prev(block: *mut BlockHeader, prev: *mut BlockHeader) {
        unsafe { ptr::write_unaligned(ptr::addr_of_mut!((*block).prev), prev) }
    }

    /// Next node on whichever list `block` currently belongs to.
    ///
    /// # Safety
    /// `block` must be a valid, live `BlockHeader` pointer.
    pub(crate) unsafe fn next(block: *mut BlockHeader) -> *mut BlockHeader {
        unsafe { ptr::read_unaligned(ptr::addr_of!((*block).next)) }
    }

    /// # Safety
    /// `block` must be a valid, live `BlockHeader` pointer.
    pub(crate) unsafe fn set_next(block: *mut BlockHeader, next: *mut BlockHeader) {
        unsafe { ptr::write_unaligned(ptr::addr_of_mut!((*block).next), next) }
    }

    /// Address one past this block's payload, i.e. where the next physical
    /// block's header would begin.
    ///
    /// # Safety
    /// `block` must be a valid, live `BlockHeader` pointer.
    pub(crate) unsafe fn payload_end(block: *mut BlockHeader) -> *mut u8 {
        unsafe { block.cast::<u8>().add(HEADER_SIZE + Self::size(block)) }
    }

    /// Pointer to the payload bytes following this block's header.
    ///
    /// # Safety
    /// `block` must be a valid, live `BlockHeader` pointer.
    pub(crate) unsafe fn payload(block: *mut BlockHeader) -> *mut u8 {
        unsafe { block.cast::<u8>().add(HEADER_SIZE) }
    }

    /// Recover the header pointer belonging to a payload pointer previously
    /// returned to a caller.
    ///
    /// # Safety
    /// `payload` must have been produced by [`BlockHeader::payload`] on some
    /// live block (the caller is responsible for validating that with the
    /// allocation ledger before trusting the result).
    #[allow(clippy::cast_ptr_alignment)]
    pub(crate) unsafe fn header_of(payload: *mut u8) -> *mut BlockHeader {
        unsafe { payload.sub(HEADER_SIZE).cast::<BlockHeader>() }
    }
}

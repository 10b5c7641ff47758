//! # Allocator Configuration Constants

/// Size of one OS page. Arena growth always requests a whole multiple of
/// this many bytes.
pub const PAGE_SIZE: usize = 4096;

/// Byte alignment every allocated block's size is rounded up to.
///
/// The allocator does not support a caller-chosen alignment — every request
/// rounds up to this one fixed 4-byte boundary, not to the strictest scalar
/// alignment, by explicit non-goal. A block header's `prev`/`next` pointer
/// fields can therefore end up at an address this boundary does not satisfy
/// their natural alignment for; that is handled at the point the header is
/// read and written (`BlockHeader`'s unaligned field accessors), not by
/// widening this constant.
pub const ALIGNMENT: usize = 4;

/// Minimum extra payload a split remainder must have beyond a bare header to
/// be worth carving off as its own free block. A remainder of exactly
/// `header_size + MIN_SPLIT_PAYLOAD` bytes is the smallest block that still
/// splits; anything smaller is handed out attached to the original request.
///
/// Defined independently of [`ALIGNMENT`] rather than reusing it: the split
/// threshold is a fixed `4` by the split-threshold law, regardless of what
/// value `ALIGNMENT` happens to hold.
pub const MIN_SPLIT_PAYLOAD: usize = 4;

/// Round `size` up to the next multiple of [`ALIGNMENT`].
#[must_use]
pub const fn align_up_4(size: usize) -> usize {
    (size + (ALIGNMENT - 1)) & !(ALIGNMENT - 1)
}

/// Round `size` up to the next whole number of [`PAGE_SIZE`] pages.
#[must_use]
pub const fn align_up_page(size: usize) -> usize {
    (size + (PAGE_SIZE - 1)) & !(PAGE_SIZE - 1)
}

const _: () = {
    assert!(PAGE_SIZE.is_multiple_of(ALIGNMENT));
    assert!(ALIGNMENT.is_power_of_two());
    assert!(align_up_4(ALIGNMENT + 1) == 2 * ALIGNMENT);
    assert!(align_up_page(1) == PAGE_SIZE);
};

//! # Placement Policy Selector

/// Which free block a [`Heap`](../heap_alloc/struct.Heap.html) hands out for
/// a given request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Policy {
    /// First block encountered (by ascending address) that is large enough.
    FirstFit,
    /// Smallest block that is large enough; ties go to the lower address.
    BestFit,
    /// Largest block available; ties go to the lower address.
    WorstFit,
}

//! # Placement Search
//!
//! The three policies differ only in which candidate they pick from a
//! read-only scan of the free list; a single parameterized function covers
//! all three rather than three near-duplicate copies of the same walk.

use crate::block::BlockHeader;
use crate::free_list::FreeList;
use heap_info::policy::Policy;

/// Find the free block `free_list` should hand out for a request of `size`
/// payload bytes under `policy`, or `None` if nothing currently fits.
pub(crate) fn find_candidate(
    free_list: &FreeList,
    size: usize,
    policy: Policy,
) -> Option<*mut BlockHeader> {
    match policy {
        Policy::FirstFit => free_list
            .iter()
            .find(|&b| unsafe { BlockHeader::size(b) } >= size),
        Policy::BestFit => free_list
            .iter()
            .filter(|&b| unsafe { BlockHeader::size(b) } >= size)
            .min_by_key(|&b| unsafe { BlockHeader::size(b) }),
        Policy::WorstFit => {
            // `Iterator::max_by_key` keeps the *last* of equally-maximum
            // elements; the free list's tie-break rule wants the first
            // (lowest address, since the list is address-sorted), so the
            // largest-so-far has to win strictly, not by `>=`.
            let mut worst: Option<*mut BlockHeader> = None;
            let mut worst_size = 0;
            for b in free_list.iter() {
                let block_size = unsafe { BlockHeader::size(b) };
                if block_size >= size && block_size > worst_size {
                    worst = Some(b);
                    worst_size = block_size;
                }
            }
            worst
        }
    }
}

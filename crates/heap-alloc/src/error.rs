//! # Error Types

/// Failure modes the allocator surfaces as a genuine `Result::Err`.
///
/// `BadRequestSize` and an invalid/double free are deliberately *not*
/// variants here: the spec's propagation policy treats them as non-fatal
/// sentinel outcomes (`None` from `malloc`, a logged-and-ignored `free`),
/// not as errors a caller receives.
#[derive(Debug, thiserror::Error)]
pub enum HeapError {
    /// The OS refused to satisfy an anonymous `mmap` request.
    #[error("failed to map {requested} bytes via mmap: {source}")]
    ArenaMapFailed {
        requested: usize,
        #[source]
        source: std::io::Error,
    },
}

//! # Heap Allocator Configuration
//!
//! This crate defines the constants, the alignment helper, and the
//! placement-policy enum shared by `heap-alloc`. It serves as the single
//! source of truth for the numbers the allocator's invariants depend on
//! (page size, alignment), mirroring this workspace's convention of keeping
//! such values in a dedicated, dependency-free `-info` crate rather than
//! scattering them across the allocator itself.
//!
//! ## Modules
//!
//! - [`policy`]: the [`Policy`](policy::Policy) selector (`FirstFit`,
//!   `BestFit`, `WorstFit`) used to pick a placement strategy at init time.
//! - [`config`]: page size, alignment, and the minimum useful split
//!   remainder, plus `align_up_4`/`align_up_page`.

pub mod config;
pub mod policy;

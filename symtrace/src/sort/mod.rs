//! Radix sort for integer-keyed batches
//!
//! Crash logs can carry tens of thousands of addresses; sorting them before
//! symbolization keeps subprocess queries cache-friendly and makes output
//! deterministic. The sort is a least-significant-digit counting sort with
//! two shortcuts: already-sorted input is detected in the prescan, and any
//! digit position shared by every element skips its movement pass entirely.

pub mod radix;

pub use radix::{radix_sort, radix_sort_by_key, RadixKey};

//! # Crash-Spool Directory Scanning
//!
//! Pull-based reading of directory entries from a source that fills a flat
//! byte buffer with packed records (fixed header + variable-length name; the
//! wire layout lives in the `symtrace-wire` crate).
//!
//! ## Why not `std::fs::read_dir` directly?
//!
//! The decoder mirrors how a host boundary actually hands entries over: a
//! syscall-like `fill` that packs as many records as fit, possibly
//! truncating the last one at the buffer's edge. [`DirStream`] owns the
//! incremental decoding - partial records, buffer growth, resume cookies -
//! so every source stays a dumb byte producer. `std::fs::ReadDir` is just
//! one such producer ([`ReadDirSource`]).
//!
//! ## Decoder state machine
//!
//! Each `next_entry` call:
//! 1. fewer buffered bytes than one header + last fill was short → end of
//!    stream
//! 2. fewer buffered bytes than one full record → grow the buffer
//!    (doubling, grow-only) and refill from the resume cookie
//! 3. otherwise decode one record in place: skip empty or NUL-containing
//!    names; stat-fallback for unknown inodes; skip entries that vanished
//!    between readdir and stat
//! 4. advance the cursor by the record's encoded size
//!
//! The read buffer is an index-addressed arena: it only ever grows, and the
//! decoder never holds references into it across a refill.

pub mod dirstream;
pub mod source;
pub mod spool;

pub use dirstream::{DirEntry, DirStream};
pub use source::{EntrySource, ReadDirSource};
pub use spool::{sweep_spool, SpoolEntry};

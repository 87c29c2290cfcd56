//! # symtrace - Crash Address Symbolization Toolkit
//!
//! symtrace resolves raw stack addresses (as found in crash logs) to
//! function/module/file/line by driving a long-lived external symbolizer
//! subprocess speaking the `atos` line protocol. It can also sweep a
//! crash-log spool directory through a packed directory-entry stream and
//! sorts large address batches with a radix sort.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────┐    hex address lines     ┌──────────────────┐
//! │   symtrace   │ ───────────────────────▶ │  symbolizer tool │
//! │  (this crate)│ ◀─────────────────────── │  (atos, external)│
//! └──────┬───────┘   one response per line  └──────────────────┘
//!        │
//!        ├── scan: packed dirent stream over a crash-log spool
//!        ├── sort: radix sort for address batches
//!        └── report: symbolized JSON export
//! ```
//!
//! ## Module Structure
//!
//! - [`symbolize`]: subprocess lifecycle, response-grammar parsing, and the
//!   fail-closed symbolization front end
//!   - `process`: pipe-based request/response with permanent invalidation on
//!     any I/O failure
//!   - `parse`: the `atos` response grammar as a tagged parse result
//!   - `env`: fixed-capacity environment slot rewritten in place per spawn
//! - [`scan`]: buffered incremental decoder for packed directory records
//!   (wire layout lives in the `symtrace-wire` crate)
//! - [`sort`]: least-significant-digit radix sort with a skip-pass
//!   optimization for constant digits
//! - [`report`]: JSON export of symbolized frames
//! - [`cli`]: command-line argument parsing
//! - [`domain`]: core newtypes (`Pid`, `Addr`) and structured errors
//!
//! ## Failure discipline
//!
//! The symbolizer subprocess is never respawned: the first I/O or protocol
//! failure marks it unusable and every later query fails fast. Callers
//! degrade to "no symbol information" rather than crash.

// Expose modules for testing
pub mod cli;
pub mod domain;
pub mod report;
pub mod scan;
pub mod sort;
pub mod symbolize;

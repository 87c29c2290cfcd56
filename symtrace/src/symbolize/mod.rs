//! # Address → Symbol Resolution via an External Subprocess
//!
//! This module resolves raw addresses to human-readable symbols by driving a
//! long-lived external symbolizer tool (macOS `atos`, or anything speaking
//! the same line protocol) over stdin/stdout pipes.
//!
//! ## The Protocol
//!
//! The protocol is newline-delimited, human-readable text. One query is one
//! hex address on a line; one response is one line:
//!
//! ```text
//! parent ──▶ "0x2010\n"
//! child  ──▶ "myfunction (in library.dylib) + 0x10\n"
//! ```
//!
//! The response grammar (parsed exactly in [`parse`]):
//!
//! ```text
//! <symbol-or-0xHEX> (in <module>) [ (<file>:<line>) | + <offset> ]
//! ```
//!
//! A leading `0x` token means the tool had no symbol name for the address.
//! When an offset is reported instead of a file/line pair, the function's
//! start address is `queried_address - offset`.
//!
//! ## Fail-Closed Lifecycle
//!
//! The subprocess is spawned once per [`AtosSymbolizer`]. Any pipe I/O
//! failure or unparsable response marks it permanently unusable - there is
//! no retry and no respawn. Every later query returns `None` immediately,
//! and callers degrade to "no symbol information" instead of crashing.
//!
//! ## Spawn-Path Discipline
//!
//! The spawn path must stay allocation-light because symbolization can be
//! requested from crash handling. The task-port environment entry handed to
//! the child lives in a fixed-capacity process-wide slot ([`env`]); only its
//! pid digits are rewritten in place before each spawn.
//!
//! ## Module Structure
//!
//! - **`process`**: subprocess spawn, pipe request/response, invalidation
//! - **`parse`**: the response grammar as a tagged parse result
//! - **`atos`**: per-address symbolization, demangling, `dladdr` fallback
//! - **`env`**: the fixed-capacity environment slot
//! - **`annotation`**: mutex-guarded crash-note buffer shared by all threads

pub mod annotation;
pub mod atos;
pub mod env;
pub mod parse;
pub mod process;

pub use atos::{AtosSymbolizer, DataInfo, SymbolizedFrame};
pub use parse::{parse_response_line, ParseError, ParsedSymbol, SourceInfo};
pub use process::{SymbolizerConfig, SymbolizerProcess};

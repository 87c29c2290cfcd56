//! Front end for the `atos` line protocol
//!
//! Builds one query per address, parses the response, and populates the
//! output record. On any protocol failure the subprocess is invalidated and
//! all later calls return `None` without touching the child again.

// dladdr requires unsafe
#![allow(unsafe_code)]

use crate::domain::{Addr, SymbolizeError};
use crate::symbolize::annotation;
use crate::symbolize::parse::{parse_response_line, ParsedSymbol, SourceInfo};
use crate::symbolize::process::{SymbolizerConfig, SymbolizerProcess};
use log::warn;
use rustc_demangle::demangle;

/// A resolved code address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolizedFrame {
    pub addr: Addr,
    /// Demangled function name; `None` when the tool had no symbol.
    pub function: Option<String>,
    pub module: Option<String>,
    pub file: Option<String>,
    pub line: Option<u32>,
    /// Offset of `addr` from the function's start, when reported.
    pub function_offset: Option<u64>,
    /// Start address of the containing function, when recoverable.
    pub function_start: Option<Addr>,
}

/// A resolved data (global) address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataInfo {
    pub addr: Addr,
    pub name: Option<String>,
    pub module: Option<String>,
    pub start: Option<Addr>,
}

/// Symbolizer backed by one external subprocess.
pub struct AtosSymbolizer {
    process: SymbolizerProcess,
}

impl AtosSymbolizer {
    /// Spawn the subprocess described by `config`.
    ///
    /// # Errors
    /// Propagates spawn failures; no handle is constructed on error.
    pub fn new(config: &SymbolizerConfig) -> Result<Self, SymbolizeError> {
        Ok(Self { process: SymbolizerProcess::spawn(config)? })
    }

    /// Whether the subprocess is still accepting queries.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.process.is_usable()
    }

    /// Resolve a code address.
    ///
    /// Returns `None` on any I/O or parse failure; a parse failure also
    /// invalidates the subprocess so later calls fail fast.
    pub fn symbolize_pc(&mut self, addr: Addr) -> Option<SymbolizedFrame> {
        let parsed = self.query(addr)?;
        let mut frame = frame_from_parsed(addr, parsed);
        if frame.function_start.is_none() {
            // The tool reported neither offset nor location; recover at
            // least the start address from the in-process symbol table.
            frame.function_start = dladdr_function_start(addr);
            if let (Some(start), None) = (frame.function_start, frame.function_offset) {
                frame.function_offset = addr.0.checked_sub(start.0);
            }
        }
        Some(frame)
    }

    /// Resolve a data address.
    pub fn symbolize_data(&mut self, addr: Addr) -> Option<DataInfo> {
        let parsed = self.query(addr)?;
        let frame = frame_from_parsed(addr, parsed);
        Some(DataInfo {
            addr,
            name: frame.function,
            module: frame.module,
            start: frame.function_start,
        })
    }

    fn query(&mut self, addr: Addr) -> Option<ParsedSymbol> {
        let command = format!("0x{:x}", addr.0);
        let response = self.process.send_command(&command)?.to_string();
        match parse_response_line(&response) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!("Rejected symbolizer response for {addr}: {e}");
                annotation::append_note(&format!("symbolizer response rejected: {e}"));
                self.process.mark_unusable();
                None
            }
        }
    }
}

/// Build the output record from a parsed response. Pure; no process state.
fn frame_from_parsed(addr: Addr, parsed: ParsedSymbol) -> SymbolizedFrame {
    let function = parsed.function.map(|name| format!("{:#}", demangle(&name)));
    let mut frame = SymbolizedFrame {
        addr,
        function,
        module: Some(parsed.module),
        file: None,
        line: None,
        function_offset: None,
        function_start: None,
    };
    match parsed.source {
        SourceInfo::FileLine { file, line } => {
            frame.file = Some(file);
            frame.line = Some(line);
        }
        SourceInfo::Offset(offset) => {
            frame.function_offset = Some(offset);
            frame.function_start = Some(Addr(addr.0.wrapping_sub(offset)));
        }
        SourceInfo::None => {}
    }
    frame
}

/// Look up the containing function's start address via `dladdr`.
///
/// Only meaningful for addresses mapped into this process; used as the
/// lighter-weight fallback when the external tool gave no start address.
#[cfg(unix)]
fn dladdr_function_start(addr: Addr) -> Option<Addr> {
    let mut info: libc::Dl_info = unsafe { std::mem::zeroed() };
    let found = unsafe { libc::dladdr(addr.0 as usize as *const libc::c_void, &mut info) };
    if found != 0 && !info.dli_saddr.is_null() {
        Some(Addr(info.dli_saddr as usize as u64))
    } else {
        None
    }
}

#[cfg(not(unix))]
fn dladdr_function_start(_addr: Addr) -> Option<Addr> {
    None
}

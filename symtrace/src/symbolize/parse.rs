//! Parser for the symbolizer tool's response grammar
//!
//! One response line has the shape:
//!
//! ```text
//! <symbol-or-0xHEX> (in <module>) [ (<file>:<line>) | + <offset> ]
//! ```
//!
//! Parsing produces a tagged [`ParsedSymbol`] or a [`ParseError`]; it never
//! hands back a partially-filled record. Callers that receive an error are
//! expected to treat the subprocess as desynced and stop using it.

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty response line")]
    Empty,

    #[error("missing \" (in \" separator in {0:?}")]
    MissingModuleSeparator(String),

    #[error("unterminated module name in {0:?}")]
    UnterminatedModule(String),

    #[error("malformed source location in {0:?}")]
    MalformedLocation(String),

    #[error("malformed offset in {0:?}")]
    MalformedOffset(String),
}

/// Where the tool located the address within its function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceInfo {
    /// Source file and line number, from debug info.
    FileLine { file: String, line: u32 },
    /// Byte offset from the function's start address.
    Offset(u64),
    /// The tool reported neither.
    None,
}

/// Fully parsed response line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSymbol {
    /// Function name, or `None` when the tool echoed a raw `0x` address.
    pub function: Option<String>,
    /// Module (image) the address belongs to.
    pub module: String,
    pub source: SourceInfo,
}

/// Parse one response line from the symbolizer tool.
///
/// # Errors
/// Returns a [`ParseError`] describing the first point at which the line
/// diverges from the grammar. Nothing is extracted from a rejected line.
pub fn parse_response_line(line: &str) -> Result<ParsedSymbol, ParseError> {
    let line = line.trim_end_matches(['\n', '\r']);
    if line.is_empty() {
        return Err(ParseError::Empty);
    }

    let (token, rest) = line
        .split_once(" (in ")
        .ok_or_else(|| ParseError::MissingModuleSeparator(line.to_string()))?;

    // A raw hex token means the tool had no symbol for the address.
    let function = if token.starts_with("0x") { None } else { Some(token.to_string()) };

    if let Some((module, tail)) = rest.split_once(") ") {
        if module.is_empty() {
            return Err(ParseError::UnterminatedModule(line.to_string()));
        }
        let source = parse_source(tail.trim_start(), line)?;
        Ok(ParsedSymbol { function, module: module.to_string(), source })
    } else if let Some(module) = rest.strip_suffix(')') {
        if module.is_empty() {
            return Err(ParseError::UnterminatedModule(line.to_string()));
        }
        Ok(ParsedSymbol { function, module: module.to_string(), source: SourceInfo::None })
    } else {
        Err(ParseError::UnterminatedModule(line.to_string()))
    }
}

fn parse_source(tail: &str, line: &str) -> Result<SourceInfo, ParseError> {
    if let Some(inner) = tail.strip_prefix('(') {
        // "(<file>:<line>)"
        let inner =
            inner.strip_suffix(')').ok_or_else(|| ParseError::MalformedLocation(line.to_string()))?;
        let (file, line_str) =
            inner.split_once(':').ok_or_else(|| ParseError::MalformedLocation(line.to_string()))?;
        let line_no = line_str
            .trim()
            .parse::<u32>()
            .map_err(|_| ParseError::MalformedLocation(line.to_string()))?;
        Ok(SourceInfo::FileLine { file: file.to_string(), line: line_no })
    } else if let Some(offset) = tail.strip_prefix('+') {
        Ok(SourceInfo::Offset(parse_number(offset.trim(), line)?))
    } else if tail.is_empty() {
        Ok(SourceInfo::None)
    } else {
        Err(ParseError::MalformedLocation(line.to_string()))
    }
}

fn parse_number(s: &str, line: &str) -> Result<u64, ParseError> {
    let parsed = if let Some(hex) = s.strip_prefix("0x") {
        u64::from_str_radix(hex, 16)
    } else {
        s.parse::<u64>()
    };
    parsed.map_err(|_| ParseError::MalformedOffset(line.to_string()))
}

//! Structured error types for symtrace
//!
//! Using thiserror for automatic Display implementation and error chaining.

use super::types::Pid;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SymbolizeError {
    #[error("Failed to spawn symbolizer tool {tool}: {error}")]
    SpawnFailed { tool: String, error: String },

    #[error("Symbolizer tool {tool} has no stdio pipes for {pid}")]
    MissingPipes { tool: String, pid: Pid },

    #[error("Symbolizer subprocess is unusable after a protocol failure")]
    ProcessUnusable,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Spool path {0} is not a directory")]
    NotADirectory(PathBuf),

    #[error("Failed to read spool directory {path}: {error}")]
    SpoolUnreadable { path: PathBuf, error: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to write report file: {0}")]
    WriteFailed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_error_display() {
        let err = SymbolizeError::SpawnFailed {
            tool: "atos".to_string(),
            error: "No such file or directory".to_string(),
        };
        assert!(err.to_string().contains("atos"));
        assert!(err.to_string().contains("No such file"));
    }

    #[test]
    fn test_missing_pipes_display() {
        let err =
            SymbolizeError::MissingPipes { tool: "atos".to_string(), pid: Pid(42) };
        assert_eq!(err.to_string(), "Symbolizer tool atos has no stdio pipes for PID:42");
    }

    #[test]
    fn test_scan_error_display() {
        let err = ScanError::NotADirectory(PathBuf::from("/tmp/not-a-dir"));
        assert!(err.to_string().contains("/tmp/not-a-dir"));
    }
}

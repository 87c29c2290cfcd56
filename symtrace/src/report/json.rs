//! JSON report of symbolized frames

use crate::domain::{ExportError, Pid};
use crate::symbolize::SymbolizedFrame;
use log::info;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// One frame in the exported report. Addresses are rendered as hex strings
/// so the JSON stays readable and round-trips without precision concerns.
#[derive(Debug, Clone, Serialize)]
pub struct ReportFrame {
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_offset: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_start: Option<String>,
}

impl From<&SymbolizedFrame> for ReportFrame {
    fn from(frame: &SymbolizedFrame) -> Self {
        Self {
            address: frame.addr.to_string(),
            function: frame.function.clone(),
            module: frame.module.clone(),
            file: frame.file.clone(),
            line: frame.line,
            function_offset: frame.function_offset,
            function_start: frame.function_start.map(|a| a.to_string()),
        }
    }
}

/// Top-level report document.
#[derive(Debug, Serialize)]
pub struct SymbolizedReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<i32>,
    pub tool: String,
    pub frames: Vec<ReportFrame>,
    pub notes: Vec<String>,
}

/// Accumulates frames and writes the report document.
pub struct JsonReportExporter {
    report: SymbolizedReport,
}

impl JsonReportExporter {
    #[must_use]
    pub fn new(pid: Option<Pid>, tool: &str) -> Self {
        Self {
            report: SymbolizedReport {
                pid: pid.map(|p| p.0),
                tool: tool.to_string(),
                frames: Vec::new(),
                notes: Vec::new(),
            },
        }
    }

    pub fn add_frame(&mut self, frame: &SymbolizedFrame) {
        self.report.frames.push(ReportFrame::from(frame));
    }

    /// Record an unresolved address so the report stays complete.
    pub fn add_unresolved(&mut self, addr: crate::domain::Addr) {
        self.report.frames.push(ReportFrame {
            address: addr.to_string(),
            function: None,
            module: None,
            file: None,
            line: None,
            function_offset: None,
            function_start: None,
        });
    }

    pub fn set_notes(&mut self, notes: &str) {
        self.report.notes = notes.lines().map(str::to_string).collect();
    }

    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.report.frames.len()
    }

    /// Write the report as pretty-printed JSON.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created or serialized.
    pub fn write_to(&self, path: &Path) -> Result<(), ExportError> {
        let file = File::create(path)
            .map_err(|e| ExportError::WriteFailed(format!("{}: {e}", path.display())))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &self.report)?;
        info!("Wrote {} frames to {}", self.report.frames.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Addr;

    fn sample_frame() -> SymbolizedFrame {
        SymbolizedFrame {
            addr: Addr(0x2010),
            function: Some("myfunction".to_string()),
            module: Some("library.dylib".to_string()),
            file: None,
            line: None,
            function_offset: Some(0x10),
            function_start: Some(Addr(0x2000)),
        }
    }

    #[test]
    fn test_report_frame_renders_hex_addresses() {
        let frame = ReportFrame::from(&sample_frame());
        assert_eq!(frame.address, "0x2010");
        assert_eq!(frame.function_start.as_deref(), Some("0x2000"));
    }

    #[test]
    fn test_export_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("report.json");

        let mut exporter = JsonReportExporter::new(Some(Pid(1234)), "atos");
        exporter.add_frame(&sample_frame());
        exporter.add_unresolved(Addr(0xdead));
        exporter.set_notes("symbolizer response rejected: garbage");
        exporter.write_to(&path).expect("write report");

        let content = std::fs::read_to_string(&path).expect("read back");
        let json: serde_json::Value = serde_json::from_str(&content).expect("valid json");
        assert_eq!(json["pid"], 1234);
        assert_eq!(json["tool"], "atos");
        assert_eq!(json["frames"][0]["address"], "0x2010");
        assert_eq!(json["frames"][0]["function"], "myfunction");
        assert_eq!(json["frames"][0]["function_offset"], 0x10);
        assert_eq!(json["frames"][1]["address"], "0xdead");
        assert!(json["frames"][1].get("function").is_none());
        assert_eq!(json["notes"][0], "symbolizer response rejected: garbage");
    }
}

//! Report export functionality
//!
//! This module provides functionality for exporting symbolized frames to
//! machine-readable formats. Currently supports a JSON report layout.

pub mod json;

pub use json::{JsonReportExporter, ReportFrame, SymbolizedReport};

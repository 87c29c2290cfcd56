//! CLI argument definitions

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "symtrace",
    about = "Resolve crash addresses to symbols via an external symbolizer",
    after_help = "\
EXAMPLES:
    symtrace --pid 1234 0x2010 0x3fa8        Symbolize two addresses
    symtrace --pid 1234 --input crash.txt    Addresses from a file
    symtrace --scan /var/crashlogs           Sweep a crash-log spool
    symtrace --pid 1234 0x2010 --export report.json"
)]
pub struct Args {
    /// Addresses to symbolize (0x-prefixed hex or decimal)
    #[arg(value_name = "ADDR")]
    pub addresses: Vec<String>,

    /// Target process ID handed to the symbolizer tool
    #[arg(short, long)]
    pub pid: Option<i32>,

    /// Symbolizer tool to spawn (defaults to atos on PATH)
    #[arg(long, value_name = "TOOL")]
    pub tool: Option<PathBuf>,

    /// Read additional addresses from a file, one per line
    #[arg(long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Sweep a crash-log spool directory and list its reports
    #[arg(long, value_name = "DIR")]
    pub scan: Option<PathBuf>,

    /// Export the symbolized report as JSON
    #[arg(long, value_name = "FILE")]
    pub export: Option<PathBuf>,

    /// Do not pass the tool's -d (keep offsets) flag
    #[arg(long)]
    pub no_verbose_tool: bool,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,
}

//! # symtrace - Main Entry Point
//!
//! Two operational modes, combinable in one invocation:
//! - **Symbolize** (`--pid <PID> <ADDR>...`): resolve addresses through the
//!   external symbolizer subprocess
//! - **Spool sweep** (`--scan <DIR>`): list crash reports in a spool
//!   directory, sorted by inode

use anyhow::{Context, Result};
use clap::Parser;
use log::warn;
use std::fs;
use std::path::Path;

use symtrace::cli::Args;
use symtrace::domain::{Addr, Pid};
use symtrace::report::JsonReportExporter;
use symtrace::scan::sweep_spool;
use symtrace::sort::radix_sort;
use symtrace::symbolize::{annotation, AtosSymbolizer, SymbolizedFrame, SymbolizerConfig};

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_USAGE: i32 = 2;
const EXIT_NOPERM: i32 = 77;

fn main() {
    env_logger::init();
    std::process::exit(match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            let code = exit_code_for(&e);
            eprintln!("error: {e}");
            code
        }
    });
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    let msg = err.to_string().to_lowercase();
    if msg.contains("permission denied") {
        EXIT_NOPERM
    } else if msg.contains("missing required argument") {
        EXIT_USAGE
    } else {
        EXIT_ERROR
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    if let Some(ref dir) = args.scan {
        sweep_and_print(dir, args.quiet)?;
    }

    let addresses = collect_addresses(&args)?;
    if addresses.is_empty() {
        if args.scan.is_some() {
            return Ok(());
        }
        anyhow::bail!(
            "Missing required argument: ADDR or --scan\n\n\
             Usage:\n  \
             symtrace --pid 1234 0x2010       Symbolize an address\n  \
             symtrace --scan /var/crashlogs   Sweep a crash-log spool\n\n\
             Run 'symtrace --help' for more options"
        );
    }

    let Some(pid) = args.pid else {
        anyhow::bail!("Missing required argument: --pid is needed to symbolize addresses");
    };

    let mut config = SymbolizerConfig::new(Pid(pid));
    if let Some(ref tool) = args.tool {
        config = config.with_tool(tool.clone());
    }
    config.verbose_backtraces = !args.no_verbose_tool;

    let tool_name = config.tool.display().to_string();
    let mut symbolizer = AtosSymbolizer::new(&config)
        .with_context(|| format!("Failed to start symbolizer tool {tool_name}"))?;

    let mut exporter = JsonReportExporter::new(Some(Pid(pid)), &tool_name);
    for addr in &addresses {
        match symbolizer.symbolize_pc(*addr) {
            Some(frame) => {
                if !args.quiet {
                    println!("{}", format_frame(&frame));
                }
                exporter.add_frame(&frame);
            }
            None => {
                if !args.quiet {
                    println!("{addr} <unresolved>");
                }
                exporter.add_unresolved(*addr);
                if !symbolizer.is_usable() {
                    // Fail-closed: the subprocess is gone for good, so stop
                    // querying and record the rest as unresolved.
                    warn!("Symbolizer unusable; remaining addresses stay unresolved");
                    record_remaining(&mut exporter, &addresses, *addr, args.quiet);
                    break;
                }
            }
        }
    }

    if let Some(ref path) = args.export {
        exporter.set_notes(&annotation::take_notes());
        exporter
            .write_to(path)
            .with_context(|| format!("Failed to export report to {}", path.display()))?;
        if !args.quiet {
            println!("Exported {} frames to {}", exporter.frame_count(), path.display());
        }
    }

    Ok(())
}

/// Gather addresses from the command line and `--input`, parse them, and
/// radix-sort the batch so subprocess queries run in address order.
fn collect_addresses(args: &Args) -> Result<Vec<Addr>> {
    let mut raw: Vec<String> = args.addresses.clone();
    if let Some(ref path) = args.input {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read address file {}", path.display()))?;
        raw.extend(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .map(str::to_string),
        );
    }

    let mut addresses = Vec::with_capacity(raw.len());
    for token in &raw {
        let addr = Addr::parse(token)
            .with_context(|| format!("Invalid address {token:?} (expected 0x hex or decimal)"))?;
        addresses.push(addr.0);
    }

    radix_sort(&mut addresses);
    addresses.dedup();
    Ok(addresses.into_iter().map(Addr).collect())
}

fn sweep_and_print(dir: &Path, quiet: bool) -> Result<()> {
    let entries =
        sweep_spool(dir).with_context(|| format!("Failed to sweep spool {}", dir.display()))?;
    if !quiet {
        println!("{} reports in {}", entries.len(), dir.display());
        for entry in &entries {
            println!("  {:>12}  {}", entry.ino, entry.name);
        }
    }
    Ok(())
}

/// Record every address after `failed_at` as unresolved.
fn record_remaining(
    exporter: &mut JsonReportExporter,
    addresses: &[Addr],
    failed_at: Addr,
    quiet: bool,
) {
    let remaining = addresses.iter().skip_while(|a| **a != failed_at).skip(1);
    for addr in remaining {
        if !quiet {
            println!("{addr} <unresolved>");
        }
        exporter.add_unresolved(*addr);
    }
}

fn format_frame(frame: &SymbolizedFrame) -> String {
    let mut line = frame.addr.to_string();
    match &frame.function {
        Some(function) => line.push_str(&format!(" {function}")),
        None => line.push_str(" <unknown>"),
    }
    if let Some(ref module) = frame.module {
        line.push_str(&format!(" (in {module})"));
    }
    if let (Some(file), Some(line_no)) = (&frame.file, frame.line) {
        line.push_str(&format!(" at {file}:{line_no}"));
    } else if let Some(offset) = frame.function_offset {
        line.push_str(&format!(" + 0x{offset:x}"));
    }
    line
}

//! Crash-spool sweep
//!
//! Lists the regular files of a crash-log spool directory via the packed
//! directory stream and returns them radix-sorted by inode, which keeps
//! follow-up stat/open work in disk order.

use crate::domain::ScanError;
use crate::scan::dirstream::DirStream;
use crate::scan::source::ReadDirSource;
use crate::sort::radix_sort_by_key;
use log::info;
use std::path::{Path, PathBuf};
use symtrace_wire::FileType;

/// One crash report found in the spool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpoolEntry {
    pub ino: u64,
    pub name: String,
    pub path: PathBuf,
}

/// Sweep `dir` for crash reports (regular files), sorted by inode.
///
/// # Errors
/// Fails if the directory cannot be opened or the stream errors mid-sweep;
/// individual entries that vanish during the sweep are skipped, not errors.
pub fn sweep_spool(dir: &Path) -> Result<Vec<SpoolEntry>, ScanError> {
    if !dir.is_dir() {
        return Err(ScanError::NotADirectory(dir.to_path_buf()));
    }
    let source = ReadDirSource::open(dir).map_err(|e| ScanError::SpoolUnreadable {
        path: dir.to_path_buf(),
        error: e.to_string(),
    })?;

    let mut stream = DirStream::new(source);
    let mut entries = Vec::new();
    while let Some(entry) = stream.next_entry()? {
        if entry.file_type == FileType::RegularFile {
            entries.push(SpoolEntry {
                ino: entry.ino,
                path: dir.join(&entry.name),
                name: entry.name,
            });
        }
    }

    // Sort (inode, index) pairs; SpoolEntry itself is not Copy.
    let mut keyed: Vec<(u64, u32)> = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| (entry.ino, u32::try_from(index).unwrap_or(u32::MAX)))
        .collect();
    let mut scratch = Vec::new();
    radix_sort_by_key(&mut keyed, &mut scratch, |&(ino, _)| ino);

    let mut ordered = Vec::with_capacity(entries.len());
    let mut slots: Vec<Option<SpoolEntry>> = entries.into_iter().map(Some).collect();
    for (_, index) in keyed {
        if let Some(entry) = slots.get_mut(index as usize).and_then(Option::take) {
            ordered.push(entry);
        }
    }

    info!("Spool sweep of {} found {} reports", dir.display(), ordered.len());
    Ok(ordered)
}

//! Directory entry sources
//!
//! An [`EntrySource`] is the host side of the decoder: a syscall-like `fill`
//! that packs records into the caller's buffer plus a stat lookup used to
//! complete entries with unknown inodes. [`ReadDirSource`] is the standard
//! filesystem-backed implementation.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use symtrace_wire::{DirentHeader, FileType, DIRENT_HEADER_LEN};

/// Producer of packed directory records.
pub trait EntrySource {
    /// Fill `buf` with packed records starting at `cookie`, returning the
    /// number of bytes written. The final record may be truncated at the
    /// buffer's edge; a return shorter than `buf.len()` means the stream is
    /// exhausted.
    fn fill(&mut self, cookie: u64, buf: &mut [u8]) -> io::Result<usize>;

    /// Stat `name` relative to the directory being read, returning its
    /// inode and a file type derived from the mode bits.
    ///
    /// # Errors
    /// `NotFound` signals the entry vanished since it was listed; decoders
    /// treat that as benign.
    fn stat(&mut self, name: &str) -> io::Result<(u64, FileType)>;
}

/// Source backed by `std::fs::read_dir`.
///
/// The listing is materialized on first `fill`; cookies are indices into
/// it. Records are packed densely, truncating the last one at the buffer
/// edge exactly like a host readdir call would.
pub struct ReadDirSource {
    dir: PathBuf,
    entries: Option<Vec<RawEntry>>,
}

struct RawEntry {
    ino: u64,
    file_type: FileType,
    name: String,
}

impl ReadDirSource {
    /// Open `dir` for scanning.
    ///
    /// # Errors
    /// Fails if `dir` does not name a readable directory.
    pub fn open(dir: &Path) -> io::Result<Self> {
        if !dir.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                format!("{} is not a directory", dir.display()),
            ));
        }
        Ok(Self { dir: dir.to_path_buf(), entries: None })
    }

    fn load(&mut self) -> io::Result<&[RawEntry]> {
        if self.entries.is_none() {
            let mut entries = Vec::new();
            for entry in fs::read_dir(&self.dir)? {
                let entry = entry?;
                let file_type = entry
                    .file_type()
                    .map(|ft| {
                        if ft.is_dir() {
                            FileType::Directory
                        } else if ft.is_symlink() {
                            FileType::Symlink
                        } else if ft.is_file() {
                            FileType::RegularFile
                        } else {
                            FileType::Unknown
                        }
                    })
                    .unwrap_or(FileType::Unknown);
                entries.push(RawEntry {
                    ino: inode_of(&entry),
                    file_type,
                    name: entry.file_name().to_string_lossy().into_owned(),
                });
            }
            self.entries = Some(entries);
        }
        Ok(self.entries.as_deref().unwrap_or(&[]))
    }
}

impl EntrySource for ReadDirSource {
    fn fill(&mut self, cookie: u64, buf: &mut [u8]) -> io::Result<usize> {
        self.load()?;
        let entries = self.entries.as_deref().unwrap_or(&[]);

        let mut written = 0;
        let mut index = usize::try_from(cookie).unwrap_or(usize::MAX);
        while index < entries.len() && written < buf.len() {
            let entry = &entries[index];
            let header = DirentHeader {
                d_next: (index as u64) + 1,
                d_ino: entry.ino,
                d_namlen: u32::try_from(entry.name.len()).unwrap_or(u32::MAX),
                d_type: entry.file_type.to_raw(),
            };
            let mut head = [0u8; DIRENT_HEADER_LEN];
            header.encode(&mut head);

            let space = buf.len() - written;
            let header_n = DIRENT_HEADER_LEN.min(space);
            buf[written..written + header_n].copy_from_slice(&head[..header_n]);
            written += header_n;

            let name_bytes = entry.name.as_bytes();
            let name_n = name_bytes.len().min(buf.len() - written);
            buf[written..written + name_n].copy_from_slice(&name_bytes[..name_n]);
            written += name_n;

            if header_n < DIRENT_HEADER_LEN || name_n < name_bytes.len() {
                // Truncated at the buffer edge; the decoder will grow and
                // resume from the cookie of this record.
                break;
            }
            index += 1;
        }
        Ok(written)
    }

    fn stat(&mut self, name: &str) -> io::Result<(u64, FileType)> {
        let metadata = fs::symlink_metadata(self.dir.join(name))?;
        Ok((metadata_ino(&metadata), file_type_from_metadata(&metadata)))
    }
}

fn inode_of(entry: &fs::DirEntry) -> u64 {
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirEntryExt;
        entry.ino()
    }
    #[cfg(not(unix))]
    {
        let _ = entry;
        symtrace_wire::UNKNOWN_INO
    }
}

fn metadata_ino(metadata: &fs::Metadata) -> u64 {
    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        metadata.ino()
    }
    #[cfg(not(unix))]
    {
        let _ = metadata;
        symtrace_wire::UNKNOWN_INO
    }
}

fn file_type_from_metadata(metadata: &fs::Metadata) -> FileType {
    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        FileType::from_mode_bits(metadata.mode())
    }
    #[cfg(not(unix))]
    {
        let ft = metadata.file_type();
        if ft.is_dir() {
            FileType::Directory
        } else if ft.is_file() {
            FileType::RegularFile
        } else {
            FileType::Unknown
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::DirStream;
    use std::fs::File;

    #[test]
    fn test_read_dir_source_lists_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        File::create(dir.path().join("one.crash")).expect("create");
        File::create(dir.path().join("two.crash")).expect("create");
        fs::create_dir(dir.path().join("nested")).expect("mkdir");

        let source = ReadDirSource::open(dir.path()).expect("open");
        let mut stream = DirStream::new(source);
        let mut names = Vec::new();
        while let Some(entry) = stream.next_entry().expect("next_entry") {
            if entry.file_type == FileType::RegularFile {
                assert_ne!(entry.ino, symtrace_wire::UNKNOWN_INO);
            }
            names.push(entry.name);
        }
        names.sort();
        assert_eq!(names, vec!["nested", "one.crash", "two.crash"]);
    }

    #[test]
    fn test_small_buffer_forces_truncation_and_resume() {
        let dir = tempfile::tempdir().expect("tempdir");
        for i in 0..20 {
            File::create(dir.path().join(format!("report-{i:02}.crash"))).expect("create");
        }
        let source = ReadDirSource::open(dir.path()).expect("open");
        // Buffer fits barely more than one record, so nearly every fill
        // truncates and the decoder resumes via cookies.
        let mut stream = DirStream::with_buffer_len(source, 48);
        let mut count = 0;
        while let Some(entry) = stream.next_entry().expect("next_entry") {
            assert!(entry.name.starts_with("report-"));
            count += 1;
        }
        assert_eq!(count, 20);
    }

    #[test]
    fn test_open_rejects_non_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("plain");
        File::create(&file).expect("create");
        assert!(ReadDirSource::open(&file).is_err());
    }

    #[test]
    fn test_stat_reports_mode_derived_type() {
        let dir = tempfile::tempdir().expect("tempdir");
        File::create(dir.path().join("f")).expect("create");
        let mut source = ReadDirSource::open(dir.path()).expect("open");
        let (ino, file_type) = source.stat("f").expect("stat");
        if cfg!(unix) {
            assert_ne!(ino, symtrace_wire::UNKNOWN_INO);
        }
        assert_eq!(file_type, FileType::RegularFile);
    }

    #[test]
    fn test_stat_missing_entry_is_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut source = ReadDirSource::open(dir.path()).expect("open");
        let err = source.stat("no-such-entry").expect_err("stat should fail");
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}

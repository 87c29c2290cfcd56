//! Buffered incremental decoder for packed directory records

use crate::scan::source::EntrySource;
use log::{debug, warn};
use std::io;
use symtrace_wire::{DirentHeader, FileType, DIRENT_HEADER_LEN, UNKNOWN_INO};

/// Default read buffer size. Deliberately small so growth is exercised on
/// directories with long names.
const INITIAL_BUF_LEN: usize = 512;

/// One decoded directory entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub ino: u64,
    pub file_type: FileType,
    pub name: String,
}

/// Pull-based decoder over an [`EntrySource`].
///
/// The internal buffer is a grow-only arena addressed by index cursors;
/// growth never invalidates decoder state because no references into the
/// buffer are held across refills.
pub struct DirStream<S> {
    source: S,
    buf: Vec<u8>,
    /// Valid bytes from the last fill.
    len: usize,
    /// Cursor past the last fully processed record.
    processed: usize,
    /// Resume cookie handed back to the source on refill.
    cookie: u64,
    /// Whether the last fill returned fewer bytes than requested.
    last_fill_short: bool,
}

impl<S: EntrySource> DirStream<S> {
    #[must_use]
    pub fn new(source: S) -> Self {
        Self::with_buffer_len(source, INITIAL_BUF_LEN)
    }

    /// Construct with an explicit initial buffer size (tests use tiny
    /// buffers to force the refill and growth paths).
    #[must_use]
    pub fn with_buffer_len(source: S, buffer_len: usize) -> Self {
        Self {
            source,
            buf: vec![0; buffer_len.max(DIRENT_HEADER_LEN)],
            len: 0,
            processed: 0,
            cookie: 0,
            last_fill_short: false,
        }
    }

    /// Decode the next entry, or `None` at end of stream.
    ///
    /// Entries with an empty name or an interior NUL are skipped. Entries
    /// whose source reported an unknown inode are completed via the
    /// source's stat lookup; an entry that vanished in the meantime is
    /// skipped silently.
    ///
    /// # Errors
    /// Propagates source I/O errors, except `NotFound` from the stat
    /// fallback, which is treated as a benign race.
    pub fn next_entry(&mut self) -> io::Result<Option<DirEntry>> {
        loop {
            let remaining = self.len - self.processed;

            if remaining < DIRENT_HEADER_LEN {
                if self.last_fill_short {
                    return Ok(None);
                }
                self.refill()?;
                continue;
            }

            // Guaranteed by the length check above.
            let Some(header) = DirentHeader::decode(&self.buf[self.processed..self.len]) else {
                return Ok(None);
            };
            let record_len = header.record_len();

            if remaining < record_len {
                if self.last_fill_short && record_len <= self.buf.len() {
                    // The source stopped mid-record; nothing more is coming.
                    warn!("Discarding truncated record at end of directory stream");
                    return Ok(None);
                }
                self.grow_to(record_len);
                self.refill()?;
                continue;
            }

            let name_start = self.processed + DIRENT_HEADER_LEN;
            let name_bytes = &self.buf[name_start..self.processed + record_len];
            self.processed += record_len;
            self.cookie = header.d_next;

            if header.d_namlen == 0 {
                debug!("Skipping directory record with empty name");
                continue;
            }
            if name_bytes.contains(&0) {
                debug!("Skipping directory record with interior NUL in name");
                continue;
            }
            let name = String::from_utf8_lossy(name_bytes).into_owned();

            if header.d_ino == UNKNOWN_INO && name != ".." {
                match self.source.stat(&name) {
                    Ok((ino, file_type)) => {
                        return Ok(Some(DirEntry { ino, file_type, name }));
                    }
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {
                        // Entry disappeared between readdir and stat.
                        debug!("Entry {name:?} vanished before stat; skipping");
                        continue;
                    }
                    Err(e) => return Err(e),
                }
            }

            return Ok(Some(DirEntry {
                ino: header.d_ino,
                file_type: FileType::from_raw(header.d_type),
                name,
            }));
        }
    }

    fn refill(&mut self) -> io::Result<()> {
        self.processed = 0;
        self.len = self.source.fill(self.cookie, &mut self.buf)?;
        self.last_fill_short = self.len < self.buf.len();
        Ok(())
    }

    /// Grow (doubling, never shrinking) until the buffer can hold a record
    /// of `record_len` bytes.
    fn grow_to(&mut self, record_len: usize) {
        let mut target = self.buf.len();
        while target < record_len {
            target *= 2;
        }
        if target > self.buf.len() {
            debug!("Growing directory buffer {} -> {target}", self.buf.len());
            self.buf.resize(target, 0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use symtrace_wire::record_len;

    /// Packed-record fixture. Cookies are byte offsets into `data`.
    struct PackedSource {
        data: Vec<u8>,
        stats: HashMap<String, (u64, FileType)>,
        missing: Vec<String>,
        stat_calls: Vec<String>,
    }

    impl PackedSource {
        fn new(records: &[(u64, FileType, &[u8])]) -> Self {
            let mut data = Vec::new();
            let mut offsets = Vec::new();
            for (ino, ftype, name) in records {
                offsets.push(data.len());
                let header = DirentHeader {
                    d_next: 0, // patched below
                    d_ino: *ino,
                    d_namlen: name.len() as u32,
                    d_type: ftype.to_raw(),
                };
                let mut head = [0u8; DIRENT_HEADER_LEN];
                header.encode(&mut head);
                data.extend_from_slice(&head);
                data.extend_from_slice(name);
            }
            // Patch each d_next to the following record's byte offset.
            for (idx, offset) in offsets.iter().enumerate() {
                let next = if idx + 1 < offsets.len() {
                    offsets[idx + 1] as u64
                } else {
                    data.len() as u64
                };
                data[*offset..*offset + 8].copy_from_slice(&next.to_le_bytes());
            }
            Self { data, stats: HashMap::new(), missing: Vec::new(), stat_calls: Vec::new() }
        }

        fn with_stat(mut self, name: &str, ino: u64, ftype: FileType) -> Self {
            self.stats.insert(name.to_string(), (ino, ftype));
            self
        }

        fn with_missing(mut self, name: &str) -> Self {
            self.missing.push(name.to_string());
            self
        }
    }

    impl EntrySource for PackedSource {
        fn fill(&mut self, cookie: u64, buf: &mut [u8]) -> io::Result<usize> {
            let start = cookie as usize;
            let available = self.data.len().saturating_sub(start);
            let n = available.min(buf.len());
            buf[..n].copy_from_slice(&self.data[start..start + n]);
            Ok(n)
        }

        fn stat(&mut self, name: &str) -> io::Result<(u64, FileType)> {
            self.stat_calls.push(name.to_string());
            if self.missing.iter().any(|m| m == name) {
                return Err(io::Error::new(io::ErrorKind::NotFound, "vanished"));
            }
            self.stats
                .get(name)
                .copied()
                .ok_or_else(|| io::Error::new(io::ErrorKind::PermissionDenied, "stat refused"))
        }
    }

    fn names<S: EntrySource>(stream: &mut DirStream<S>) -> Vec<String> {
        let mut out = Vec::new();
        while let Some(entry) = stream.next_entry().unwrap() {
            out.push(entry.name);
        }
        out
    }

    #[test]
    fn test_empty_stream_yields_none() {
        let source = PackedSource::new(&[]);
        let mut stream = DirStream::new(source);
        assert_eq!(stream.next_entry().unwrap(), None);
        // Idempotent at end of stream.
        assert_eq!(stream.next_entry().unwrap(), None);
    }

    #[test]
    fn test_decodes_all_records_across_refills() {
        let source = PackedSource::new(&[
            (10, FileType::RegularFile, b"alpha.crash"),
            (11, FileType::Directory, b"archive"),
            (12, FileType::RegularFile, b"beta.crash"),
            (13, FileType::Symlink, b"latest"),
        ]);
        // Tiny buffer: every record straddles a refill boundary.
        let mut stream = DirStream::with_buffer_len(source, DIRENT_HEADER_LEN);
        let mut seen = Vec::new();
        while let Some(entry) = stream.next_entry().unwrap() {
            seen.push((entry.ino, entry.file_type, entry.name));
        }
        assert_eq!(
            seen,
            vec![
                (10, FileType::RegularFile, "alpha.crash".to_string()),
                (11, FileType::Directory, "archive".to_string()),
                (12, FileType::RegularFile, "beta.crash".to_string()),
                (13, FileType::Symlink, "latest".to_string()),
            ]
        );
    }

    #[test]
    fn test_buffer_grows_for_long_names() {
        let long_name = vec![b'x'; 600];
        let source = PackedSource::new(&[
            (1, FileType::RegularFile, &long_name),
            (2, FileType::RegularFile, b"short"),
        ]);
        let mut stream = DirStream::with_buffer_len(source, 64);
        let first = stream.next_entry().unwrap().unwrap();
        assert_eq!(first.name.len(), 600);
        // Doubling from 64 until >= header + 600.
        assert!(stream.buf.len() >= record_len(600));
        let grown = stream.buf.len();
        let second = stream.next_entry().unwrap().unwrap();
        assert_eq!(second.name, "short");
        // Grow-only invariant.
        assert_eq!(stream.buf.len(), grown);
        assert_eq!(stream.next_entry().unwrap(), None);
    }

    #[test]
    fn test_empty_name_is_skipped() {
        let source = PackedSource::new(&[
            (1, FileType::RegularFile, b""),
            (2, FileType::RegularFile, b"kept"),
        ]);
        let mut stream = DirStream::new(source);
        assert_eq!(names(&mut stream), vec!["kept".to_string()]);
    }

    #[test]
    fn test_interior_nul_is_skipped() {
        let source = PackedSource::new(&[
            (1, FileType::RegularFile, b"bad\0name"),
            (2, FileType::RegularFile, b"kept"),
        ]);
        let mut stream = DirStream::new(source);
        assert_eq!(names(&mut stream), vec!["kept".to_string()]);
    }

    #[test]
    fn test_unknown_inode_is_completed_via_stat() {
        let source = PackedSource::new(&[(UNKNOWN_INO, FileType::Unknown, b"pending.crash")])
            .with_stat("pending.crash", 77, FileType::RegularFile);
        let mut stream = DirStream::new(source);
        let entry = stream.next_entry().unwrap().unwrap();
        assert_eq!(entry.ino, 77);
        // File type is re-derived from the stat result, not the record.
        assert_eq!(entry.file_type, FileType::RegularFile);
        assert_eq!(stream.source.stat_calls, vec!["pending.crash".to_string()]);
    }

    #[test]
    fn test_vanished_entry_is_skipped() {
        let source = PackedSource::new(&[
            (UNKNOWN_INO, FileType::Unknown, b"gone.crash"),
            (5, FileType::RegularFile, b"still-here"),
        ])
        .with_missing("gone.crash");
        let mut stream = DirStream::new(source);
        assert_eq!(names(&mut stream), vec!["still-here".to_string()]);
    }

    #[test]
    fn test_dot_dot_is_exempt_from_stat_fallback() {
        let source = PackedSource::new(&[(UNKNOWN_INO, FileType::Directory, b"..")]);
        let mut stream = DirStream::new(source);
        let entry = stream.next_entry().unwrap().unwrap();
        assert_eq!(entry.name, "..");
        assert_eq!(entry.ino, UNKNOWN_INO);
        assert!(stream.source.stat_calls.is_empty());
    }

    #[test]
    fn test_stat_errors_other_than_not_found_propagate() {
        let source = PackedSource::new(&[(UNKNOWN_INO, FileType::Unknown, b"locked")]);
        let mut stream = DirStream::new(source);
        let err = stream.next_entry().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
    }

    #[test]
    fn test_truncated_tail_ends_stream() {
        let mut source = PackedSource::new(&[(1, FileType::RegularFile, b"whole")]);
        // Claim a name longer than the bytes actually present.
        let fake_len = 4096u32;
        source.data[16..20].copy_from_slice(&fake_len.to_le_bytes());
        let mut stream = DirStream::with_buffer_len(source, 8192);
        assert_eq!(stream.next_entry().unwrap(), None);
    }
}

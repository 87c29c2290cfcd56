//! # Directory Record Wire Format (host ↔ decoder)
//!
//! Defines the packed binary layout used by directory-entry sources to hand
//! records to the buffered stream decoder in `symtrace`. A stream is a
//! sequence of records, each a fixed-size header immediately followed by the
//! entry name (no NUL terminator, no inter-record padding).
//!
//! All header fields are little-endian and are read/written field-wise, so
//! no `#[repr(C)]` transmutes and no alignment requirements on the buffer.
//!
//! ## Record layout
//!
//! ```text
//! offset  size  field
//!      0     8  d_next    resume cookie of the record after this one
//!      8     8  d_ino     inode number; 0 means "unknown"
//!     16     4  d_namlen  name length in bytes
//!     20     1  d_type    file type code (see FileType)
//!     21     3  reserved  zero
//!     24     n  name      n = d_namlen, raw bytes
//! ```

#![no_std]

/// Size of the fixed record header in bytes.
pub const DIRENT_HEADER_LEN: usize = 24;

/// Sentinel inode value meaning the source could not determine the inode.
///
/// Decoders are expected to fall back to a stat-style lookup when they see
/// this value (except for the `..` entry, which commonly reports it).
pub const UNKNOWN_INO: u64 = 0;

/// Fixed-size header preceding every directory record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirentHeader {
    /// Cookie identifying the position after this record.
    ///
    /// Opaque to the decoder; it is handed back to the source to resume
    /// filling after the last fully processed record.
    pub d_next: u64,

    /// Inode number, or [`UNKNOWN_INO`].
    pub d_ino: u64,

    /// Length of the name that follows the header, in bytes.
    pub d_namlen: u32,

    /// File type code, as produced by [`FileType::to_raw`].
    pub d_type: u8,
}

impl DirentHeader {
    /// Encode the header into a fixed-size buffer (little-endian fields).
    pub fn encode(&self, out: &mut [u8; DIRENT_HEADER_LEN]) {
        out[0..8].copy_from_slice(&self.d_next.to_le_bytes());
        out[8..16].copy_from_slice(&self.d_ino.to_le_bytes());
        out[16..20].copy_from_slice(&self.d_namlen.to_le_bytes());
        out[20] = self.d_type;
        out[21] = 0;
        out[22] = 0;
        out[23] = 0;
    }

    /// Decode a header from the front of `bytes`.
    ///
    /// Returns `None` if fewer than [`DIRENT_HEADER_LEN`] bytes are available.
    #[must_use]
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < DIRENT_HEADER_LEN {
            return None;
        }
        let mut u64_buf = [0u8; 8];
        u64_buf.copy_from_slice(&bytes[0..8]);
        let d_next = u64::from_le_bytes(u64_buf);
        u64_buf.copy_from_slice(&bytes[8..16]);
        let d_ino = u64::from_le_bytes(u64_buf);
        let mut u32_buf = [0u8; 4];
        u32_buf.copy_from_slice(&bytes[16..20]);
        let d_namlen = u32::from_le_bytes(u32_buf);
        let d_type = bytes[20];
        Some(Self { d_next, d_ino, d_namlen, d_type })
    }

    /// Total encoded size of this record: header plus name, no padding.
    #[must_use]
    pub fn record_len(&self) -> usize {
        record_len(self.d_namlen)
    }
}

/// Total encoded size of a record with the given name length.
#[must_use]
pub const fn record_len(namlen: u32) -> usize {
    DIRENT_HEADER_LEN + namlen as usize
}

// ============================================================================
// File Types
// ============================================================================

// POSIX S_IFMT values; fixed by the standard, restated here because this
// crate is no_std and cannot pull them from libc.
const S_IFMT: u32 = 0o170_000;
const S_IFIFO: u32 = 0o010_000;
const S_IFCHR: u32 = 0o020_000;
const S_IFDIR: u32 = 0o040_000;
const S_IFBLK: u32 = 0o060_000;
const S_IFREG: u32 = 0o100_000;
const S_IFLNK: u32 = 0o120_000;
const S_IFSOCK: u32 = 0o140_000;

/// File type carried in a record header.
///
/// Wire codes are stable; unrecognized codes decode to [`FileType::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FileType {
    Unknown = 0,
    BlockDevice = 1,
    CharacterDevice = 2,
    Directory = 3,
    RegularFile = 4,
    SocketStream = 5,
    Symlink = 6,
    Fifo = 7,
}

impl FileType {
    /// Wire code for this file type.
    #[must_use]
    pub const fn to_raw(self) -> u8 {
        self as u8
    }

    /// Decode a wire code; unknown codes map to `Unknown`.
    #[must_use]
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            1 => Self::BlockDevice,
            2 => Self::CharacterDevice,
            3 => Self::Directory,
            4 => Self::RegularFile,
            5 => Self::SocketStream,
            6 => Self::Symlink,
            7 => Self::Fifo,
            _ => Self::Unknown,
        }
    }

    /// Derive a file type from stat-style mode bits.
    ///
    /// Used when a source reported [`UNKNOWN_INO`] and the decoder re-derives
    /// the entry's identity from a follow-up stat call.
    #[must_use]
    pub const fn from_mode_bits(mode: u32) -> Self {
        match mode & S_IFMT {
            S_IFIFO => Self::Fifo,
            S_IFCHR => Self::CharacterDevice,
            S_IFDIR => Self::Directory,
            S_IFBLK => Self::BlockDevice,
            S_IFREG => Self::RegularFile,
            S_IFLNK => Self::Symlink,
            S_IFSOCK => Self::SocketStream,
            _ => Self::Unknown,
        }
    }
}

//! Crash-note buffer
//!
//! A process-wide string buffer that any thread may append diagnostic text
//! to while handling a crash. Guarded by a module-scoped mutex; a poisoned
//! lock is recovered rather than propagated, since notes are best-effort.

use std::sync::{Mutex, PoisonError};

static NOTES: Mutex<String> = Mutex::new(String::new());

/// Append one note line. Notes are separated by newlines.
pub fn append_note(note: &str) {
    let mut notes = NOTES.lock().unwrap_or_else(PoisonError::into_inner);
    if !notes.is_empty() {
        notes.push('\n');
    }
    notes.push_str(note);
}

/// Take all accumulated notes, leaving the buffer empty.
#[must_use]
pub fn take_notes() -> String {
    let mut notes = NOTES.lock().unwrap_or_else(PoisonError::into_inner);
    std::mem::take(&mut *notes)
}

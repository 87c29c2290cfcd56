//! Fixed-capacity environment slot for the symbolizer subprocess
//!
//! Simulator-style hosts need the parent's task-port lookup token in the
//! child's environment. Because a spawn can be requested from crash
//! handling, the slot backing that entry is sized once at compile time and
//! never reallocated: only the zero-padded pid digits inside it are
//! rewritten before each spawn, so the entry's byte length never changes.

use crate::domain::Pid;
use std::sync::{Mutex, PoisonError};

/// Environment variable name carrying the task-port lookup token.
pub const TASK_PORT_ENV_KEY: &str = "SYMTRACE_TASK_PORT";

/// Width of the pid field. Wide enough for any `i32` pid rendered in
/// decimal (10 digits), zero padded.
const PID_DIGITS: usize = 10;

const _: () = assert!(PID_DIGITS >= 10, "pid field must hold i32::MAX");

/// The in-place-rewritable pid field of the environment entry.
#[derive(Debug)]
pub struct TaskPortSlot {
    digits: [u8; PID_DIGITS],
}

impl TaskPortSlot {
    #[must_use]
    pub const fn new() -> Self {
        Self { digits: [b'0'; PID_DIGITS] }
    }

    /// Rewrite the pid digits in place. The slot's length is unchanged;
    /// unused leading positions are zero padded. Negative pids clamp to 0.
    pub fn set_pid(&mut self, pid: Pid) {
        let mut value = if pid.0 > 0 { pid.0 as u32 } else { 0 };
        for slot in self.digits.iter_mut().rev() {
            *slot = b'0' + (value % 10) as u8;
            value /= 10;
        }
    }

    /// The current field contents as zero-padded ASCII digits.
    #[must_use]
    pub fn value(&self) -> &str {
        // Always ASCII digits; written only by set_pid.
        std::str::from_utf8(&self.digits).unwrap_or("0000000000")
    }

    /// Byte length of the field; constant for the life of the process.
    #[must_use]
    pub const fn len(&self) -> usize {
        PID_DIGITS
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }
}

impl Default for TaskPortSlot {
    fn default() -> Self {
        Self::new()
    }
}

static SLOT: Mutex<TaskPortSlot> = Mutex::new(TaskPortSlot::new());

/// Rewrite the process-wide slot for `pid` and return the entry value to
/// hand to the child's environment.
pub fn prepare_task_port_entry(pid: Pid) -> String {
    let mut slot = SLOT.lock().unwrap_or_else(PoisonError::into_inner);
    slot.set_pid(pid);
    slot.value().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_length_never_changes() {
        let mut slot = TaskPortSlot::new();
        let initial = slot.value().len();
        for pid in [0, 1, 42, 99_999, i32::MAX] {
            slot.set_pid(Pid(pid));
            assert_eq!(slot.value().len(), initial);
        }
    }

    #[test]
    fn test_pid_digits_are_zero_padded() {
        let mut slot = TaskPortSlot::new();
        slot.set_pid(Pid(1234));
        assert_eq!(slot.value(), "0000001234");
        slot.set_pid(Pid(i32::MAX));
        assert_eq!(slot.value(), "2147483647");
    }

    #[test]
    fn test_negative_pid_clamps_to_zero() {
        let mut slot = TaskPortSlot::new();
        slot.set_pid(Pid(-5));
        assert_eq!(slot.value(), "0000000000");
    }

    #[test]
    fn test_rewrite_overwrites_stale_digits() {
        let mut slot = TaskPortSlot::new();
        slot.set_pid(Pid(987_654_321));
        slot.set_pid(Pid(7));
        assert_eq!(slot.value(), "0000000007");
    }

    #[test]
    fn test_prepare_entry_matches_slot_format() {
        assert_eq!(prepare_task_port_entry(Pid(321)), "0000000321");
    }
}

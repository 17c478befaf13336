/*!
 * Core Types
 * Common types used across the mailbox
 */

use std::fmt;

pub use nix::unistd::{Pid, Uid};

/// Raw signal number as the OS hands it to a handler
pub type SignalNumber = libc::c_int;

/// Raw `si_code` of a delivery
pub type ReasonCode = libc::c_int;

/// Identity of the process that originated a delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SenderIdentity {
    pub pid: Pid,
    pub uid: Uid,
}

impl SenderIdentity {
    pub fn new(pid: Pid, uid: Uid) -> Self {
        Self { pid, uid }
    }

    /// Identity of the calling process
    pub fn current() -> Self {
        Self::new(nix::unistd::getpid(), nix::unistd::getuid())
    }

    pub(crate) fn from_raw(pid: libc::pid_t, uid: libc::uid_t) -> Self {
        Self::new(Pid::from_raw(pid), Uid::from_raw(uid))
    }
}

impl fmt::Display for SenderIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PID {} (UID {})", self.pid, self.uid)
    }
}

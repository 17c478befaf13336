/*!
 * Signal Delivery
 * Sending side: queue a payload-bearing signal or send a bare one
 *
 * `sigval` is a C union of `int` and `void *`; libc only exposes the pointer
 * member, so the integer member is read and written through the first four bytes.
 */

use super::core::Channel;
use crate::core::errors::{MailboxError, MailboxResult};
use crate::core::types::Pid;
use libc::c_void;
use nix::errno::Errno;
use std::{mem, ptr};
use tracing::{debug, warn};

/// Integer member of a `sigval`
#[inline(always)]
pub(crate) fn sigval_int(value: libc::sigval) -> i32 {
    // SAFETY: the union's members all start at offset 0 and sigval is at least 4 bytes
    unsafe { ptr::read(&value as *const libc::sigval as *const i32) }
}

/// A `sigval` whose integer member is `value`
pub(crate) fn sigval_from_int(value: i32) -> libc::sigval {
    let mut sigval: libc::sigval = unsafe { mem::zeroed() };
    // SAFETY: see sigval_int
    unsafe { ptr::write(&mut sigval as *mut libc::sigval as *mut i32, value) };
    sigval
}

/// Queue `channel` to `pid` carrying an integer
///
/// Fails with `Unavailable(EAGAIN)` when the receiver's queue of pending
/// signals is full, `ESRCH` for a missing process and `EPERM` when not allowed.
pub fn send_int(pid: Pid, channel: Channel, value: i32) -> MailboxResult<()> {
    queue(pid, channel, sigval_from_int(value))?;
    debug!(pid = %pid, channel = %channel, value, "Queued integer payload");
    Ok(())
}

/// Queue `channel` to `pid` carrying a pointer
///
/// The address is only meaningful to a receiver sharing the memory it points into.
pub fn send_ptr(pid: Pid, channel: Channel, value: *mut c_void) -> MailboxResult<()> {
    queue(pid, channel, libc::sigval { sival_ptr: value })?;
    debug!(pid = %pid, channel = %channel, address = ?value, "Queued pointer payload");
    Ok(())
}

/// Send `channel` to `pid` without a payload (reason code `SI_USER`)
pub fn send(pid: Pid, channel: Channel) -> MailboxResult<()> {
    let rc = unsafe { libc::kill(pid.as_raw(), channel.number()) };
    Errno::result(rc).map_err(MailboxError::from)?;
    debug!(pid = %pid, channel = %channel, "Sent signal");
    Ok(())
}

fn queue(pid: Pid, channel: Channel, value: libc::sigval) -> MailboxResult<()> {
    let rc = unsafe { libc::sigqueue(pid.as_raw(), channel.number(), value) };
    Errno::result(rc).map(drop).map_err(|errno| {
        if errno == Errno::EAGAIN {
            warn!(pid = %pid, channel = %channel, "Receiver signal queue is full");
        }
        MailboxError::from(errno)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sigval_integer_member() {
        for value in [0, 1, -1, 42, i32::MIN, i32::MAX] {
            assert_eq!(sigval_int(sigval_from_int(value)), value);
        }
    }

    #[test]
    fn test_send_to_missing_process() {
        // Pid::from_raw(i32::MAX) exceeds pid_max on every Linux configuration
        let err = send_int(Pid::from_raw(i32::MAX), Channel::USER1, 1).unwrap_err();
        assert_eq!(err, MailboxError::Unavailable(Errno::ESRCH));
    }
}

/*!
 * Signal Masking
 * Deferral and re-enablement of signals for the calling thread
 *
 * A deferred (blocked) signal is held pending by the OS, not lost and not
 * dispatched, until it is enabled again. Masks are per thread.
 */

use super::super::core::Channel;
use crate::core::errors::MailboxResult;
use crate::core::types::SignalNumber;
use nix::errno::Errno;
use std::fmt;
use std::mem::MaybeUninit;
use tracing::debug;

/// A set of signals, as used for thread masks and pending sets
#[derive(Clone, Copy)]
pub struct SignalMask(libc::sigset_t);

impl SignalMask {
    /// Set containing no signals
    pub fn empty() -> Self {
        let mut set = MaybeUninit::<libc::sigset_t>::uninit();
        // sigemptyset cannot fail for a valid pointer
        unsafe {
            libc::sigemptyset(set.as_mut_ptr());
            Self(set.assume_init())
        }
    }

    /// Set containing every signal
    pub fn full() -> Self {
        let mut set = MaybeUninit::<libc::sigset_t>::uninit();
        unsafe {
            libc::sigfillset(set.as_mut_ptr());
            Self(set.assume_init())
        }
    }

    /// Set containing only `channel`
    pub fn of(channel: Channel) -> MailboxResult<Self> {
        let mut mask = Self::empty();
        mask.add(channel)?;
        Ok(mask)
    }

    pub fn add(&mut self, channel: Channel) -> MailboxResult<()> {
        Errno::result(unsafe { libc::sigaddset(&mut self.0, channel.number()) })?;
        Ok(())
    }

    pub fn contains(&self, channel: Channel) -> bool {
        unsafe { libc::sigismember(&self.0, channel.number()) == 1 }
    }

    /// Calling thread's current mask
    pub fn current() -> MailboxResult<Self> {
        let mut current = Self::empty();
        let rc = unsafe {
            libc::pthread_sigmask(libc::SIG_BLOCK, std::ptr::null(), &mut current.0)
        };
        if rc != 0 {
            return Err(Errno::from_raw(rc).into());
        }
        Ok(current)
    }

    /// Signals raised but not yet dispatched to the calling thread
    pub fn pending() -> MailboxResult<Self> {
        let mut pending = Self::empty();
        Errno::result(unsafe { libc::sigpending(&mut pending.0) })?;
        Ok(pending)
    }

    pub(crate) fn as_raw(&self) -> &libc::sigset_t {
        &self.0
    }
}

impl fmt::Debug for SignalMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let members = (1..=libc::SIGRTMAX())
            .filter_map(|n| Channel::new(n).ok())
            .filter(|c| self.contains(*c));
        f.debug_set().entries(members.map(|c| c.to_string())).finish()
    }
}

/// Add `channel` to the calling thread's deferred set
///
/// Returns the mask in force before the call.
pub fn defer(channel: Channel) -> MailboxResult<SignalMask> {
    let previous = change(libc::SIG_BLOCK, &SignalMask::of(channel)?)?;
    debug!(channel = %channel, "Deferred signal");
    Ok(previous)
}

/// Remove `channel` from the calling thread's deferred set
///
/// A delivery held pending while deferred is dispatched before this returns.
pub fn enable(channel: Channel) -> MailboxResult<SignalMask> {
    let previous = change(libc::SIG_UNBLOCK, &SignalMask::of(channel)?)?;
    debug!(channel = %channel, "Enabled signal");
    Ok(previous)
}

/// Reinstall a mask captured by `defer`, `enable` or `SignalMask::current`
pub fn restore_mask(mask: &SignalMask) -> MailboxResult<SignalMask> {
    change(libc::SIG_SETMASK, mask)
}

pub fn is_deferred(channel: Channel) -> MailboxResult<bool> {
    Ok(SignalMask::current()?.contains(channel))
}

pub fn is_pending(channel: Channel) -> MailboxResult<bool> {
    Ok(SignalMask::pending()?.contains(channel))
}

/// Defer every signal; used around multi-field reads of unguarded slots
pub(crate) fn defer_all() -> MailboxResult<SignalMask> {
    change(libc::SIG_BLOCK, &SignalMask::full())
}

fn change(how: libc::c_int, set: &SignalMask) -> MailboxResult<SignalMask> {
    let mut previous = SignalMask::empty();
    let rc = unsafe { libc::pthread_sigmask(how, set.as_raw(), &mut previous.0) };
    if rc != 0 {
        return Err(Errno::from_raw(rc).into());
    }
    Ok(previous)
}

/// Async-signal-safe deferral of a raw number for the calling thread
///
/// No allocation, no logging, no error formatting.
pub(crate) fn defer_raw(signal: SignalNumber) -> bool {
    let mut set = MaybeUninit::<libc::sigset_t>::uninit();
    unsafe {
        libc::sigemptyset(set.as_mut_ptr());
        if libc::sigaddset(set.as_mut_ptr(), signal) != 0 {
            return false;
        }
        libc::pthread_sigmask(libc::SIG_BLOCK, set.as_ptr(), std::ptr::null_mut()) == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_membership() {
        let channel = Channel::realtime(3).unwrap();
        let mut mask = SignalMask::empty();
        assert!(!mask.contains(channel));
        mask.add(channel).unwrap();
        assert!(mask.contains(channel));
        assert!(!mask.contains(Channel::USER1));
        assert!(SignalMask::full().contains(Channel::USER1));
    }

    #[test]
    fn test_defer_then_enable_on_this_thread() {
        // Masks are per thread, so this cannot disturb other tests
        let channel = Channel::realtime(4).unwrap();
        let before = SignalMask::current().unwrap();

        let previous = defer(channel).unwrap();
        assert!(!previous.contains(channel));
        assert!(is_deferred(channel).unwrap());
        assert!(!is_pending(channel).unwrap());

        let previous = enable(channel).unwrap();
        assert!(previous.contains(channel));
        assert!(!is_deferred(channel).unwrap());

        restore_mask(&before).unwrap();
    }

    #[test]
    fn test_defer_raw_and_restore() {
        let channel = Channel::realtime(5).unwrap();
        let before = SignalMask::current().unwrap();

        assert!(defer_raw(channel.number()));
        assert!(is_deferred(channel).unwrap());
        assert!(!defer_raw(-1));

        restore_mask(&before).unwrap();
        assert!(!is_deferred(channel).unwrap());
    }

    #[test]
    fn test_debug_lists_members() {
        let mask = SignalMask::of(Channel::USER2).unwrap();
        assert_eq!(format!("{:?}", mask), "{\"SIGUSR2\"}");
    }
}

/*!
 * Handler Context
 * The only view of a delivery that handler code is given
 *
 * Everything reachable from here is async-signal-safe: plain reads of the
 * kernel-supplied `siginfo_t`, `sigaddset` and `pthread_sigmask`. No allocation,
 * no logging, no formatting, no panics.
 */

use crate::core::types::{ReasonCode, SignalNumber};
use crate::signals::delivery::sigval_int;
use crate::signals::management::mask;
use libc::{c_void, pid_t, siginfo_t, uid_t};

/// Validated arguments of an `SA_SIGINFO` handler invocation
pub struct HandlerContext<'a> {
    signal: SignalNumber,
    info: &'a siginfo_t,
    ucontext: *mut c_void,
}

impl<'a> HandlerContext<'a> {
    /// Wrap the raw handler arguments
    ///
    /// Returns `None` for a null `info` or one describing a different signal.
    ///
    /// # Safety
    /// `info` and `ucontext` must be null or the pointers the OS passed to the
    /// handler currently running, and must not outlive it.
    pub unsafe fn from_raw(
        signal: SignalNumber,
        info: *mut siginfo_t,
        ucontext: *mut c_void,
    ) -> Option<Self> {
        let info = info.as_ref()?;
        if info.si_signo != signal {
            return None;
        }
        Some(Self {
            signal,
            info,
            ucontext,
        })
    }

    pub fn signal(&self) -> SignalNumber {
        self.signal
    }

    pub fn code(&self) -> ReasonCode {
        self.info.si_code
    }

    /// Sent with `sigqueue`, carrying a payload
    pub fn is_queued(&self) -> bool {
        self.code() == libc::SI_QUEUE
    }

    /// Sent with `kill`
    pub fn is_user_sent(&self) -> bool {
        self.code() == libc::SI_USER
    }

    /// Only meaningful for queued or user-sent deliveries
    pub fn sender_pid(&self) -> pid_t {
        unsafe { self.info.si_pid() }
    }

    pub fn sender_uid(&self) -> uid_t {
        unsafe { self.info.si_uid() }
    }

    pub fn value_int(&self) -> i32 {
        sigval_int(unsafe { self.info.si_value() })
    }

    pub fn value_ptr(&self) -> *mut c_void {
        let value = unsafe { self.info.si_value() };
        value.sival_ptr
    }

    /// Defer the received signal until ordinary code enables it
    ///
    /// Blocks it for the running thread and adds it to the mask saved in the
    /// interrupted context, which the kernel reinstates when the handler returns.
    /// Without the second step the deferral would be undone on return.
    pub fn defer(&self) -> bool {
        if !mask::defer_raw(self.signal) {
            return false;
        }

        let ucontext = self.ucontext as *mut libc::ucontext_t;
        match unsafe { ucontext.as_mut() } {
            Some(uc) => unsafe { libc::sigaddset(&mut uc.uc_sigmask, self.signal) == 0 },
            // Called directly rather than by the OS: no sigreturn will touch the mask
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::core::Channel;
    use crate::signals::management::{is_deferred, restore_mask, SignalMask};
    use std::mem;
    use std::ptr;

    fn siginfo(signal: SignalNumber, code: ReasonCode) -> siginfo_t {
        let mut info: siginfo_t = unsafe { mem::zeroed() };
        info.si_signo = signal;
        info.si_code = code;
        info
    }

    #[test]
    fn test_null_info_is_rejected() {
        let ctx = unsafe { HandlerContext::from_raw(libc::SIGUSR1, ptr::null_mut(), ptr::null_mut()) };
        assert!(ctx.is_none());
    }

    #[test]
    fn test_mismatched_signal_is_rejected() {
        let mut info = siginfo(libc::SIGUSR2, libc::SI_QUEUE);
        let ctx = unsafe { HandlerContext::from_raw(libc::SIGUSR1, &mut info, ptr::null_mut()) };
        assert!(ctx.is_none());
    }

    #[test]
    fn test_reason_classification() {
        let mut info = siginfo(libc::SIGUSR1, libc::SI_QUEUE);
        let ctx = unsafe { HandlerContext::from_raw(libc::SIGUSR1, &mut info, ptr::null_mut()) }.unwrap();
        assert!(ctx.is_queued());
        assert!(!ctx.is_user_sent());
        assert_eq!(ctx.code(), libc::SI_QUEUE);
    }

    #[test]
    fn test_defer_updates_saved_context_mask() {
        let channel = Channel::realtime(6).unwrap();
        let before = SignalMask::current().unwrap();

        let mut info = siginfo(channel.number(), libc::SI_QUEUE);
        let mut uc: libc::ucontext_t = unsafe { mem::zeroed() };
        unsafe { libc::sigemptyset(&mut uc.uc_sigmask) };

        let ctx = unsafe {
            HandlerContext::from_raw(
                channel.number(),
                &mut info,
                &mut uc as *mut libc::ucontext_t as *mut c_void,
            )
        }
        .unwrap();
        assert!(ctx.defer());

        assert_eq!(unsafe { libc::sigismember(&uc.uc_sigmask, channel.number()) }, 1);
        assert!(is_deferred(channel).unwrap());

        restore_mask(&before).unwrap();
    }
}

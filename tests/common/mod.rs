/*!
 * Shared test support
 * Runs signal scenarios in a forked, single-threaded child
 *
 * Signal masks are per thread and the test harness is multi-threaded, so every
 * scenario that delivers a real signal runs in a child whose exit status carries
 * the verdict back to the harness.
 */

#![allow(dead_code)]

use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::{fork, ForkResult};
use signal_mailbox::{mailbox, restore_mask, SignalMask};
use std::panic::{self, AssertUnwindSafe};
use std::thread;
use std::time::{Duration, Instant};

/// SIGALRM kills a hung child after this many seconds
pub const WATCHDOG_SECS: u32 = 10;

/// Run `scenario` in a forked child and fail the calling test if it does
pub fn in_child<F: FnOnce()>(name: &str, scenario: F) {
    match unsafe { fork() }.expect("fork failed") {
        ForkResult::Child => {
            unsafe { libc::alarm(WATCHDOG_SECS) };
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                restore_mask(&SignalMask::empty()).expect("reset mask");
                mailbox().clear();
                scenario();
            }));
            unsafe { libc::_exit(if outcome.is_ok() { 0 } else { 1 }) };
        }
        ForkResult::Parent { child } => {
            let status = waitpid(child, None).expect("waitpid failed");
            assert_eq!(
                status,
                WaitStatus::Exited(child, 0),
                "scenario '{}' failed in child",
                name
            );
        }
    }
}

/// Poll `condition` until it holds or `timeout` passes
pub fn wait_for(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let started = Instant::now();
    while started.elapsed() < timeout {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    condition()
}

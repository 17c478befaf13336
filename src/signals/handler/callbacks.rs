/*!
 * Handler Variants
 * Registerable handlers that write the process-wide mailbox
 *
 * Handlers run at an arbitrary point in the interrupted thread. They may only
 * perform atomic stores, read the delivery, and defer their own signal. They never
 * log, allocate, panic or clear a flag.
 */

use super::context::HandlerContext;
use crate::core::limits::INTERRUPT_SIGNAL;
use crate::core::types::{Pid, SignalNumber};
use crate::signals::core::Payload;
use crate::signals::mailbox::mailbox;
use libc::{c_void, siginfo_t};
use nix::errno::Errno;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};

// =============================================================================
// BASIC HANDLERS (sa_handler)
// =============================================================================

/// Collect every terminated child without blocking
///
/// Writes no mailbox state beyond the reaped-children counter. `errno` is saved
/// and restored because `waitpid` may overwrite it under the interrupted code.
pub extern "C" fn reap_children(_signal: SignalNumber) {
    let saved = Errno::last_raw();
    let counters = mailbox().counters();

    loop {
        match waitpid(None::<Pid>, Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::StillAlive) => break,
            Ok(_) => counters.record_reaped(),
            // ECHILD: nothing left to collect
            Err(_) => break,
        }
    }

    Errno::set_raw(saved);
}

/// Set the interrupted flag when SIGINT arrives
pub extern "C" fn flag_interruption(signal: SignalNumber) {
    if signal == INTERRUPT_SIGNAL {
        mailbox().record_interrupt();
    }
}

/// Record whichever signal arrived (last write wins)
pub extern "C" fn record_signal_number(signal: SignalNumber) {
    mailbox().record_signal(signal);
}

// =============================================================================
// EXTENDED HANDLERS (sa_sigaction)
// =============================================================================

/// Publish a queued integer payload
pub extern "C" fn read_queue_int(signal: SignalNumber, info: *mut siginfo_t, ucontext: *mut c_void) {
    read_queue(signal, info, ucontext, |ctx| Payload::Integer(ctx.value_int()));
}

/// Publish a queued pointer payload
pub extern "C" fn read_queue_ptr(signal: SignalNumber, info: *mut siginfo_t, ucontext: *mut c_void) {
    read_queue(signal, info, ucontext, |ctx| Payload::Pointer(ctx.value_ptr()));
}

/// Record number, code and sender of a queued or `kill`-sent signal
pub extern "C" fn record_sending_process(
    signal: SignalNumber,
    info: *mut siginfo_t,
    ucontext: *mut c_void,
) {
    record_notice(signal, info, ucontext, true);
}

/// Record number and code of a queued or `kill`-sent signal
pub extern "C" fn record_signal_code(
    signal: SignalNumber,
    info: *mut siginfo_t,
    ucontext: *mut c_void,
) {
    record_notice(signal, info, ucontext, false);
}

/// Shared state machine of the queue readers
///
/// validate -> defer own signal -> write fields -> publish kind. Any failure before
/// the writes leaves the mailbox untouched.
#[inline(always)]
fn read_queue(
    signal: SignalNumber,
    info: *mut siginfo_t,
    ucontext: *mut c_void,
    decode: fn(&HandlerContext<'_>) -> Payload,
) {
    let mailbox = mailbox();
    let ctx = match unsafe { HandlerContext::from_raw(signal, info, ucontext) } {
        Some(ctx) if ctx.is_queued() => ctx,
        _ => {
            mailbox.counters().record_rejected();
            return;
        }
    };

    // Must precede every mailbox write for this signal
    if !ctx.defer() {
        mailbox.counters().record_deferral_failure();
        return;
    }

    mailbox.publish_payload(
        ctx.signal(),
        ctx.code(),
        ctx.sender_pid(),
        ctx.sender_uid(),
        decode(&ctx),
    );
}

/// Shared body of the sender-identity and reason-code recorders; never defers
#[inline(always)]
fn record_notice(signal: SignalNumber, info: *mut siginfo_t, ucontext: *mut c_void, with_sender: bool) {
    let mailbox = mailbox();
    let ctx = match unsafe { HandlerContext::from_raw(signal, info, ucontext) } {
        Some(ctx) if ctx.is_queued() || ctx.is_user_sent() => ctx,
        _ => {
            mailbox.counters().record_rejected();
            return;
        }
    };

    let sender = with_sender.then(|| (ctx.sender_pid(), ctx.sender_uid()));
    mailbox.publish_notice(ctx.signal(), ctx.code(), sender);
}

/*!
 * Reason-Code Translator
 * Maps (signal, si_code) to a description
 *
 * Lookup order: the vocabulary of the signal's own family, then the codes any
 * signal may carry, then a fixed fallback. Allocates; never call from a handler.
 */

use super::core::Channel;
use crate::core::errors::{MailboxError, MailboxResult};
use crate::core::types::{ReasonCode, SignalNumber};
use tracing::debug;

/// Returned for codes outside every table
pub const UNRECOGNIZED: &str = "Unrecognized signal code";

/// Linux `si_code` values
pub mod codes {
    use crate::core::types::ReasonCode;

    // Any signal
    pub const SI_USER: ReasonCode = 0;
    pub const SI_KERNEL: ReasonCode = 0x80;
    pub const SI_QUEUE: ReasonCode = -1;
    pub const SI_TIMER: ReasonCode = -2;
    pub const SI_MESGQ: ReasonCode = -3;
    pub const SI_ASYNCIO: ReasonCode = -4;
    pub const SI_SIGIO: ReasonCode = -5;
    pub const SI_TKILL: ReasonCode = -6;
    pub const SI_DETHREAD: ReasonCode = -7;
    pub const SI_ASYNCNL: ReasonCode = -60;

    // SIGILL
    pub const ILL_ILLOPC: ReasonCode = 1;
    pub const ILL_ILLOPN: ReasonCode = 2;
    pub const ILL_ILLADR: ReasonCode = 3;
    pub const ILL_ILLTRP: ReasonCode = 4;
    pub const ILL_PRVOPC: ReasonCode = 5;
    pub const ILL_PRVREG: ReasonCode = 6;
    pub const ILL_COPROC: ReasonCode = 7;
    pub const ILL_BADSTK: ReasonCode = 8;

    // SIGFPE
    pub const FPE_INTDIV: ReasonCode = 1;
    pub const FPE_INTOVF: ReasonCode = 2;
    pub const FPE_FLTDIV: ReasonCode = 3;
    pub const FPE_FLTOVF: ReasonCode = 4;
    pub const FPE_FLTUND: ReasonCode = 5;
    pub const FPE_FLTRES: ReasonCode = 6;
    pub const FPE_FLTINV: ReasonCode = 7;
    pub const FPE_FLTSUB: ReasonCode = 8;

    // SIGSEGV
    pub const SEGV_MAPERR: ReasonCode = 1;
    pub const SEGV_ACCERR: ReasonCode = 2;
    pub const SEGV_BNDERR: ReasonCode = 3;
    pub const SEGV_PKUERR: ReasonCode = 4;

    // SIGBUS
    pub const BUS_ADRALN: ReasonCode = 1;
    pub const BUS_ADRERR: ReasonCode = 2;
    pub const BUS_OBJERR: ReasonCode = 3;
    pub const BUS_MCEERR_AR: ReasonCode = 4;
    pub const BUS_MCEERR_AO: ReasonCode = 5;

    // SIGTRAP
    pub const TRAP_BRKPT: ReasonCode = 1;
    pub const TRAP_TRACE: ReasonCode = 2;
    pub const TRAP_BRANCH: ReasonCode = 3;
    pub const TRAP_HWBKPT: ReasonCode = 4;

    // SIGCHLD
    pub const CLD_EXITED: ReasonCode = 1;
    pub const CLD_KILLED: ReasonCode = 2;
    pub const CLD_DUMPED: ReasonCode = 3;
    pub const CLD_TRAPPED: ReasonCode = 4;
    pub const CLD_STOPPED: ReasonCode = 5;
    pub const CLD_CONTINUED: ReasonCode = 6;

    // SIGIO / SIGPOLL
    pub const POLL_IN: ReasonCode = 1;
    pub const POLL_OUT: ReasonCode = 2;
    pub const POLL_MSG: ReasonCode = 3;
    pub const POLL_ERR: ReasonCode = 4;
    pub const POLL_PRI: ReasonCode = 5;
    pub const POLL_HUP: ReasonCode = 6;
}

use codes::*;

/// Describe a reason code; fails only for an invalid signal number
pub fn translate(signal: SignalNumber, code: ReasonCode) -> MailboxResult<String> {
    let channel = Channel::new(signal)?;
    Ok(describe(channel, code))
}

/// Describe a reason code for an already validated channel
pub fn describe(channel: Channel, code: ReasonCode) -> String {
    match lookup(channel, code) {
        Ok(text) => text.to_string(),
        Err(e) => {
            debug!(channel = %channel, code, error = %e, "Falling back to generic description");
            UNRECOGNIZED.to_string()
        }
    }
}

/// Raw table lookup; `Unsupported` when no table knows the code
pub fn lookup(channel: Channel, code: ReasonCode) -> MailboxResult<&'static str> {
    family(channel.number(), code)
        .or_else(|| generic(code))
        .ok_or(MailboxError::Unsupported {
            signal: channel.number(),
            code,
        })
}

fn family(signal: SignalNumber, code: ReasonCode) -> Option<&'static str> {
    match signal {
        libc::SIGILL => illegal_instruction(code),
        libc::SIGFPE => floating_point(code),
        libc::SIGSEGV => segmentation(code),
        libc::SIGBUS => bus(code),
        libc::SIGTRAP => trap(code),
        libc::SIGCHLD => child(code),
        libc::SIGIO => poll(code),
        _ => None,
    }
}

fn illegal_instruction(code: ReasonCode) -> Option<&'static str> {
    Some(match code {
        ILL_ILLOPC => "Illegal opcode",
        ILL_ILLOPN => "Illegal operand",
        ILL_ILLADR => "Illegal addressing mode",
        ILL_ILLTRP => "Illegal trap",
        ILL_PRVOPC => "Privileged opcode",
        ILL_PRVREG => "Privileged register",
        ILL_COPROC => "Coprocessor error",
        ILL_BADSTK => "Internal stack error",
        _ => return None,
    })
}

fn floating_point(code: ReasonCode) -> Option<&'static str> {
    Some(match code {
        FPE_INTDIV => "Integer divide by zero",
        FPE_INTOVF => "Integer overflow",
        FPE_FLTDIV => "Floating-point divide by zero",
        FPE_FLTOVF => "Floating-point overflow",
        FPE_FLTUND => "Floating-point underflow",
        FPE_FLTRES => "Floating-point inexact result",
        FPE_FLTINV => "Floating-point invalid operation",
        FPE_FLTSUB => "Subscript out of range",
        _ => return None,
    })
}

fn segmentation(code: ReasonCode) -> Option<&'static str> {
    Some(match code {
        SEGV_MAPERR => "Address not mapped to object",
        SEGV_ACCERR => "Invalid permissions for mapped object",
        SEGV_BNDERR => "Failed address bound checks",
        SEGV_PKUERR => "Access denied by memory protection keys",
        _ => return None,
    })
}

fn bus(code: ReasonCode) -> Option<&'static str> {
    Some(match code {
        BUS_ADRALN => "Invalid address alignment",
        BUS_ADRERR => "Nonexistent physical address",
        BUS_OBJERR => "Object-specific hardware error",
        BUS_MCEERR_AR => "Hardware memory error consumed on a machine check",
        BUS_MCEERR_AO => "Hardware memory error detected but not consumed",
        _ => return None,
    })
}

fn trap(code: ReasonCode) -> Option<&'static str> {
    Some(match code {
        TRAP_BRKPT => "Process breakpoint",
        TRAP_TRACE => "Process trace trap",
        TRAP_BRANCH => "Process taken branch trap",
        TRAP_HWBKPT => "Hardware breakpoint or watchpoint",
        _ => return None,
    })
}

fn child(code: ReasonCode) -> Option<&'static str> {
    Some(match code {
        CLD_EXITED => "Child has exited",
        CLD_KILLED => "Child was killed",
        CLD_DUMPED => "Child terminated abnormally and dumped core",
        CLD_TRAPPED => "Traced child has trapped",
        CLD_STOPPED => "Child has stopped",
        CLD_CONTINUED => "Stopped child has continued",
        _ => return None,
    })
}

fn poll(code: ReasonCode) -> Option<&'static str> {
    Some(match code {
        POLL_IN => "Data input available",
        POLL_OUT => "Output buffers available",
        POLL_MSG => "Input message available",
        POLL_ERR => "I/O error",
        POLL_PRI => "High priority input available",
        POLL_HUP => "Device disconnected",
        _ => return None,
    })
}

fn generic(code: ReasonCode) -> Option<&'static str> {
    Some(match code {
        SI_USER => "Sent by kill() or raise()",
        SI_KERNEL => "Sent by the kernel",
        SI_QUEUE => "Sent by sigqueue()",
        SI_TIMER => "POSIX timer expired",
        SI_MESGQ => "POSIX message queue state changed",
        SI_ASYNCIO => "Asynchronous I/O completed",
        SI_SIGIO => "Queued SIGIO",
        SI_TKILL => "Sent by tkill() or tgkill()",
        SI_DETHREAD => "Sent by execve() killing subsidiary threads",
        SI_ASYNCNL => "Asynchronous name lookup completed",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_family_table_wins_over_generic() {
        // 1 is a family code for SIGCHLD but meaningless for SIGUSR1
        assert_eq!(translate(libc::SIGCHLD, CLD_EXITED).unwrap(), "Child has exited");
        assert_eq!(translate(libc::SIGUSR1, 1).unwrap(), UNRECOGNIZED);
    }

    #[test]
    fn test_generic_codes_apply_to_every_family() {
        assert_eq!(translate(libc::SIGSEGV, SI_QUEUE).unwrap(), "Sent by sigqueue()");
        assert_eq!(translate(libc::SIGUSR2, SI_USER).unwrap(), "Sent by kill() or raise()");
        assert_eq!(translate(libc::SIGRTMIN(), SI_TIMER).unwrap(), "POSIX timer expired");
    }

    #[test]
    fn test_lookup_reports_unsupported() {
        let err = lookup(Channel::CHILD, 99).unwrap_err();
        assert_eq!(err, MailboxError::Unsupported { signal: libc::SIGCHLD, code: 99 });
    }

    #[test]
    fn test_invalid_signal_is_rejected() {
        assert!(matches!(translate(0, SI_USER), Err(MailboxError::InvalidArgument(_))));
    }

    #[test]
    fn test_codes_match_libc() {
        assert_eq!(SI_USER, libc::SI_USER);
        assert_eq!(SI_QUEUE, libc::SI_QUEUE);
    }
}

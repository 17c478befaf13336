/*!
 * Signal Types
 * Handler forms, payloads and the records a consumer takes out of the mailbox
 */

use super::channel::Channel;
use crate::core::types::{ReasonCode, SenderIdentity, SignalNumber};
use libc::{c_void, siginfo_t};
use serde::Serialize;
use std::fmt;

/// `sa_handler` form: receives only the signal number
pub type BasicHandler = extern "C" fn(SignalNumber);

/// `sa_sigaction` form: also receives the delivery record and the interrupted context
pub type ExtendedHandler = extern "C" fn(SignalNumber, *mut siginfo_t, *mut c_void);

/// A registerable handler
#[derive(Debug, Clone, Copy)]
pub enum Handler {
    Basic(BasicHandler),
    Extended(ExtendedHandler),
}

impl Handler {
    /// Extended handlers are installed with `SA_SIGINFO`
    pub fn is_extended(&self) -> bool {
        matches!(self, Handler::Extended(_))
    }

    pub(crate) fn address(&self) -> libc::sighandler_t {
        match *self {
            Handler::Basic(f) => f as libc::sighandler_t,
            Handler::Extended(f) => f as libc::sighandler_t,
        }
    }
}

/// Discriminant of a channel's payload cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum PayloadKind {
    None = 0,
    Integer = 1,
    Pointer = 2,
}

impl PayloadKind {
    pub(crate) const fn from_raw(raw: u8) -> Self {
        match raw {
            1 => PayloadKind::Integer,
            2 => PayloadKind::Pointer,
            _ => PayloadKind::None,
        }
    }
}

/// One machine word carried by a queued signal
///
/// A pointer is only meaningful when sender and receiver map the same memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload {
    Integer(i32),
    Pointer(*mut c_void),
}

impl Payload {
    pub fn kind(&self) -> PayloadKind {
        match self {
            Payload::Integer(_) => PayloadKind::Integer,
            Payload::Pointer(_) => PayloadKind::Pointer,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match *self {
            Payload::Integer(value) => Some(value),
            Payload::Pointer(_) => None,
        }
    }

    pub fn as_ptr(&self) -> Option<*mut c_void> {
        match *self {
            Payload::Pointer(ptr) => Some(ptr),
            Payload::Integer(_) => None,
        }
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Integer(value) => write!(f, "{}", value),
            Payload::Pointer(ptr) => write!(f, "{:p}", ptr),
        }
    }
}

/// A payload taken out of a channel's cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    pub channel: Channel,
    pub code: ReasonCode,
    pub sender: SenderIdentity,
    pub payload: Payload,
}

impl Delivery {
    /// Human-readable reason code; allocates
    pub fn describe(&self) -> String {
        crate::signals::translate::describe(self.channel, self.code)
    }
}

/// What the sender-identity and reason-code recorders leave behind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notice {
    pub channel: Channel,
    pub code: ReasonCode,
    /// Present only when recorded by the sender-identity variant
    pub sender: Option<SenderIdentity>,
}

impl Notice {
    pub fn describe(&self) -> String {
        crate::signals::translate::describe(self.channel, self.code)
    }
}

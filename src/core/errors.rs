/*!
 * Error Types
 * Centralized error handling with thiserror and miette
 */

use miette::Diagnostic;
use nix::errno::Errno;
use thiserror::Error;

/// Mailbox operation result
pub type MailboxResult<T> = Result<T, MailboxError>;

/// Mailbox errors
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum MailboxError {
    #[error("Invalid argument: {0}")]
    #[diagnostic(
        code(mailbox::invalid_argument),
        help("Supply a handler and a signal number between 1 and SIGRTMAX.")
    )]
    InvalidArgument(String),

    #[error("Operating system rejected the request: {0}")]
    #[diagnostic(
        code(mailbox::unavailable),
        help("SIGKILL and SIGSTOP cannot be caught, and the target process must exist and accept signals from this user.")
    )]
    Unavailable(#[from] Errno),

    #[error("Nothing has been published yet")]
    #[diagnostic(
        code(mailbox::not_ready),
        help("Not a failure. Poll again after a short sleep.")
    )]
    NotReady,

    #[error("Unrecognized code {code} for signal {signal}")]
    #[diagnostic(code(mailbox::unsupported))]
    Unsupported { signal: i32, code: i32 },

    #[error("Invalid configuration: {0}")]
    #[diagnostic(
        code(mailbox::config),
        help("Durations are whole milliseconds; booleans are 1/0 or true/false.")
    )]
    Config(String),
}

impl MailboxError {
    /// True for the "try again" outcome of a poll
    pub fn is_not_ready(&self) -> bool {
        matches!(self, MailboxError::NotReady)
    }

    /// OS error code carried by `Unavailable`
    pub fn errno(&self) -> Option<Errno> {
        match self {
            MailboxError::Unavailable(errno) => Some(*errno),
            _ => None,
        }
    }
}

/*!
 * Handler Registration
 * Installs basic and extended handlers as the process-wide disposition
 */

use super::super::core::{Channel, Handler};
use crate::core::errors::{MailboxError, MailboxResult};
use nix::errno::Errno;
use nix::sys::signal::SaFlags;
use std::fmt;
use std::mem;
use tracing::{debug, info};

/// Disposition that was in force before a registration
#[derive(Clone, Copy)]
pub struct PreviousAction {
    raw: libc::sigaction,
}

impl PreviousAction {
    /// `SIG_DFL`
    pub fn is_default(&self) -> bool {
        self.raw.sa_sigaction == libc::SIG_DFL
    }

    /// `SIG_IGN`
    pub fn is_ignored(&self) -> bool {
        self.raw.sa_sigaction == libc::SIG_IGN
    }

    pub fn flags(&self) -> SaFlags {
        SaFlags::from_bits_truncate(self.raw.sa_flags)
    }

    /// True if this disposition is the given handler
    pub fn is_handler(&self, handler: Handler) -> bool {
        self.raw.sa_sigaction == handler.address()
    }
}

impl fmt::Debug for PreviousAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let disposition = if self.is_default() {
            "SIG_DFL".to_string()
        } else if self.is_ignored() {
            "SIG_IGN".to_string()
        } else {
            format!("{:#x}", self.raw.sa_sigaction)
        };
        f.debug_struct("PreviousAction")
            .field("disposition", &disposition)
            .field("flags", &self.flags())
            .finish()
    }
}

/// Install `handler` for `channel`, replacing the disposition for the whole process
///
/// The handler form decides `SA_SIGINFO`: added for extended handlers, stripped
/// from `flags` for basic ones. The handler's own signal stays blocked while it
/// runs (no `SA_NODEFER` unless the caller asks).
pub fn register_handler(
    channel: Channel,
    handler: Handler,
    flags: SaFlags,
) -> MailboxResult<PreviousAction> {
    let mut flags = flags;
    flags.set(SaFlags::SA_SIGINFO, handler.is_extended());

    let mut action: libc::sigaction = unsafe { mem::zeroed() };
    action.sa_sigaction = handler.address();
    action.sa_flags = flags.bits();
    unsafe { libc::sigemptyset(&mut action.sa_mask) };

    let previous = install(channel, &action)?;
    info!(
        channel = %channel,
        extended = handler.is_extended(),
        flags = ?flags,
        "Registered signal handler"
    );
    Ok(previous)
}

/// Reinstall a disposition captured by a registration
pub fn restore(channel: Channel, previous: &PreviousAction) -> MailboxResult<PreviousAction> {
    let replaced = install(channel, &previous.raw)?;
    debug!(channel = %channel, restored = ?previous, "Restored signal disposition");
    Ok(replaced)
}

fn install(channel: Channel, action: &libc::sigaction) -> MailboxResult<PreviousAction> {
    let mut previous: libc::sigaction = unsafe { mem::zeroed() };
    Errno::result(unsafe { libc::sigaction(channel.number(), action, &mut previous) })?;
    Ok(PreviousAction { raw: previous })
}

/// Registration builder
///
/// ```no_run
/// use signal_mailbox::{Channel, HandlerVariant, Registration};
///
/// let previous = Registration::new(Channel::USER1)
///     .handler(HandlerVariant::QueueInt.handler())
///     .restart_interrupted()
///     .install()?;
/// # Ok::<(), signal_mailbox::MailboxError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Registration {
    channel: Channel,
    handler: Option<Handler>,
    flags: SaFlags,
}

impl Registration {
    pub fn new(channel: Channel) -> Self {
        Self {
            channel,
            handler: None,
            flags: SaFlags::empty(),
        }
    }

    pub fn handler(mut self, handler: Handler) -> Self {
        self.handler = Some(handler);
        self
    }

    pub fn flags(mut self, flags: SaFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Restart blocking calls interrupted by this signal (`SA_RESTART`)
    pub fn restart_interrupted(mut self) -> Self {
        self.flags |= SaFlags::SA_RESTART;
        self
    }

    pub fn install(self) -> MailboxResult<PreviousAction> {
        let handler = self.handler.ok_or_else(|| {
            MailboxError::InvalidArgument(format!("no handler supplied for {}", self.channel))
        })?;
        register_handler(self.channel, handler, self.flags)
    }
}

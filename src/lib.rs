/*!
 * Signal Mailbox Library
 * Typed payload delivery between processes over queued POSIX signals
 *
 * A sender queues a signal carrying one machine word (an integer or a pointer into
 * memory shared with the receiver). The receiver's handler publishes it into a
 * process-wide mailbox of atomic cells and defers further deliveries of that signal
 * until ordinary code has drained that channel's cell and enabled it again.
 */

pub mod core;
pub mod monitoring;
pub mod signals;

// Re-exports
pub use crate::core::{MailboxConfig, MailboxError, MailboxResult};
pub use monitoring::init_tracing;
pub use signals::{
    defer, enable, is_deferred, is_pending, mailbox, register_handler, restore, restore_mask,
    send, send_int, send_ptr, translate, Channel, Delivery, Handler, HandlerVariant, Mailbox,
    MailboxStats, Notice, Payload, PayloadKind, PreviousAction, Receiver, Registration,
    SenderIdentity, SignalMask,
};

/*!
 * Signals Module
 * Queued-signal payload delivery into a process-wide mailbox
 */

pub mod core;
pub mod delivery;
pub mod handler;
pub mod mailbox;
pub mod management;
pub mod receiver;
pub mod translate;

// Re-export public API
pub use self::core::{
    Channel, Delivery, Handler, MailboxStats, Notice, Payload, PayloadKind,
};
pub use crate::core::types::SenderIdentity;
pub use delivery::{send, send_int, send_ptr};
pub use handler::{
    flag_interruption, read_queue_int, read_queue_ptr, reap_children, record_sending_process,
    record_signal_code, record_signal_number, HandlerContext, HandlerVariant,
};
pub use mailbox::{mailbox, Mailbox};
pub use management::{
    defer, enable, is_deferred, is_pending, register_handler, restore, restore_mask,
    PreviousAction, Registration, SignalMask,
};
pub use receiver::Receiver;
pub use translate::{describe, lookup, translate};

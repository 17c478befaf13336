/*!
 * Signal Handlers
 * Handler context and the built-in handler variants
 */

mod callbacks;
mod context;

pub use callbacks::{
    flag_interruption, read_queue_int, read_queue_ptr, reap_children, record_sending_process,
    record_signal_code, record_signal_number,
};
pub use context::HandlerContext;

use super::core::Handler;
use std::fmt;

/// Built-in handlers, by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerVariant {
    /// Basic: collect every terminated child
    ReapChildren,
    /// Basic: set the interrupted flag on SIGINT
    Interruptions,
    /// Basic: record the signal number
    SignalNumber,
    /// Extended: publish a queued integer, deferring its signal
    QueueInt,
    /// Extended: publish a queued pointer, deferring its signal
    QueuePtr,
    /// Extended: record number, code and sender identity
    SendingProcess,
    /// Extended: record number and code
    SignalCode,
}

impl HandlerVariant {
    pub const ALL: [HandlerVariant; 7] = [
        HandlerVariant::ReapChildren,
        HandlerVariant::Interruptions,
        HandlerVariant::SignalNumber,
        HandlerVariant::QueueInt,
        HandlerVariant::QueuePtr,
        HandlerVariant::SendingProcess,
        HandlerVariant::SignalCode,
    ];

    pub fn handler(self) -> Handler {
        match self {
            HandlerVariant::ReapChildren => Handler::Basic(reap_children),
            HandlerVariant::Interruptions => Handler::Basic(flag_interruption),
            HandlerVariant::SignalNumber => Handler::Basic(record_signal_number),
            HandlerVariant::QueueInt => Handler::Extended(read_queue_int),
            HandlerVariant::QueuePtr => Handler::Extended(read_queue_ptr),
            HandlerVariant::SendingProcess => Handler::Extended(record_sending_process),
            HandlerVariant::SignalCode => Handler::Extended(record_signal_code),
        }
    }

    /// Whether the handler defers its own signal on firing
    pub fn defers(self) -> bool {
        matches!(self, HandlerVariant::QueueInt | HandlerVariant::QueuePtr)
    }

    pub fn name(self) -> &'static str {
        match self {
            HandlerVariant::ReapChildren => "reap-children",
            HandlerVariant::Interruptions => "interruptions",
            HandlerVariant::SignalNumber => "signal-number",
            HandlerVariant::QueueInt => "queue-int",
            HandlerVariant::QueuePtr => "queue-ptr",
            HandlerVariant::SendingProcess => "sending-process",
            HandlerVariant::SignalCode => "signal-code",
        }
    }
}

impl fmt::Display for HandlerVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_forms() {
        for variant in HandlerVariant::ALL {
            let extended = variant.handler().is_extended();
            match variant {
                HandlerVariant::ReapChildren
                | HandlerVariant::Interruptions
                | HandlerVariant::SignalNumber => assert!(!extended, "{} should be basic", variant),
                _ => assert!(extended, "{} should be extended", variant),
            }
        }
    }

    #[test]
    fn test_only_queue_readers_defer() {
        let deferring: Vec<_> = HandlerVariant::ALL.into_iter().filter(|v| v.defers()).collect();
        assert_eq!(deferring, vec![HandlerVariant::QueueInt, HandlerVariant::QueuePtr]);
    }
}

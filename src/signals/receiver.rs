/*!
 * Receiver
 * Consumer loop over one channel of the process-wide mailbox
 *
 * Installs the matching queue reader, then drains the channel's payload cell by
 * polling.
 * Each successful take re-enables the channel so the next queued delivery can
 * run its handler.
 */

use super::core::{Channel, Delivery, PayloadKind};
use super::handler::HandlerVariant;
use super::mailbox::{mailbox, Mailbox};
use super::management::{defer, enable, restore, restore_mask, PreviousAction, Registration};
use crate::core::config::MailboxConfig;
use crate::core::errors::{MailboxError, MailboxResult};
use crate::monitoring::span_channel;
use std::thread;
use std::time::Instant;
use tracing::{debug, info, trace, warn};

/// Polling consumer bound to one channel
pub struct Receiver {
    channel: Channel,
    kind: PayloadKind,
    config: MailboxConfig,
    mailbox: &'static Mailbox,
    previous: Option<PreviousAction>,
}

impl Receiver {
    /// Receiver for integer payloads
    pub fn new(channel: Channel, config: MailboxConfig) -> Self {
        Self {
            channel,
            kind: PayloadKind::Integer,
            config,
            mailbox: mailbox(),
            previous: None,
        }
    }

    /// Receiver for pointer payloads
    pub fn for_pointers(channel: Channel, config: MailboxConfig) -> Self {
        Self {
            kind: PayloadKind::Pointer,
            ..Self::new(channel, config)
        }
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn kind(&self) -> PayloadKind {
        self.kind
    }

    pub fn is_installed(&self) -> bool {
        self.previous.is_some()
    }

    fn variant(&self) -> HandlerVariant {
        match self.kind {
            PayloadKind::Pointer => HandlerVariant::QueuePtr,
            _ => HandlerVariant::QueueInt,
        }
    }

    /// Register the queue reader and open the channel
    ///
    /// The channel is held deferred while the handler is swapped in, so no
    /// delivery can reach the old disposition half way through.
    pub fn install(&mut self) -> MailboxResult<()> {
        let variant = self.variant();
        let before = defer(self.channel)?;

        let registered = Registration::new(self.channel)
            .handler(variant.handler())
            .flags(self.config.flags())
            .install();
        let previous = match registered {
            Ok(previous) => previous,
            Err(e) => {
                restore_mask(&before)?;
                return Err(e);
            }
        };

        // Only remember the first disposition so uninstall returns to it
        self.previous.get_or_insert(previous);
        enable(self.channel)?;

        info!(channel = %self.channel, handler = %variant, "Receiver installed");
        Ok(())
    }

    /// Reinstall the disposition found by `install`
    pub fn uninstall(&mut self) -> MailboxResult<()> {
        if let Some(previous) = self.previous.take() {
            restore(self.channel, &previous)?;
            info!(channel = %self.channel, "Receiver uninstalled");
        }
        Ok(())
    }

    /// Take a pending delivery without waiting
    ///
    /// Returns `NotReady` when nothing has arrived on this channel. If the channel
    /// cannot be enabled again, the delivery goes back into its cell (the channel
    /// is still deferred) and the next call returns it.
    pub fn try_recv(&self) -> MailboxResult<Delivery> {
        let before = defer(self.channel)?;
        match self.mailbox.take_payload(self.channel) {
            Ok(delivery) => {
                if let Err(e) = enable(self.channel) {
                    self.mailbox.requeue(&delivery);
                    warn!(channel = %self.channel, error = %e, "Enable failed, delivery requeued");
                    return Err(e);
                }
                trace!(channel = %self.channel, payload = %delivery.payload, "Took delivery");
                Ok(delivery)
            }
            Err(e) => {
                restore_mask(&before)?;
                Err(e)
            }
        }
    }

    /// Wait for a delivery, polling at the configured interval
    ///
    /// Gives up with `NotReady` once the configured receive timeout elapses.
    pub fn recv(&self) -> MailboxResult<Delivery> {
        let span = span_channel("recv", &self.channel.to_string());
        let _guard = span.enter();

        let started = Instant::now();
        let timeout = self.config.receive_timeout();
        loop {
            match self.try_recv() {
                Err(MailboxError::NotReady) => {}
                other => return other,
            }

            if let Some(timeout) = timeout {
                if started.elapsed() >= timeout {
                    debug!(channel = %self.channel, ?timeout, "Receive timed out");
                    return Err(MailboxError::NotReady);
                }
            }
            thread::sleep(self.config.poll_interval());
        }
    }
}

impl std::fmt::Debug for Receiver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Receiver")
            .field("channel", &self.channel)
            .field("kind", &self.kind)
            .field("config", &self.config)
            .field("installed", &self.is_installed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_receiver_kinds() {
        let channel = Channel::realtime(7).unwrap();
        let ints = Receiver::new(channel, MailboxConfig::new());
        let ptrs = Receiver::for_pointers(channel, MailboxConfig::new());

        assert_eq!(ints.variant(), HandlerVariant::QueueInt);
        assert_eq!(ptrs.variant(), HandlerVariant::QueuePtr);
        assert!(!ints.is_installed());
    }

    #[test]
    fn test_recv_times_out_when_nothing_arrives() {
        // Never installed, so nothing can fill the slot for this channel
        let channel = Channel::realtime(8).unwrap();
        let config = MailboxConfig::new()
            .with_poll_interval(Duration::from_millis(1))
            .with_receive_timeout(Duration::from_millis(20));
        let receiver = Receiver::new(channel, config);

        let started = Instant::now();
        assert_eq!(receiver.recv().unwrap_err(), MailboxError::NotReady);
        assert!(started.elapsed() >= Duration::from_millis(20));
        assert!(!crate::signals::management::is_deferred(channel).unwrap());
    }
}

/*!
 * Mailbox State
 * Process-wide cells written by signal handlers and drained by ordinary code
 *
 * Publication order: a handler writes every field of a slot with relaxed stores,
 * then stores the slot's discriminant (`kind` / `ready`) with Release. A consumer
 * loads the discriminant with Acquire before trusting any other field, zeroes the
 * fields, and clears the discriminant last.
 *
 * Handlers only ever set values; consumers only ever reset them.
 */

use super::core::{AtomicMailboxStats, Channel, Delivery, MailboxStats, Notice, Payload, PayloadKind};
use super::management::mask;
use crate::core::errors::{MailboxError, MailboxResult};
use crate::core::limits::PAYLOAD_SLOTS;
use crate::core::types::{ReasonCode, SenderIdentity, SignalNumber};
use libc::{c_void, pid_t, uid_t};
use std::ptr;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicPtr, AtomicU32, AtomicU8, Ordering};

static MAILBOX: Mailbox = Mailbox::new();

/// The process-wide mailbox the built-in handlers write to
pub fn mailbox() -> &'static Mailbox {
    &MAILBOX
}

/// Payload cell of one channel, filled by the queue readers
struct PayloadSlot {
    code: AtomicI32,
    pid: AtomicI32,
    uid: AtomicU32,
    int: AtomicI32,
    ptr: AtomicPtr<c_void>,
    kind: AtomicU8,
}

// Repeat operand for the slot array; each use is a fresh value
#[allow(clippy::declare_interior_mutable_const)]
const EMPTY_SLOT: PayloadSlot = PayloadSlot::new();

impl PayloadSlot {
    const fn new() -> Self {
        Self {
            code: AtomicI32::new(0),
            pid: AtomicI32::new(0),
            uid: AtomicU32::new(0),
            int: AtomicI32::new(0),
            ptr: AtomicPtr::new(ptr::null_mut()),
            kind: AtomicU8::new(PayloadKind::None as u8),
        }
    }

    fn publish(&self, code: ReasonCode, pid: pid_t, uid: uid_t, payload: Payload) {
        self.code.store(code, Ordering::Relaxed);
        self.pid.store(pid, Ordering::Relaxed);
        self.uid.store(uid, Ordering::Relaxed);
        match payload {
            Payload::Integer(value) => self.int.store(value, Ordering::Relaxed),
            Payload::Pointer(value) => self.ptr.store(value, Ordering::Relaxed),
        }
        // Publication barrier: must be the last write
        self.kind.store(payload.kind() as u8, Ordering::Release);
    }

    fn kind(&self) -> PayloadKind {
        PayloadKind::from_raw(self.kind.load(Ordering::Acquire))
    }

    fn take(&self, channel: Channel) -> Option<Delivery> {
        let payload = match self.kind() {
            PayloadKind::None => return None,
            PayloadKind::Integer => Payload::Integer(self.int.load(Ordering::Relaxed)),
            PayloadKind::Pointer => Payload::Pointer(self.ptr.load(Ordering::Relaxed)),
        };

        let delivery = Delivery {
            channel,
            code: self.code.load(Ordering::Relaxed),
            sender: SenderIdentity::from_raw(
                self.pid.load(Ordering::Relaxed),
                self.uid.load(Ordering::Relaxed),
            ),
            payload,
        };
        self.clear();
        Some(delivery)
    }

    fn clear(&self) {
        self.code.store(0, Ordering::Relaxed);
        self.pid.store(0, Ordering::Relaxed);
        self.uid.store(0, Ordering::Relaxed);
        self.int.store(0, Ordering::Relaxed);
        self.ptr.store(ptr::null_mut(), Ordering::Relaxed);
        self.kind.store(PayloadKind::None as u8, Ordering::Release);
    }
}

/// Slot filled by the sender-identity and reason-code recorders
struct NoticeSlot {
    signal: AtomicI32,
    code: AtomicI32,
    pid: AtomicI32,
    uid: AtomicU32,
    has_sender: AtomicBool,
    ready: AtomicBool,
}

impl NoticeSlot {
    const fn new() -> Self {
        Self {
            signal: AtomicI32::new(0),
            code: AtomicI32::new(0),
            pid: AtomicI32::new(0),
            uid: AtomicU32::new(0),
            has_sender: AtomicBool::new(false),
            ready: AtomicBool::new(false),
        }
    }

    fn publish(&self, signal: SignalNumber, code: ReasonCode, sender: Option<(pid_t, uid_t)>) {
        self.signal.store(signal, Ordering::Relaxed);
        self.code.store(code, Ordering::Relaxed);
        if let Some((pid, uid)) = sender {
            self.pid.store(pid, Ordering::Relaxed);
            self.uid.store(uid, Ordering::Relaxed);
        }
        self.has_sender.store(sender.is_some(), Ordering::Relaxed);
        self.ready.store(true, Ordering::Release);
    }

    fn take(&self) -> Option<Notice> {
        if !self.ready.load(Ordering::Acquire) {
            return None;
        }

        let sender = self.has_sender.load(Ordering::Relaxed).then(|| {
            SenderIdentity::from_raw(
                self.pid.load(Ordering::Relaxed),
                self.uid.load(Ordering::Relaxed),
            )
        });
        let notice = Notice {
            channel: Channel::from_handler(self.signal.load(Ordering::Relaxed)),
            code: self.code.load(Ordering::Relaxed),
            sender,
        };
        self.clear();
        Some(notice)
    }

    fn clear(&self) {
        self.signal.store(0, Ordering::Relaxed);
        self.code.store(0, Ordering::Relaxed);
        self.pid.store(0, Ordering::Relaxed);
        self.uid.store(0, Ordering::Relaxed);
        self.has_sender.store(false, Ordering::Relaxed);
        self.ready.store(false, Ordering::Release);
    }
}

/// Mailbox of atomic cells
///
/// No lock guards any of this. Each channel owns its payload cell, which the queue
/// reader for that channel protects by deferring the channel before writing. The
/// notice slot is shared and last-write-wins.
pub struct Mailbox {
    queues: [PayloadSlot; PAYLOAD_SLOTS],
    notice: NoticeSlot,
    signal_number: AtomicI32,
    interrupted: AtomicBool,
    stats: AtomicMailboxStats,
}

impl Mailbox {
    pub const fn new() -> Self {
        Self {
            queues: [EMPTY_SLOT; PAYLOAD_SLOTS],
            notice: NoticeSlot::new(),
            signal_number: AtomicI32::new(0),
            interrupted: AtomicBool::new(false),
            stats: AtomicMailboxStats::new(),
        }
    }

    // -------------------------------------------------------------------------
    // Handler side: atomic stores only
    // -------------------------------------------------------------------------

    pub(crate) fn publish_payload(
        &self,
        signal: SignalNumber,
        code: ReasonCode,
        pid: pid_t,
        uid: uid_t,
        payload: Payload,
    ) {
        match self.slot(signal) {
            Some(slot) => {
                slot.publish(code, pid, uid, payload);
                self.stats.record_published();
            }
            None => self.stats.record_rejected(),
        }
    }

    pub(crate) fn publish_notice(
        &self,
        signal: SignalNumber,
        code: ReasonCode,
        sender: Option<(pid_t, uid_t)>,
    ) {
        self.notice.publish(signal, code, sender);
        self.stats.record_notice();
    }

    pub(crate) fn record_signal(&self, signal: SignalNumber) {
        self.signal_number.store(signal, Ordering::Release);
        self.stats.record_signal();
    }

    pub(crate) fn record_interrupt(&self) {
        self.interrupted.store(true, Ordering::Release);
        self.stats.record_interrupt();
    }

    pub(crate) fn counters(&self) -> &AtomicMailboxStats {
        &self.stats
    }

    // -------------------------------------------------------------------------
    // Consumer side
    // -------------------------------------------------------------------------

    /// Current discriminant of `channel`'s payload cell
    pub fn payload_kind(&self, channel: Channel) -> PayloadKind {
        self.slot(channel.number()).map_or(PayloadKind::None, PayloadSlot::kind)
    }

    /// Read and clear `channel`'s payload cell
    ///
    /// Returns `NotReady` when nothing has been published on `channel`. The
    /// channel stays deferred; call `enable(channel)` afterwards to let the next
    /// queued delivery in.
    pub fn take_payload(&self, channel: Channel) -> MailboxResult<Delivery> {
        self.slot(channel.number())
            .and_then(|slot| slot.take(channel))
            .ok_or(MailboxError::NotReady)
    }

    /// Read and clear the lowest-numbered channel holding a payload
    pub fn take_any_payload(&self) -> MailboxResult<Delivery> {
        self.queues
            .iter()
            .enumerate()
            .skip(1)
            .find_map(|(number, slot)| slot.take(Channel::from_handler(number as SignalNumber)))
            .ok_or(MailboxError::NotReady)
    }

    /// Put a taken delivery back into its cell without counting a publication
    ///
    /// Only sound while the channel is deferred, so no handler can race the writes.
    pub(crate) fn requeue(&self, delivery: &Delivery) {
        if let Some(slot) = self.slot(delivery.channel.number()) {
            slot.publish(
                delivery.code,
                delivery.sender.pid.as_raw(),
                delivery.sender.uid.as_raw(),
                delivery.payload,
            );
        }
    }

    /// True once a sender-identity or reason-code recorder has fired
    pub fn is_notice_ready(&self) -> bool {
        self.notice.ready.load(Ordering::Acquire)
    }

    /// Read and clear the notice slot
    ///
    /// The recorders never defer, so every signal is held off for the calling
    /// thread while the fields are copied out.
    pub fn take_notice(&self) -> MailboxResult<Notice> {
        let previous = mask::defer_all()?;
        let taken = self.notice.take();
        mask::restore_mask(&previous)?;
        taken.ok_or(MailboxError::NotReady)
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::Acquire)
    }

    /// Read and reset the interrupt flag
    pub fn take_interrupted(&self) -> bool {
        self.interrupted.swap(false, Ordering::AcqRel)
    }

    /// Last number seen by the signal-number recorder, without resetting it
    pub fn signal_number(&self) -> Option<Channel> {
        match self.signal_number.load(Ordering::Acquire) {
            0 => None,
            number => Some(Channel::from_handler(number)),
        }
    }

    /// Read and reset the recorded signal number
    pub fn take_signal_number(&self) -> Option<Channel> {
        match self.signal_number.swap(0, Ordering::AcqRel) {
            0 => None,
            number => Some(Channel::from_handler(number)),
        }
    }

    /// Reset every cell to its empty sentinel
    pub fn clear(&self) {
        self.queues.iter().for_each(PayloadSlot::clear);
        self.notice.clear();
        self.signal_number.store(0, Ordering::Release);
        self.interrupted.store(false, Ordering::Release);
    }

    pub fn stats(&self) -> MailboxStats {
        self.stats.snapshot()
    }

    fn slot(&self, signal: SignalNumber) -> Option<&PayloadSlot> {
        usize::try_from(signal)
            .ok()
            .filter(|&index| index > 0)
            .and_then(|index| self.queues.get(index))
    }
}

impl Default for Mailbox {
    fn default() -> Self {
        Self::new()
    }
}

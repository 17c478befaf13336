/*!
 * Limits and Constants
 *
 * Defaults for polling, timeouts and the signal numbers the handlers key on.
 */

use std::time::Duration;

// =============================================================================
// POLLING
// =============================================================================

/// Standard sleep between mailbox polls (100ms)
pub const STANDARD_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Aggressive poll interval (10ms)
pub const AGGRESSIVE_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Relaxed poll interval (1s)
pub const RELAXED_POLL_INTERVAL: Duration = Duration::from_secs(1);

// =============================================================================
// RECEIVE TIMEOUTS
// =============================================================================

/// Standard receive timeout (10s)
pub const STANDARD_RECEIVE_TIMEOUT: Duration = Duration::from_secs(10);

/// Aggressive receive timeout (2s)
pub const AGGRESSIVE_RECEIVE_TIMEOUT: Duration = Duration::from_secs(2);

/// Relaxed receive timeout (60s)
pub const RELAXED_RECEIVE_TIMEOUT: Duration = Duration::from_secs(60);

// =============================================================================
// SIGNALS
// =============================================================================

/// Signal the interrupt handler reacts to
pub const INTERRUPT_SIGNAL: libc::c_int = libc::SIGINT;

/// Lowest valid signal number
pub const MIN_SIGNAL: libc::c_int = 1;

/// Payload cells in the mailbox, one per signal number up to the Linux `_NSIG` (65)
///
/// `SIGRTMAX()` is at most 64 on Linux, so every valid channel has a cell.
pub const PAYLOAD_SLOTS: usize = 65;

// =============================================================================
// ENVIRONMENT
// =============================================================================

pub const ENV_POLL_INTERVAL_MS: &str = "MAILBOX_POLL_INTERVAL_MS";
pub const ENV_RECEIVE_TIMEOUT_MS: &str = "MAILBOX_RECEIVE_TIMEOUT_MS";
pub const ENV_RESTART: &str = "MAILBOX_RESTART";
pub const ENV_TRACE_JSON: &str = "MAILBOX_TRACE_JSON";

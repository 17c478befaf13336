/*!
 * Signal Core - Types
 * Channels, handler forms, payload records and statistics
 */

pub mod atomic_stats;
pub mod channel;
pub mod types;

// Re-export commonly used types
pub use atomic_stats::{AtomicMailboxStats, MailboxStats};
pub use channel::Channel;
pub use types::*;

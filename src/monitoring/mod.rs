/*!
 * Monitoring
 * Tracing setup for the mailbox consumers
 */

mod tracer;

pub use tracer::{init_tracing, span_channel};

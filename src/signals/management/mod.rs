/*!
 * Signal Management
 * Handler registration and per-thread deferral
 */

pub mod mask;
pub mod registry;

pub use mask::{defer, enable, is_deferred, is_pending, restore_mask, SignalMask};
pub use registry::{register_handler, restore, PreviousAction, Registration};

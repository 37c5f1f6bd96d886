//! Real-time change-notification fan-out.
//!
//! Every successful board mutation publishes exactly one [`ChangeEvent`]
//! here; connected observers (board views, notification bells) receive it
//! and re-render or surface the summary.

mod event;
mod hub;

pub use event::{ChangeEvent, ChangeKind};
pub use hub::{NotificationHub, NotificationReceiver};

#[cfg(test)]
mod tests;

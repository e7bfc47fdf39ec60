//! Alert delivery.
//!
//! Delivery is best-effort: a failed send is reported to the caller, which
//! logs it and carries on. Nothing here retries.

pub mod errors;
pub mod message;
pub mod sink;
pub mod telegram;

pub use errors::NotifyError;
pub use sink::{DisabledSink, NotificationSink};
pub use telegram::TelegramSink;

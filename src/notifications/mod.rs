//! Operator notifications
//!
//! Run summaries, verification summaries and archived-link events are pushed
//! through a `NotificationDispatcher` that never blocks or fails the pipelines.

pub mod dispatcher;
pub mod log_notifier;
pub mod traits;
pub mod webhook;

pub use dispatcher::NotificationDispatcher;
pub use log_notifier::LogNotifier;
pub use traits::{DispatchResult, NotificationEvent, Notifier, NotifyError};
pub use webhook::WebhookNotifier;

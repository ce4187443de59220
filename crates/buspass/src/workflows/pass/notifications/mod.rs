//! Notification creation, dedup, and read-marking.

pub mod dispatcher;
pub mod domain;
pub mod store;

pub use dispatcher::NotificationDispatcher;
pub use domain::{Notification, Recipient};
pub use store::{NotificationError, NotificationStore};

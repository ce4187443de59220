use super::domain::{Notification, Recipient};

/// Persistence seam for notifications.
pub trait NotificationStore: Send + Sync {
    fn create(&self, notification: Notification) -> Result<(), NotificationError>;

    /// Unread notifications for a recipient, most recent first.
    fn unread_for(&self, recipient: &Recipient) -> Result<Vec<Notification>, NotificationError>;

    /// Unread notifications for a recipient whose message contains
    /// `fragment`, case-insensitively. Backs the pending-review dedup check.
    fn unread_matching(
        &self,
        recipient: &Recipient,
        fragment: &str,
    ) -> Result<Vec<Notification>, NotificationError>;

    /// Mark every unread notification for `recipient` as read, returning how
    /// many rows changed. Already-read rows are untouched.
    fn mark_read(&self, recipient: &Recipient) -> Result<u64, NotificationError>;
}

/// Error enumeration for notification persistence failures.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification store unavailable: {0}")]
    Unavailable(String),
}

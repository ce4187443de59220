use std::sync::Arc;

use chrono::Utc;

use super::domain::{Notification, Recipient};
use super::store::{NotificationError, NotificationStore};
use crate::workflows::pass::applications::domain::ApplicantId;

/// Creates, dedupes, and read-marks notifications on behalf of the
/// lifecycle manager and the expiry sweep.
pub struct NotificationDispatcher<S> {
    store: Arc<S>,
}

impl<S> NotificationDispatcher<S>
where
    S: NotificationStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Always creates a fresh unread notification for the applicant.
    pub fn notify_user(
        &self,
        applicant: &ApplicantId,
        message: impl Into<String>,
    ) -> Result<(), NotificationError> {
        self.store.create(Notification::unread(
            Recipient::User(applicant.clone()),
            message.into(),
            Utc::now(),
        ))
    }

    /// Always creates a fresh unread broadcast in the admin inbox. Not
    /// deduplicated; callers wanting dedup use [`Self::notify_pending_review`].
    pub fn notify_admins(&self, message: impl Into<String>) -> Result<(), NotificationError> {
        self.store.create(Notification::unread(
            Recipient::AdminBroadcast,
            message.into(),
            Utc::now(),
        ))
    }

    /// Raise the "new application pending review" broadcast, suppressed while
    /// an unread broadcast naming the same applicant is still sitting in the
    /// admin inbox. Bounds alert spam from repeated submissions.
    pub fn notify_pending_review(&self, full_name: &str) -> Result<(), NotificationError> {
        let existing = self
            .store
            .unread_matching(&Recipient::AdminBroadcast, full_name)?;
        if !existing.is_empty() {
            tracing::debug!(%full_name, "pending-review alert suppressed, unread alert exists");
            return Ok(());
        }

        self.notify_admins(format!(
            "New bus pass application pending review from {full_name}"
        ))
    }

    /// Unread notifications, most recent first. A read, not a mutation.
    pub fn list_unread(&self, recipient: &Recipient) -> Result<Vec<Notification>, NotificationError> {
        self.store.unread_for(recipient)
    }

    /// Consume-once view: returns the current unread set (most recent first)
    /// and marks all of those as read. A second immediate call returns an
    /// empty sequence. Safe to call repeatedly.
    pub fn fetch_and_mark_read(
        &self,
        recipient: &Recipient,
    ) -> Result<Vec<Notification>, NotificationError> {
        let unread = self.store.unread_for(recipient)?;
        self.store.mark_read(recipient)?;
        Ok(unread)
    }

    /// Mark unread as read without returning them.
    pub fn mark_all_read(&self, recipient: &Recipient) -> Result<u64, NotificationError> {
        self.store.mark_read(recipient)
    }
}

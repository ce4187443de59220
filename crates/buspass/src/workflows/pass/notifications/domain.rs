use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::pass::applications::domain::ApplicantId;

/// Addressee of a notification: a concrete applicant or the shared
/// administrator inbox.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "applicant_id", rename_all = "snake_case")]
pub enum Recipient {
    User(ApplicantId),
    AdminBroadcast,
}

/// A single inbox entry. Created by system events, mutated only by
/// read-marking, never deleted here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub recipient: Recipient,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn unread(recipient: Recipient, message: String, created_at: DateTime<Utc>) -> Self {
        Self {
            recipient,
            message,
            read: false,
            created_at,
        }
    }
}

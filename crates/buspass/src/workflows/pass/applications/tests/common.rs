use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{NaiveDate, TimeZone, Utc};

use crate::workflows::pass::applications::domain::{
    ApplicantId, Application, ApplicationId, DocumentReference, PassDuration, PassPayload,
    PassStatus,
};
use crate::workflows::pass::applications::payload::{PayloadRenderer, RenderError};
use crate::workflows::pass::applications::repository::{
    ApplicationRepository, RepositoryError, StatusChange,
};
use crate::workflows::pass::applications::service::{PassApplicationService, PassSubmission};
use crate::workflows::pass::applications::verification::{
    ExtractionError, ExtractionGateway, VerificationConfig,
};
use crate::workflows::pass::clock::{Clock, FixedClock};
use crate::workflows::pass::notifications::{
    Notification, NotificationDispatcher, NotificationError, NotificationStore, Recipient,
};

pub(super) fn test_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 4, 6).expect("valid date")
}

pub(super) fn test_clock() -> Arc<dyn Clock> {
    let now = Utc.with_ymd_and_hms(2025, 4, 6, 8, 0, 0).single().expect("valid timestamp");
    Arc::new(FixedClock(now))
}

#[derive(Default)]
pub(super) struct MemoryRepository {
    records: Mutex<Vec<Application>>,
}

impl MemoryRepository {
    pub(super) fn all(&self) -> Vec<Application> {
        self.records.lock().expect("repository mutex poisoned").clone()
    }
}

impl ApplicationRepository for MemoryRepository {
    fn insert(&self, application: Application) -> Result<Application, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.iter().any(|existing| existing.id == application.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(application.clone());
        Ok(application)
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.iter().find(|application| &application.id == id).cloned())
    }

    fn by_status(&self, status: PassStatus) -> Result<Vec<Application>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .iter()
            .filter(|application| application.status == status)
            .cloned()
            .collect())
    }

    fn latest_for_applicant(
        &self,
        applicant: &ApplicantId,
    ) -> Result<Option<Application>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .iter()
            .rev()
            .find(|application| &application.applicant_id == applicant)
            .cloned())
    }

    fn update_status_if_current(
        &self,
        id: &ApplicationId,
        expected: PassStatus,
        change: StatusChange,
    ) -> Result<Option<Application>, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let Some(application) = guard.iter_mut().find(|application| &application.id == id) else {
            return Ok(None);
        };
        if application.status != expected {
            return Ok(None);
        }
        match change {
            StatusChange::Approve { payload } => {
                application.status = PassStatus::Approved;
                application.pass_payload = Some(payload);
            }
            StatusChange::Reject { reason } => {
                application.status = PassStatus::Rejected;
                application.rejection_reason = Some(reason);
            }
        }
        Ok(Some(application.clone()))
    }

    fn count_by_status(&self, status: PassStatus) -> Result<usize, RepositoryError> {
        Ok(self.by_status(status)?.len())
    }
}

#[derive(Default)]
pub(super) struct MemoryNotificationStore {
    entries: Mutex<Vec<Notification>>,
}

impl MemoryNotificationStore {
    pub(super) fn all(&self) -> Vec<Notification> {
        self.entries.lock().expect("notification mutex poisoned").clone()
    }
}

impl NotificationStore for MemoryNotificationStore {
    fn create(&self, notification: Notification) -> Result<(), NotificationError> {
        self.entries
            .lock()
            .expect("notification mutex poisoned")
            .push(notification);
        Ok(())
    }

    fn unread_for(&self, recipient: &Recipient) -> Result<Vec<Notification>, NotificationError> {
        let guard = self.entries.lock().expect("notification mutex poisoned");
        Ok(guard
            .iter()
            .rev()
            .filter(|notification| !notification.read && &notification.recipient == recipient)
            .cloned()
            .collect())
    }

    fn unread_matching(
        &self,
        recipient: &Recipient,
        fragment: &str,
    ) -> Result<Vec<Notification>, NotificationError> {
        let needle = fragment.to_lowercase();
        Ok(self
            .unread_for(recipient)?
            .into_iter()
            .filter(|notification| notification.message.to_lowercase().contains(&needle))
            .collect())
    }

    fn mark_read(&self, recipient: &Recipient) -> Result<u64, NotificationError> {
        let mut guard = self.entries.lock().expect("notification mutex poisoned");
        let mut marked = 0;
        for notification in guard.iter_mut() {
            if !notification.read && &notification.recipient == recipient {
                notification.read = true;
                marked += 1;
            }
        }
        Ok(marked)
    }
}

/// Gateway returning canned text, a backend failure, or never answering
/// within the budget.
pub(super) enum ScriptedGateway {
    Text(String),
    Failure,
    Hang(Duration),
}

impl ExtractionGateway for ScriptedGateway {
    fn recognize(
        &self,
        _document: &DocumentReference,
        _language_hint: &str,
    ) -> Result<String, ExtractionError> {
        match self {
            Self::Text(text) => Ok(text.clone()),
            Self::Failure => Err(ExtractionError::Backend("scanner offline".to_string())),
            Self::Hang(pause) => {
                std::thread::sleep(*pause);
                Ok("too late".to_string())
            }
        }
    }
}

/// Renderer wrapping the payload text so tests can assert on content.
pub(super) struct EchoRenderer;

impl PayloadRenderer for EchoRenderer {
    fn render(&self, payload_text: &str) -> Result<PassPayload, RenderError> {
        Ok(PassPayload(format!("code:{payload_text}")))
    }
}

pub(super) type TestService = PassApplicationService<MemoryRepository, MemoryNotificationStore>;

pub(super) fn build_service(
    gateway: ScriptedGateway,
) -> (
    Arc<TestService>,
    Arc<MemoryRepository>,
    Arc<MemoryNotificationStore>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let store = Arc::new(MemoryNotificationStore::default());
    let dispatcher = Arc::new(NotificationDispatcher::new(store.clone()));
    let service = PassApplicationService::new(
        repository.clone(),
        dispatcher,
        Arc::new(gateway),
        Arc::new(EchoRenderer),
        test_clock(),
        VerificationConfig {
            language_hint: "eng".to_string(),
            extraction_budget: Duration::from_millis(200),
        },
    );
    (Arc::new(service), repository, store)
}

pub(super) fn submission() -> PassSubmission {
    PassSubmission {
        applicant_id: ApplicantId("user-001".to_string()),
        document: DocumentReference("uploads/idproof-1744000000000.png".to_string()),
        full_name: "Asha Verma".to_string(),
        document_number: "AB1234".to_string(),
        from: "Madurai".to_string(),
        to: "Chennai".to_string(),
        duration: PassDuration::SevenDays,
    }
}

pub(super) fn matching_document_text() -> String {
    "asha verma voter id ab1234 dob 1990".to_string()
}

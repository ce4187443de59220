use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use buspass::workflows::pass::applications::{
    ApplicantId, Application, ApplicationId, ApplicationRepository, DocumentReference,
    ExtractionError, ExtractionGateway, PassPayload, PassStatus, PayloadRenderer, RenderError,
    RepositoryError, StatusChange,
};
use buspass::workflows::pass::notifications::{
    Notification, NotificationError, NotificationStore, Recipient,
};
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default)]
pub(crate) struct InMemoryApplicationRepository {
    records: Mutex<Vec<Application>>,
}

impl ApplicationRepository for InMemoryApplicationRepository {
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
        Ok(guard
            .iter()
            .find(|application| &application.id == id)
            .cloned())
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
pub(crate) struct InMemoryNotificationStore {
    entries: Mutex<Vec<Notification>>,
}

impl NotificationStore for InMemoryNotificationStore {
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

/// Extraction adapter reading recognizer output stored next to the uploaded
/// document (`<document>.txt`), written there by the upload pipeline's OCR
/// hook. A missing or unreadable sidecar is a backend failure, which the
/// core degrades to manual review.
pub(crate) struct SidecarTextGateway;

impl ExtractionGateway for SidecarTextGateway {
    fn recognize(
        &self,
        document: &DocumentReference,
        _language_hint: &str,
    ) -> Result<String, ExtractionError> {
        let sidecar = format!("{}.txt", document.0);
        std::fs::read_to_string(Path::new(&sidecar))
            .map_err(|err| ExtractionError::Backend(format!("{sidecar}: {err}")))
    }
}

/// Renders the payload text as a base64 data URL, the shape the scannable
/// code carried in the original deployment. Swap in a QR encoder here for
/// image output.
pub(crate) struct Base64PayloadRenderer;

impl PayloadRenderer for Base64PayloadRenderer {
    fn render(&self, payload_text: &str) -> Result<PassPayload, RenderError> {
        let encoded = BASE64.encode(payload_text.as_bytes());
        Ok(PassPayload(format!("data:text/plain;base64,{encoded}")))
    }
}

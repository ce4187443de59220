use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::domain::{
    ApplicantId, Application, ApplicationId, ApplicationStats, ClaimedIdentity, DocumentReference,
    PassDuration, PassStatus, TripDetails,
};
use super::payload::{payload_text, PayloadRenderer, RenderError};
use super::repository::{ApplicationRepository, RepositoryError, StatusChange};
use super::verification::{recognize_bounded, verify, ExtractionGateway, VerificationConfig};
use crate::workflows::pass::clock::Clock;
use crate::workflows::pass::notifications::{
    NotificationDispatcher, NotificationError, NotificationStore,
};

/// Reason stored when an admin rejects without supplying one.
pub const DEFAULT_REJECTION_REASON: &str = "No reason provided";

/// Inbound submission: claimed identity, trip request, and the reference to
/// the already-uploaded document image.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct PassSubmission {
    pub applicant_id: ApplicantId,
    pub document: DocumentReference,
    pub full_name: String,
    pub document_number: String,
    pub from: String,
    pub to: String,
    pub duration: PassDuration,
}

/// Validation errors raised before verification runs. Blank claimed fields
/// would trivially substring-match, so they are rejected up front.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionViolation {
    #[error("claimed full name must not be blank")]
    MissingFullName,
    #[error("claimed document number must not be blank")]
    MissingDocumentNumber,
}

/// Error raised by the lifecycle service.
#[derive(Debug, thiserror::Error)]
pub enum PassServiceError {
    #[error(transparent)]
    Validation(#[from] SubmissionViolation),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Notification(#[from] NotificationError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("application {} is not awaiting manual review (status: {})", .id.0, .status.label())]
    InvalidTransition {
        id: ApplicationId,
        status: PassStatus,
    },
}

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("app-{id:06}"))
}

/// Service owning the application lifecycle: initial routing at submission,
/// admin transitions, and the query views behind the HTTP surface.
pub struct PassApplicationService<R, S> {
    repository: Arc<R>,
    notifications: Arc<NotificationDispatcher<S>>,
    extraction: Arc<dyn ExtractionGateway>,
    renderer: Arc<dyn PayloadRenderer>,
    clock: Arc<dyn Clock>,
    config: VerificationConfig,
}

impl<R, S> PassApplicationService<R, S>
where
    R: ApplicationRepository + 'static,
    S: NotificationStore + 'static,
{
    pub fn new(
        repository: Arc<R>,
        notifications: Arc<NotificationDispatcher<S>>,
        extraction: Arc<dyn ExtractionGateway>,
        renderer: Arc<dyn PayloadRenderer>,
        clock: Arc<dyn Clock>,
        config: VerificationConfig,
    ) -> Self {
        Self {
            repository,
            notifications,
            extraction,
            renderer,
            clock,
            config,
        }
    }

    /// Submit a new application. Runs extraction (tolerating failure as
    /// empty text) and the identity verifier, then persists the application
    /// in the decided initial state: `Approved` with a rendered payload when
    /// verified, `ManualReview` plus a deduplicated admin alert otherwise.
    ///
    /// The persist and the alert are two separate effects; a failure between
    /// them leaves the application stored with no alert raised.
    pub fn submit(&self, submission: PassSubmission) -> Result<Application, PassServiceError> {
        let claimed = ClaimedIdentity {
            full_name: submission.full_name.trim().to_string(),
            document_number: submission.document_number.trim().to_string(),
        };
        if claimed.full_name.is_empty() {
            return Err(SubmissionViolation::MissingFullName.into());
        }
        if claimed.document_number.is_empty() {
            return Err(SubmissionViolation::MissingDocumentNumber.into());
        }

        let extracted = recognize_bounded(
            Arc::clone(&self.extraction),
            submission.document.clone(),
            self.config.language_hint.clone(),
            self.config.extraction_budget,
        );
        let verified = verify(&claimed, &extracted);

        let trip = TripDetails::new(
            submission.from,
            submission.to,
            submission.duration,
            self.clock.today(),
        );

        let pass_payload = if verified {
            Some(self.renderer.render(&payload_text(&trip))?)
        } else {
            None
        };

        let application = Application {
            id: next_application_id(),
            applicant_id: submission.applicant_id,
            document: submission.document,
            claimed,
            trip,
            status: if verified {
                PassStatus::Approved
            } else {
                PassStatus::ManualReview
            },
            rejection_reason: None,
            pass_payload,
            applied_at: self.clock.now(),
        };

        let stored = self.repository.insert(application)?;

        if stored.status == PassStatus::ManualReview {
            self.notifications
                .notify_pending_review(&stored.claimed.full_name)?;
        }

        tracing::info!(
            application = %stored.id.0,
            status = stored.status.label(),
            "pass application submitted"
        );
        Ok(stored)
    }

    /// Admin command: approve an application awaiting manual review.
    ///
    /// Reuses a payload already carried by the application, otherwise builds
    /// one from the trip details. The status flip is compare-and-set, so a
    /// racing decision leaves exactly one winner.
    pub fn approve(&self, id: &ApplicationId) -> Result<Application, PassServiceError> {
        let current = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;

        let payload = match current.pass_payload.clone() {
            Some(payload) => payload,
            None => self.renderer.render(&payload_text(&current.trip))?,
        };

        let updated = match self.repository.update_status_if_current(
            id,
            PassStatus::ManualReview,
            StatusChange::Approve { payload },
        )? {
            Some(updated) => updated,
            None => {
                let status = self
                    .repository
                    .fetch(id)?
                    .map(|application| application.status)
                    .unwrap_or(current.status);
                return Err(PassServiceError::InvalidTransition {
                    id: id.clone(),
                    status,
                });
            }
        };

        self.notifications
            .notify_user(&updated.applicant_id, "Your bus pass has been approved!")?;

        tracing::info!(application = %updated.id.0, "pass application approved");
        Ok(updated)
    }

    /// Admin command: reject an application awaiting manual review, storing
    /// the supplied reason or the fixed placeholder.
    pub fn reject(
        &self,
        id: &ApplicationId,
        reason: Option<String>,
    ) -> Result<Application, PassServiceError> {
        let current = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;

        let reason = reason
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .unwrap_or_else(|| DEFAULT_REJECTION_REASON.to_string());

        let updated = match self.repository.update_status_if_current(
            id,
            PassStatus::ManualReview,
            StatusChange::Reject {
                reason: reason.clone(),
            },
        )? {
            Some(updated) => updated,
            None => {
                let status = self
                    .repository
                    .fetch(id)?
                    .map(|application| application.status)
                    .unwrap_or(current.status);
                return Err(PassServiceError::InvalidTransition {
                    id: id.clone(),
                    status,
                });
            }
        };

        self.notifications.notify_user(
            &updated.applicant_id,
            format!("Your bus pass has been rejected. Reason: {reason}."),
        )?;

        tracing::info!(application = %updated.id.0, %reason, "pass application rejected");
        Ok(updated)
    }

    /// Fetch an application for status views.
    pub fn get(&self, id: &ApplicationId) -> Result<Application, PassServiceError> {
        self.repository
            .fetch(id)?
            .ok_or_else(|| RepositoryError::NotFound.into())
    }

    /// Applications waiting on an admin decision.
    pub fn pending(&self) -> Result<Vec<Application>, PassServiceError> {
        Ok(self.repository.by_status(PassStatus::ManualReview)?)
    }

    /// Applications an admin has already decided, approved and rejected
    /// together.
    pub fn decided(&self) -> Result<Vec<Application>, PassServiceError> {
        let mut decided = self.repository.by_status(PassStatus::Approved)?;
        decided.extend(self.repository.by_status(PassStatus::Rejected)?);
        Ok(decided)
    }

    /// Most recent application for an applicant; `None` when they never
    /// applied.
    pub fn latest_for_applicant(
        &self,
        applicant: &ApplicantId,
    ) -> Result<Option<Application>, PassServiceError> {
        Ok(self.repository.latest_for_applicant(applicant)?)
    }

    /// Dispatcher backing the notification endpoints and the expiry sweep.
    pub fn notifications(&self) -> &NotificationDispatcher<S> {
        &self.notifications
    }

    /// Counters for the admin dashboard.
    pub fn stats(&self) -> Result<ApplicationStats, PassServiceError> {
        let pending = self.repository.count_by_status(PassStatus::ManualReview)?;
        let approved = self.repository.count_by_status(PassStatus::Approved)?;
        let rejected = self.repository.count_by_status(PassStatus::Rejected)?;
        Ok(ApplicationStats {
            total: pending + approved + rejected,
            pending,
            approved,
        })
    }
}

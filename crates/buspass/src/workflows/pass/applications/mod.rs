//! Pass application intake, verification, lifecycle transitions, and the
//! HTTP surface that exposes them.

pub mod domain;
pub mod payload;
pub mod repository;
pub mod router;
pub mod service;
pub mod verification;

#[cfg(test)]
mod tests;

pub use domain::{
    ApplicantId, Application, ApplicationId, ApplicationStats, ApplicationStatusView,
    ClaimedIdentity, DocumentReference, PassDuration, PassPayload, PassStatus, TripDetails,
};
pub use payload::{payload_text, PayloadRenderer, RenderError};
pub use repository::{ApplicationRepository, RepositoryError, StatusChange};
pub use router::pass_router;
pub use service::{
    PassApplicationService, PassServiceError, PassSubmission, SubmissionViolation,
    DEFAULT_REJECTION_REASON,
};
pub use verification::{verify, ExtractionError, ExtractionGateway, VerificationConfig};

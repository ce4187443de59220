use super::domain::{ApplicantId, Application, ApplicationId, PassPayload, PassStatus};

/// Decision applied atomically by [`ApplicationRepository::update_status_if_current`].
///
/// Carrying the payload or reason inside the variant keeps the entity
/// invariants structural: a payload can only land together with `Approved`,
/// a reason only with `Rejected`.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusChange {
    Approve { payload: PassPayload },
    Reject { reason: String },
}

impl StatusChange {
    pub const fn target(&self) -> PassStatus {
        match self {
            Self::Approve { .. } => PassStatus::Approved,
            Self::Reject { .. } => PassStatus::Rejected,
        }
    }
}

/// Storage abstraction so the workflow can be exercised in isolation.
pub trait ApplicationRepository: Send + Sync {
    fn insert(&self, application: Application) -> Result<Application, RepositoryError>;

    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError>;

    fn by_status(&self, status: PassStatus) -> Result<Vec<Application>, RepositoryError>;

    /// Most recently applied application for an applicant; the authoritative
    /// record for "current pass state" views.
    fn latest_for_applicant(
        &self,
        applicant: &ApplicantId,
    ) -> Result<Option<Application>, RepositoryError>;

    /// Compare-and-set transition: applies `change` only while the stored
    /// status still equals `expected`, returning the updated row. `None`
    /// means the status moved underneath the caller (or was never
    /// `expected`); concurrent decisions therefore yield one winner.
    fn update_status_if_current(
        &self,
        id: &ApplicationId,
        expected: PassStatus,
        change: StatusChange,
    ) -> Result<Option<Application>, RepositoryError>;

    fn count_by_status(&self, status: PassStatus) -> Result<usize, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

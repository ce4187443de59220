use std::sync::Arc;

use chrono::Duration;

use crate::workflows::pass::applications::domain::{format_calendar_date, PassStatus};
use crate::workflows::pass::applications::repository::{ApplicationRepository, RepositoryError};
use crate::workflows::pass::clock::Clock;
use crate::workflows::pass::notifications::{
    NotificationDispatcher, NotificationError, NotificationStore,
};

/// Error raised by a sweep run.
#[derive(Debug, thiserror::Error)]
pub enum SweepError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Notification(#[from] NotificationError),
}

/// What a single sweep run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepOutcome {
    pub scanned: usize,
    pub reminded: usize,
}

/// Read-and-notify scan over approved applications whose passes lapse
/// tomorrow. Performs no state mutation; a run with zero matches is a
/// normal, silent outcome.
pub struct ExpirySweep<R, S> {
    repository: Arc<R>,
    notifications: Arc<NotificationDispatcher<S>>,
    clock: Arc<dyn Clock>,
}

impl<R, S> ExpirySweep<R, S>
where
    R: ApplicationRepository,
    S: NotificationStore,
{
    pub fn new(
        repository: Arc<R>,
        notifications: Arc<NotificationDispatcher<S>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            notifications,
            clock,
        }
    }

    pub fn run(&self) -> Result<SweepOutcome, SweepError> {
        let tomorrow = self.clock.today() + Duration::days(1);

        let approved = self.repository.by_status(PassStatus::Approved)?;
        let scanned = approved.len();
        let mut reminded = 0;

        for application in approved {
            if application.trip.valid_till != tomorrow {
                continue;
            }
            self.notifications.notify_user(
                &application.applicant_id,
                format!(
                    "Your bus pass will expire on {}. Please renew.",
                    format_calendar_date(application.trip.valid_till)
                ),
            )?;
            reminded += 1;
        }

        if reminded > 0 {
            tracing::info!(%tomorrow, reminded, "expiry reminders dispatched");
        }
        Ok(SweepOutcome { scanned, reminded })
    }
}

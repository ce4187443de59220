use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time;

use super::sweep::ExpirySweep;
use crate::config::SweepConfig;
use crate::workflows::pass::applications::repository::ApplicationRepository;
use crate::workflows::pass::clock::Clock;
use crate::workflows::pass::notifications::NotificationStore;

/// Error raised by scheduler lifecycle calls.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("expiry sweep scheduler is already running")]
    AlreadyRunning,
}

/// Singleton background loop driving [`ExpirySweep`] once per calendar day
/// at the configured hour.
///
/// The loop is sequential, so runs never overlap; a last-run date guard
/// keeps re-fires within the same day from sweeping twice. The guard lives
/// in process memory, so a restart on the same day may remind again.
pub struct ExpirySweepScheduler<R, S> {
    sweep: Arc<ExpirySweep<R, S>>,
    clock: Arc<dyn Clock>,
    config: SweepConfig,
    shutdown: Mutex<Option<watch::Sender<bool>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl<R, S> ExpirySweepScheduler<R, S>
where
    R: ApplicationRepository + 'static,
    S: NotificationStore + 'static,
{
    pub fn new(sweep: Arc<ExpirySweep<R, S>>, clock: Arc<dyn Clock>, config: SweepConfig) -> Self {
        Self {
            sweep,
            clock,
            config,
            shutdown: Mutex::new(None),
            handle: Mutex::new(None),
        }
    }

    /// Spawn the background loop. Fails when a loop is already running.
    pub fn start(&self) -> Result<(), SchedulerError> {
        let mut handle_slot = self.handle.lock().expect("scheduler mutex poisoned");
        if handle_slot.is_some() {
            return Err(SchedulerError::AlreadyRunning);
        }

        let (tx, mut rx) = watch::channel(false);
        let sweep = Arc::clone(&self.sweep);
        let clock = Arc::clone(&self.clock);
        let hour = self.config.hour;

        let handle = tokio::spawn(async move {
            let mut last_run: Option<NaiveDate> = None;
            loop {
                let wait = duration_until_next_fire(clock.now(), hour);
                tokio::select! {
                    changed = rx.changed() => {
                        if changed.is_err() || *rx.borrow() {
                            tracing::info!("expiry sweep scheduler shutting down");
                            break;
                        }
                    }
                    _ = time::sleep(wait) => {
                        let today = clock.today();
                        if last_run == Some(today) {
                            continue;
                        }
                        match sweep.run() {
                            Ok(outcome) => tracing::debug!(
                                scanned = outcome.scanned,
                                reminded = outcome.reminded,
                                "expiry sweep completed"
                            ),
                            Err(err) => tracing::error!(%err, "expiry sweep failed"),
                        }
                        last_run = Some(today);
                    }
                }
            }
        });

        *handle_slot = Some(handle);
        *self.shutdown.lock().expect("scheduler mutex poisoned") = Some(tx);

        tracing::info!(hour = self.config.hour, "expiry sweep scheduler started");
        Ok(())
    }

    /// Signal the loop to stop and wait for it to wind down. A no-op when
    /// the scheduler was never started.
    pub async fn stop(&self) {
        let sender = self
            .shutdown
            .lock()
            .expect("scheduler mutex poisoned")
            .take();
        if let Some(sender) = sender {
            let _ = sender.send(true);
        }

        let handle = self.handle.lock().expect("scheduler mutex poisoned").take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }
}

/// Time remaining until the next daily fire at `hour` (UTC), strictly in the
/// future of `now`.
pub(crate) fn duration_until_next_fire(now: DateTime<Utc>, hour: u32) -> std::time::Duration {
    let hour = hour.min(23);
    let today_fire = now
        .date_naive()
        .and_hms_opt(hour, 0, 0)
        .expect("fire hour in range")
        .and_utc();
    let next = if today_fire > now {
        today_fire
    } else {
        today_fire + chrono::Duration::days(1)
    };
    (next - now).to_std().unwrap_or_default()
}

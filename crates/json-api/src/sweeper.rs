//! Background removal of accounts whose deletion grace period has run out.

use std::{sync::Arc, time::Duration};

use jiff::Timestamp;
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tracing::{Instrument as _, debug, error, info, info_span};

use qrewards_app::domain::users::UsersService;

/// Sweep every `period` until `stop` flips to `true` or its sender is dropped.
///
/// The first sweep runs immediately so requests that expired while the server
/// was down are not left waiting a full period.
pub(crate) fn spawn(
    users: Arc<dyn UsersService>,
    period: Duration,
    mut stop: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    sweep_once(users.as_ref())
                        .instrument(info_span!("users.sweep_deletions"))
                        .await;
                }
                changed = stop.changed() => {
                    if changed.is_err() || *stop.borrow() {
                        debug!("deletion sweeper stopping");

                        return;
                    }
                }
            }
        }
    })
}

async fn sweep_once(users: &dyn UsersService) {
    match users.sweep_deletions(Timestamp::now()).await {
        Ok(0) => debug!("no accounts due for deletion"),
        Ok(deleted) => info!(deleted, "deleted accounts past their grace period"),
        Err(source) => error!("account deletion sweep failed: {source}"),
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use qrewards_app::domain::users::{MockUsersService, UsersServiceError};

    use super::*;

    #[tokio::test]
    async fn sweeps_on_start_and_stops_on_signal() -> TestResult {
        let mut users = MockUsersService::new();

        users
            .expect_sweep_deletions()
            .once()
            .withf(|now| *now <= Timestamp::now())
            .return_once(|_| Ok(2));

        let (stop_tx, stop_rx) = watch::channel(false);

        let task = spawn(Arc::new(users), Duration::from_secs(3_600), stop_rx);

        time::sleep(Duration::from_millis(50)).await;

        stop_tx.send(true)?;

        time::timeout(Duration::from_secs(1), task).await??;

        Ok(())
    }

    #[tokio::test]
    async fn failed_sweep_keeps_the_task_running() -> TestResult {
        let mut users = MockUsersService::new();

        users
            .expect_sweep_deletions()
            .times(2..)
            .returning(|_| Err(UsersServiceError::NotFound));

        let (stop_tx, stop_rx) = watch::channel(false);

        let task = spawn(Arc::new(users), Duration::from_millis(10), stop_rx);

        time::sleep(Duration::from_millis(100)).await;

        assert!(!task.is_finished(), "sweeper exited after a failed sweep");

        drop(stop_tx);

        time::timeout(Duration::from_secs(1), task).await??;

        Ok(())
    }
}

//! Keep-alive watcher
//!
//! Foreground loop that probes connectivity on an interval and re-runs
//! the login cycle whenever the connection drops. Login attempts are
//! spaced by a cooldown so a dead gateway is not hammered, and repeated
//! failures stretch the probe interval linearly up to a cap. Ctrl-C
//! stops the loop.

use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::{Config, ConfigError};
use crate::portal::{LivePortal, Outcome, RetryPolicy, probe, session};

/// Extra sleep added after consecutive failed login cycles.
fn failure_backoff(consecutive_failures: u32) -> Duration {
    const STEP: Duration = Duration::from_secs(5);
    const CAP: Duration = Duration::from_secs(60);
    STEP.saturating_mul(consecutive_failures).min(CAP)
}

/// Watch connectivity until interrupted.
pub async fn watch(config: &Config) -> Result<(), ConfigError> {
    let accounts = config.selectable_accounts()?;
    let pacing = &config.watch;
    let cooldown = Duration::from_secs(pacing.login_cooldown_secs);

    let mut consecutive_failures: u32 = 0;
    let mut last_attempt: Option<Instant> = None;

    info!("Watching connectivity (Ctrl-C to stop)");
    loop {
        let online = probe::check_connectivity().await;

        let delay = if online {
            if consecutive_failures > 0 {
                info!("Back online");
            }
            consecutive_failures = 0;
            Duration::from_secs(pacing.online_interval_secs)
        } else {
            let due = last_attempt.is_none_or(|at| at.elapsed() >= cooldown);
            if due {
                info!("Offline, running a login cycle");
                last_attempt = Some(Instant::now());

                let policy = RetryPolicy {
                    max_attempts: Some(1),
                    retry_delay: Duration::ZERO,
                };
                match session::run(&LivePortal, accounts, policy).await {
                    Outcome::Connected => {
                        consecutive_failures = 0;
                    }
                    outcome => {
                        consecutive_failures += 1;
                        warn!(
                            "Login cycle did not restore connectivity ({:?}), \
                             will try again after the cooldown",
                            outcome
                        );
                    }
                }
            } else {
                debug!("Offline, login cooldown still active");
            }

            Duration::from_secs(pacing.offline_interval_secs)
                + failure_backoff(consecutive_failures)
        };

        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Stopping watcher");
                return Ok(());
            }
        }
    }
}

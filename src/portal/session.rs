//! Login session loop
//!
//! Drives the resolve -> login -> probe cycle as an explicit loop. A
//! failed probe loops back to a fresh cycle (the address is re-resolved
//! every time, never cached); a failed resolve or login request is a
//! terminal abort handed back to the CLI. The loop is unbounded unless
//! the retry policy caps it.

use std::time::Duration;
use tracing::{info, warn};

use super::{PortalError, login, probe, status};
use crate::config::Account;

/// The three portal operations one login cycle is made of.
///
/// The live implementation talks to the real endpoints; tests drive the
/// loop with a scripted implementation instead.
#[allow(async_fn_in_trait)]
pub trait Portal {
    /// Resolve the client address the portal sees for this connection.
    async fn resolve_address(&self) -> Result<String, PortalError>;

    /// Submit one login request; returns the raw response body.
    async fn submit_login(&self, account: &Account, client_ip: &str)
    -> Result<String, PortalError>;

    /// `true` when the internet is reachable through the gateway.
    async fn probe(&self) -> bool;
}

/// Portal implementation backed by the real endpoints.
pub struct LivePortal;

impl Portal for LivePortal {
    async fn resolve_address(&self) -> Result<String, PortalError> {
        status::resolve_address().await
    }

    async fn submit_login(
        &self,
        account: &Account,
        client_ip: &str,
    ) -> Result<String, PortalError> {
        login::submit(account, client_ip).await
    }

    async fn probe(&self) -> bool {
        probe::check_connectivity().await
    }
}

/// Bounds on the retry loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// `None` retries until connectivity is confirmed or the process
    /// is interrupted.
    pub max_attempts: Option<u32>,
    /// Pause between cycles. Zero by default; the per-request timeouts
    /// are the only pacing then.
    pub retry_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: None,
            retry_delay: Duration::ZERO,
        }
    }
}

/// Terminal states of a login session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The probe confirmed internet access.
    Connected,
    /// The session cannot make progress on its own; the reason tells
    /// the operator what to look at before running login again.
    ManualIntervention(String),
    /// A bounded policy ran out of attempts without getting online.
    RetriesExhausted,
}

/// Run login cycles until a terminal state is reached.
pub async fn run<P: Portal>(portal: &P, accounts: &[Account], policy: RetryPolicy) -> Outcome {
    let mut attempt: u32 = 0;

    loop {
        if let Some(max) = policy.max_attempts {
            if attempt >= max {
                warn!("Still offline after {} login attempts, giving up", max);
                return Outcome::RetriesExhausted;
            }
        }
        if attempt > 0 && !policy.retry_delay.is_zero() {
            tokio::time::sleep(policy.retry_delay).await;
        }
        attempt += 1;

        let client_ip = match portal.resolve_address().await {
            Ok(address) => address,
            Err(e) => {
                warn!("Could not resolve client address: {}", e);
                return Outcome::ManualIntervention(format!(
                    "could not resolve the client address ({e}); check the physical \
                     network connection"
                ));
            }
        };

        let account = login::pick_account(accounts);
        if let Err(e) = portal.submit_login(account, &client_ip).await {
            warn!("Login request failed: {}", e);
            return Outcome::ManualIntervention(format!("login request failed: {e}"));
        }

        info!("Connect to WiFi \"csust-bg\" or plug into an office network port first.");
        info!("This tool is for personal study use only.");
        info!("Checking connectivity...");

        if portal.probe().await {
            info!("Internet access confirmed");
            return Outcome::Connected;
        }

        info!("Still offline, retrying login (attempt {})", attempt);
    }
}

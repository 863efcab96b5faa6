//! Connectivity probe
//!
//! Asks a well-known external host whether the gateway actually passes
//! traffic. Only the status code matters; any transport failure counts
//! as offline and is not surfaced to the user.

use reqwest::Client;
use tracing::debug;

use super::{PROBE_TIMEOUT, PROBE_URL};

/// Probe the external host. `true` means the internet is reachable.
pub async fn check_connectivity() -> bool {
    let client = match Client::builder().timeout(PROBE_TIMEOUT).build() {
        Ok(client) => client,
        Err(e) => {
            debug!("probe client build failed: {}", e);
            return false;
        }
    };

    match client.get(PROBE_URL).send().await {
        Ok(response) => response.status().is_success(),
        Err(e) => {
            debug!("connectivity probe failed: {}", e);
            false
        }
    }
}

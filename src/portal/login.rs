//! Login submission
//!
//! Builds the ePortal login URL from a credential pair and the resolved
//! client address, then issues the request. The portal answers with a
//! JSONP blob; whether it mentions `success` is logged but never gates
//! the flow, because the gateway sometimes opens access without saying
//! so. Connectivity is confirmed separately by the probe.

use rand::Rng;
use reqwest::Client;
use tracing::{debug, info};

use super::{LOGIN_TIMEOUT, LOGIN_URL, PortalError};
use crate::config::Account;

/// Pick one account from the configured list.
///
/// Slot 0 is the reserved template entry and is never drawn; the draw
/// is uniform over the remaining entries. A single-entry list (the
/// forced-account path) degenerates to that entry.
pub fn pick_account(accounts: &[Account]) -> &Account {
    if accounts.len() == 1 {
        return &accounts[0];
    }
    let index = rand::thread_rng().gen_range(1..accounts.len());
    &accounts[index]
}

/// Build the full login URL for one attempt.
///
/// The parameter set is what the portal's own login page sends: the
/// account carries a literal `,0,` prefix, MAC and AC fields are fixed
/// placeholders, and the trailing `lang` appears twice.
pub fn build_login_url(account: &Account, client_ip: &str) -> String {
    format!(
        "{LOGIN_URL}?callback=dr1003&login_method=1\
         &user_account=%2C0%2C{}&user_password={}\
         &wlan_user_ip={}&wlan_user_ipv6=&wlan_user_mac=000000000000\
         &wlan_ac_ip=&wlan_ac_name=\
         &jsVersion=4.2.1&terminal_type=1&lang=zh-cn&v=1250&lang=zh",
        account.account, account.password, client_ip
    )
}

/// Submit one login request for the given account and address.
pub async fn submit(account: &Account, client_ip: &str) -> Result<String, PortalError> {
    info!("Logging in as {}", account.account);

    let client = Client::builder().timeout(LOGIN_TIMEOUT).build()?;

    let url = build_login_url(account, client_ip);
    let response = client.get(&url).send().await?;
    let body = response.text().await?;
    debug!("login response: {}", body);

    if body.to_lowercase().contains("success") {
        info!("Portal acknowledged the login request");
    } else {
        info!("Portal did not acknowledge the login request, checking connectivity anyway");
    }

    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(id: &str, password: &str) -> Account {
        Account {
            account: id.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_login_url_embeds_credentials_and_address() {
        let url = build_login_url(&account("a2", "p2"), "10.10.20.5");

        assert!(url.starts_with(LOGIN_URL));
        assert!(url.contains("user_account=%2C0%2Ca2&"));
        assert!(url.contains("user_password=p2&"));
        assert!(url.contains("wlan_user_ip=10.10.20.5&"));
    }

    #[test]
    fn test_login_url_fixed_parameters() {
        let url = build_login_url(&account("x", "y"), "1.2.3.4");

        assert!(url.contains("callback=dr1003"));
        assert!(url.contains("login_method=1"));
        assert!(url.contains("wlan_user_ipv6=&"));
        assert!(url.contains("wlan_user_mac=000000000000"));
        assert!(url.contains("wlan_ac_ip=&wlan_ac_name=&"));
        assert!(url.contains("jsVersion=4.2.1"));
        assert!(url.contains("terminal_type=1"));
        assert!(url.contains("lang=zh-cn"));
        // The portal's own page sends lang twice; keep both.
        assert!(url.ends_with("&v=1250&lang=zh"));
    }

    #[test]
    fn test_pick_account_never_draws_reserved_slot() {
        let accounts = vec![
            account("reserved", ""),
            account("a1", "p1"),
            account("a2", "p2"),
        ];

        let mut seen = [false; 3];
        for _ in 0..200 {
            let picked = pick_account(&accounts);
            let index = accounts.iter().position(|a| a == picked).unwrap();
            assert!(index > 0 && index < accounts.len());
            seen[index] = true;
        }
        // Both drawable entries show up over 200 draws.
        assert!(seen[1] && seen[2]);
        assert!(!seen[0]);
    }

    #[test]
    fn test_pick_account_singleton_list() {
        let accounts = vec![account("forced", "pw")];
        assert_eq!(pick_account(&accounts), &accounts[0]);
    }
}

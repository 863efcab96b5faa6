//! Status endpoint: client address resolution
//!
//! The portal reports the address it associates with this physical
//! connection inside a JSONP-wrapped blob. The login step needs that
//! address verbatim, so extraction scans the raw body for the first
//! quoted `v46ip` value instead of trusting the wrapper to be valid
//! JSON.

use regex::Regex;
use reqwest::Client;
use std::sync::OnceLock;
use tracing::{debug, info};

use super::{PortalError, STATUS_TIMEOUT, STATUS_URL};

fn v46ip_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r#""v46ip":\s*"([^"]+)""#).expect("valid pattern"))
}

/// Extract the first `v46ip` value from a status response body.
pub fn extract_v46ip(body: &str) -> Option<String> {
    v46ip_pattern()
        .captures(body)
        .map(|caps| caps[1].to_string())
}

/// Fetch the raw status-check body.
pub async fn fetch_status_body() -> Result<String, PortalError> {
    let client = Client::builder().timeout(STATUS_TIMEOUT).build()?;

    let response = client.get(STATUS_URL).send().await?;
    let body = response.text().await?;
    debug!("chkstatus response: {}", body);

    Ok(body)
}

/// Resolve the client address the portal sees for this connection.
pub async fn resolve_address() -> Result<String, PortalError> {
    info!("Resolving client address");

    let body = fetch_status_body().await?;
    match extract_v46ip(&body) {
        Some(address) => {
            info!("Client address: {}", address);
            Ok(address)
        }
        None => Err(PortalError::AddressUnavailable),
    }
}

/// Strip the `dr1002(...)` JSONP wrapper and parse the inner payload.
///
/// Returns `None` when the body is not wrapper-shaped or the inner
/// text is not valid JSON; callers fall back to the raw-scan view.
pub fn parse_chkstatus(body: &str) -> Option<serde_json::Value> {
    let start = body.find('(')? + 1;
    let end = body.rfind(')')?;
    if start >= end {
        return None;
    }
    serde_json::from_str(&body[start..end]).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_v46ip() {
        let body = r#"dr1002({"result":1,"v46ip":"10.10.20.5","olmac":"000000000000"})"#;
        assert_eq!(extract_v46ip(body), Some("10.10.20.5".to_string()));
    }

    #[test]
    fn test_extract_tolerates_whitespace_after_colon() {
        let body = r#"{"v46ip":   "172.16.9.33"}"#;
        assert_eq!(extract_v46ip(body), Some("172.16.9.33".to_string()));
    }

    #[test]
    fn test_extract_takes_first_match_only() {
        let body = r#"{"v46ip":"1.2.3.4","nested":{"v46ip":"5.6.7.8"}}"#;
        assert_eq!(extract_v46ip(body), Some("1.2.3.4".to_string()));
    }

    #[test]
    fn test_extract_missing_field() {
        assert_eq!(extract_v46ip(r#"dr1002({"result":0})"#), None);
        assert_eq!(extract_v46ip(""), None);
        // An empty value does not match either; the portal always
        // quotes a non-empty address when it knows one.
        assert_eq!(extract_v46ip(r#"{"v46ip":""}"#), None);
    }

    #[test]
    fn test_parse_chkstatus() {
        let body = r#"dr1002({"result":1,"account":"202312345678","v46ip":"10.0.0.7"})"#;
        let value = parse_chkstatus(body).unwrap();
        assert_eq!(value["result"], 1);
        assert_eq!(value["account"], "202312345678");
    }

    #[test]
    fn test_parse_chkstatus_rejects_malformed() {
        assert!(parse_chkstatus("not a wrapper").is_none());
        assert!(parse_chkstatus("dr1002()").is_none());
        assert!(parse_chkstatus("dr1002({broken)").is_none());
    }
}

//! Campus portal protocol
//!
//! Implements the three-step login flow against the CSUST ePortal:
//! 1. status - Resolve the client address the portal sees for us
//! 2. login - Submit a credential pair for that address
//! 3. probe - Confirm the gateway actually opened internet access
//!
//! The endpoints are fixed; only the credential list is configurable.

pub mod login;
pub mod probe;
pub mod session;
pub mod status;

pub use session::{LivePortal, Outcome, Portal, RetryPolicy, run};

use std::time::Duration;
use thiserror::Error;

/// Status-check endpoint, JSONP-wrapped DrCOM payload.
pub const STATUS_URL: &str =
    "https://login.csust.edu.cn/drcom/chkstatus?callback=dr1002&jsVersion=4.X&v=1611&lang=zh";

/// ePortal login endpoint (note the non-standard port).
pub const LOGIN_URL: &str = "https://login.csust.edu.cn:802/eportal/portal/login";

/// External host probed to confirm internet access.
pub const PROBE_URL: &str = "https://www.baidu.com";

pub const STATUS_TIMEOUT: Duration = Duration::from_secs(5);
pub const LOGIN_TIMEOUT: Duration = Duration::from_secs(5);
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Portal protocol errors
#[derive(Error, Debug)]
pub enum PortalError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("status response carries no v46ip field")]
    AddressUnavailable,
}

//! csust-portal - Captive-portal auto-login for the CSUST campus network
//!
//! The campus gateway grants internet access only after a web-style
//! portal login tied to the address it assigned to the connection. This
//! crate resolves that address from the portal's status endpoint,
//! submits a configured credential pair, and confirms connectivity
//! against an external host, retrying the whole cycle until the
//! gateway lets traffic through.
//!
//! # Architecture
//!
//! - `config`: Credential list and pacing knobs (TOML)
//! - `portal`: The status/login/probe protocol and the session loop
//! - `watch`: Keep-alive loop that re-logs in when the connection drops
//!
//! # Usage
//!
//! ```bash
//! csust-portal init          # write a config template
//! csust-portal login         # one login session
//! csust-portal watch         # stay logged in until Ctrl-C
//! ```

pub mod config;
pub mod portal;
pub mod watch;

pub use config::{Account, Config};
pub use portal::{LivePortal, Outcome, Portal, RetryPolicy};

//! HTTP client for the attendance service.
//!
//! [`AuthSession`] performs credential login and session establishment;
//! [`HttpAttendanceSink`] delivers completed capture submissions. Both speak
//! plain JSON over HTTP.
//!
//! # Example
//!
//! ```rust,ignore
//! use rollcall::{AuthSession, InMemorySessionStore, Portal};
//!
//! let auth = AuthSession::new(
//!     "https://attendance.example.edu",
//!     InMemorySessionStore::new_shared(),
//!     navigator,
//!     notifier,
//! );
//! let outcome = auth.login("s101", "secret", Portal::Student).await?;
//! println!("token: {}", outcome.token);
//! ```

mod attendance;
mod login;

pub use attendance::HttpAttendanceSink;
pub use login::{AuthSession, LoginOutcome};

/// Options for configuring the service clients.
#[derive(Debug, Clone)]
pub struct AuthOptions {
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Accept self-signed or otherwise invalid TLS certificates
    pub accept_invalid_certs: bool,
    /// Log login request/response detail at info level
    pub verbose_login: bool,
}

impl Default for AuthOptions {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            accept_invalid_certs: false,
            verbose_login: false,
        }
    }
}

/// Build the HTTP client the login and attendance paths share.
pub fn build_http_client(options: &AuthOptions) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(options.timeout_secs))
        .danger_accept_invalid_certs(options.accept_invalid_certs)
        .build()
}

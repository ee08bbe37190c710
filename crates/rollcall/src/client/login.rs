//! Credential login and session establishment.
//!
//! One flow: POST the credentials and requested portal, resolve portal
//! access from the granted roles, persist the session wholesale, navigate,
//! then hand the outcome back. The store write always completes before the
//! navigator runs, and the navigator runs before the caller sees the token.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{build_http_client, AuthOptions};
use crate::access::{self, Destination, Portal};
use crate::error::AuthError;
use crate::notify::{Navigator, UserNotifier};
use crate::session::{Session, SessionStore};

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    id: &'a str,
    password: &'a str,
    role: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    jwt_token: String,
    #[serde(rename = "expiryDate")]
    expiry_date: String,
    user_roles: Vec<String>,
}

/// What a successful login produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    /// The granted bearer token.
    pub token: String,
    /// Role identifiers the service granted.
    pub roles: Vec<String>,
    /// Where the navigator was sent.
    pub destination: Destination,
}

/// Authenticated session establishment against the attendance service.
///
/// Collaborators are injected: the [`SessionStore`] receives the wholesale
/// session write (or clear), the [`Navigator`] performs the post-login
/// redirect, and the [`UserNotifier`] shows the generic failure message.
pub struct AuthSession {
    http: reqwest::Client,
    base_url: String,
    options: AuthOptions,
    store: Arc<dyn SessionStore>,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn UserNotifier>,
    login_in_flight: AtomicBool,
}

impl AuthSession {
    /// Create a session client with default options.
    pub fn new(
        base_url: impl Into<String>,
        store: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn UserNotifier>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: normalize_base_url(base_url),
            options: AuthOptions::default(),
            store,
            navigator,
            notifier,
            login_in_flight: AtomicBool::new(false),
        }
    }

    /// Create a session client with custom options.
    pub fn with_options(
        base_url: impl Into<String>,
        options: AuthOptions,
        store: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn UserNotifier>,
    ) -> Result<Self, AuthError> {
        let http = build_http_client(&options).map_err(|e| AuthError::Client(e.to_string()))?;
        Ok(Self {
            http,
            base_url: normalize_base_url(base_url),
            options,
            store,
            navigator,
            notifier,
            login_in_flight: AtomicBool::new(false),
        })
    }

    /// Get the base URL this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Attempt a login against the requested portal.
    ///
    /// On success the session is persisted, then the navigator is invoked,
    /// then the outcome is returned. On an authorization mismatch the stored
    /// session is cleared. A second call while one is in flight is rejected
    /// with [`AuthError::LoginInFlight`] before any network traffic.
    #[tracing::instrument(skip(self, password), fields(user = %user_id, portal = %portal))]
    pub async fn login(
        &self,
        user_id: &str,
        password: &str,
        portal: Portal,
    ) -> Result<LoginOutcome, AuthError> {
        if self.login_in_flight.swap(true, Ordering::SeqCst) {
            debug!("login rejected, another attempt is in flight");
            return Err(AuthError::LoginInFlight);
        }
        let _guard = InFlightGuard {
            flag: &self.login_in_flight,
        };

        let result = self.attempt_login(user_id, password, portal).await;

        match &result {
            Ok(outcome) => {
                info!(destination = %outcome.destination, "login succeeded");
            }
            Err(err @ AuthError::AuthenticationFailed { reason }) => {
                warn!(%reason, "login failed");
                self.notifier.alert(&err.to_string());
            }
            Err(err @ AuthError::AuthorizationMismatch { granted }) => {
                warn!(?granted, "granted roles do not admit the portal");
                self.notifier.alert(&err.to_string());
            }
            Err(_) => {}
        }

        result
    }

    async fn attempt_login(
        &self,
        user_id: &str,
        password: &str,
        portal: Portal,
    ) -> Result<LoginOutcome, AuthError> {
        let url = format!("{}/auth/login", self.base_url);
        let request = LoginRequest {
            id: user_id,
            password,
            role: portal.as_str(),
        };

        if self.options.verbose_login {
            info!(%url, "sending login request");
        } else {
            debug!(%url, "sending login request");
        }

        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| AuthError::AuthenticationFailed {
                reason: format!("request failed: {e}"),
            })?;

        let status = response.status();
        if self.options.verbose_login {
            info!(status = %status, "login response received");
        }
        if !status.is_success() {
            // The failure body is not interpreted
            return Err(AuthError::AuthenticationFailed {
                reason: format!("service answered {status}"),
            });
        }

        let payload: LoginResponse =
            response
                .json()
                .await
                .map_err(|e| AuthError::AuthenticationFailed {
                    reason: format!("malformed login payload: {e}"),
                })?;

        let Some(destination) = access::resolve(portal, &payload.user_roles) else {
            self.store.clear()?;
            return Err(AuthError::AuthorizationMismatch {
                granted: payload.user_roles,
            });
        };

        let session = Session::issued_now(payload.jwt_token, payload.expiry_date, payload.user_roles);
        self.store.save(&session)?;
        self.navigator.navigate(destination);

        Ok(LoginOutcome {
            token: session.token,
            roles: session.roles,
            destination,
        })
    }

    /// Forget the persisted session. Purely local.
    pub fn logout(&self) -> Result<(), AuthError> {
        self.store.clear()?;
        info!("session cleared");
        Ok(())
    }
}

fn normalize_base_url(base_url: impl Into<String>) -> String {
    base_url.into().trim_end_matches('/').to_string()
}

/// Clears the in-flight flag even when the login future is dropped mid-way.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

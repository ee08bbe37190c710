//! Error types for the capture and auth components.
//!
//! Login failures deliberately share one `Display` message. What actually
//! went wrong is kept in the variant payload and in the logs, never in the
//! text shown to the user.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from [`AuthSession`](crate::AuthSession) operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The service rejected the credentials, was unreachable, or answered
    /// with a payload the client could not read.
    #[error("Login failed")]
    AuthenticationFailed { reason: String },

    /// The credentials were valid but none of the granted roles admit the
    /// requested portal. The stored session has been cleared.
    #[error("Login failed")]
    AuthorizationMismatch { granted: Vec<String> },

    /// A login on this session has not completed yet.
    #[error("a login attempt is already in progress")]
    LoginInFlight,

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    /// The session store failed while persisting or clearing.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors from [`CaptureSession`](crate::CaptureSession) operations.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The media collaborator refused or failed to provide a stream.
    #[error("Camera access denied. Please enable camera permissions.")]
    CameraAccessDenied { reason: String },

    /// There is no live stream to grab a frame from.
    #[error("no active camera stream")]
    NoActiveStream,

    /// Submission was attempted without both a captured frame and a code.
    #[error("Please capture your face and enter the attendance code.")]
    IncompleteSubmission,

    /// The attendance collaborator rejected or failed the submission.
    #[error("attendance submission failed: {reason}")]
    SubmissionFailed { reason: String },
}

/// Errors from [`SessionStore`](crate::SessionStore) implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access session storage at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("stored session is not valid: {0}")]
    Invalid(String),
}

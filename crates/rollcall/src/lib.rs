//! rollcall - client library for the Rollcall attendance service
//!
//! Rollcall marks class attendance with a face capture: a student starts
//! the camera, captures a still frame, and submits it together with the
//! attendance code handed out in class. Staff and students sign in through
//! role-gated portals backed by the same service.
//!
//! # Features
//!
//! - **Capture**: `CaptureSession` drives the camera through an explicit
//!   idle / camera-active / captured state machine
//! - **Auth**: `AuthSession` logs in against a portal, resolves access from
//!   the granted roles, and persists the session wholesale
//! - **Seams**: camera, submission endpoint, session store, navigation and
//!   user notification are all traits, so the core runs headless
//!
//! # Login Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use rollcall::{AuthSession, FileSessionStore, Portal};
//!
//! let store = Arc::new(FileSessionStore::new("session.json"));
//! let auth = AuthSession::new("https://attendance.example.edu", store, navigator, notifier);
//!
//! let outcome = auth.login("s101", "secret", Portal::Student).await?;
//! println!("granted: {:?}", outcome.roles);
//! ```
//!
//! # Capture Example
//!
//! ```rust,ignore
//! use rollcall::CaptureSession;
//!
//! let mut capture = CaptureSession::new(camera, sink, notifier);
//! capture.start_camera().await?;
//! capture.capture_image().await?;
//! let receipt = capture.submit("4731").await?;
//! ```

pub mod access;
pub mod capture;
pub mod client;
pub mod error;
pub mod notify;
pub mod session;

// Re-export commonly used types at crate root
pub use access::{
    resolve, Destination, Portal, ROLE_ADMIN, ROLE_LECTURER, ROLE_STUDENT, ROLE_SUPER_ADMIN,
};
pub use capture::{
    AttendanceSink, AttendanceSubmission, Camera, CameraStream, CapturePhase, CaptureSession,
    Frame, StreamConstraints,
};
pub use client::{build_http_client, AuthOptions, AuthSession, HttpAttendanceSink, LoginOutcome};
pub use error::{AuthError, CaptureError, StoreError};
pub use notify::{Navigator, NullNotifier, UserNotifier};
pub use session::{FileSessionStore, InMemorySessionStore, Session, SessionStore};

//! User notification and navigation seams.
//!
//! The core components never talk to a UI directly. Anything a user must
//! see goes through [`UserNotifier`], and the post-login redirect goes
//! through [`Navigator`], so any presentation layer can be plugged in.

use crate::access::Destination;

/// Shows the user a short human-readable message.
pub trait UserNotifier: Send + Sync {
    fn alert(&self, message: &str);
}

/// Carries the user to a destination after a successful login.
pub trait Navigator: Send + Sync {
    fn navigate(&self, destination: Destination);
}

/// Discards all notifications. For embedders that only care about the
/// returned errors.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

impl UserNotifier for NullNotifier {
    fn alert(&self, _message: &str) {}
}

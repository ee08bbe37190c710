//! Authenticated session state and its persistence seam.

pub mod store;

pub use store::{FileSessionStore, InMemorySessionStore, SessionStore};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// The persisted outcome of a successful login.
///
/// Serialized field names are the stable storage keys (`jwtToken`,
/// `expiryDate`, `userRoles`, `tokenIssueTime`). The expiry is kept as the
/// exact string the service sent; only [`Session::expires_at`] interprets it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token granted by the service.
    #[serde(rename = "jwtToken")]
    pub token: String,

    /// Expiry timestamp verbatim from the service.
    #[serde(rename = "expiryDate")]
    pub expiry_date: String,

    /// Role identifiers granted with the token.
    #[serde(rename = "userRoles")]
    pub roles: Vec<String>,

    /// When this client accepted the token.
    #[serde(rename = "tokenIssueTime")]
    pub issued_at: DateTime<Utc>,
}

impl Session {
    /// Build a session stamped with the current time.
    pub fn issued_now(
        token: impl Into<String>,
        expiry_date: impl Into<String>,
        roles: Vec<String>,
    ) -> Self {
        Self {
            token: token.into(),
            expiry_date: expiry_date.into(),
            roles,
            issued_at: Utc::now(),
        }
    }

    /// Whether `role` was granted with this session.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Parse the expiry the service sent, if it is parseable.
    ///
    /// The service does not commit to one format, so RFC 3339, a bare ISO
    /// datetime, and a bare date are all accepted. Naive values are read
    /// as UTC.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.expiry_date.trim();

        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Some(parsed.with_timezone(&Utc));
        }
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
            return Some(parsed.and_utc());
        }
        if let Ok(parsed) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return parsed.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }

        None
    }

    /// Whether the expiry has passed as of `now`. An unparseable expiry is
    /// not treated as expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at() {
            Some(expiry) => expiry <= now,
            None => false,
        }
    }

    /// Whether the expiry has passed.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Session {
        Session::issued_now("abc", "2025-01-01", vec!["ROLE_STUDENT".to_string()])
    }

    #[test]
    fn serializes_with_storage_key_names() {
        let value = serde_json::to_value(sample()).unwrap();
        let object = value.as_object().unwrap();

        assert_eq!(object.len(), 4);
        assert_eq!(object["jwtToken"], "abc");
        assert_eq!(object["expiryDate"], "2025-01-01");
        assert_eq!(object["userRoles"][0], "ROLE_STUDENT");
        assert!(object.contains_key("tokenIssueTime"));
    }

    #[test]
    fn round_trips_all_four_fields() {
        let session = sample();
        let json = serde_json::to_string(&session).unwrap();
        let restored: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, session);
    }

    #[test]
    fn parses_rfc3339_expiry() {
        let mut session = sample();
        session.expiry_date = "2025-06-01T12:00:00Z".to_string();
        assert_eq!(
            session.expires_at(),
            Some(Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap())
        );
    }

    #[test]
    fn parses_bare_iso_datetime_expiry() {
        let mut session = sample();
        session.expiry_date = "2025-06-01T12:30:45".to_string();
        assert_eq!(
            session.expires_at(),
            Some(Utc.with_ymd_and_hms(2025, 6, 1, 12, 30, 45).unwrap())
        );
    }

    #[test]
    fn parses_bare_date_expiry() {
        let session = sample();
        assert_eq!(
            session.expires_at(),
            Some(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn expiry_comparison_uses_the_given_clock() {
        let session = sample();
        let before = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap();
        let after = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        assert!(!session.is_expired_at(before));
        assert!(session.is_expired_at(after));
    }

    #[test]
    fn unparseable_expiry_is_not_expired() {
        let mut session = sample();
        session.expiry_date = "whenever".to_string();
        assert_eq!(session.expires_at(), None);
        assert!(!session.is_expired_at(Utc.with_ymd_and_hms(2099, 1, 1, 0, 0, 0).unwrap()));
    }

    #[test]
    fn has_role_matches_exact_identifiers() {
        let session = sample();
        assert!(session.has_role("ROLE_STUDENT"));
        assert!(!session.has_role("ROLE_ADMIN"));
        assert!(!session.has_role("role_student"));
    }
}

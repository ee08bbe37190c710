//! Portal access rules.
//!
//! A login targets a portal (the user-facing category on the sign-in form)
//! and the service answers with granted role identifiers. The rule table
//! here decides whether any granted role admits the user to that portal
//! and where a successful entry lands. Rules are checked in order and the
//! first match wins.

use std::fmt;
use std::str::FromStr;

/// Role identifier granting full administrative access.
pub const ROLE_SUPER_ADMIN: &str = "ROLE_SUPER_ADMIN";
/// Role identifier granting administrative access.
pub const ROLE_ADMIN: &str = "ROLE_ADMIN";
/// Role identifier for teaching staff.
pub const ROLE_LECTURER: &str = "ROLE_LECTURER";
/// Role identifier for enrolled students.
pub const ROLE_STUDENT: &str = "ROLE_STUDENT";

/// The portal a login attempt is made against.
///
/// Sent to the service verbatim as the request `role` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Portal {
    Admin,
    Lecturer,
    Student,
}

impl Portal {
    /// Wire value for the login request.
    pub fn as_str(&self) -> &'static str {
        match self {
            Portal::Admin => "admin",
            Portal::Lecturer => "lecturer",
            Portal::Student => "student",
        }
    }
}

impl fmt::Display for Portal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Portal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "admin" => Ok(Portal::Admin),
            "lecturer" => Ok(Portal::Lecturer),
            "student" => Ok(Portal::Student),
            other => Err(format!(
                "unknown portal '{other}' (expected admin, lecturer or student)"
            )),
        }
    }
}

/// Where a successful login navigates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    /// Application root, shared by staff portals.
    Root,
    /// The student area.
    StudentArea,
}

impl Destination {
    pub fn as_path(&self) -> &'static str {
        match self {
            Destination::Root => "/",
            Destination::StudentArea => "/student",
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_path())
    }
}

/// Access rules in precedence order. Both admin roles admit the admin
/// portal, super admin checked first.
const ACCESS_RULES: &[(Portal, &str, Destination)] = &[
    (Portal::Admin, ROLE_SUPER_ADMIN, Destination::Root),
    (Portal::Admin, ROLE_ADMIN, Destination::Root),
    (Portal::Lecturer, ROLE_LECTURER, Destination::Root),
    (Portal::Student, ROLE_STUDENT, Destination::StudentArea),
];

/// Resolve the destination for a portal given the roles the service granted.
///
/// Returns `None` when no rule admits the user, which callers must treat
/// as an authorization mismatch rather than a near miss: a lecturer role
/// does not open the admin portal.
pub fn resolve(portal: Portal, granted: &[String]) -> Option<Destination> {
    ACCESS_RULES
        .iter()
        .find(|(rule_portal, role, _)| {
            *rule_portal == portal && granted.iter().any(|g| g == role)
        })
        .map(|(_, _, destination)| *destination)
}

//! Role handling for authorization checks.
//!
//! This module provides the [`Role`] type and the [`has_role`] predicate used
//! for every authorization decision in the crate.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use crate::auth::Session;

/// A role granted to a user by the booking API.
///
/// The API sends roles as upper-case strings. The known roles map to
/// dedicated variants; anything else is kept verbatim in [`Role::Other`] so
/// that a profile carrying a new role still loads. Authorization checks only
/// ever compare exact variants.
///
/// # Example
///
/// ```rust
/// use court_booking::Role;
///
/// let role: Role = "ADMIN".parse().unwrap();
/// assert_eq!(role, Role::Admin);
/// assert_eq!(role.to_string(), "ADMIN");
///
/// // Matching is exact
/// let role: Role = "admin".parse().unwrap();
/// assert_eq!(role, Role::Other("admin".to_string()));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    /// Club administrator; manages courts, users, and all bookings.
    Admin,
    /// Coach account, registered by an administrator.
    Coach,
    /// Regular player account.
    Player,
    /// A role this client does not know about.
    Other(String),
}

impl Role {
    /// Returns the wire name of this role.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Admin => "ADMIN",
            Self::Coach => "COACH",
            Self::Player => "PLAYER",
            Self::Other(name) => name,
        }
    }
}

impl FromStr for Role {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "ADMIN" => Self::Admin,
            "COACH" => Self::Coach,
            "PLAYER" => Self::Player,
            other => Self::Other(other.to_string()),
        })
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Role {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(match s.parse() {
            Ok(role) => role,
            Err(never) => match never {},
        })
    }
}

/// Returns `true` if the session's user holds `role`.
///
/// This is the single authorization predicate; route guards and service
/// callers go through it rather than inspecting role strings.
#[must_use]
pub fn has_role(session: &Session, role: &Role) -> bool {
    session.user.roles.contains(role)
}

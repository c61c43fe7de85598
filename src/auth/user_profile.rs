//! The signed-in user's profile snapshot.
//!
//! The login response carries the profile fields next to the access token.
//! [`UserProfile`] is the immutable copy kept with the [`crate::Session`] and
//! persisted under the user-data key.
//!
//! # Example
//!
//! ```rust
//! use court_booking::{has_role, Role, Session, UserProfile};
//!
//! let user: UserProfile = serde_json::from_str(
//!     r#"{"id":"u1","email":"a@x.com","firstName":"Ana","lastName":"Ruiz","roles":["PLAYER"]}"#,
//! ).unwrap();
//! assert_eq!(user.first_name, "Ana");
//!
//! let session = Session::new("T1".to_string(), None, user);
//! assert!(has_role(&session, &Role::Player));
//! ```

use serde::{de, Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::auth::Role;

/// Profile of the authenticated user.
///
/// Fields other than `id` default when absent so a sparse login response
/// still produces a usable profile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// The user ID. Numeric IDs from the API are kept in string form.
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,

    /// The user's email address.
    #[serde(default)]
    pub email: String,

    /// The user's first name.
    #[serde(default)]
    pub first_name: String,

    /// The user's last name.
    #[serde(default)]
    pub last_name: String,

    /// Roles granted to the user.
    #[serde(default)]
    pub roles: BTreeSet<Role>,

    /// URL of the user's profile image, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
}

impl UserProfile {
    /// Returns the user's display name ("First Last", trimmed).
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Accepts either a JSON string or an integer for an ID field.
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct IdVisitor;

    impl de::Visitor<'_> for IdVisitor {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a string or integer id")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(v.to_string())
        }

        fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
            Ok(v)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(v.to_string())
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(v.to_string())
        }
    }

    deserializer.deserialize_any(IdVisitor)
}

//! Users: the signed-in user's own profile and admin user management.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::Role;
use crate::clients::{HttpClient, HttpError, HttpMethod, HttpRequest};
use crate::services::{segment, Page, ServiceError, DEFAULT_PAGE_SIZE};

/// A full user record.
///
/// This is richer than the [`UserProfile`](crate::UserProfile) kept with the
/// session; it is fetched on demand and never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// The unique identifier of the user.
    #[serde(deserialize_with = "crate::auth::deserialize_id")]
    pub id: String,

    /// Sign-in email.
    #[serde(default)]
    pub email: String,

    /// Given name.
    #[serde(default)]
    pub first_name: String,

    /// Family name.
    #[serde(default)]
    pub last_name: String,

    /// Contact phone number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// Postal address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Date of birth, as the API sends it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,

    /// URL of the profile image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,

    /// Account status, e.g. `"ACTIVE"` or `"PENDING_APPROVAL"`.
    #[serde(default)]
    pub status: String,

    /// Roles granted to the user.
    #[serde(default)]
    pub roles: Vec<Role>,

    /// When the account was created.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::services::datetime::option"
    )]
    pub created_at: Option<DateTime<Utc>>,

    /// When the account was last updated.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::services::datetime::option"
    )]
    pub updated_at: Option<DateTime<Utc>>,

    /// When the user last signed in.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::services::datetime::option"
    )]
    pub last_login_at: Option<DateTime<Utc>>,

    /// Whether two-factor authentication is enabled.
    #[serde(default)]
    pub two_factor_enabled: bool,
}

/// Profile changes. Only the fields that are set are sent.
#[derive(Debug, Clone, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdateRequest {
    /// New given name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// New family name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// New phone number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// New postal address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// New date of birth, `YYYY-MM-DD`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
}

/// Body for changing the signed-in user's password.
#[derive(Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChangeRequest {
    /// The password being replaced.
    pub current_password: String,
    /// The replacement password.
    pub new_password: String,
}

impl std::fmt::Debug for PasswordChangeRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordChangeRequest")
            .field("current_password", &"*****")
            .field("new_password", &"*****")
            .finish()
    }
}

/// Body for creating a user or registering a coach. Admin only.
#[derive(Debug, Clone, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewUserRequest {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Sign-in email.
    pub email: String,
    /// Initial password.
    pub password: String,
    /// Contact phone number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Roles to grant. Ignored by the coach registration endpoint.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<Role>,
}

#[derive(Serialize)]
struct StatusUpdate<'a> {
    status: &'a str,
}

/// User endpoints.
#[derive(Debug, Clone)]
pub struct UserService {
    client: Arc<HttpClient>,
}

impl UserService {
    /// Creates the service over `client`.
    #[must_use]
    pub const fn new(client: Arc<HttpClient>) -> Self {
        Self { client }
    }

    fn current_user_id(&self) -> Result<String, ServiceError> {
        self.client
            .context()
            .session()
            .map(|session| session.user.id)
            .filter(|id| !id.is_empty())
            .ok_or(ServiceError::NotAuthenticated)
    }

    /// Fetches the signed-in user's full record.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Http`] if the request fails.
    pub async fn current_user(&self) -> Result<User, ServiceError> {
        Ok(self.client.get("users/me").await?.json()?)
    }

    /// Updates the signed-in user's profile.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotAuthenticated`] without a request when
    /// nobody is signed in, and [`ServiceError::Http`] if the request fails.
    pub async fn update_profile(&self, update: &UserUpdateRequest) -> Result<User, ServiceError> {
        let id = self.current_user_id()?;
        Ok(self
            .client
            .put(&format!("users/{}", segment(&id)), update)
            .await?
            .json()?)
    }

    /// Changes the signed-in user's password.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotAuthenticated`] without a request when
    /// nobody is signed in, and [`ServiceError::Http`] if the request fails.
    pub async fn change_password(&self, change: &PasswordChangeRequest) -> Result<(), ServiceError> {
        let id = self.current_user_id()?;
        self.client
            .patch(&format!("users/{}/password", segment(&id)), Some(change))
            .await?;
        Ok(())
    }

    /// Fetches any user. Admin only.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Http`] if the request fails.
    pub async fn get_user(&self, id: &str) -> Result<User, ServiceError> {
        Ok(self
            .client
            .get(&format!("users/{}", segment(id)))
            .await?
            .json()?)
    }

    /// Lists users, one page at a time. Admin only.
    ///
    /// `size` defaults to [`DEFAULT_PAGE_SIZE`].
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Http`] if the request fails.
    pub async fn all_users(&self, page: u32, size: Option<u32>) -> Result<Page<User>, ServiceError> {
        let request = HttpRequest::builder(HttpMethod::Get, "users")
            .query_param("page", page)
            .query_param("size", size.unwrap_or(DEFAULT_PAGE_SIZE))
            .build()
            .map_err(HttpError::from)?;
        Ok(self.client.request(request).await?.json()?)
    }

    /// Creates a user. Admin only.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Http`] if the request fails.
    pub async fn create_user(&self, user: &NewUserRequest) -> Result<User, ServiceError> {
        Ok(self.client.post("users", user).await?.json()?)
    }

    /// Updates any user's profile. Admin only.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Http`] if the request fails.
    pub async fn update_user(
        &self,
        id: &str,
        update: &UserUpdateRequest,
    ) -> Result<User, ServiceError> {
        Ok(self
            .client
            .put(&format!("users/{}", segment(id)), update)
            .await?
            .json()?)
    }

    /// Sets a user's account status. Admin only.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Http`] if the request fails.
    pub async fn update_user_status(&self, id: &str, status: &str) -> Result<User, ServiceError> {
        Ok(self
            .client
            .patch(
                &format!("users/{}/status", segment(id)),
                Some(&StatusUpdate { status }),
            )
            .await?
            .json()?)
    }

    /// Deletes a user. Admin only.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Http`] if the request fails.
    pub async fn delete_user(&self, id: &str) -> Result<(), ServiceError> {
        self.client
            .delete(&format!("users/{}", segment(id)))
            .await?;
        Ok(())
    }

    /// Approves a self-registered player. Admin only.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Http`] if the request fails.
    pub async fn approve_player(&self, id: &str) -> Result<User, ServiceError> {
        Ok(self
            .client
            .patch::<()>(&format!("users/{}/approve", segment(id)), None)
            .await?
            .json()?)
    }

    /// Lists players waiting for approval. Admin only.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Http`] if the request fails.
    pub async fn pending_approval_players(&self) -> Result<Vec<User>, ServiceError> {
        Ok(self.client.get("users/pending-approval").await?.json()?)
    }

    /// Registers a coach account. Admin only.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Http`] if the request fails.
    pub async fn register_coach(&self, coach: &NewUserRequest) -> Result<User, ServiceError> {
        Ok(self
            .client
            .post("users/register/coach", coach)
            .await?
            .json()?)
    }
}

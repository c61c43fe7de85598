//! Courts: browsing, availability, and administration.
//!
//! # Example
//!
//! ```rust,ignore
//! use court_booking::services::CourtFilter;
//!
//! let courts = app.courts().list_courts().await?;
//!
//! let filter = CourtFilter {
//!     search: "center".to_string(),
//!     surface: Some("Clay".to_string()),
//!     ..Default::default()
//! };
//! for court in filter.apply(&courts) {
//!     println!("{} ({})", court.name, court.court_type);
//! }
//! ```

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::clients::{HttpClient, HttpError, HttpMethod, HttpRequest};
use crate::services::datetime::{format_api_date, format_api_datetime};
use crate::services::{distinct, segment, ServiceError};

/// A bookable court.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Court {
    /// The unique identifier of the court.
    #[serde(deserialize_with = "crate::auth::deserialize_id")]
    pub id: String,

    /// Display name.
    #[serde(default)]
    pub name: String,

    /// Court category, e.g. `"Singles"` or `"Doubles"`.
    #[serde(default)]
    pub court_type: String,

    /// Whether the court is indoors.
    #[serde(default)]
    pub indoor: bool,

    /// Whether the court has floodlights.
    #[serde(default)]
    pub has_lighting: bool,

    /// Hourly rate in dollars.
    #[serde(default)]
    pub price_per_hour: f64,

    /// Free-text description.
    #[serde(default)]
    pub description: String,

    /// Operational status, e.g. `"AVAILABLE"` or `"MAINTENANCE"`.
    #[serde(default)]
    pub status: String,

    /// Number painted on the court.
    #[serde(default)]
    pub court_number: u32,

    /// Playing surface, e.g. `"Clay"` or `"Hard"`.
    #[serde(default)]
    pub surface_type: String,

    /// Amenities.
    #[serde(default)]
    pub features: Vec<String>,

    /// Photo of the court.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Court {
    /// Returns `true` if the court's status is "available" (any case).
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.status.eq_ignore_ascii_case("available")
    }
}

/// Body for creating a court.
#[derive(Debug, Clone, Serialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CourtRequest {
    /// Display name.
    pub name: String,
    /// Court category.
    pub court_type: String,
    /// Whether the court is indoors.
    pub indoor: bool,
    /// Whether the court has floodlights.
    pub has_lighting: bool,
    /// Hourly rate in dollars.
    pub price_per_hour: f64,
    /// Free-text description.
    pub description: String,
    /// Operational status.
    pub status: String,
    /// Number painted on the court.
    pub court_number: u32,
    /// Playing surface.
    pub surface_type: String,
    /// Amenities.
    pub features: Vec<String>,
    /// Photo of the court.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Partial update of a court. Only the fields that are set are sent.
#[derive(Debug, Clone, Serialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CourtUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub court_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indoor: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_lighting: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_per_hour: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub court_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surface_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// A free interval on a court.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    /// Start of the free interval.
    #[serde(with = "crate::services::datetime")]
    pub start_time: DateTime<Utc>,
    /// End of the free interval.
    #[serde(with = "crate::services::datetime")]
    pub end_time: DateTime<Utc>,
}

/// Free intervals on one court.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CourtAvailability {
    /// The court these slots belong to.
    #[serde(deserialize_with = "crate::auth::deserialize_id")]
    pub court_id: String,
    /// Free intervals, in the order the API returned them.
    #[serde(default)]
    pub available_slots: Vec<TimeSlot>,
}

#[derive(Serialize)]
struct StatusUpdate<'a> {
    status: &'a str,
}

/// Client-side filtering of a court list.
///
/// An empty `search` matches everything; `court_type` and `surface` match
/// exactly when set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourtFilter {
    /// Case-insensitive substring of the name or description.
    pub search: String,
    /// Exact court type.
    pub court_type: Option<String>,
    /// Exact surface type.
    pub surface: Option<String>,
}

impl CourtFilter {
    /// Returns `true` if `court` passes every criterion.
    #[must_use]
    pub fn matches(&self, court: &Court) -> bool {
        let needle = self.search.to_lowercase();
        let matches_search = court.name.to_lowercase().contains(&needle)
            || court.description.to_lowercase().contains(&needle);
        let matches_type = self
            .court_type
            .as_ref()
            .map_or(true, |court_type| &court.court_type == court_type);
        let matches_surface = self
            .surface
            .as_ref()
            .map_or(true, |surface| &court.surface_type == surface);

        matches_search && matches_type && matches_surface
    }

    /// Returns the courts that pass the filter, in their original order.
    #[must_use]
    pub fn apply<'a>(&self, courts: &'a [Court]) -> Vec<&'a Court> {
        courts.iter().filter(|court| self.matches(court)).collect()
    }

    /// Returns `true` if no criterion is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.search.is_empty() && self.court_type.is_none() && self.surface.is_none()
    }
}

/// Court types present in `courts`, in order of first appearance.
#[must_use]
pub fn distinct_court_types(courts: &[Court]) -> Vec<String> {
    distinct(courts.iter().map(|court| court.court_type.as_str()))
}

/// Surface types present in `courts`, in order of first appearance.
#[must_use]
pub fn distinct_surfaces(courts: &[Court]) -> Vec<String> {
    distinct(courts.iter().map(|court| court.surface_type.as_str()))
}

/// Courts whose status is "available".
#[must_use]
pub fn available_courts(courts: &[Court]) -> Vec<&Court> {
    courts.iter().filter(|court| court.is_available()).collect()
}

/// Court endpoints.
#[derive(Debug, Clone)]
pub struct CourtService {
    client: Arc<HttpClient>,
}

impl CourtService {
    /// Creates the service over `client`.
    #[must_use]
    pub const fn new(client: Arc<HttpClient>) -> Self {
        Self { client }
    }

    /// Lists every court.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Http`] if the request fails.
    pub async fn list_courts(&self) -> Result<Vec<Court>, ServiceError> {
        Ok(self.client.get("courts").await?.json()?)
    }

    /// Fetches one court.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Http`] if the request fails.
    pub async fn get_court(&self, id: &str) -> Result<Court, ServiceError> {
        Ok(self
            .client
            .get(&format!("courts/{}", segment(id)))
            .await?
            .json()?)
    }

    /// Lists courts free for the whole of `start..end`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Http`] if the request fails.
    pub async fn available_courts(
        &self,
        start: &DateTime<Utc>,
        end: &DateTime<Utc>,
    ) -> Result<Vec<Court>, ServiceError> {
        let request = HttpRequest::builder(HttpMethod::Get, "courts/available")
            .query_param("startTime", format_api_datetime(start))
            .query_param("endTime", format_api_datetime(end))
            .build()
            .map_err(HttpError::from)?;
        Ok(self.client.request(request).await?.json()?)
    }

    /// Returns the free slots of court `id` between two dates.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Http`] if the request fails.
    pub async fn court_availability(
        &self,
        id: &str,
        start_date: &NaiveDate,
        end_date: &NaiveDate,
    ) -> Result<CourtAvailability, ServiceError> {
        let request =
            HttpRequest::builder(HttpMethod::Get, format!("courts/{}/availability", segment(id)))
                .query_param("startDate", format_api_date(start_date))
                .query_param("endDate", format_api_date(end_date))
                .build()
                .map_err(HttpError::from)?;
        Ok(self.client.request(request).await?.json()?)
    }

    /// Creates a court. Admin only.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Http`] if the request fails.
    pub async fn create_court(&self, court: &CourtRequest) -> Result<Court, ServiceError> {
        Ok(self.client.post("courts", court).await?.json()?)
    }

    /// Updates a court. Admin only.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Http`] if the request fails.
    pub async fn update_court(&self, id: &str, update: &CourtUpdate) -> Result<Court, ServiceError> {
        Ok(self
            .client
            .put(&format!("courts/{}", segment(id)), update)
            .await?
            .json()?)
    }

    /// Sets a court's status. Admin only.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Http`] if the request fails.
    pub async fn update_court_status(&self, id: &str, status: &str) -> Result<Court, ServiceError> {
        Ok(self
            .client
            .patch(
                &format!("courts/{}/status", segment(id)),
                Some(&StatusUpdate { status }),
            )
            .await?
            .json()?)
    }

    /// Deletes a court. Admin only.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Http`] if the request fails.
    pub async fn delete_court(&self, id: &str) -> Result<(), ServiceError> {
        self.client
            .delete(&format!("courts/{}", segment(id)))
            .await?;
        Ok(())
    }
}

//! Bookings: the signed-in user's reservations and admin booking management.
//!
//! # Example
//!
//! ```rust,ignore
//! use chrono::Utc;
//! use court_booking::services::BookingFilter;
//!
//! let mut bookings = app.bookings().user_bookings().await?;
//!
//! let filter = BookingFilter { status: Some("CONFIRMED".to_string()), ..Default::default() };
//! let (upcoming, past) = filter.partition_by_time(&bookings, Utc::now());
//! println!("{} upcoming, {} past", upcoming.len(), past.len());
//! ```

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::clients::{HttpClient, HttpError, HttpMethod, HttpRequest};
use crate::services::courts::CourtAvailability;
use crate::services::datetime::{format_api_date, format_api_datetime};
use crate::services::{distinct, segment, Page, ServiceError, DEFAULT_PAGE_SIZE};

/// Status a cancelled booking carries.
pub const CANCELLED: &str = "CANCELLED";

/// The court a booking is for, as embedded in the booking.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BookingCourt {
    /// The court ID.
    #[serde(deserialize_with = "crate::auth::deserialize_id")]
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Court category.
    #[serde(default)]
    pub court_type: String,
}

/// The user who made a booking, as embedded in the booking.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BookingUser {
    /// The user ID.
    #[serde(deserialize_with = "crate::auth::deserialize_id")]
    pub id: String,
    /// Given name.
    #[serde(default)]
    pub first_name: String,
    /// Family name.
    #[serde(default)]
    pub last_name: String,
    /// Email address.
    #[serde(default)]
    pub email: String,
}

/// A court reservation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    /// The unique identifier of the booking.
    #[serde(deserialize_with = "crate::auth::deserialize_id")]
    pub id: String,

    /// When play starts.
    #[serde(with = "crate::services::datetime")]
    pub start_time: DateTime<Utc>,

    /// When play ends.
    #[serde(with = "crate::services::datetime")]
    pub end_time: DateTime<Utc>,

    /// Lifecycle status, e.g. `"CONFIRMED"`, `"CANCELLED"`, `"COMPLETED"`.
    #[serde(default)]
    pub status: String,

    /// Price charged, in dollars.
    #[serde(default)]
    pub total_price: f64,

    /// Number of players on court.
    #[serde(default)]
    pub number_of_players: u32,

    /// Free-text requests for the club.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_requests: Option<String>,

    /// The booked court's ID.
    #[serde(default, deserialize_with = "crate::auth::deserialize_id")]
    pub court_id: String,

    /// The booked court, when the API embeds it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub court: Option<BookingCourt>,

    /// The booking user's ID.
    #[serde(default, deserialize_with = "crate::auth::deserialize_id")]
    pub user_id: String,

    /// The booking user, when the API embeds it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<BookingUser>,

    /// Whether the booking repeats.
    #[serde(default)]
    pub recurring: bool,

    /// Recurrence rule, e.g. `"WEEKLY"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence_pattern: Option<String>,

    /// Last day of the recurrence.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::services::datetime::option"
    )]
    pub recurrence_end_date: Option<DateTime<Utc>>,

    /// When the booking was created.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::services::datetime::option"
    )]
    pub created_at: Option<DateTime<Utc>>,

    /// When the booking was last updated.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::services::datetime::option"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Booking {
    /// Returns `true` if the booking starts after `now`.
    #[must_use]
    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.start_time > now
    }
}

/// Body for creating a booking.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    /// The court to book.
    pub court_id: String,
    /// When play starts.
    #[serde(with = "crate::services::datetime")]
    pub start_time: DateTime<Utc>,
    /// When play ends.
    #[serde(with = "crate::services::datetime")]
    pub end_time: DateTime<Utc>,
    /// Number of players on court.
    pub number_of_players: u32,
    /// Free-text requests for the club.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_requests: Option<String>,
    /// Whether the booking repeats.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurring: Option<bool>,
    /// Recurrence rule.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence_pattern: Option<String>,
    /// Last day of the recurrence.
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "crate::services::datetime::option"
    )]
    pub recurrence_end_date: Option<DateTime<Utc>>,
}

/// Partial update of a booking. Only the fields that are set are sent.
#[derive(Debug, Clone, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BookingUpdate {
    /// Move to another court.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub court_id: Option<String>,
    /// New start.
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "crate::services::datetime::option"
    )]
    pub start_time: Option<DateTime<Utc>>,
    /// New end.
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "crate::services::datetime::option"
    )]
    pub end_time: Option<DateTime<Utc>>,
    /// New player count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_players: Option<u32>,
    /// New special requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_requests: Option<String>,
}

#[derive(Deserialize)]
struct PriceQuote {
    price: f64,
}

/// Client-side filtering of a booking list.
///
/// An empty `search` matches everything. A non-empty one matches the
/// embedded court's name or type, case-insensitively; bookings without an
/// embedded court never match it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingFilter {
    /// Case-insensitive substring of the court name or court type.
    pub search: String,
    /// Exact status.
    pub status: Option<String>,
}

impl BookingFilter {
    /// Returns `true` if `booking` passes every criterion.
    #[must_use]
    pub fn matches(&self, booking: &Booking) -> bool {
        let matches_search = self.search.is_empty()
            || booking.court.as_ref().is_some_and(|court| {
                let needle = self.search.to_lowercase();
                court.name.to_lowercase().contains(&needle)
                    || court.court_type.to_lowercase().contains(&needle)
            });
        let matches_status = self
            .status
            .as_ref()
            .map_or(true, |status| &booking.status == status);

        matches_search && matches_status
    }

    /// Returns the bookings that pass the filter, in their original order.
    #[must_use]
    pub fn apply<'a>(&self, bookings: &'a [Booking]) -> Vec<&'a Booking> {
        bookings
            .iter()
            .filter(|booking| self.matches(booking))
            .collect()
    }

    /// Splits the matching bookings into `(upcoming, past)` relative to `now`.
    ///
    /// A booking starting exactly at `now` is past.
    #[must_use]
    pub fn partition_by_time<'a>(
        &self,
        bookings: &'a [Booking],
        now: DateTime<Utc>,
    ) -> (Vec<&'a Booking>, Vec<&'a Booking>) {
        self.apply(bookings)
            .into_iter()
            .partition(|booking| booking.is_upcoming(now))
    }
}

/// Statuses present in `bookings`, in order of first appearance.
#[must_use]
pub fn distinct_statuses(bookings: &[Booking]) -> Vec<String> {
    distinct(bookings.iter().map(|booking| booking.status.as_str()))
}

/// Marks booking `id` as cancelled in a local list.
///
/// Returns `true` if the booking was found.
pub fn mark_cancelled(bookings: &mut [Booking], id: &str) -> bool {
    match bookings.iter_mut().find(|booking| booking.id == id) {
        Some(booking) => {
            booking.status = CANCELLED.to_string();
            true
        }
        None => false,
    }
}

/// Booking endpoints.
#[derive(Debug, Clone)]
pub struct BookingService {
    client: Arc<HttpClient>,
}

impl BookingService {
    /// Creates the service over `client`.
    #[must_use]
    pub const fn new(client: Arc<HttpClient>) -> Self {
        Self { client }
    }

    /// Fetches one booking.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Http`] if the request fails.
    pub async fn get_booking(&self, id: &str) -> Result<Booking, ServiceError> {
        Ok(self
            .client
            .get(&format!("bookings/{}", segment(id)))
            .await?
            .json()?)
    }

    /// Lists the signed-in user's bookings.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Http`] if the request fails.
    pub async fn user_bookings(&self) -> Result<Vec<Booking>, ServiceError> {
        Ok(self.client.get("bookings/user").await?.json()?)
    }

    /// Lists the signed-in user's upcoming bookings.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Http`] if the request fails.
    pub async fn user_upcoming_bookings(&self) -> Result<Vec<Booking>, ServiceError> {
        Ok(self.client.get("bookings/user/upcoming").await?.json()?)
    }

    /// Lists the signed-in user's past bookings.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Http`] if the request fails.
    pub async fn user_past_bookings(&self) -> Result<Vec<Booking>, ServiceError> {
        Ok(self.client.get("bookings/user/past").await?.json()?)
    }

    /// Books a court.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Http`] if the request fails, including when
    /// the slot is taken.
    pub async fn create_booking(&self, booking: &BookingRequest) -> Result<Booking, ServiceError> {
        Ok(self.client.post("bookings", booking).await?.json()?)
    }

    /// Changes a booking.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Http`] if the request fails.
    pub async fn update_booking(
        &self,
        id: &str,
        update: &BookingUpdate,
    ) -> Result<Booking, ServiceError> {
        Ok(self
            .client
            .put(&format!("bookings/{}", segment(id)), update)
            .await?
            .json()?)
    }

    /// Cancels a booking.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Http`] if the request fails.
    pub async fn cancel_booking(&self, id: &str) -> Result<Booking, ServiceError> {
        Ok(self
            .client
            .patch::<()>(&format!("bookings/{}/cancel", segment(id)), None)
            .await?
            .json()?)
    }

    /// Returns the free slots of a court on `date`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Http`] if the request fails.
    pub async fn check_court_availability(
        &self,
        court_id: &str,
        date: &NaiveDate,
    ) -> Result<CourtAvailability, ServiceError> {
        let request = HttpRequest::builder(
            HttpMethod::Get,
            format!("bookings/check-availability/{}", segment(court_id)),
        )
        .query_param("date", format_api_date(date))
        .build()
        .map_err(HttpError::from)?;
        Ok(self.client.request(request).await?.json()?)
    }

    /// Quotes the price of booking a court from `start` to `end`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Http`] if the request fails or the response
    /// has no `price`.
    pub async fn calculate_booking_price(
        &self,
        court_id: &str,
        start: &DateTime<Utc>,
        end: &DateTime<Utc>,
    ) -> Result<f64, ServiceError> {
        let request = HttpRequest::builder(
            HttpMethod::Get,
            format!("bookings/calculate-price/{}", segment(court_id)),
        )
        .query_param("startTime", format_api_datetime(start))
        .query_param("endTime", format_api_datetime(end))
        .build()
        .map_err(HttpError::from)?;
        let quote: PriceQuote = self.client.request(request).await?.json()?;
        Ok(quote.price)
    }

    /// Lists all bookings, one page at a time. Admin only.
    ///
    /// `size` defaults to [`DEFAULT_PAGE_SIZE`].
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Http`] if the request fails.
    pub async fn all_bookings(
        &self,
        page: u32,
        size: Option<u32>,
    ) -> Result<Page<Booking>, ServiceError> {
        let request = HttpRequest::builder(HttpMethod::Get, "bookings")
            .query_param("page", page)
            .query_param("size", size.unwrap_or(DEFAULT_PAGE_SIZE))
            .build()
            .map_err(HttpError::from)?;
        Ok(self.client.request(request).await?.json()?)
    }

    /// Lists the bookings of user `user_id`. Admin only.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Http`] if the request fails.
    pub async fn bookings_by_user(&self, user_id: &str) -> Result<Vec<Booking>, ServiceError> {
        Ok(self
            .client
            .get(&format!("bookings/user/{}", segment(user_id)))
            .await?
            .json()?)
    }

    /// Marks a booking as played. Admin only.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Http`] if the request fails.
    pub async fn complete_booking(&self, id: &str) -> Result<Booking, ServiceError> {
        Ok(self
            .client
            .patch::<()>(&format!("bookings/{}/complete", segment(id)), None)
            .await?
            .json()?)
    }

    /// Deletes a booking. Admin only.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Http`] if the request fails.
    pub async fn delete_booking(&self, id: &str) -> Result<(), ServiceError> {
        self.client
            .delete(&format!("bookings/{}", segment(id)))
            .await?;
        Ok(())
    }
}

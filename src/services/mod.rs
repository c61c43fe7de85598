//! Typed wrappers over the booking API's domain endpoints.
//!
//! Every service call goes through the shared [`HttpClient`](crate::HttpClient),
//! so it is authenticated with the current session and benefits from the
//! transparent token refresh.
//!
//! - [`BookingService`]: the user's bookings, pricing, and admin booking
//!   management
//! - [`CourtService`]: courts, availability, and admin court management
//! - [`UserService`]: the signed-in user's profile and admin user management
//!
//! Alongside the services are the client-side derivations the list screens
//! use ([`BookingFilter`], [`CourtFilter`]) and the [`format`] helpers.

mod bookings;
mod courts;
pub mod datetime;
mod errors;
pub mod format;
mod users;

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

pub use bookings::{
    distinct_statuses, mark_cancelled, Booking, BookingCourt, BookingFilter, BookingRequest,
    BookingService, BookingUpdate, BookingUser, CANCELLED,
};
pub use courts::{
    available_courts, distinct_court_types, distinct_surfaces, Court, CourtAvailability,
    CourtFilter, CourtRequest, CourtService, CourtUpdate, TimeSlot,
};
pub use errors::ServiceError;
pub use users::{NewUserRequest, PasswordChangeRequest, User, UserService, UserUpdateRequest};

/// Default page size of the admin list endpoints.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// One page of an admin list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on this page.
    #[serde(default = "Vec::new")]
    pub content: Vec<T>,
    /// Total number of items across all pages.
    #[serde(default)]
    pub total_elements: u64,
    /// Total number of pages.
    #[serde(default)]
    pub total_pages: u32,
    /// Zero-based index of this page.
    #[serde(default)]
    pub number: u32,
    /// Requested page size.
    #[serde(default)]
    pub size: u32,
}

impl<T> Page<T> {
    /// Returns `true` if a page follows this one.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.number + 1 < self.total_pages
    }
}

/// Percent-encodes an ID for use as a path segment.
pub(crate) fn segment(id: &str) -> Cow<'_, str> {
    urlencoding::encode(id)
}

/// Collects `values` without duplicates, in order of first appearance.
pub(crate) fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for value in values {
        if !seen.iter().any(|existing| existing == value) {
            seen.push(value.to_string());
        }
    }
    seen
}

//! Document store for facilities, reviews and access tags.
//!
//! The traits describe the collaborators the review workflow needs; the
//! JSON-file implementation lives in [`json`].

pub mod json;

pub use json::JsonStore;

use crate::error::StoreError;
use crate::models::{AccessTag, Facility, FacilitySummary, NewReview, Review, ReviewId};
use async_trait::async_trait;

/// Append-only review collection.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Store a new review, assigning its id and creation time.
    async fn create_review(&self, review: NewReview) -> Result<ReviewId, StoreError>;

    /// All reviews for a facility, oldest first.
    async fn find_reviews_by_facility(&self, facility_id: &str) -> Result<Vec<Review>, StoreError>;

    /// Every stored review, oldest first.
    async fn all_reviews(&self) -> Result<Vec<Review>, StoreError>;
}

/// Facility collection.
#[async_trait]
pub trait FacilityStore: Send + Sync {
    async fn get_facility(&self, facility_id: &str) -> Result<Option<Facility>, StoreError>;

    /// Insert a facility with an empty summary at revision 0.
    async fn create_facility(&self, facility: Facility) -> Result<(), StoreError>;

    /// Overwrite the derived summary fields if the facility is still at
    /// `expected_revision`. Returns the new revision.
    ///
    /// Name, address, location and the other descriptive fields are left
    /// untouched.
    async fn update_facility_summary(
        &self,
        facility_id: &str,
        summary: FacilitySummary,
        expected_revision: u64,
    ) -> Result<u64, StoreError>;

    async fn list_facilities(&self) -> Result<Vec<Facility>, StoreError>;
}

/// Access tag catalog collection.
#[async_trait]
pub trait TagStore: Send + Sync {
    async fn list_access_tags(&self) -> Result<Vec<AccessTag>, StoreError>;

    async fn add_access_tag(&self, tag: AccessTag) -> Result<(), StoreError>;
}

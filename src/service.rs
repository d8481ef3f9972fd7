//! Review submission workflow.
//!
//! Ties the aggregator to the document store: validate a review, append it,
//! make sure its facility exists, then recompute and write the facility
//! summary from every review of that facility.
//!
//! The recompute-and-write cycle uses the facility revision as a
//! compare-and-swap guard. A writer that lost a race re-reads the reviews
//! and tries again, so the last successful write always reflects every
//! review appended before it.

use crate::analysis::{compute_facility_summary, validate_review};
use crate::config::ValidationConfig;
use crate::error::{ServiceError, StoreError};
use crate::models::{Facility, FacilitySummary, NewReview, Review, ReviewId};
use crate::store::{FacilityStore, ReviewStore};
use futures::future::join_all;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Settings for [`ReviewService`].
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Summary write attempts before a conflict is reported.
    pub max_write_retries: usize,
    pub validation: ValidationConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_write_retries: 5,
            validation: ValidationConfig::default(),
        }
    }
}

/// A review that has been stored.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmittedReview {
    pub review_id: ReviewId,
    /// The refreshed facility summary. `None` when the review is stored but
    /// the summary could not be brought up to date; `recalculate` repairs it.
    pub summary: Option<FacilitySummary>,
}

/// Per-facility outcomes of [`ReviewService::recalculate_all`].
pub type RecalculateResults = Vec<(String, Result<FacilitySummary, ServiceError>)>;

/// Review workflow over a document store.
pub struct ReviewService<S> {
    store: Arc<S>,
    config: ServiceConfig,
}

impl<S> Clone for ReviewService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config.clone(),
        }
    }
}

impl<S> ReviewService<S>
where
    S: ReviewStore + FacilityStore,
{
    pub fn new(store: Arc<S>, config: ServiceConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Register a facility with an empty summary.
    pub async fn create_facility(&self, facility: Facility) -> Result<(), ServiceError> {
        info!("Creating facility {} ({})", facility.id, facility.name);
        self.store.create_facility(facility).await?;
        Ok(())
    }

    /// Submit a review and refresh the facility summary.
    ///
    /// Invalid reviews are rejected before anything is written. An unknown
    /// facility is created from the review's facility details once the
    /// review itself is stored.
    ///
    /// After the review is appended this never returns an error: a failed
    /// facility creation or summary write is logged and reported through
    /// [`SubmittedReview::summary`], so callers never resubmit a stored review.
    pub async fn add_review(
        &self,
        facility_id: &str,
        mut review: NewReview,
    ) -> Result<SubmittedReview, ServiceError> {
        validate_review(&review, &self.config.validation)?;
        review.facility_id = facility_id.to_string();

        let draft = match self.store.get_facility(facility_id).await? {
            Some(_) => None,
            None => Some(Facility::from_review(facility_id, &review)),
        };

        let review_id = self.store.create_review(review).await?;
        debug!("Stored review {} for facility {}", review_id, facility_id);

        if let Some(facility) = draft {
            info!("Facility {} not found, creating it from review", facility_id);
            match self.store.create_facility(facility).await {
                Ok(()) | Err(StoreError::AlreadyExists { .. }) => {}
                Err(e) => {
                    warn!(
                        "Review {} stored but facility {} could not be created: {}",
                        review_id, facility_id, e
                    );
                    return Ok(SubmittedReview {
                        review_id,
                        summary: None,
                    });
                }
            }
        }

        let summary = match self.refresh_summary(facility_id).await {
            Ok(summary) => {
                info!(
                    "Facility {} now has {} reviews",
                    facility_id, summary.review_count
                );
                Some(summary)
            }
            Err(e) => {
                warn!(
                    "Review {} stored but the summary of {} is stale: {}",
                    review_id, facility_id, e
                );
                None
            }
        };

        Ok(SubmittedReview { review_id, summary })
    }

    /// Recompute a facility summary from its reviews.
    pub async fn recalculate(&self, facility_id: &str) -> Result<FacilitySummary, ServiceError> {
        Ok(self.refresh_summary(facility_id).await?)
    }

    /// Recompute every facility summary.
    ///
    /// `on_done(facility_id, finished, total)` runs as each facility
    /// completes. Results are returned in facility id order; a failure for
    /// one facility does not stop the others.
    pub async fn recalculate_all<F>(&self, on_done: F) -> Result<RecalculateResults, ServiceError>
    where
        F: Fn(&str, usize, usize) + Sync,
    {
        let facilities = self.store.list_facilities().await?;
        let total = facilities.len();
        info!("Recalculating {} facilities", total);

        let finished = AtomicUsize::new(0);
        let results = join_all(facilities.iter().map(|f| {
            let (finished, on_done) = (&finished, &on_done);
            async move {
                let result = self.recalculate(&f.id).await;
                on_done(&f.id, finished.fetch_add(1, Ordering::SeqCst) + 1, total);
                result
            }
        }))
        .await;

        Ok(facilities
            .into_iter()
            .map(|f| f.id)
            .zip(results)
            .collect())
    }

    /// Reviews of a facility, newest first.
    pub async fn facility_reviews(&self, facility_id: &str) -> Result<Vec<Review>, ServiceError> {
        let mut reviews = self.store.find_reviews_by_facility(facility_id).await?;
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reviews)
    }

    /// Reviews written by a user across all facilities, newest first.
    pub async fn user_reviews(&self, user_id: &str) -> Result<Vec<Review>, ServiceError> {
        let mut reviews: Vec<Review> = self
            .store
            .all_reviews()
            .await?
            .into_iter()
            .filter(|r| r.user_id == user_id)
            .collect();
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reviews)
    }

    /// The facility registered under an external place id.
    pub async fn facility_by_place_id(&self, place_id: &str) -> Result<Option<Facility>, ServiceError> {
        Ok(self
            .store
            .list_facilities()
            .await?
            .into_iter()
            .find(|f| f.place_id.as_deref() == Some(place_id)))
    }

    /// Facilities whose name starts with `query`, ignoring case.
    pub async fn search_facilities(&self, query: &str) -> Result<Vec<Facility>, ServiceError> {
        let needle = query.trim().to_lowercase();
        let mut matches: Vec<Facility> = self
            .store
            .list_facilities()
            .await?
            .into_iter()
            .filter(|f| f.name.to_lowercase().starts_with(&needle))
            .collect();
        matches.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(matches)
    }

    async fn refresh_summary(&self, facility_id: &str) -> Result<FacilitySummary, StoreError> {
        let attempts = self.config.max_write_retries.max(1);
        let mut last_conflict = None;

        for attempt in 1..=attempts {
            let facility = self
                .store
                .get_facility(facility_id)
                .await?
                .ok_or_else(|| StoreError::facility_not_found(facility_id))?;

            let reviews = self.store.find_reviews_by_facility(facility_id).await?;
            let summary = compute_facility_summary(&reviews);

            match self
                .store
                .update_facility_summary(facility_id, summary.clone(), facility.revision)
                .await
            {
                Ok(revision) => {
                    debug!(
                        "Facility {} summary written at revision {}",
                        facility_id, revision
                    );
                    return Ok(summary);
                }
                Err(e @ StoreError::RevisionConflict { .. }) => {
                    debug!("Attempt {}/{}: {}", attempt, attempts, e);
                    last_conflict = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        warn!(
            "Giving up on facility {} after {} conflicting writes",
            facility_id, attempts
        );
        Err(last_conflict.unwrap_or_else(|| StoreError::facility_not_found(facility_id)))
    }
}

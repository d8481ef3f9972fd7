//! Data models for facility accessibility reviews.
//!
//! This module contains the records stored in the document store
//! (facilities, reviews, access tags) and the derived facility summary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Store-assigned review identifier.
pub type ReviewId = String;

/// One of the three accessibility rating categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagCategory {
    /// Mobility and physical access
    Physical,
    /// Sight, hearing and other sensory access
    Sensory,
    /// Comprehension, memory and attention support
    Cognitive,
}

impl fmt::Display for TagCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagCategory::Physical => write!(f, "Physical"),
            TagCategory::Sensory => write!(f, "Sensory"),
            TagCategory::Cognitive => write!(f, "Cognitive"),
        }
    }
}

impl TagCategory {
    /// All categories in display order.
    pub const ALL: [TagCategory; 3] = [
        TagCategory::Physical,
        TagCategory::Sensory,
        TagCategory::Cognitive,
    ];

    /// Returns an emoji marker for the category.
    pub fn emoji(&self) -> &'static str {
        match self {
            TagCategory::Physical => "🦽",
            TagCategory::Sensory => "👂",
            TagCategory::Cognitive => "🧠",
        }
    }
}

/// Rating categories share the tag categories.
pub type RatingCategory = TagCategory;

/// Geographic coordinates of a facility.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

/// A stored review. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// Store-assigned identifier.
    pub id: ReviewId,
    /// Facility this review belongs to.
    pub facility_id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub facility_name: String,
    #[serde(default)]
    pub facility_address: String,
    #[serde(default)]
    pub facility_location: Location,
    /// Overall rating at submission time.
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub comment: String,
    /// Physical rating in `[0, 5]`; absent counts as 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_rating: Option<f64>,
    /// Sensory rating in `[0, 5]`; absent counts as 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensory_rating: Option<f64>,
    /// Cognitive rating in `[0, 5]`; absent counts as 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cognitive_rating: Option<f64>,
    /// Access tags cited by the reviewer, in the order given.
    #[serde(default)]
    pub access_tags: Vec<String>,
    #[serde(default)]
    pub is_anonymous: bool,
    pub created_at: DateTime<Utc>,
}

impl Review {
    /// Returns the rating for a category, treating an absent rating as 0.
    pub fn rating_for(&self, category: RatingCategory) -> f64 {
        let value = match category {
            TagCategory::Physical => self.physical_rating,
            TagCategory::Sensory => self.sensory_rating,
            TagCategory::Cognitive => self.cognitive_rating,
        };
        value.unwrap_or(0.0)
    }
}

/// A review as submitted, before the store assigns an id and timestamp.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    pub facility_id: String,
    pub user_id: String,
    pub facility_name: String,
    pub facility_address: String,
    pub facility_location: Location,
    pub comment: String,
    pub physical_rating: Option<f64>,
    pub sensory_rating: Option<f64>,
    pub cognitive_rating: Option<f64>,
    pub access_tags: Vec<String>,
    pub is_anonymous: bool,
}

impl NewReview {
    /// Returns the submitted rating for a category, if any.
    pub fn rating_for(&self, category: RatingCategory) -> Option<f64> {
        match category {
            TagCategory::Physical => self.physical_rating,
            TagCategory::Sensory => self.sensory_rating,
            TagCategory::Cognitive => self.cognitive_rating,
        }
    }

    /// Overall rating: mean of the three category ratings.
    pub fn overall_rating(&self) -> f64 {
        TagCategory::ALL
            .iter()
            .map(|c| self.rating_for(*c).unwrap_or(0.0))
            .sum::<f64>()
            / 3.0
    }

    /// Materialize into a stored review.
    pub fn into_review(self, id: ReviewId, created_at: DateTime<Utc>) -> Review {
        let rating = self.overall_rating();
        Review {
            id,
            facility_id: self.facility_id,
            user_id: self.user_id,
            facility_name: self.facility_name,
            facility_address: self.facility_address,
            facility_location: self.facility_location,
            rating,
            comment: self.comment,
            physical_rating: self.physical_rating,
            sensory_rating: self.sensory_rating,
            cognitive_rating: self.cognitive_rating,
            access_tags: self.access_tags,
            is_anonymous: self.is_anonymous,
            created_at,
        }
    }
}

/// Derived aggregate of all reviews for a facility.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacilitySummary {
    #[serde(default)]
    pub physical_rating: f64,
    #[serde(default)]
    pub sensory_rating: f64,
    #[serde(default)]
    pub cognitive_rating: f64,
    #[serde(default)]
    pub review_count: usize,
    /// Up to three most cited tags.
    #[serde(default)]
    pub common_access_tags: Vec<String>,
    /// Every distinct tag cited for the facility.
    #[serde(default)]
    pub access_tags: Vec<String>,
}

impl FacilitySummary {
    /// Returns the averaged rating for a category.
    pub fn rating_for(&self, category: RatingCategory) -> f64 {
        match category {
            TagCategory::Physical => self.physical_rating,
            TagCategory::Sensory => self.sensory_rating,
            TagCategory::Cognitive => self.cognitive_rating,
        }
    }
}

/// A reviewable physical location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Facility {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub location: Location,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
    /// Derived fields; only the store's summary update writes them.
    #[serde(flatten)]
    pub summary: FacilitySummary,
    pub created_at: DateTime<Utc>,
    /// Bumped on every summary write.
    #[serde(default)]
    pub revision: u64,
}

impl Facility {
    /// Creates a facility with an empty summary.
    pub fn new(id: impl Into<String>, name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            address: address.into(),
            location: Location::default(),
            photo: None,
            place_id: None,
            summary: FacilitySummary::default(),
            created_at: Utc::now(),
            revision: 0,
        }
    }

    /// Builds the facility record implied by a review of an unknown facility.
    pub fn from_review(facility_id: &str, review: &NewReview) -> Self {
        Self {
            location: review.facility_location,
            place_id: Some(facility_id.to_string()),
            ..Self::new(
                facility_id,
                review.facility_name.clone(),
                review.facility_address.clone(),
            )
        }
    }
}

/// Catalog entry describing an access tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTag {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<TagCategory>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_review() -> Review {
        NewReview {
            facility_id: "f1".to_string(),
            physical_rating: Some(4.0),
            sensory_rating: None,
            cognitive_rating: Some(5.0),
            access_tags: vec!["Ramp".to_string()],
            ..NewReview::default()
        }
        .into_review("r1".to_string(), Utc::now())
    }

    #[test]
    fn test_absent_rating_reads_as_zero() {
        let review = make_review();
        assert_eq!(review.rating_for(TagCategory::Physical), 4.0);
        assert_eq!(review.rating_for(TagCategory::Sensory), 0.0);
        assert_eq!(review.rating_for(TagCategory::Cognitive), 5.0);
    }

    #[test]
    fn test_overall_rating() {
        let review = make_review();
        assert_eq!(review.rating, 3.0);
    }

    #[test]
    fn test_review_serializes_camel_case() {
        let json = serde_json::to_string(&make_review()).unwrap();
        assert!(json.contains("\"facilityId\":\"f1\""));
        assert!(json.contains("\"physicalRating\":4.0"));
        assert!(json.contains("\"accessTags\":[\"Ramp\"]"));
        assert!(!json.contains("sensoryRating"));
    }

    #[test]
    fn test_review_missing_tags_deserializes_empty() {
        let json = r#"{
            "id": "r9",
            "facilityId": "f1",
            "physicalRating": 3,
            "createdAt": "2024-03-01T10:00:00Z"
        }"#;
        let review: Review = serde_json::from_str(json).unwrap();
        assert!(review.access_tags.is_empty());
        assert_eq!(review.rating_for(TagCategory::Physical), 3.0);
        assert_eq!(review.cognitive_rating, None);
    }

    #[test]
    fn test_facility_summary_is_flattened() {
        let mut facility = Facility::new("f1", "Library", "1 Main St");
        facility.summary.review_count = 2;
        facility.summary.common_access_tags = vec!["Elevator".to_string()];

        let value = serde_json::to_value(&facility).unwrap();
        assert_eq!(value["reviewCount"], 2);
        assert_eq!(value["commonAccessTags"][0], "Elevator");
        assert_eq!(value["name"], "Library");
    }

    #[test]
    fn test_facility_from_review() {
        let review = NewReview {
            facility_name: "Cafe".to_string(),
            facility_address: "2 Side St".to_string(),
            facility_location: Location {
                latitude: 43.6,
                longitude: -79.4,
            },
            ..NewReview::default()
        };
        let facility = Facility::from_review("place-123", &review);
        assert_eq!(facility.id, "place-123");
        assert_eq!(facility.place_id.as_deref(), Some("place-123"));
        assert_eq!(facility.name, "Cafe");
        assert_eq!(facility.location.latitude, 43.6);
        assert_eq!(facility.summary, FacilitySummary::default());
    }

    #[test]
    fn test_category_display() {
        assert_eq!(TagCategory::Physical.to_string(), "Physical");
        assert_eq!(TagCategory::Cognitive.emoji(), "🧠");
        let parsed: TagCategory = serde_json::from_str("\"sensory\"").unwrap();
        assert_eq!(parsed, TagCategory::Sensory);
    }
}

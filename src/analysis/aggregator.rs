//! Facility metrics aggregation.
//!
//! Every summary is recomputed from the complete review set of a facility.
//! Nothing here performs I/O or mutates its input, so the same reviews
//! always produce the same summary.

use crate::config::ValidationConfig;
use crate::error::ValidationError;
use crate::models::{FacilitySummary, NewReview, RatingCategory, Review, TagCategory};
use std::collections::HashMap;

/// Number of tags reported as a facility's common access tags.
pub const COMMON_TAG_LIMIT: usize = 3;

/// Highest rating a review may give in any category.
pub const MAX_RATING: f64 = 5.0;

/// Compute the facility summary from all of its reviews.
///
/// Reviews must already be filtered to a single facility. Their order matters
/// only for breaking ties between equally frequent tags: the tag seen first
/// ranks first.
pub fn compute_facility_summary(reviews: &[Review]) -> FacilitySummary {
    if reviews.is_empty() {
        return FacilitySummary::default();
    }

    let frequencies = tag_frequencies(reviews);
    let access_tags: Vec<String> = frequencies.iter().map(|(tag, _)| tag.clone()).collect();

    FacilitySummary {
        physical_rating: average_rating(reviews, TagCategory::Physical),
        sensory_rating: average_rating(reviews, TagCategory::Sensory),
        cognitive_rating: average_rating(reviews, TagCategory::Cognitive),
        review_count: reviews.len(),
        common_access_tags: top_tags(frequencies, COMMON_TAG_LIMIT),
        access_tags,
    }
}

/// Mean rating for a category, rounded to one decimal.
///
/// Absent ratings count as 0 and still count toward the denominator.
pub fn average_rating(reviews: &[Review], category: RatingCategory) -> f64 {
    if reviews.is_empty() {
        return 0.0;
    }

    let total: f64 = reviews.iter().map(|r| r.rating_for(category)).sum();
    round_to_tenth(total / reviews.len() as f64)
}

/// Round to one decimal place, halves away from zero.
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Count every tag occurrence across reviews.
///
/// The result lists each distinct tag once, in the order it was first seen.
/// A tag repeated within one review counts once per occurrence.
pub fn tag_frequencies(reviews: &[Review]) -> Vec<(String, usize)> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();

    for tag in reviews.iter().flat_map(|r| r.access_tags.iter()) {
        match positions.get(tag.as_str()) {
            Some(&idx) => counts[idx].1 += 1,
            None => {
                positions.insert(tag.as_str(), counts.len());
                counts.push((tag.clone(), 1));
            }
        }
    }

    counts
}

/// Take the `n` most frequent tags.
///
/// `frequencies` must be in first-seen order; the stable sort keeps that
/// order among tags with equal counts.
pub fn top_tags(mut frequencies: Vec<(String, usize)>, n: usize) -> Vec<String> {
    frequencies.sort_by(|a, b| b.1.cmp(&a.1));
    frequencies.into_iter().take(n).map(|(tag, _)| tag).collect()
}

/// Check a submitted review before it is stored.
///
/// Out-of-range ratings are rejected, never clamped.
pub fn validate_review(review: &NewReview, config: &ValidationConfig) -> Result<(), ValidationError> {
    for category in TagCategory::ALL {
        match review.rating_for(category) {
            Some(value) if value.is_nan() || !(0.0..=MAX_RATING).contains(&value) => {
                return Err(ValidationError::InvalidRating { category, value });
            }
            Some(value) if value == 0.0 && config.require_all_ratings => {
                return Err(ValidationError::MissingRating { category });
            }
            None if config.require_all_ratings => {
                return Err(ValidationError::MissingRating { category });
            }
            _ => {}
        }
    }

    if review.access_tags.iter().any(|t| t.trim().is_empty()) {
        return Err(ValidationError::EmptyTag);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn create_review(physical: Option<f64>, sensory: Option<f64>, cognitive: Option<f64>, tags: &[&str]) -> Review {
        NewReview {
            facility_id: "facility-1".to_string(),
            physical_rating: physical,
            sensory_rating: sensory,
            cognitive_rating: cognitive,
            access_tags: tags.iter().map(|t| t.to_string()).collect(),
            ..NewReview::default()
        }
        .into_review(uuid::Uuid::new_v4().to_string(), Utc::now())
    }

    fn tagged(tags: &[&str]) -> Review {
        create_review(Some(3.0), Some(3.0), Some(3.0), tags)
    }

    fn assert_subset(summary: &FacilitySummary) {
        assert!(summary.common_access_tags.len() <= COMMON_TAG_LIMIT);
        assert!(summary.common_access_tags.len() <= summary.access_tags.len());
        for tag in &summary.common_access_tags {
            assert!(summary.access_tags.contains(tag), "{} missing from access tags", tag);
        }
    }

    #[test]
    fn test_empty_reviews() {
        let summary = compute_facility_summary(&[]);
        assert_eq!(summary.physical_rating, 0.0);
        assert_eq!(summary.sensory_rating, 0.0);
        assert_eq!(summary.cognitive_rating, 0.0);
        assert_eq!(summary.review_count, 0);
        assert!(summary.common_access_tags.is_empty());
        assert!(summary.access_tags.is_empty());
    }

    #[test]
    fn test_single_review() {
        let reviews = vec![create_review(Some(4.0), Some(3.0), Some(5.0), &["Elevator", "Ramp"])];
        let summary = compute_facility_summary(&reviews);

        assert_eq!(summary.physical_rating, 4.0);
        assert_eq!(summary.sensory_rating, 3.0);
        assert_eq!(summary.cognitive_rating, 5.0);
        assert_eq!(summary.review_count, 1);
        assert_eq!(summary.common_access_tags, vec!["Elevator", "Ramp"]);
        assert_eq!(summary.access_tags, vec!["Elevator", "Ramp"]);
    }

    #[test]
    fn test_mean_of_three() {
        let reviews = vec![
            create_review(Some(5.0), None, None, &[]),
            create_review(Some(4.0), None, None, &[]),
            create_review(Some(3.0), None, None, &[]),
        ];
        let summary = compute_facility_summary(&reviews);
        assert_eq!(summary.physical_rating, 4.0);
        assert_eq!(summary.sensory_rating, 0.0);
        assert!(summary.access_tags.is_empty());
    }

    #[test]
    fn test_mean_rounds_to_one_decimal() {
        let reviews = vec![
            create_review(Some(5.0), Some(4.0), Some(1.0), &[]),
            create_review(Some(4.0), Some(4.0), Some(1.0), &[]),
            create_review(Some(4.0), Some(5.0), Some(2.0), &[]),
        ];
        let summary = compute_facility_summary(&reviews);
        // 13/3 = 4.333.., 13/3, 4/3 = 1.333..
        assert_eq!(summary.physical_rating, 4.3);
        assert_eq!(summary.sensory_rating, 4.3);
        assert_eq!(summary.cognitive_rating, 1.3);

        let reviews = vec![
            create_review(Some(5.0), None, None, &[]),
            create_review(Some(5.0), None, None, &[]),
            create_review(Some(4.0), None, None, &[]),
        ];
        // 14/3 = 4.666..
        assert_eq!(average_rating(&reviews, TagCategory::Physical), 4.7);
    }

    #[test]
    fn test_absent_rating_pulls_average_down() {
        let reviews = vec![
            create_review(None, Some(4.0), Some(4.0), &[]),
            create_review(Some(4.0), Some(4.0), Some(4.0), &[]),
        ];
        let summary = compute_facility_summary(&reviews);
        assert_eq!(summary.physical_rating, 2.0);
        assert_eq!(summary.sensory_rating, 4.0);
    }

    #[test]
    fn test_round_to_tenth() {
        assert_eq!(round_to_tenth(4.25), 4.3);
        assert_eq!(round_to_tenth(2.75), 2.8);
        assert_eq!(round_to_tenth(3.04), 3.0);
        assert_eq!(round_to_tenth(0.0), 0.0);
        assert_eq!(round_to_tenth(5.0), 5.0);
    }

    #[test]
    fn test_common_tags_by_frequency() {
        let reviews = vec![tagged(&["Ramp", "Quiet"]), tagged(&["Ramp"])];
        let summary = compute_facility_summary(&reviews);

        assert_eq!(summary.common_access_tags, vec!["Ramp", "Quiet"]);
        assert_eq!(summary.access_tags.len(), 2);
        assert!(summary.access_tags.contains(&"Ramp".to_string()));
        assert!(summary.access_tags.contains(&"Quiet".to_string()));
    }

    #[test]
    fn test_top_three_with_ties_in_first_seen_order() {
        let reviews = vec![
            tagged(&["Elevator", "Braille Menu"]),
            tagged(&["Elevator", "Hearing Loop"]),
            tagged(&["Elevator", "Quiet"]),
            tagged(&["Elevator", "Ramp"]),
            tagged(&["Elevator", "Handrails"]),
        ];
        let summary = compute_facility_summary(&reviews);

        assert_eq!(
            summary.common_access_tags,
            vec!["Elevator", "Braille Menu", "Hearing Loop"]
        );
        assert_eq!(summary.access_tags.len(), 6);
        assert_subset(&summary);
    }

    #[test]
    fn test_tie_break_prefers_earlier_review() {
        let reviews = vec![
            tagged(&["Quiet"]),
            tagged(&["Ramp"]),
            tagged(&["Ramp", "Quiet"]),
        ];
        let summary = compute_facility_summary(&reviews);
        assert_eq!(summary.common_access_tags, vec!["Quiet", "Ramp"]);
    }

    #[test]
    fn test_later_tag_overtakes_on_frequency() {
        let reviews = vec![
            tagged(&["Quiet", "Ramp", "Elevator", "Spacious"]),
            tagged(&["Spacious"]),
        ];
        let summary = compute_facility_summary(&reviews);
        assert_eq!(summary.common_access_tags, vec!["Spacious", "Quiet", "Ramp"]);
    }

    #[test]
    fn test_duplicate_tag_in_one_review_counts_each_occurrence() {
        let reviews = vec![tagged(&["Quiet", "Quiet"]), tagged(&["Ramp"])];
        let frequencies = tag_frequencies(&reviews);
        assert_eq!(
            frequencies,
            vec![("Quiet".to_string(), 2), ("Ramp".to_string(), 1)]
        );

        let summary = compute_facility_summary(&reviews);
        assert_eq!(summary.access_tags, vec!["Quiet", "Ramp"]);
    }

    #[test]
    fn test_idempotent() {
        let reviews = vec![
            create_review(Some(3.0), Some(2.0), Some(1.0), &["Ramp", "Quiet"]),
            create_review(Some(5.0), None, Some(4.0), &["Ramp", "Elevator"]),
        ];
        assert_eq!(compute_facility_summary(&reviews), compute_facility_summary(&reviews));
    }

    #[test]
    fn test_review_count_grows_by_one() {
        let mut reviews = Vec::new();
        for i in 0..6 {
            let before = compute_facility_summary(&reviews).review_count;
            reviews.push(tagged(&[if i % 2 == 0 { "Ramp" } else { "Quiet" }]));
            let after = compute_facility_summary(&reviews);
            assert_eq!(after.review_count, before + 1);
            assert_subset(&after);
        }
    }

    #[test]
    fn test_input_not_mutated() {
        let reviews = vec![tagged(&["Quiet"]), tagged(&["Ramp", "Ramp"])];
        let snapshot = reviews.clone();
        let _ = compute_facility_summary(&reviews);
        assert_eq!(reviews, snapshot);
    }

    #[test]
    fn test_validate_accepts_complete_review() {
        let review = NewReview {
            physical_rating: Some(5.0),
            sensory_rating: Some(1.0),
            cognitive_rating: Some(3.5),
            access_tags: vec!["Ramp".to_string()],
            ..NewReview::default()
        };
        assert!(validate_review(&review, &ValidationConfig::default()).is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let config = ValidationConfig::default();
        let mut review = NewReview {
            physical_rating: Some(5.5),
            sensory_rating: Some(1.0),
            cognitive_rating: Some(1.0),
            ..NewReview::default()
        };
        assert_eq!(
            validate_review(&review, &config),
            Err(ValidationError::InvalidRating {
                category: TagCategory::Physical,
                value: 5.5
            })
        );

        review.physical_rating = Some(2.0);
        review.cognitive_rating = Some(-1.0);
        assert!(matches!(
            validate_review(&review, &config),
            Err(ValidationError::InvalidRating {
                category: TagCategory::Cognitive,
                ..
            })
        ));

        review.cognitive_rating = Some(f64::NAN);
        assert!(validate_review(&review, &config).is_err());
    }

    #[test]
    fn test_validate_missing_ratings() {
        let review = NewReview {
            physical_rating: Some(4.0),
            sensory_rating: Some(0.0),
            cognitive_rating: None,
            ..NewReview::default()
        };

        let strict = ValidationConfig::default();
        assert_eq!(
            validate_review(&review, &strict),
            Err(ValidationError::MissingRating {
                category: TagCategory::Sensory
            })
        );

        let lenient = ValidationConfig {
            require_all_ratings: false,
        };
        assert!(validate_review(&review, &lenient).is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_tag() {
        let review = NewReview {
            physical_rating: Some(4.0),
            sensory_rating: Some(4.0),
            cognitive_rating: Some(4.0),
            access_tags: vec!["Ramp".to_string(), "  ".to_string()],
            ..NewReview::default()
        };
        assert_eq!(
            validate_review(&review, &ValidationConfig::default()),
            Err(ValidationError::EmptyTag)
        );
    }
}

//! Facility report generation.
//!
//! Renders a facility's accessibility summary as Markdown or JSON.

use crate::catalog::category_of;
use crate::models::{Facility, Review, TagCategory};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A facility with its current summary and a few recent reviews.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FacilityReport {
    pub facility: Facility,
    /// Catalog category of each common tag; `None` for unknown tags.
    pub common_tag_categories: Vec<(String, Option<TagCategory>)>,
    pub recent_reviews: Vec<Review>,
    pub generated_at: DateTime<Utc>,
}

impl FacilityReport {
    /// Build a report from a facility and its reviews, newest first.
    pub fn new(facility: Facility, reviews_newest_first: Vec<Review>, recent_limit: usize) -> Self {
        let common_tag_categories = facility
            .summary
            .common_access_tags
            .iter()
            .map(|tag| (tag.clone(), category_of(tag)))
            .collect();

        let mut recent_reviews = reviews_newest_first;
        recent_reviews.truncate(recent_limit);

        Self {
            facility,
            common_tag_categories,
            recent_reviews,
            generated_at: Utc::now(),
        }
    }
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &FacilityReport) -> String {
    let mut output = String::new();

    output.push_str(&format!("# {}\n\n", report.facility.name));
    output.push_str(&generate_details_section(&report.facility));
    output.push_str(&generate_ratings_section(&report.facility));
    output.push_str(&generate_tags_section(report));
    output.push_str(&generate_reviews_section(&report.recent_reviews));
    output.push_str(&generate_footer(report.generated_at));

    output
}

fn generate_details_section(facility: &Facility) -> String {
    let mut section = String::new();

    if !facility.address.is_empty() {
        section.push_str(&format!("- **Address:** {}\n", facility.address));
    }
    section.push_str(&format!(
        "- **Location:** {:.5}, {:.5}\n",
        facility.location.latitude, facility.location.longitude
    ));
    section.push_str(&format!("- **Reviews:** {}\n", facility.summary.review_count));
    section.push('\n');

    section
}

/// Generate the ratings table.
fn generate_ratings_section(facility: &Facility) -> String {
    let mut section = String::new();

    section.push_str("## Accessibility Ratings\n\n");

    if facility.summary.review_count == 0 {
        section.push_str("No reviews yet.\n\n");
        return section;
    }

    section.push_str("| Category | Rating | |\n");
    section.push_str("|:---|:---:|:---|\n");
    for category in TagCategory::ALL {
        let rating = facility.summary.rating_for(category);
        section.push_str(&format!(
            "| {} {} | {:.1} | {} |\n",
            category.emoji(),
            category,
            rating,
            stars(rating)
        ));
    }
    section.push('\n');

    section
}

fn generate_tags_section(report: &FacilityReport) -> String {
    let summary = &report.facility.summary;
    if summary.access_tags.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Common Access Tags\n\n");
    for (tag, category) in &report.common_tag_categories {
        match category {
            Some(category) => {
                section.push_str(&format!("- {} {} *({})*\n", category.emoji(), tag, category))
            }
            None => section.push_str(&format!("- {}\n", tag)),
        }
    }
    section.push('\n');

    section.push_str("## All Access Tags\n\n");
    section.push_str(&summary.access_tags.join(", "));
    section.push_str("\n\n");

    section
}

fn generate_reviews_section(reviews: &[Review]) -> String {
    if reviews.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Recent Reviews\n\n");
    for review in reviews {
        let author = if review.is_anonymous || review.user_id.is_empty() {
            "Anonymous"
        } else {
            review.user_id.as_str()
        };

        section.push_str(&format!(
            "### {} - {}\n\n",
            author,
            review.created_at.format("%Y-%m-%d")
        ));
        section.push_str(&format!(
            "Physical {:.1} | Sensory {:.1} | Cognitive {:.1}\n\n",
            review.rating_for(TagCategory::Physical),
            review.rating_for(TagCategory::Sensory),
            review.rating_for(TagCategory::Cognitive),
        ));
        if !review.comment.is_empty() {
            section.push_str(&format!("> {}\n\n", review.comment));
        }
        if !review.access_tags.is_empty() {
            section.push_str(&format!("*Tags: {}*\n\n", review.access_tags.join(", ")));
        }
    }

    section
}

fn generate_footer(generated_at: DateTime<Utc>) -> String {
    format!(
        "---\n\n*Generated {}*\n",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    )
}

/// Render a rating as five stars, rounding to the nearest whole star.
fn stars(rating: f64) -> String {
    let filled = (rating.round().clamp(0.0, 5.0)) as usize;
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

/// Generate a JSON report.
pub fn generate_json_report(report: &FacilityReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

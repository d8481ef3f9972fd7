//! Built-in access tag catalog.
//!
//! Reference data describing the accessibility features reviewers can tag.
//! Aggregation treats tag names as opaque strings and never consults this
//! catalog; it is used for listing, seeding and labelling reports.

use crate::error::StoreError;
use crate::models::{AccessTag, TagCategory};
use crate::store::TagStore;
use tracing::{debug, info};

use crate::models::TagCategory::{Cognitive, Physical, Sensory};

/// (name, description, category, icon)
const BUILTIN_TAGS: &[(&str, &str, TagCategory, &str)] = &[
    (
        "Accessible Door Width",
        "Doorways wide enough to accommodate wheelchairs and mobility devices",
        Physical,
        "door",
    ),
    (
        "Accessible Parking",
        "Designated parking spaces for people with disabilities",
        Physical,
        "car",
    ),
    (
        "Accessible Seating",
        "Seating options designed for wheelchair users and people with mobility needs",
        Physical,
        "chair",
    ),
    ("Accessible Stalls", "Wheelchair-accessible bathroom stalls", Physical, "toilet"),
    (
        "Accessible Washroom",
        "Bathroom facilities designed for wheelchair users and people with mobility needs",
        Physical,
        "bathroom",
    ),
    ("Alternative Entrance", "An accessible alternative to the main entrance", Physical, "door"),
    (
        "Automatic Door",
        "Doors that open automatically with motion sensors or buttons",
        Physical,
        "door",
    ),
    ("Barrier Free Entrance", "Entrance without steps or barriers", Physical, "door"),
    (
        "Changing Tables",
        "Adult-sized changing tables for people with disabilities",
        Physical,
        "table",
    ),
    ("Covered Entrance", "Entrance with overhead protection from weather", Physical, "umbrella"),
    ("Covered Parking", "Parking area with overhead protection from weather", Physical, "car"),
    ("Curb Ramp", "Ramp connecting sidewalk to street level", Physical, "ramp"),
    (
        "Designated Aisle Seating",
        "Seats with extra legroom or space for mobility devices",
        Physical,
        "chair",
    ),
    (
        "Electric Vehicle Parking",
        "Designated parking spaces for electric vehicles",
        Physical,
        "car",
    ),
    ("Elevator", "Vertical transportation between floors", Physical, "elevator"),
    (
        "Frequent Seating / Rest Points",
        "Regularly spaced seating areas for rest breaks",
        Physical,
        "bench",
    ),
    ("Garage Parking", "Indoor parking facility", Physical, "car"),
    (
        "Gender Neutral Washroom",
        "Bathroom facilities available to all genders",
        Physical,
        "bathroom",
    ),
    ("Handicap Accessible Door", "Door designed for wheelchair users", Physical, "door"),
    ("Handrails", "Support rails along walls or stairs", Physical, "handrail"),
    (
        "Lowered Changing Tables",
        "Changing tables at a height accessible to wheelchair users",
        Physical,
        "table",
    ),
    (
        "Lowered Counters",
        "Service counters at a height accessible to wheelchair users",
        Physical,
        "counter",
    ),
    ("Lowered Sinks", "Sinks at a height accessible to wheelchair users", Physical, "sink"),
    (
        "Motion Sensor Lighting",
        "Lights that activate automatically with movement",
        Physical,
        "light",
    ),
    ("Outdoor Access Only", "Facility only accessible from outside", Physical, "door"),
    ("Ramp", "Sloped surface for wheelchair access", Physical, "ramp"),
    ("Service Animal Friendly", "Facility welcomes service animals", Physical, "paw"),
    ("Single Use Washroom", "Private bathroom for individual use", Physical, "bathroom"),
    ("Spacious", "Ample space for wheelchair movement", Physical, "space"),
    ("Valet Parking", "Parking service available", Physical, "car"),
    ("Well lit parking", "Parking area with good lighting", Physical, "light"),
    (
        "Well-Lit Path to Entrance",
        "Well-illuminated path leading to the entrance",
        Physical,
        "path",
    ),
    ("Wheelchair Accessible Door", "Door designed for wheelchair users", Physical, "door"),
    (
        "Wheelchair Accessible Phone",
        "Phone at a height accessible to wheelchair users",
        Physical,
        "phone",
    ),
    ("Wheelchair Ramp", "Ramp specifically designed for wheelchair access", Physical, "ramp"),
    ("Wide hallway", "Hallways wide enough for wheelchair movement", Physical, "hallway"),
    ("WiFi Access", "Wireless internet access available", Physical, "wifi"),
    ("Adjustable Lighting", "Lighting that can be adjusted for different needs", Sensory, "light"),
    ("Audio Guidance", "Audio assistance for navigation", Sensory, "audio"),
    ("Auditory Signals", "Sound-based alerts and notifications", Sensory, "sound"),
    ("Braille keyboard", "Keyboard with Braille labels", Sensory, "keyboard"),
    ("Braille Menu", "Menu available in Braille format", Sensory, "menu"),
    ("Braille signs", "Signage with Braille text", Sensory, "sign"),
    ("Hearing Loop", "Induction loop system for hearing aid users", Sensory, "sound"),
    (
        "High-Contrast Signage",
        "Signs with high contrast colors for better visibility",
        Sensory,
        "sign",
    ),
    ("Large Print", "Materials available in large print format", Sensory, "text"),
    ("Lighting - Bright", "Well-lit environment with bright lighting", Sensory, "light"),
    ("Lighting - Dim", "Environment with reduced lighting", Sensory, "light"),
    ("Quiet", "Low-noise environment", Sensory, "sound"),
    ("Scent Free", "Environment free of strong scents", Sensory, "nose"),
    ("Screen Reader", "Screen reading software available", Sensory, "screen"),
    ("Sensory Friendly", "Environment designed to be sensory-friendly", Sensory, "sensory"),
    ("Sensory Room", "Dedicated space for sensory regulation", Sensory, "room"),
    ("Shaded Areas", "Areas with protection from bright light", Sensory, "shade"),
    ("Sign language", "Sign language interpretation available", Sensory, "sign"),
    ("Tactile Pavement", "Textured ground surface for navigation", Sensory, "ground"),
    ("Tactile Signs", "Signs with raised or textured elements", Sensory, "sign"),
    ("Tactile Surfaces", "Surfaces with distinct textures for navigation", Sensory, "surface"),
    ("Textured/Visual Wayfinding", "Visual and tactile navigation aids", Sensory, "navigation"),
    ("Visual Alerts", "Visual notifications and warnings", Sensory, "alert"),
    ("Assistive Technology", "Technology to support cognitive accessibility", Cognitive, "tech"),
    ("Clear Signage", "Easy-to-read and understand signs", Cognitive, "sign"),
    ("Easy To Read Signs", "Signs with simple, clear language", Cognitive, "sign"),
    ("Extended Service Hours", "Longer operating hours for flexibility", Cognitive, "clock"),
    ("Flexible Hours", "Adaptable scheduling options", Cognitive, "clock"),
    ("Low Distraction Zones", "Areas designed to minimize distractions", Cognitive, "zone"),
    ("Low Stimulation Zones", "Areas with reduced sensory stimulation", Cognitive, "zone"),
    ("Memory Support", "Features to assist with memory", Cognitive, "brain"),
    ("Non/Low-Glare Lighting", "Lighting designed to reduce glare", Cognitive, "light"),
    ("Picture Menus", "Menus with visual representations", Cognitive, "menu"),
    ("Quiet Areas", "Spaces designed for reduced noise", Cognitive, "sound"),
    ("Simple Instructions", "Clear, straightforward directions", Cognitive, "instructions"),
    ("Simplified Payment Options", "Straightforward payment processes", Cognitive, "payment"),
    ("Step-By-Step Guidance", "Clear, sequential instructions", Cognitive, "steps"),
    ("Visual Support", "Visual aids to support understanding", Cognitive, "visual"),
    ("Visual and Auditory Landmarks", "Distinctive features for navigation", Cognitive, "landmark"),
    ("Visual Schedules", "Visual timetables and schedules", Cognitive, "schedule"),
    ("Back Support Seating", "Seating with proper back support", Physical, "chair"),
];

/// Derive a stable catalog id from a tag name.
fn tag_id(name: &str) -> String {
    let mut id = String::with_capacity(name.len());
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            id.push(ch.to_ascii_lowercase());
        } else if !id.ends_with('-') {
            id.push('-');
        }
    }
    id.trim_matches('-').to_string()
}

/// All built-in access tags.
pub fn default_catalog() -> Vec<AccessTag> {
    BUILTIN_TAGS
        .iter()
        .map(|(name, description, category, icon)| AccessTag {
            id: tag_id(name),
            name: name.to_string(),
            description: description.to_string(),
            icon: icon.to_string(),
            category: Some(*category),
        })
        .collect()
}

/// Category of a built-in tag, matched by exact name.
pub fn category_of(name: &str) -> Option<TagCategory> {
    BUILTIN_TAGS
        .iter()
        .find(|(tag, _, _, _)| *tag == name)
        .map(|(_, _, category, _)| *category)
}

/// Tags belonging to one category, in catalog order.
pub fn tags_in(tags: &[AccessTag], category: TagCategory) -> Vec<&AccessTag> {
    tags.iter()
        .filter(|t| t.category == Some(category))
        .collect()
}

/// Insert every built-in tag the store does not know by name yet.
///
/// Returns the number of tags added.
pub async fn seed<S: TagStore + ?Sized>(store: &S) -> Result<usize, StoreError> {
    let existing = store.list_access_tags().await?;
    let mut added = 0;

    for tag in default_catalog() {
        if existing.iter().any(|t| t.name == tag.name) {
            debug!("Tag already present: {}", tag.name);
            continue;
        }
        store.add_access_tag(tag).await?;
        added += 1;
    }

    info!("Seeded {} access tags", added);
    Ok(added)
}

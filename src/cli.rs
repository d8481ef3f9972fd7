//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::{Location, NewReview, TagCategory};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// access-metrics - crowd-sourced accessibility ratings for facilities
///
/// Record reviews rating a facility's physical, sensory and cognitive
/// accessibility, and keep each facility's averages and common access
/// tags up to date.
///
/// Examples:
///   access-metrics add-facility cafe-1 --name "Corner Cafe" --address "1 Main St"
///   access-metrics add-review cafe-1 --user u1 --physical 4 --sensory 3 --cognitive 5 --tags Ramp,Elevator
///   access-metrics show cafe-1 --format json
///   access-metrics recalculate --all
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to configuration file
    ///
    /// If not specified, looks for .access-metrics.toml in the current directory
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// JSON data file used as the document store
    #[arg(long, global = true, value_name = "FILE", env = "ACCESS_METRICS_DATA")]
    pub data: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Accept reviews that leave some categories unrated
    #[arg(long, global = true)]
    pub allow_partial_ratings: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Generate a default .access-metrics.toml configuration file
    InitConfig,

    /// Load the built-in access tag catalog into the store
    SeedTags,

    /// List known access tags
    Tags {
        /// Only list tags of this category
        #[arg(long, value_name = "CATEGORY")]
        category: Option<CategoryArg>,
    },

    /// Register a facility
    AddFacility {
        /// Facility identifier (for example a places id)
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        address: String,
        #[arg(long, default_value = "0.0", allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, default_value = "0.0", allow_negative_numbers = true)]
        lon: f64,
        #[arg(long, value_name = "ID")]
        place_id: Option<String>,
    },

    /// Submit a review and refresh the facility summary
    AddReview(ReviewArgs),

    /// Recompute facility summaries from their reviews
    Recalculate {
        /// Facility to recompute
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        facility_id: Option<String>,

        /// Recompute every facility
        #[arg(long)]
        all: bool,
    },

    /// Print a facility report
    Show {
        facility_id: String,

        /// Output format (markdown, json); defaults to the config setting
        #[arg(long, value_name = "FORMAT")]
        format: Option<OutputFormat>,

        /// Write the report to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// List a facility's reviews, newest first
    Reviews { facility_id: String },

    /// Find facilities whose name starts with the query
    Search { query: String },

    /// List every review written by a user, newest first
    UserReviews { user_id: String },

    /// Look up the facility registered under an external place id
    Place { place_id: String },
}

/// Arguments of `add-review`.
#[derive(clap::Args, Debug, Clone)]
pub struct ReviewArgs {
    /// Facility being reviewed
    pub facility_id: String,

    /// Reviewing user
    #[arg(long, default_value = "")]
    pub user: String,

    /// Physical accessibility rating (0-5)
    #[arg(long, allow_negative_numbers = true)]
    pub physical: Option<f64>,

    /// Sensory accessibility rating (0-5)
    #[arg(long, allow_negative_numbers = true)]
    pub sensory: Option<f64>,

    /// Cognitive accessibility rating (0-5)
    #[arg(long, allow_negative_numbers = true)]
    pub cognitive: Option<f64>,

    /// Access tags (comma-separated)
    ///
    /// Example: --tags "Ramp,Braille Menu"
    #[arg(long, value_name = "TAGS", value_delimiter = ',')]
    pub tags: Vec<String>,

    #[arg(long, default_value = "")]
    pub comment: String,

    #[arg(long)]
    pub anonymous: bool,

    /// Name used when the facility is not registered yet
    #[arg(long, default_value = "")]
    pub facility_name: String,

    /// Address used when the facility is not registered yet
    #[arg(long, default_value = "")]
    pub facility_address: String,
}

impl ReviewArgs {
    /// Build the review submission from the arguments.
    pub fn to_new_review(&self) -> NewReview {
        NewReview {
            facility_id: self.facility_id.clone(),
            user_id: self.user.clone(),
            facility_name: self.facility_name.clone(),
            facility_address: self.facility_address.clone(),
            facility_location: Location::default(),
            comment: self.comment.clone(),
            physical_rating: self.physical,
            sensory_rating: self.sensory,
            cognitive_rating: self.cognitive,
            access_tags: self.tags.iter().map(|t| t.trim().to_string()).collect(),
            is_anonymous: self.anonymous,
        }
    }
}

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

/// Tag category filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CategoryArg {
    Physical,
    Sensory,
    Cognitive,
}

impl From<CategoryArg> for TagCategory {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Physical => TagCategory::Physical,
            CategoryArg::Sensory => TagCategory::Sensory,
            CategoryArg::Cognitive => TagCategory::Cognitive,
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        match &self.command {
            Command::AddFacility { id, name, lat, lon, .. } => {
                if id.trim().is_empty() {
                    return Err("Facility id must not be empty".to_string());
                }
                if name.trim().is_empty() {
                    return Err("Facility name must not be empty".to_string());
                }
                if !(-90.0..=90.0).contains(lat) {
                    return Err("Latitude must be between -90 and 90".to_string());
                }
                if !(-180.0..=180.0).contains(lon) {
                    return Err("Longitude must be between -180 and 180".to_string());
                }
            }
            Command::AddReview(review) => {
                if review.facility_id.trim().is_empty() {
                    return Err("Facility id must not be empty".to_string());
                }
            }
            Command::Search { query } => {
                if query.trim().is_empty() {
                    return Err("Search query must not be empty".to_string());
                }
            }
            Command::UserReviews { user_id } => {
                if user_id.trim().is_empty() {
                    return Err("User id must not be empty".to_string());
                }
            }
            _ => {}
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `--quiet` wins over both `--verbose` and a config file asking for
    /// verbose output.
    pub fn log_level(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args(command: Command) -> Args {
        Args {
            config: None,
            data: None,
            verbose: false,
            quiet: false,
            allow_partial_ratings: false,
            command,
        }
    }

    #[test]
    fn test_parse_add_review() {
        let args = Args::try_parse_from([
            "access-metrics",
            "add-review",
            "cafe-1",
            "--physical",
            "4",
            "--sensory",
            "3.5",
            "--tags",
            "Ramp, Braille Menu",
        ])
        .unwrap();

        match args.command {
            Command::AddReview(review) => {
                let new_review = review.to_new_review();
                assert_eq!(new_review.facility_id, "cafe-1");
                assert_eq!(new_review.physical_rating, Some(4.0));
                assert_eq!(new_review.sensory_rating, Some(3.5));
                assert_eq!(new_review.cognitive_rating, None);
                assert_eq!(new_review.access_tags, vec!["Ramp", "Braille Menu"]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_recalculate_requires_target() {
        assert!(Args::try_parse_from(["access-metrics", "recalculate"]).is_err());
        assert!(Args::try_parse_from(["access-metrics", "recalculate", "--all"]).is_ok());
        assert!(Args::try_parse_from(["access-metrics", "recalculate", "f1", "--all"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = Args::try_parse_from(["access-metrics", "show", "f1", "--verbose", "--format", "json"])
            .unwrap();
        assert!(args.verbose);
        assert!(matches!(
            args.command,
            Command::Show {
                format: Some(OutputFormat::Json),
                ..
            }
        ));
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args(Command::SeedTags);
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_facility_coordinates() {
        let args = make_args(Command::AddFacility {
            id: "f1".to_string(),
            name: "Library".to_string(),
            address: String::new(),
            lat: 95.0,
            lon: 0.0,
            place_id: None,
        });
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args(Command::SeedTags);
        assert_eq!(args.log_level(false), tracing::Level::INFO);
        assert_eq!(args.log_level(true), tracing::Level::DEBUG);

        args.verbose = true;
        assert_eq!(args.log_level(false), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(true), tracing::Level::ERROR);
    }

    #[test]
    fn test_parse_lookup_commands() {
        let args = Args::try_parse_from(["access-metrics", "user-reviews", "alex"]).unwrap();
        assert!(matches!(args.command, Command::UserReviews { ref user_id } if user_id == "alex"));

        let args = Args::try_parse_from(["access-metrics", "place", "ChIJ-1"]).unwrap();
        assert!(matches!(args.command, Command::Place { ref place_id } if place_id == "ChIJ-1"));

        let args = make_args(Command::UserReviews {
            user_id: "  ".to_string(),
        });
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_category_arg_conversion() {
        assert_eq!(TagCategory::from(CategoryArg::Sensory), TagCategory::Sensory);
    }
}

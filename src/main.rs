//! access-metrics - crowd-sourced facility accessibility ratings
//!
//! A CLI tool that records accessibility reviews of facilities and keeps
//! each facility's average ratings and common access tags up to date.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (invalid review, unknown facility, store failure, etc.)

mod analysis;
mod catalog;
mod cli;
mod config;
mod error;
mod models;
mod report;
mod service;
mod store;

use anyhow::{Context, Result};
use cli::{Args, Command, OutputFormat, ReviewArgs};
use config::{Config, CONFIG_FILE_NAME};
use indicatif::{ProgressBar, ProgressStyle};
use models::{Facility, Location, TagCategory};
use service::{ReviewService, ServiceConfig};
use std::path::PathBuf;
use std::sync::Arc;
use store::{FacilityStore, JsonStore, TagStore};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle init-config early (no logging needed)
    if matches!(args.command, Command::InitConfig) {
        return handle_init_config();
    }

    // Configuration comes first so `[general] verbose` can raise the log level
    let mut config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    // Initialize logging
    init_logging(args.log_level(config.general.verbose));

    debug!("access-metrics v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    debug!("Configuration: {:?}", config);

    if let Err(e) = run(args, config).await {
        error!("Command failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle init-config: generate a default .access-metrics.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to change the data file, validation and report settings.");
    Ok(())
}

/// Initialize logging at the given level.
fn init_logging(level: tracing::Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Dispatch a subcommand against the configured store.
async fn run(args: Args, config: Config) -> Result<()> {
    let store = JsonStore::open(&config.store.data_file).with_context(|| {
        format!(
            "Failed to open data file {}",
            config.store.data_file.display()
        )
    })?;
    if let Some(path) = store.path() {
        info!("Using data file: {}", path.display());
    }

    let service = ReviewService::new(
        Arc::new(store),
        ServiceConfig {
            max_write_retries: config.store.max_write_retries,
            validation: config.validation.clone(),
        },
    );

    match args.command {
        Command::InitConfig => Ok(()),
        Command::SeedTags => {
            let added = catalog::seed(service.store()).await?;
            println!("✅ Added {} access tags to the catalog.", added);
            Ok(())
        }
        Command::Tags { category } => handle_tags(&service, category.map(Into::into)).await,
        Command::AddFacility {
            id,
            name,
            address,
            lat,
            lon,
            place_id,
        } => {
            let mut facility = Facility::new(id.clone(), name, address);
            facility.location = Location {
                latitude: lat,
                longitude: lon,
            };
            facility.place_id = place_id;
            service.create_facility(facility).await?;
            println!("✅ Facility {} created.", id);
            Ok(())
        }
        Command::AddReview(review_args) => handle_add_review(&service, &review_args).await,
        Command::Recalculate { facility_id, all } => {
            if all {
                handle_recalculate_all(&service, args.quiet).await
            } else {
                let facility_id = facility_id.unwrap_or_default();
                let summary = service.recalculate(&facility_id).await?;
                println!(
                    "✅ {}: {} reviews | physical {:.1} | sensory {:.1} | cognitive {:.1}",
                    facility_id,
                    summary.review_count,
                    summary.physical_rating,
                    summary.sensory_rating,
                    summary.cognitive_rating
                );
                Ok(())
            }
        }
        Command::Show {
            facility_id,
            format,
            output,
        } => {
            let format = format.unwrap_or(config.report.format);
            handle_show(&service, &facility_id, format, output, config.report.recent_reviews).await
        }
        Command::Reviews { facility_id } => {
            let reviews = service.facility_reviews(&facility_id).await?;
            if reviews.is_empty() {
                println!("No reviews for {}.", facility_id);
            }
            for review in reviews {
                println!(
                    "{}  {}  P{:.1} S{:.1} C{:.1}  [{}]  {}",
                    review.created_at.format("%Y-%m-%d %H:%M"),
                    review.id,
                    review.rating_for(TagCategory::Physical),
                    review.rating_for(TagCategory::Sensory),
                    review.rating_for(TagCategory::Cognitive),
                    review.access_tags.join(", "),
                    review.comment
                );
            }
            Ok(())
        }
        Command::Search { query } => {
            let facilities = service.search_facilities(&query).await?;
            if facilities.is_empty() {
                println!("No facilities match \"{}\".", query);
            }
            for facility in facilities {
                println!(
                    "{}  {}  ({} reviews)  {}",
                    facility.id, facility.name, facility.summary.review_count, facility.address
                );
            }
            Ok(())
        }
        Command::UserReviews { user_id } => {
            let reviews = service.user_reviews(&user_id).await?;
            if reviews.is_empty() {
                println!("No reviews by {}.", user_id);
            }
            for review in reviews {
                println!(
                    "{}  {}  {}  P{:.1} S{:.1} C{:.1}  {}",
                    review.created_at.format("%Y-%m-%d %H:%M"),
                    review.facility_id,
                    review.facility_name,
                    review.rating_for(TagCategory::Physical),
                    review.rating_for(TagCategory::Sensory),
                    review.rating_for(TagCategory::Cognitive),
                    review.comment
                );
            }
            Ok(())
        }
        Command::Place { place_id } => {
            let facility = service
                .facility_by_place_id(&place_id)
                .await?
                .ok_or_else(|| anyhow::anyhow!("No facility registered for place {}", place_id))?;
            println!(
                "{}  {}  ({} reviews)  {}",
                facility.id, facility.name, facility.summary.review_count, facility.address
            );
            Ok(())
        }
    }
}

async fn handle_tags(service: &ReviewService<JsonStore>, category: Option<TagCategory>) -> Result<()> {
    let mut tags = service.store().list_access_tags().await?;
    if tags.is_empty() {
        debug!("Store has no access tags, listing the built-in catalog");
        tags = catalog::default_catalog();
    }

    let categories: Vec<TagCategory> = match category {
        Some(c) => vec![c],
        None => TagCategory::ALL.to_vec(),
    };

    for category in categories {
        println!("\n{} {}", category.emoji(), category);
        for tag in catalog::tags_in(&tags, category) {
            println!("   {:<32} {}", tag.name, tag.description);
        }
    }

    Ok(())
}

async fn handle_add_review(service: &ReviewService<JsonStore>, args: &ReviewArgs) -> Result<()> {
    let review = args.to_new_review();

    for tag in &review.access_tags {
        if catalog::category_of(tag).is_none() {
            warn!("Tag \"{}\" is not in the built-in catalog", tag);
        }
    }

    let submitted = service
        .add_review(&args.facility_id, review)
        .await
        .with_context(|| format!("Could not submit review for {}", args.facility_id))?;

    println!("✅ Review {} submitted.", submitted.review_id);
    match submitted.summary {
        Some(summary) => {
            println!(
                "   {} now has {} reviews: physical {:.1} | sensory {:.1} | cognitive {:.1}",
                args.facility_id,
                summary.review_count,
                summary.physical_rating,
                summary.sensory_rating,
                summary.cognitive_rating
            );
            if !summary.common_access_tags.is_empty() {
                println!("   Common tags: {}", summary.common_access_tags.join(", "));
            }
        }
        None => {
            println!(
                "⚠️  The summary of {} was not updated. Do not resubmit; run `access-metrics recalculate {}` instead.",
                args.facility_id, args.facility_id
            );
        }
    }

    Ok(())
}

async fn handle_recalculate_all(service: &ReviewService<JsonStore>, quiet: bool) -> Result<()> {
    let progress = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(0)
    };
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let results = service
        .recalculate_all(|facility_id, finished, total| {
            progress.set_length(total as u64);
            progress.set_position(finished as u64);
            progress.set_message(facility_id.to_string());
        })
        .await?;
    progress.finish_and_clear();

    let mut failed = 0;
    for (facility_id, result) in &results {
        if let Err(e) = result {
            failed += 1;
            warn!("Failed to recalculate {}: {}", facility_id, e);
        }
    }

    println!(
        "✅ Recalculated {} facilities ({} failed).",
        results.len() - failed,
        failed
    );

    if failed > 0 {
        anyhow::bail!("{} facilities could not be recalculated", failed);
    }
    Ok(())
}

async fn handle_show(
    service: &ReviewService<JsonStore>,
    facility_id: &str,
    format: OutputFormat,
    output: Option<PathBuf>,
    recent_reviews: usize,
) -> Result<()> {
    let facility = service
        .store()
        .get_facility(facility_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Facility not found: {}", facility_id))?;
    let reviews = service.facility_reviews(facility_id).await?;

    let report = report::FacilityReport::new(facility, reviews, recent_reviews);
    let content = match format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report),
    };

    match output {
        Some(path) => {
            std::fs::write(&path, &content)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            println!("✅ Report saved to: {}", path.display());
        }
        None => println!("{}", content),
    }

    Ok(())
}

/// Load configuration from file or use defaults.
///
/// Runs before logging is set up, so problems are reported on stderr.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok(config),
        Ok(None) => Ok(Config::default()),
        Err(e) => {
            eprintln!("⚠️  Failed to load {}: {:#}", CONFIG_FILE_NAME, e);
            Ok(Config::default())
        }
    }
}

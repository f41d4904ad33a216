//! trip-planner-rs: turns free-form LLM travel plans into validated, enriched,
//! printable trip records.
//!
//! The model's reply is sanitized into JSON, normalized into a [`Trip`] that
//! always has every field, enriched with coordinates and an image, then
//! rendered to a paginated PDF or annotated with search links for display.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use trip_planner_rs::{render, DirectorySink, PlannerConfig, TripPlanner, TripRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PlannerConfig::from_env()?;
//!     let planner = TripPlanner::from_config(&config)?;
//!
//!     let request = TripRequest::new("Lisbon, Portugal", 3).with_preferences(["food"]);
//!     let trip = planner.generate(&request).await?;
//!
//!     let location = render::export(&trip, &DirectorySink::new(".")).await?;
//!     println!("{} -> {}", trip.summary, location);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod pipeline;
pub mod render;
pub mod schemas;
pub mod services;
pub mod types;

pub use crate::core::TripPlanner;
pub use config::PlannerConfig;
pub use error::{PlannerError, Result};
pub use pipeline::{
    annotate_itinerary, interpret, normalize, normalize_response, sanitize, Enricher,
    EnrichmentSummary, Linkifier, NormalizationReport, ParseFailure, ParseResult,
};
pub use render::{DirectorySink, DocumentSink, RenderedDocument};
pub use schemas::{CompletionSchema, SchemaHandle};
pub use services::{GenerationSource, GeocodeResolver, ImageResult, ImageSearch};
pub use types::{Accommodation, ActivityEntry, Coordinates, DayPlan, Season, Trip, TripRequest};

#[cfg(feature = "cli")]
pub mod cli;

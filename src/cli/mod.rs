use crate::{
    annotate_itinerary,
    render::{self, DirectorySink},
    schemas::decode_strict,
    PlannerConfig, Trip, TripPlanner, TripRequest,
};
use anyhow::Context;
use chrono::NaiveDate;
use clap::{Arg, ArgAction, Command};
use std::fmt::Write as _;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// CLI entry point for the trip-planner tool
pub async fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let matches = Command::new("trip-planner")
        .version("0.1.0")
        .about("Generate, enrich and export a travel itinerary")
        .arg(
            Arg::new("destination")
                .help("Where the trip goes (e.g. \"Paris, France\")")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("start-date")
                .short('s')
                .long("start-date")
                .value_name("YYYY-MM-DD")
                .help("First day of the trip"),
        )
        .arg(
            Arg::new("days")
                .short('d')
                .long("days")
                .value_name("COUNT")
                .help("Number of days to plan")
                .default_value("3"),
        )
        .arg(
            Arg::new("travelers")
                .long("travelers")
                .value_name("COUNT")
                .help("Number of travelers"),
        )
        .arg(
            Arg::new("budget")
                .short('b')
                .long("budget")
                .value_name("AMOUNT")
                .help("Total budget for the trip"),
        )
        .arg(
            Arg::new("currency")
                .long("currency")
                .value_name("CODE")
                .help("Currency of the budget (default USD)"),
        )
        .arg(
            Arg::new("preference")
                .short('p')
                .long("preference")
                .value_name("TAG")
                .action(ArgAction::Append)
                .help("Preference tag, repeatable (e.g. -p food -p museums)"),
        )
        .arg(
            Arg::new("refine")
                .short('r')
                .long("refine")
                .value_name("FEEDBACK")
                .action(ArgAction::Append)
                .help("Refinement feedback applied after generation, repeatable"),
        )
        .arg(
            Arg::new("from-file")
                .short('f')
                .long("from-file")
                .value_name("PATH")
                .help("Load a saved trip JSON instead of generating one"),
        )
        .arg(
            Arg::new("output-dir")
                .short('o')
                .long("output-dir")
                .value_name("DIR")
                .help("Directory the PDF is written to")
                .default_value("."),
        )
        .arg(
            Arg::new("model")
                .short('m')
                .long("model")
                .value_name("MODEL")
                .help("Model to generate with (or set MODEL env var)"),
        )
        .arg(
            Arg::new("base-url")
                .short('u')
                .long("base-url")
                .value_name("URL")
                .help("OpenAI-compatible base URL (or set OPENAI_BASE_URL / OPENROUTER_BASE_URL)"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .help("Print the trip record as JSON instead of a text summary")
                .conflicts_with("html"),
        )
        .arg(
            Arg::new("html")
                .long("html")
                .action(ArgAction::SetTrue)
                .help("Print the itinerary as HTML with search links for places"),
        )
        .get_matches();

    let mut config = PlannerConfig::from_env()?;
    if let Some(model) = matches.get_one::<String>("model") {
        config = config.with_model(model.as_str());
    }
    if let Some(base_url) = matches.get_one::<String>("base-url") {
        config = config.with_base_url(base_url.as_str());
    }

    let request = build_request(&matches)?;
    let refinements: Vec<&String> = matches
        .get_many::<String>("refine")
        .map(|values| values.collect())
        .unwrap_or_default();

    let mut trip = match matches.get_one::<String>("from-file") {
        Some(path) => {
            let raw = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("failed to read {}", path))?;
            let trip: Trip = decode_strict(&raw)?;
            info!("Loaded trip from {}", path);
            let saved_image = trip.image.clone();
            let mut trip = config.enricher().enrich(trip, &request).await;
            // A saved record keeps its own image when the search finds nothing.
            trip.image = trip.image.or(saved_image);
            trip
        }
        None => {
            let planner = TripPlanner::from_config(&config)?;
            info!("Using model: {}", config.model);
            planner.generate(&request).await.map_err(|err| {
                error!("Trip generation failed: {}", err);
                err
            })?
        }
    };

    if !refinements.is_empty() {
        let planner = TripPlanner::from_config(&config)?;
        for feedback in refinements {
            trip = planner.refine(&trip, feedback, &request).await?;
        }
    }

    let output_dir = matches
        .get_one::<String>("output-dir")
        .map(String::as_str)
        .unwrap_or(".");
    let location = render::export(&trip, &DirectorySink::new(output_dir)).await?;

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&trip)?);
    } else if matches.get_flag("html") {
        print!("{}", format_html(&trip));
    } else {
        print!("{}", format_text(&trip));
    }
    println!("\nDocument: {}", location);

    Ok(())
}

fn build_request(matches: &clap::ArgMatches) -> anyhow::Result<TripRequest> {
    let destination = matches
        .get_one::<String>("destination")
        .context("destination is required")?;
    let days: u32 = matches
        .get_one::<String>("days")
        .map(|raw| raw.parse::<u32>())
        .transpose()
        .context("--days must be a whole number")?
        .unwrap_or(3);

    let mut request = TripRequest::new(destination.as_str(), days);

    if let Some(raw) = matches.get_one::<String>("start-date") {
        let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .with_context(|| format!("invalid --start-date `{}`", raw))?;
        request = request.with_start_date(date);
    }
    if let Some(raw) = matches.get_one::<String>("travelers") {
        request = request.with_travelers(raw.parse().context("--travelers must be a whole number")?);
    }
    if let Some(raw) = matches.get_one::<String>("budget") {
        let budget: f64 = raw.parse().context("--budget must be a number")?;
        request = request.with_budget(budget, matches.get_one::<String>("currency").cloned());
    }
    if let Some(preferences) = matches.get_many::<String>("preference") {
        request = request.with_preferences(preferences.cloned());
    }

    Ok(request)
}

fn format_text(trip: &Trip) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{}", trip.summary);

    if !trip.budget_breakdown.is_empty() {
        let _ = writeln!(out, "\nBudget:");
        for (category, amount) in &trip.budget_breakdown {
            let _ = writeln!(out, "  {}: {:.2}", category, amount);
        }
        let _ = writeln!(out, "  Total: {:.2}", trip.total_budget());
    }

    if !trip.accommodation.name.is_empty() {
        let _ = writeln!(
            out,
            "\nStay: {} ({:.2}/night)",
            trip.accommodation.name, trip.accommodation.price_per_night
        );
    }

    for day in &trip.itinerary {
        let _ = writeln!(out, "\nDay {} - {}", day.day, day.summary);
        for entry in &day.details {
            if entry.time.is_empty() {
                let _ = writeln!(out, "  {}", entry.activity);
            } else {
                let _ = writeln!(out, "  {}: {}", entry.time, entry.activity);
            }
        }
    }

    if let Some(image) = &trip.image {
        let _ = writeln!(out, "\nImage: {}", image);
    }
    out
}

fn format_html(trip: &Trip) -> String {
    let mut out = String::new();
    for day in annotate_itinerary(trip) {
        let _ = writeln!(out, "<h3>Day {}: {}</h3>\n<ul>", day.day, day.summary);
        for activity in day.activities {
            if activity.time.is_empty() {
                let _ = writeln!(out, "  <li>{}</li>", activity.html);
            } else {
                let _ = writeln!(out, "  <li><strong>{}</strong> {}</li>", activity.time, activity.html);
            }
        }
        let _ = writeln!(out, "</ul>");
    }
    out
}

//! TradeSnap
//!
//! A command-line proof-of-concept for a vehicle trade-in workflow: look up
//! a registration (typed, or read from a photo via OCR) and get a mocked
//! vehicle report, ranked trade buyers, and recall/inspection bookings.

mod booking;
mod buyers;
mod config;
mod ocr;
mod paths;
mod plate;
mod providers;
mod report;
mod session;

use anyhow::{Context, Result, anyhow};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use booking::CustomerDetails;
use providers::{
    MockProviders, RecallLookup, ValuationEstimator, VehicleCondition, VehicleLookup,
};
use session::SessionContext;

/// Logs a message to both console and log file with timestamp.
pub fn log(msg: &str) {
    let timestamp = Local::now().format("%H:%M:%S%.3f");
    let line = format!("[{}] {}\n", timestamp, msg);
    print!("{}", line);
    let log_path = paths::get_logs_dir().join("tradesnap.log");
    if let Ok(mut file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        let _ = file.write_all(line.as_bytes());
    }
}

#[derive(Parser)]
#[command(name = "tradesnap", version, about = "Snap it. Value it. Done.")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Look up a vehicle by registration and print its report
    Lookup {
        /// Vehicle registration, e.g. "AB12 CDE"
        registration: String,
        /// Vehicle condition used for the valuation
        #[arg(long, default_value = "good")]
        condition: VehicleCondition,
        /// Also write the report as pretty-printed JSON to this path
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Read the registration from a photo, then print the vehicle report
    Scan {
        /// Photo of the number plate
        image: PathBuf,
        #[arg(long, default_value = "good")]
        condition: VehicleCondition,
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Rank trade buyers for a vehicle
    Buyers {
        registration: String,
    },
    /// Book a workshop slot for an open recall
    BookRecall {
        registration: String,
        /// Recall identifier from the report, e.g. R-2023-001
        recall_id: String,
        #[arg(long)]
        garage: String,
        /// Booking date (YYYY-MM-DD), 1-60 days ahead
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        slot: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        email: Option<String>,
    },
    /// Book an on-site inspection that locks in the offer
    BookInspection {
        registration: String,
        #[arg(long)]
        garage: String,
        /// Inspection date (YYYY-MM-DD), today up to 7 days ahead
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        slot: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "good")]
        condition: VehicleCondition,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    paths::ensure_directories()?;
    config::init_config();

    match cli.command {
        Command::Lookup {
            registration,
            condition,
            json,
        } => run_lookup(&registration, condition, json.as_deref()),
        Command::Scan {
            image,
            condition,
            json,
        } => run_scan(&image, condition, json.as_deref()),
        Command::Buyers { registration } => run_buyers(&registration),
        Command::BookRecall {
            registration,
            recall_id,
            garage,
            date,
            slot,
            name,
            phone,
            email,
        } => run_book_recall(
            &registration,
            &recall_id,
            &garage,
            date,
            &slot,
            CustomerDetails { name, phone, email },
        ),
        Command::BookInspection {
            registration,
            garage,
            date,
            slot,
            name,
            phone,
            email,
            condition,
        } => run_book_inspection(
            &registration,
            &garage,
            date,
            &slot,
            CustomerDetails {
                name,
                phone,
                email: Some(email),
            },
            condition,
        ),
    }
}

fn resolve_registration(raw: &str) -> Result<plate::Registration> {
    plate::normalize(raw).map_err(|e| anyhow!("invalid registration {:?}: {}", raw, e))
}

fn run_lookup(raw: &str, condition: VehicleCondition, json: Option<&Path>) -> Result<()> {
    let registration = resolve_registration(raw)?;
    let mut session = SessionContext::new(registration);

    let providers = MockProviders::new();
    let report = report::assemble_report(session.registration(), &providers, condition);
    session.attach_report(report);

    print_session_report(&session, json)?;
    session.finish();
    Ok(())
}

fn run_scan(image_path: &Path, condition: VehicleCondition, json: Option<&Path>) -> Result<()> {
    let app_config = config::get_config();

    // Engine availability is checked up front; a missing engine leaves
    // manual lookup untouched.
    let mut backend = ocr::build_backend(&app_config.ocr)?;
    log(&format!("OCR engine ready: {}", backend.name()));

    let bytes = std::fs::read(image_path)
        .with_context(|| format!("failed to read image {}", image_path.display()))?;
    let registration = ocr::scan_image(
        &bytes,
        backend.as_mut(),
        &app_config.preprocess,
        app_config.ocr.min_confidence,
    )?;
    log(&format!("Plate read from photo: {}", registration));

    let mut session = SessionContext::new(registration);
    session.set_source_image(image_path.to_path_buf());

    let providers = MockProviders::new();
    let report = report::assemble_report(session.registration(), &providers, condition);
    session.attach_report(report);

    print_session_report(&session, json)?;
    session.finish();
    Ok(())
}

fn print_session_report(session: &SessionContext, json: Option<&Path>) -> Result<()> {
    let Some(report) = session.report() else {
        return Err(anyhow!("no report assembled for {}", session.registration()));
    };

    if let Some(source) = session.source_image() {
        println!("  (scanned from {})", source.display());
    }
    if report.is_empty() {
        log(&format!(
            "every provider came back empty for {}",
            session.registration()
        ));
    }
    print!("{}", report::render::render_report(report));

    if let Some(path) = json {
        report::export::export_to_json(report, path)?;
        log(&format!("Report JSON saved: {}", path.display()));
    }
    Ok(())
}

fn run_buyers(raw: &str) -> Result<()> {
    let registration = resolve_registration(raw)?;
    let session = SessionContext::new(registration);

    let providers = MockProviders::new();
    let report =
        report::assemble_report(session.registration(), &providers, VehicleCondition::Good);

    let tags = report.category_tags();
    if tags.is_empty() {
        println!(
            "No vehicle record for {}; showing the full buyer directory.",
            session.registration()
        );
    } else {
        println!(
            "Matched buyers for {} (tags: {}):",
            session.registration(),
            tags.join(", ")
        );
    }

    for (rank, buyer_match) in buyers::match_buyers(&report).iter().enumerate() {
        let region = buyers::location_by_name(buyer_match.location)
            .map(|location| location.region)
            .unwrap_or("unknown region");
        println!(
            "  {}. {} ({}, {})  score {}",
            rank + 1,
            buyer_match.name,
            buyer_match.location,
            region,
            buyer_match.score
        );
    }

    session.finish();
    Ok(())
}

fn run_book_recall(
    raw: &str,
    recall_id: &str,
    garage: &str,
    date: NaiveDate,
    slot: &str,
    customer: CustomerDetails,
) -> Result<()> {
    let registration = resolve_registration(raw)?;
    let session = SessionContext::new(registration);

    let providers = MockProviders::new();
    let recalls = providers.lookup_recalls(session.registration())?;
    let recall = recalls
        .iter()
        .find(|r| r.id.eq_ignore_ascii_case(recall_id))
        .ok_or_else(|| {
            anyhow!(
                "no recall {} recorded for {}",
                recall_id,
                session.registration()
            )
        })?;

    let booking = booking::book_recall_repair(
        recall,
        garage,
        date,
        slot,
        customer,
        Local::now().naive_local(),
    )?;

    println!("Booking confirmed!");
    println!("  Reference: {}", booking.reference);
    println!("  Repair:    {}", recall.summary);
    println!("  Garage:    {}", booking.garage);
    println!("  When:      {} at {}", booking.date, booking.slot);
    println!(
        "  Customer:  {} | {}",
        booking.customer.name, booking.customer.phone
    );

    session.finish();
    Ok(())
}

fn run_book_inspection(
    raw: &str,
    garage: &str,
    date: NaiveDate,
    slot: &str,
    customer: CustomerDetails,
    condition: VehicleCondition,
) -> Result<()> {
    let registration = resolve_registration(raw)?;
    let session = SessionContext::new(registration);

    let providers = MockProviders::new();
    let vehicle = providers
        .lookup_vehicle(session.registration())?
        .ok_or_else(|| {
            anyhow!(
                "no vehicle record for {}; nothing to inspect",
                session.registration()
            )
        })?;
    let offer = providers.estimate_value(&vehicle, condition)?;

    let booking = booking::book_inspection(
        session.registration(),
        &offer,
        garage,
        date,
        slot,
        customer,
        Local::now().naive_local(),
    )?;

    println!("Inspection booked!");
    println!("  Reference: {}", booking.reference);
    println!(
        "  Vehicle:   {} ({})",
        vehicle.display_name(),
        session.registration()
    );
    println!(
        "  Offer:     up to £{} ({} condition, valid {} hours)",
        report::render::format_thousands(offer.high),
        condition,
        providers::VALUATION_VALIDITY_HOURS
    );
    println!("  Garage:    {}", booking.garage);
    println!("  When:      {} at {}", booking.date, booking.slot);
    if let Some(email) = &booking.customer.email {
        println!("  Confirmation sent to {}", email);
    }

    session.finish();
    Ok(())
}

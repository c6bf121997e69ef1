//! Recall-repair and inspection bookings.
//!
//! Pure validation plus reference generation; nothing is persisted. The
//! caller supplies the current time so bookings are reproducible.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

use crate::buyers;
use crate::plate::Registration;
use crate::providers::{Recall, ValuationRange};

/// Bookable workshop slots for recall repairs.
pub const TIME_SLOTS: [&str; 4] = ["09:00", "11:00", "14:00", "16:00"];
/// Bookable inspection slots; "asap" is the next free 30-minute window.
pub const INSPECTION_SLOTS: [&str; 4] = ["asap", "11:00", "14:00", "16:00"];

/// Recall repairs book 1 to 60 days ahead.
pub const BOOKING_ADVANCE_DAYS_MIN: i64 = 1;
pub const BOOKING_ADVANCE_DAYS_MAX: i64 = 60;
/// Inspections book same-day up to a week ahead.
pub const INSPECTION_ADVANCE_DAYS_MAX: i64 = 7;

/// Minimum digit count for a contact phone number.
pub const PHONE_MIN_DIGITS: usize = 10;

const EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";

static EMAIL: OnceLock<Regex> = OnceLock::new();

fn email_pattern() -> &'static Regex {
    EMAIL.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern is valid"))
}

/// Why a booking request was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookingError {
    #[error("customer name is required")]
    MissingName,
    #[error("phone number needs at least 10 digits")]
    InvalidPhone,
    #[error("e-mail address {0:?} is not valid")]
    InvalidEmail(String),
    #[error("an e-mail address is required for inspection bookings")]
    MissingEmail,
    #[error("unknown garage {0:?}")]
    UnknownGarage(String),
    #[error("unknown time slot {0:?}")]
    UnknownSlot(String),
    #[error("date {date} is outside the booking window ({earliest} to {latest})")]
    DateOutsideWindow {
        date: NaiveDate,
        earliest: NaiveDate,
        latest: NaiveDate,
    },
    #[error("recall {0} is closed; only open recalls can be booked")]
    RecallClosed(String),
}

/// Contact details collected with a booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerDetails {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
}

/// A confirmed booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    pub reference: String,
    pub garage: String,
    pub date: NaiveDate,
    pub slot: String,
    pub customer: CustomerDetails,
}

/// Books a workshop slot for an open recall.
///
/// Reference format: `RCL-<recall-id>-<YYYYMMDDHHMM>`.
pub fn book_recall_repair(
    recall: &Recall,
    garage: &str,
    date: NaiveDate,
    slot: &str,
    customer: CustomerDetails,
    now: NaiveDateTime,
) -> Result<Booking, BookingError> {
    if !recall.is_open {
        return Err(BookingError::RecallClosed(recall.id.clone()));
    }
    validate_customer(&customer, false)?;
    let garage = validate_garage(garage)?;
    let slot = validate_slot(slot, &TIME_SLOTS)?;

    let today = now.date();
    let earliest = today + Duration::days(BOOKING_ADVANCE_DAYS_MIN);
    let latest = today + Duration::days(BOOKING_ADVANCE_DAYS_MAX);
    validate_window(date, earliest, latest)?;

    Ok(Booking {
        reference: format!("RCL-{}-{}", recall.id, now.format("%Y%m%d%H%M")),
        garage,
        date,
        slot,
        customer,
    })
}

/// Books an on-site inspection that locks in the offer.
///
/// E-mail is required (the confirmation goes there). Reference format:
/// `INS-<YYYYMMDDHHMM>`.
pub fn book_inspection(
    registration: &Registration,
    offer: &ValuationRange,
    garage: &str,
    date: NaiveDate,
    slot: &str,
    customer: CustomerDetails,
    now: NaiveDateTime,
) -> Result<Booking, BookingError> {
    validate_customer(&customer, true)?;
    let garage = validate_garage(garage)?;
    let slot = validate_slot(slot, &INSPECTION_SLOTS)?;

    let today = now.date();
    let latest = today + Duration::days(INSPECTION_ADVANCE_DAYS_MAX);
    validate_window(date, today, latest)?;

    crate::log(&format!(
        "inspection booked for {} (offer up to £{})",
        registration, offer.high
    ));

    Ok(Booking {
        reference: format!("INS-{}", now.format("%Y%m%d%H%M")),
        garage,
        date,
        slot,
        customer,
    })
}

fn validate_customer(
    customer: &CustomerDetails,
    email_required: bool,
) -> Result<(), BookingError> {
    if customer.name.trim().is_empty() {
        return Err(BookingError::MissingName);
    }
    let digits = customer.phone.chars().filter(|c| c.is_ascii_digit()).count();
    if digits < PHONE_MIN_DIGITS {
        return Err(BookingError::InvalidPhone);
    }
    match &customer.email {
        Some(email) => {
            if !email_pattern().is_match(email) {
                return Err(BookingError::InvalidEmail(email.clone()));
            }
        }
        None if email_required => return Err(BookingError::MissingEmail),
        None => {}
    }
    Ok(())
}

fn validate_garage(garage: &str) -> Result<String, BookingError> {
    buyers::location_by_name(garage)
        .map(|location| location.name.to_string())
        .ok_or_else(|| BookingError::UnknownGarage(garage.to_string()))
}

fn validate_slot(slot: &str, allowed: &[&str]) -> Result<String, BookingError> {
    allowed
        .iter()
        .find(|candidate| candidate.eq_ignore_ascii_case(slot))
        .map(|candidate| candidate.to_string())
        .ok_or_else(|| BookingError::UnknownSlot(slot.to_string()))
}

fn validate_window(
    date: NaiveDate,
    earliest: NaiveDate,
    latest: NaiveDate,
) -> Result<(), BookingError> {
    if date < earliest || date > latest {
        return Err(BookingError::DateOutsideWindow {
            date,
            earliest,
            latest,
        });
    }
    Ok(())
}

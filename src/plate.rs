//! Registration normalization.
//!
//! Turns raw user text or OCR output into a canonical UK plate string, or
//! a rejection reason. Total over all input: every string maps to exactly
//! one of the two.

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

/// Accepted plate length bounds, counted after removing whitespace.
pub const PLATE_MIN_LENGTH: usize = 5;
pub const PLATE_MAX_LENGTH: usize = 10;

/// Current-format UK plate: two letters, two digits, three letters.
const CURRENT_FORMAT_PATTERN: &str = r"^[A-Z]{2}[0-9]{2}[A-Z]{3}$";

static CURRENT_FORMAT: OnceLock<Regex> = OnceLock::new();

fn current_format() -> &'static Regex {
    CURRENT_FORMAT.get_or_init(|| {
        Regex::new(CURRENT_FORMAT_PATTERN).expect("plate pattern is valid")
    })
}

/// Why an input string was rejected as a registration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlateError {
    #[error("registration is empty")]
    Empty,
    #[error("registration is too short (minimum 5 characters)")]
    TooShort,
    #[error("registration is too long (maximum 10 characters)")]
    TooLong,
    #[error("registration contains invalid character {0:?}")]
    InvalidCharacter(char),
}

/// A normalized vehicle registration.
///
/// Current-format plates carry the single internal space (`AB12 CDE`);
/// other accepted shapes are stored compact. Construct via [`normalize`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Registration(String);

impl Registration {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The plate with internal spacing removed, as used for provider keys.
    pub fn compact(&self) -> String {
        self.0.replace(' ', "")
    }
}

impl fmt::Display for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalizes raw input into a canonical registration.
///
/// Whitespace is stripped, letters uppercased, and the result validated
/// against the accepted plate shapes. Current-format plates are re-spaced
/// into the standard two-part form.
pub fn normalize(raw: &str) -> Result<Registration, PlateError> {
    let compact: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect();

    if compact.is_empty() {
        return Err(PlateError::Empty);
    }
    if let Some(bad) = compact.chars().find(|c| !c.is_ascii_alphanumeric()) {
        return Err(PlateError::InvalidCharacter(bad));
    }
    if compact.len() < PLATE_MIN_LENGTH {
        return Err(PlateError::TooShort);
    }
    if compact.len() > PLATE_MAX_LENGTH {
        return Err(PlateError::TooLong);
    }

    if current_format().is_match(&compact) {
        Ok(Registration(format!("{} {}", &compact[..4], &compact[4..])))
    } else {
        Ok(Registration(compact))
    }
}

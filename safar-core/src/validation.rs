use chrono::NaiveDate;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use uuid::Uuid;

use crate::{CoreError, CoreResult};

/// 24-character lowercase hex identifier, the id format every collection
/// uses on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordId(String);

impl RecordId {
    pub fn generate() -> Self {
        // 24 hex chars out of a v4 UUID's 32; collision odds are fine for
        // back-office volumes.
        let hex = Uuid::new_v4().simple().to_string();
        Self(hex[..24].to_string())
    }

    pub fn parse(s: &str) -> CoreResult<Self> {
        if s.len() != 24 || !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(CoreError::Validation(format!("Invalid record id: {}", s)));
        }
        Ok(Self(s.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("email regex")
});

pub fn validate_email(email: &str) -> CoreResult<()> {
    if EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid email address: {}",
            email
        )))
    }
}

/// Phone numbers arrive with spaces and dashes from the front office;
/// accept an optional leading + and 10 to 14 digits.
pub fn validate_phone(phone: &str) -> CoreResult<()> {
    let cleaned: String = phone
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();
    let digits = cleaned.strip_prefix('+').unwrap_or(&cleaned);
    if digits.len() >= 10 && digits.len() <= 14 && digits.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid phone number: {}",
            phone
        )))
    }
}

/// Strict `YYYY-MM-DD` parse for query parameters.
pub fn validate_date_str(value: &str) -> CoreResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| CoreError::Validation(format!("Invalid date (expected YYYY-MM-DD): {}", value)))
}

/// Airline designators are two or three uppercase alphanumerics ("BG", "SV").
pub fn validate_airline_code(code: &str) -> CoreResult<()> {
    let len_ok = code.len() == 2 || code.len() == 3;
    if len_ok && code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid airline code: {}",
            code
        )))
    }
}

/// Airport codes are three uppercase letters ("DAC", "JED").
pub fn validate_airport_code(code: &str) -> CoreResult<()> {
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_uppercase()) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid airport code: {}",
            code
        )))
    }
}

pub fn validate_pnr(pnr: &str) -> CoreResult<()> {
    if pnr.len() == 6 && pnr.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!("Invalid PNR: {}", pnr)))
    }
}

pub fn require_non_empty(field: &str, value: &str) -> CoreResult<()> {
    if value.trim().is_empty() {
        Err(CoreError::Validation(format!("{} must not be empty", field)))
    } else {
        Ok(())
    }
}

pub fn require_non_negative(field: &str, value: i64) -> CoreResult<()> {
    if value < 0 {
        Err(CoreError::Validation(format!(
            "{} must not be negative",
            field
        )))
    } else {
        Ok(())
    }
}

pub fn require_positive(field: &str, value: f64) -> CoreResult<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(CoreError::Validation(format!("{} must be positive", field)))
    }
}

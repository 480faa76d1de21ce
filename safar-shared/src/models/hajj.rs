use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::pii::Masked;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PilgrimPackage {
    Economy,
    Standard,
    Premium,
}

impl fmt::Display for PilgrimPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Economy => "ECONOMY",
            Self::Standard => "STANDARD",
            Self::Premium => "PREMIUM",
        };
        f.write_str(s)
    }
}

impl FromStr for PilgrimPackage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ECONOMY" => Ok(Self::Economy),
            "STANDARD" => Ok(Self::Standard),
            "PREMIUM" => Ok(Self::Premium),
            other => Err(format!("unknown pilgrim package: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PilgrimStatus {
    PreRegistered,
    Registered,
    Departed,
    Completed,
    Cancelled,
}

impl fmt::Display for PilgrimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::PreRegistered => "PRE_REGISTERED",
            Self::Registered => "REGISTERED",
            Self::Departed => "DEPARTED",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        };
        f.write_str(s)
    }
}

impl FromStr for PilgrimStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PRE_REGISTERED" => Ok(Self::PreRegistered),
            "REGISTERED" => Ok(Self::Registered),
            "DEPARTED" => Ok(Self::Departed),
            "COMPLETED" => Ok(Self::Completed),
            "CANCELLED" => Ok(Self::Cancelled),
            other => Err(format!("unknown pilgrim status: {}", other)),
        }
    }
}

/// A Hajj customer record. Amounts are whole taka.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Haji {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub passport_no: Masked<String>,
    pub national_id: Option<Masked<String>>,
    pub package: PilgrimPackage,
    pub season_year: i32,
    pub package_amount: i64,
    pub paid_amount: i64,
    pub status: PilgrimStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateHajiRequest {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub passport_no: String,
    pub national_id: Option<String>,
    pub package: PilgrimPackage,
    pub season_year: i32,
    pub package_amount: i64,
    #[serde(default)]
    pub paid_amount: i64,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateHajiRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub passport_no: Option<String>,
    pub national_id: Option<String>,
    pub package: Option<PilgrimPackage>,
    pub season_year: Option<i32>,
    pub package_amount: Option<i64>,
    pub paid_amount: Option<i64>,
    pub status: Option<PilgrimStatus>,
    pub notes: Option<String>,
}

/// An Umrah customer record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Umrah {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub passport_no: Masked<String>,
    pub package_amount: i64,
    pub paid_amount: i64,
    pub departure_date: Option<NaiveDate>,
    pub return_date: Option<NaiveDate>,
    pub status: PilgrimStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUmrahRequest {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub passport_no: String,
    pub package_amount: i64,
    #[serde(default)]
    pub paid_amount: i64,
    pub departure_date: Option<NaiveDate>,
    pub return_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUmrahRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub passport_no: Option<String>,
    pub package_amount: Option<i64>,
    pub paid_amount: Option<i64>,
    pub departure_date: Option<NaiveDate>,
    pub return_date: Option<NaiveDate>,
    pub status: Option<PilgrimStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkDeleteRequest {
    pub ids: Vec<String>,
}

/// Outcome of a bulk delete: per-id failures do not abort the batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkDeleteResult {
    pub deleted: usize,
    pub failed: usize,
}

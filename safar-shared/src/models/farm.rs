use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Male => "MALE",
            Self::Female => "FEMALE",
        })
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MALE" => Ok(Self::Male),
            "FEMALE" => Ok(Self::Female),
            other => Err(format!("unknown gender: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CattleStatus {
    Active,
    Sold,
    Deceased,
}

impl fmt::Display for CattleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Active => "ACTIVE",
            Self::Sold => "SOLD",
            Self::Deceased => "DECEASED",
        })
    }
}

impl FromStr for CattleStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(Self::Active),
            "SOLD" => Ok(Self::Sold),
            "DECEASED" => Ok(Self::Deceased),
            other => Err(format!("unknown cattle status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cattle {
    pub id: String,
    pub tag_no: String,
    pub breed: Option<String>,
    pub gender: Gender,
    pub date_of_birth: Option<NaiveDate>,
    pub weight_kg: Option<f64>,
    pub purchase_price: Option<i64>,
    pub purchased_on: Option<NaiveDate>,
    pub status: CattleStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCattleRequest {
    pub tag_no: String,
    pub breed: Option<String>,
    pub gender: Gender,
    pub date_of_birth: Option<NaiveDate>,
    pub weight_kg: Option<f64>,
    pub purchase_price: Option<i64>,
    pub purchased_on: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCattleRequest {
    pub tag_no: Option<String>,
    pub breed: Option<String>,
    pub gender: Option<Gender>,
    pub date_of_birth: Option<NaiveDate>,
    pub weight_kg: Option<f64>,
    pub purchase_price: Option<i64>,
    pub purchased_on: Option<NaiveDate>,
    pub status: Option<CattleStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeedUnit {
    Kg,
    Bag,
    Litre,
}

impl fmt::Display for FeedUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Kg => "KG",
            Self::Bag => "BAG",
            Self::Litre => "LITRE",
        })
    }
}

impl FromStr for FeedUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "KG" => Ok(Self::Kg),
            "BAG" => Ok(Self::Bag),
            "LITRE" => Ok(Self::Litre),
            other => Err(format!("unknown feed unit: {}", other)),
        }
    }
}

/// A feed stock item; `quantity_on_hand` is maintained by the transaction
/// flow, never written directly by clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feed {
    pub id: String,
    pub name: String,
    pub unit: FeedUnit,
    pub quantity_on_hand: f64,
    pub unit_cost: i64,
    pub reorder_level: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFeedRequest {
    pub name: String,
    pub unit: FeedUnit,
    #[serde(default)]
    pub quantity_on_hand: f64,
    pub unit_cost: i64,
    pub reorder_level: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateFeedRequest {
    pub name: Option<String>,
    pub unit: Option<FeedUnit>,
    pub unit_cost: Option<i64>,
    pub reorder_level: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeedTransactionKind {
    Purchase,
    Usage,
}

impl fmt::Display for FeedTransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Purchase => "PURCHASE",
            Self::Usage => "USAGE",
        })
    }
}

impl FromStr for FeedTransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PURCHASE" => Ok(Self::Purchase),
            "USAGE" => Ok(Self::Usage),
            other => Err(format!("unknown feed transaction kind: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedTransaction {
    pub id: String,
    pub feed_id: String,
    pub kind: FeedTransactionKind,
    pub quantity: f64,
    pub unit_cost: Option<i64>,
    pub occurred_on: NaiveDate,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFeedTransactionRequest {
    pub kind: FeedTransactionKind,
    pub quantity: f64,
    pub unit_cost: Option<i64>,
    pub occurred_on: NaiveDate,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthRecord {
    pub id: String,
    pub cattle_id: String,
    pub record_date: NaiveDate,
    pub diagnosis: String,
    pub treatment: Option<String>,
    pub vet_name: Option<String>,
    pub cost: i64,
    pub next_visit: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateHealthRecordRequest {
    pub cattle_id: String,
    pub record_date: NaiveDate,
    pub diagnosis: String,
    pub treatment: Option<String>,
    pub vet_name: Option<String>,
    #[serde(default)]
    pub cost: i64,
    pub next_visit: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateHealthRecordRequest {
    pub record_date: Option<NaiveDate>,
    pub diagnosis: Option<String>,
    pub treatment: Option<String>,
    pub vet_name: Option<String>,
    pub cost: Option<i64>,
    pub next_visit: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MilkSession {
    Morning,
    Evening,
}

impl fmt::Display for MilkSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Morning => "MORNING",
            Self::Evening => "EVENING",
        })
    }
}

impl FromStr for MilkSession {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MORNING" => Ok(Self::Morning),
            "EVENING" => Ok(Self::Evening),
            other => Err(format!("unknown milk session: {}", other)),
        }
    }
}

/// One milking entry. At most one record per cattle, date and session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MilkRecord {
    pub id: String,
    pub cattle_id: String,
    pub record_date: NaiveDate,
    pub session: MilkSession,
    pub quantity_litres: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMilkRecordRequest {
    pub cattle_id: String,
    pub record_date: NaiveDate,
    pub session: MilkSession,
    pub quantity_litres: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateMilkRecordRequest {
    pub record_date: Option<NaiveDate>,
    pub session: Option<MilkSession>,
    pub quantity_litres: Option<f64>,
}

/// Per-cattle production rollup used by the milk summary report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CattleMilkSummary {
    pub cattle_id: String,
    pub total_litres: f64,
    pub mornings: u32,
    pub evenings: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MilkSummaryReport {
    pub per_cattle: Vec<CattleMilkSummary>,
    pub total_litres: f64,
    pub record_count: usize,
}

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    Booked,
    Issued,
    Refunded,
    Void,
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Booked => "BOOKED",
            Self::Issued => "ISSUED",
            Self::Refunded => "REFUNDED",
            Self::Void => "VOID",
        };
        f.write_str(s)
    }
}

impl FromStr for TicketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BOOKED" => Ok(Self::Booked),
            "ISSUED" => Ok(Self::Issued),
            "REFUNDED" => Ok(Self::Refunded),
            "VOID" => Ok(Self::Void),
            other => Err(format!("unknown ticket status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Airline {
    pub id: String,
    pub name: String,
    /// Two or three character designator, e.g. "BG" or "SV".
    pub code: String,
    pub contact_phone: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAirlineRequest {
    pub name: String,
    pub code: String,
    pub contact_phone: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAirlineRequest {
    pub name: Option<String>,
    pub code: Option<String>,
    pub contact_phone: Option<String>,
    pub is_active: Option<bool>,
}

/// A sold air ticket. Purchase price is what the agency paid the airline,
/// sale price what the customer paid the agency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AirTicket {
    pub id: String,
    pub airline_id: String,
    pub passenger_name: String,
    pub pnr: String,
    pub travel_date: NaiveDate,
    pub origin: String,
    pub destination: String,
    pub purchase_price: i64,
    pub sale_price: i64,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTicketRequest {
    pub airline_id: String,
    pub passenger_name: String,
    pub pnr: String,
    pub travel_date: NaiveDate,
    pub origin: String,
    pub destination: String,
    pub purchase_price: i64,
    pub sale_price: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTicketRequest {
    pub passenger_name: Option<String>,
    pub pnr: Option<String>,
    pub travel_date: Option<NaiveDate>,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub purchase_price: Option<i64>,
    pub sale_price: Option<i64>,
    pub status: Option<TicketStatus>,
}

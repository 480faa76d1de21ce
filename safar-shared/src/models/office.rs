use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: String,
    pub name: String,
    pub designation: String,
    pub phone: String,
    pub email: Option<String>,
    pub monthly_salary: i64,
    pub joined_on: NaiveDate,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEmployeeRequest {
    pub name: String,
    pub designation: String,
    pub phone: String,
    pub email: Option<String>,
    pub monthly_salary: i64,
    pub joined_on: NaiveDate,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateEmployeeRequest {
    pub name: Option<String>,
    pub designation: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub monthly_salary: Option<i64>,
    pub joined_on: Option<NaiveDate>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpenseCategory {
    OfficeRent,
    Utilities,
    Salary,
    Supplies,
    Farm,
    Other,
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::OfficeRent => "OFFICE_RENT",
            Self::Utilities => "UTILITIES",
            Self::Salary => "SALARY",
            Self::Supplies => "SUPPLIES",
            Self::Farm => "FARM",
            Self::Other => "OTHER",
        })
    }
}

impl FromStr for ExpenseCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OFFICE_RENT" => Ok(Self::OfficeRent),
            "UTILITIES" => Ok(Self::Utilities),
            "SALARY" => Ok(Self::Salary),
            "SUPPLIES" => Ok(Self::Supplies),
            "FARM" => Ok(Self::Farm),
            "OTHER" => Ok(Self::Other),
            other => Err(format!("unknown expense category: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    pub category: ExpenseCategory,
    pub description: String,
    pub amount: i64,
    pub spent_on: NaiveDate,
    pub recorded_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateExpenseRequest {
    pub category: ExpenseCategory,
    pub description: String,
    pub amount: i64,
    pub spent_on: NaiveDate,
    pub recorded_by: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateExpenseRequest {
    pub category: Option<ExpenseCategory>,
    pub description: Option<String>,
    pub amount: Option<i64>,
    pub spent_on: Option<NaiveDate>,
    pub recorded_by: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceType {
    VisaProcessing,
    PassportService,
    Manpower,
    Other,
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::VisaProcessing => "VISA_PROCESSING",
            Self::PassportService => "PASSPORT_SERVICE",
            Self::Manpower => "MANPOWER",
            Self::Other => "OTHER",
        })
    }
}

impl FromStr for ServiceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "VISA_PROCESSING" => Ok(Self::VisaProcessing),
            "PASSPORT_SERVICE" => Ok(Self::PassportService),
            "MANPOWER" => Ok(Self::Manpower),
            "OTHER" => Ok(Self::Other),
            other => Err(format!("unknown service type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "PENDING",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        })
    }
}

impl FromStr for ServiceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "COMPLETED" => Ok(Self::Completed),
            "CANCELLED" => Ok(Self::Cancelled),
            other => Err(format!("unknown service status: {}", other)),
        }
    }
}

/// A walk-in service ticket: visa processing, passport renewal and the like.
/// `charge` is what the customer pays, `cost` what the agency pays out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtherService {
    pub id: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub service_type: ServiceType,
    pub charge: i64,
    pub cost: i64,
    pub status: ServiceStatus,
    pub ordered_on: NaiveDate,
    pub delivered_on: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateServiceRequest {
    pub customer_name: String,
    pub customer_phone: String,
    pub service_type: ServiceType,
    pub charge: i64,
    #[serde(default)]
    pub cost: i64,
    pub ordered_on: NaiveDate,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateServiceRequest {
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub service_type: Option<ServiceType>,
    pub charge: Option<i64>,
    pub cost: Option<i64>,
    pub status: Option<ServiceStatus>,
    pub delivered_on: Option<NaiveDate>,
}

use serde::{Deserialize, Serialize};

/// Dashboard rollup across every subsystem. Ticket figures only count
/// issued tickets; refunded and void ones carry no revenue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub haji_total: i64,
    pub umrah_total: i64,
    pub active_cattle: i64,
    pub tickets_issued: i64,
    pub active_employees: i64,
    pub pending_services: i64,
    pub ticket_sales: i64,
    pub ticket_margin: i64,
}

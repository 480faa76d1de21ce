use std::sync::Arc;

use safar_core::repository::{
    AirlineRepository, CattleRepository, EmployeeRepository, ExpenseRepository, FeedRepository,
    HajiRepository, HealthRepository, MilkRepository, ReportsRepository, ServiceRepository,
    TicketRepository, UmrahRepository, UserRepository,
};
use safar_store::app_config::{CacheConfig, RateLimitConfig};
use safar_store::Cache;

#[derive(Clone)]
pub struct AuthSettings {
    pub secret: String,
    pub expiration: u64,
}

/// Everything the handlers need, behind trait objects so tests can swap the
/// Postgres repositories for in-memory ones.
#[derive(Clone)]
pub struct AppState {
    pub haji_repo: Arc<dyn HajiRepository>,
    pub umrah_repo: Arc<dyn UmrahRepository>,
    pub airline_repo: Arc<dyn AirlineRepository>,
    pub ticket_repo: Arc<dyn TicketRepository>,
    pub cattle_repo: Arc<dyn CattleRepository>,
    pub feed_repo: Arc<dyn FeedRepository>,
    pub health_repo: Arc<dyn HealthRepository>,
    pub milk_repo: Arc<dyn MilkRepository>,
    pub employee_repo: Arc<dyn EmployeeRepository>,
    pub expense_repo: Arc<dyn ExpenseRepository>,
    pub service_repo: Arc<dyn ServiceRepository>,
    pub user_repo: Arc<dyn UserRepository>,
    pub reports_repo: Arc<dyn ReportsRepository>,
    pub cache: Arc<dyn Cache>,
    pub auth: AuthSettings,
    pub cache_ttl: CacheConfig,
    pub rate_limit: RateLimitConfig,
}

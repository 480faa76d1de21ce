use async_trait::async_trait;
use chrono::NaiveDate;

use safar_shared::envelope::PageParams;
use safar_shared::models::auth::{User, UserRole};
use safar_shared::models::farm::{
    Cattle, CattleStatus, CreateCattleRequest, CreateFeedRequest, CreateFeedTransactionRequest,
    CreateHealthRecordRequest, CreateMilkRecordRequest, Feed, FeedTransaction, HealthRecord,
    MilkRecord, UpdateCattleRequest, UpdateFeedRequest, UpdateHealthRecordRequest,
    UpdateMilkRecordRequest,
};
use safar_shared::models::hajj::{
    CreateHajiRequest, CreateUmrahRequest, Haji, PilgrimStatus, Umrah, UpdateHajiRequest,
    UpdateUmrahRequest,
};
use safar_shared::models::office::{
    CreateEmployeeRequest, CreateExpenseRequest, CreateServiceRequest, Employee, Expense,
    ExpenseCategory, OtherService, ServiceStatus, ServiceType, UpdateEmployeeRequest,
    UpdateExpenseRequest, UpdateServiceRequest,
};
use safar_shared::models::reports::DashboardSummary;
use safar_shared::models::ticketing::{
    AirTicket, Airline, CreateAirlineRequest, CreateTicketRequest, TicketStatus,
    UpdateAirlineRequest, UpdateTicketRequest,
};

use crate::CoreError;

pub type RepoResult<T> = Result<T, CoreError>;

/// A page of rows plus the unpaged total, enough to build the pagination
/// envelope.
pub type Page<T> = (Vec<T>, i64);

#[derive(Debug, Clone, Default)]
pub struct HajiFilter {
    pub status: Option<PilgrimStatus>,
    pub season_year: Option<i32>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UmrahFilter {
    pub status: Option<PilgrimStatus>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AirlineFilter {
    pub is_active: Option<bool>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TicketFilter {
    pub airline_id: Option<String>,
    pub status: Option<TicketStatus>,
}

#[derive(Debug, Clone, Default)]
pub struct CattleFilter {
    pub status: Option<CattleStatus>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct HealthFilter {
    pub cattle_id: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct MilkFilter {
    pub cattle_id: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default)]
pub struct EmployeeFilter {
    pub is_active: Option<bool>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    pub category: Option<ExpenseCategory>,
    /// Calendar month as (year, month).
    pub month: Option<(i32, u32)>,
}

#[derive(Debug, Clone, Default)]
pub struct ServiceFilter {
    pub status: Option<ServiceStatus>,
    pub service_type: Option<ServiceType>,
}

#[async_trait]
pub trait HajiRepository: Send + Sync {
    async fn list(&self, filter: &HajiFilter, page: PageParams) -> RepoResult<Page<Haji>>;
    async fn find(&self, id: &str) -> RepoResult<Option<Haji>>;
    async fn create(&self, req: CreateHajiRequest) -> RepoResult<Haji>;
    async fn update(&self, id: &str, req: UpdateHajiRequest) -> RepoResult<Option<Haji>>;
    async fn delete(&self, id: &str) -> RepoResult<bool>;
}

#[async_trait]
pub trait UmrahRepository: Send + Sync {
    async fn list(&self, filter: &UmrahFilter, page: PageParams) -> RepoResult<Page<Umrah>>;
    async fn find(&self, id: &str) -> RepoResult<Option<Umrah>>;
    async fn create(&self, req: CreateUmrahRequest) -> RepoResult<Umrah>;
    async fn update(&self, id: &str, req: UpdateUmrahRequest) -> RepoResult<Option<Umrah>>;
    async fn delete(&self, id: &str) -> RepoResult<bool>;
}

#[async_trait]
pub trait AirlineRepository: Send + Sync {
    async fn list(&self, filter: &AirlineFilter, page: PageParams) -> RepoResult<Page<Airline>>;
    async fn find(&self, id: &str) -> RepoResult<Option<Airline>>;
    async fn create(&self, req: CreateAirlineRequest) -> RepoResult<Airline>;
    async fn update(&self, id: &str, req: UpdateAirlineRequest) -> RepoResult<Option<Airline>>;
    async fn delete(&self, id: &str) -> RepoResult<bool>;
}

#[async_trait]
pub trait TicketRepository: Send + Sync {
    async fn list(&self, filter: &TicketFilter, page: PageParams) -> RepoResult<Page<AirTicket>>;
    async fn find(&self, id: &str) -> RepoResult<Option<AirTicket>>;
    async fn create(&self, req: CreateTicketRequest) -> RepoResult<AirTicket>;
    async fn update(&self, id: &str, req: UpdateTicketRequest) -> RepoResult<Option<AirTicket>>;
    async fn delete(&self, id: &str) -> RepoResult<bool>;
}

#[async_trait]
pub trait CattleRepository: Send + Sync {
    async fn list(&self, filter: &CattleFilter, page: PageParams) -> RepoResult<Page<Cattle>>;
    async fn find(&self, id: &str) -> RepoResult<Option<Cattle>>;
    async fn create(&self, req: CreateCattleRequest) -> RepoResult<Cattle>;
    async fn update(&self, id: &str, req: UpdateCattleRequest) -> RepoResult<Option<Cattle>>;
    async fn delete(&self, id: &str) -> RepoResult<bool>;
}

#[async_trait]
pub trait FeedRepository: Send + Sync {
    async fn list(&self, page: PageParams) -> RepoResult<Page<Feed>>;
    async fn find(&self, id: &str) -> RepoResult<Option<Feed>>;
    async fn create(&self, req: CreateFeedRequest) -> RepoResult<Feed>;
    async fn update(&self, id: &str, req: UpdateFeedRequest) -> RepoResult<Option<Feed>>;
    async fn delete(&self, id: &str) -> RepoResult<bool>;

    /// Insert the transaction row and persist `new_level` as the feed's
    /// stock level, atomically.
    async fn record_transaction(
        &self,
        feed_id: &str,
        req: CreateFeedTransactionRequest,
        new_level: f64,
    ) -> RepoResult<FeedTransaction>;

    async fn list_transactions(&self, feed_id: &str) -> RepoResult<Vec<FeedTransaction>>;
}

#[async_trait]
pub trait HealthRepository: Send + Sync {
    async fn list(&self, filter: &HealthFilter, page: PageParams)
        -> RepoResult<Page<HealthRecord>>;
    async fn find(&self, id: &str) -> RepoResult<Option<HealthRecord>>;
    async fn create(&self, req: CreateHealthRecordRequest) -> RepoResult<HealthRecord>;
    async fn update(
        &self,
        id: &str,
        req: UpdateHealthRecordRequest,
    ) -> RepoResult<Option<HealthRecord>>;
    async fn delete(&self, id: &str) -> RepoResult<bool>;
}

#[async_trait]
pub trait MilkRepository: Send + Sync {
    async fn list(&self, filter: &MilkFilter, page: PageParams) -> RepoResult<Page<MilkRecord>>;
    async fn find(&self, id: &str) -> RepoResult<Option<MilkRecord>>;
    /// Fails with `CoreError::Conflict` when a record already exists for the
    /// same cattle, date and session.
    async fn create(&self, req: CreateMilkRecordRequest) -> RepoResult<MilkRecord>;
    async fn update(
        &self,
        id: &str,
        req: UpdateMilkRecordRequest,
    ) -> RepoResult<Option<MilkRecord>>;
    async fn delete(&self, id: &str) -> RepoResult<bool>;

    /// Unpaged range scan feeding the production summary.
    async fn list_range(&self, filter: &MilkFilter) -> RepoResult<Vec<MilkRecord>>;
}

#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    async fn list(&self, filter: &EmployeeFilter, page: PageParams) -> RepoResult<Page<Employee>>;
    async fn find(&self, id: &str) -> RepoResult<Option<Employee>>;
    async fn create(&self, req: CreateEmployeeRequest) -> RepoResult<Employee>;
    async fn update(&self, id: &str, req: UpdateEmployeeRequest) -> RepoResult<Option<Employee>>;
    async fn delete(&self, id: &str) -> RepoResult<bool>;
}

#[async_trait]
pub trait ExpenseRepository: Send + Sync {
    async fn list(&self, filter: &ExpenseFilter, page: PageParams) -> RepoResult<Page<Expense>>;
    async fn find(&self, id: &str) -> RepoResult<Option<Expense>>;
    async fn create(&self, req: CreateExpenseRequest) -> RepoResult<Expense>;
    async fn update(&self, id: &str, req: UpdateExpenseRequest) -> RepoResult<Option<Expense>>;
    async fn delete(&self, id: &str) -> RepoResult<bool>;
}

#[async_trait]
pub trait ServiceRepository: Send + Sync {
    async fn list(&self, filter: &ServiceFilter, page: PageParams)
        -> RepoResult<Page<OtherService>>;
    async fn find(&self, id: &str) -> RepoResult<Option<OtherService>>;
    async fn create(&self, req: CreateServiceRequest) -> RepoResult<OtherService>;
    async fn update(&self, id: &str, req: UpdateServiceRequest)
        -> RepoResult<Option<OtherService>>;
    async fn delete(&self, id: &str) -> RepoResult<bool>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;
    async fn count(&self) -> RepoResult<i64>;
    async fn create(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        role: UserRole,
    ) -> RepoResult<User>;
}

#[async_trait]
pub trait ReportsRepository: Send + Sync {
    async fn dashboard(&self) -> RepoResult<DashboardSummary>;
}

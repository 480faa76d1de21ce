#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{self, Request, StatusCode};
use chrono::Utc;
use http_body_util::BodyExt;
use tokio::sync::RwLock;
use tower::ServiceExt;

use safar_api::state::{AppState, AuthSettings};
use safar_core::repository::{
    AirlineFilter, AirlineRepository, CattleFilter, CattleRepository, EmployeeFilter,
    EmployeeRepository, ExpenseFilter, ExpenseRepository, FeedRepository, HajiFilter,
    HajiRepository, HealthFilter, HealthRepository, MilkFilter, MilkRepository, Page,
    RepoResult, ReportsRepository, ServiceFilter, ServiceRepository, TicketFilter,
    TicketRepository, UmrahFilter, UmrahRepository, UserRepository,
};
use safar_core::validation::RecordId;
use safar_core::CoreError;
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
    OtherService, ServiceStatus, UpdateEmployeeRequest, UpdateExpenseRequest,
    UpdateServiceRequest,
};
use safar_shared::models::reports::DashboardSummary;
use safar_shared::models::ticketing::{
    AirTicket, Airline, CreateAirlineRequest, CreateTicketRequest, TicketStatus,
    UpdateAirlineRequest, UpdateTicketRequest,
};
use safar_shared::pii::Masked;
use safar_store::app_config::{CacheConfig, RateLimitConfig};
use safar_store::MemoryCache;

pub const ADMIN_EMAIL: &str = "admin@test.local";
pub const STAFF_EMAIL: &str = "staff@test.local";
pub const PASSWORD: &str = "password123";

fn paginate<T: Clone>(rows: Vec<T>, page: PageParams) -> Page<T> {
    let total = rows.len() as i64;
    let start = (page.offset() as usize).min(rows.len());
    let end = (start + page.limit_i64() as usize).min(rows.len());
    (rows[start..end].to_vec(), total)
}

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

// ---------------------------------------------------------------------------
// In-memory repositories
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemHajiRepo {
    rows: RwLock<Vec<Haji>>,
}

#[async_trait]
impl HajiRepository for MemHajiRepo {
    async fn list(&self, filter: &HajiFilter, page: PageParams) -> RepoResult<Page<Haji>> {
        let rows = self.rows.read().await;
        let filtered: Vec<Haji> = rows
            .iter()
            .filter(|h| filter.status.map_or(true, |s| h.status == s))
            .filter(|h| filter.season_year.map_or(true, |y| h.season_year == y))
            .filter(|h| {
                filter.search.as_deref().map_or(true, |q| {
                    contains(&h.name, q) || contains(h.passport_no.as_str(), q)
                })
            })
            .cloned()
            .collect();
        Ok(paginate(filtered, page))
    }

    async fn find(&self, id: &str) -> RepoResult<Option<Haji>> {
        Ok(self.rows.read().await.iter().find(|h| h.id == id).cloned())
    }

    async fn create(&self, req: CreateHajiRequest) -> RepoResult<Haji> {
        let now = Utc::now();
        let record = Haji {
            id: RecordId::generate().into_string(),
            name: req.name,
            phone: req.phone,
            email: req.email,
            passport_no: Masked::new(req.passport_no),
            national_id: req.national_id.map(Masked::new),
            package: req.package,
            season_year: req.season_year,
            package_amount: req.package_amount,
            paid_amount: req.paid_amount,
            status: PilgrimStatus::Registered,
            notes: req.notes,
            created_at: now,
            updated_at: now,
        };
        self.rows.write().await.push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: &str, req: UpdateHajiRequest) -> RepoResult<Option<Haji>> {
        let mut rows = self.rows.write().await;
        let Some(record) = rows.iter_mut().find(|h| h.id == id) else {
            return Ok(None);
        };
        if let Some(name) = req.name {
            record.name = name;
        }
        if let Some(phone) = req.phone {
            record.phone = phone;
        }
        if let Some(paid) = req.paid_amount {
            record.paid_amount = paid;
        }
        if let Some(status) = req.status {
            record.status = status;
        }
        record.updated_at = Utc::now();
        Ok(Some(record.clone()))
    }

    async fn delete(&self, id: &str) -> RepoResult<bool> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|h| h.id != id);
        Ok(rows.len() < before)
    }
}

#[derive(Default)]
pub struct MemUmrahRepo {
    rows: RwLock<Vec<Umrah>>,
}

#[async_trait]
impl UmrahRepository for MemUmrahRepo {
    async fn list(&self, filter: &UmrahFilter, page: PageParams) -> RepoResult<Page<Umrah>> {
        let rows = self.rows.read().await;
        let filtered: Vec<Umrah> = rows
            .iter()
            .filter(|u| filter.status.map_or(true, |s| u.status == s))
            .filter(|u| filter.search.as_deref().map_or(true, |q| contains(&u.name, q)))
            .cloned()
            .collect();
        Ok(paginate(filtered, page))
    }

    async fn find(&self, id: &str) -> RepoResult<Option<Umrah>> {
        Ok(self.rows.read().await.iter().find(|u| u.id == id).cloned())
    }

    async fn create(&self, req: CreateUmrahRequest) -> RepoResult<Umrah> {
        let now = Utc::now();
        let record = Umrah {
            id: RecordId::generate().into_string(),
            name: req.name,
            phone: req.phone,
            email: req.email,
            passport_no: Masked::new(req.passport_no),
            package_amount: req.package_amount,
            paid_amount: req.paid_amount,
            departure_date: req.departure_date,
            return_date: req.return_date,
            status: PilgrimStatus::Registered,
            notes: req.notes,
            created_at: now,
            updated_at: now,
        };
        self.rows.write().await.push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: &str, req: UpdateUmrahRequest) -> RepoResult<Option<Umrah>> {
        let mut rows = self.rows.write().await;
        let Some(record) = rows.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(name) = req.name {
            record.name = name;
        }
        if let Some(status) = req.status {
            record.status = status;
        }
        record.updated_at = Utc::now();
        Ok(Some(record.clone()))
    }

    async fn delete(&self, id: &str) -> RepoResult<bool> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|u| u.id != id);
        Ok(rows.len() < before)
    }
}

#[derive(Default)]
pub struct MemAirlineRepo {
    rows: RwLock<Vec<Airline>>,
}

#[async_trait]
impl AirlineRepository for MemAirlineRepo {
    async fn list(&self, filter: &AirlineFilter, page: PageParams) -> RepoResult<Page<Airline>> {
        let rows = self.rows.read().await;
        let filtered: Vec<Airline> = rows
            .iter()
            .filter(|a| filter.is_active.map_or(true, |active| a.is_active == active))
            .filter(|a| {
                filter
                    .search
                    .as_deref()
                    .map_or(true, |q| contains(&a.name, q) || contains(&a.code, q))
            })
            .cloned()
            .collect();
        Ok(paginate(filtered, page))
    }

    async fn find(&self, id: &str) -> RepoResult<Option<Airline>> {
        Ok(self.rows.read().await.iter().find(|a| a.id == id).cloned())
    }

    async fn create(&self, req: CreateAirlineRequest) -> RepoResult<Airline> {
        let now = Utc::now();
        let record = Airline {
            id: RecordId::generate().into_string(),
            name: req.name,
            code: req.code,
            contact_phone: req.contact_phone,
            is_active: req.is_active,
            created_at: now,
            updated_at: now,
        };
        self.rows.write().await.push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: &str, req: UpdateAirlineRequest) -> RepoResult<Option<Airline>> {
        let mut rows = self.rows.write().await;
        let Some(record) = rows.iter_mut().find(|a| a.id == id) else {
            return Ok(None);
        };
        if let Some(name) = req.name {
            record.name = name;
        }
        if let Some(code) = req.code {
            record.code = code;
        }
        if let Some(active) = req.is_active {
            record.is_active = active;
        }
        record.updated_at = Utc::now();
        Ok(Some(record.clone()))
    }

    async fn delete(&self, id: &str) -> RepoResult<bool> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|a| a.id != id);
        Ok(rows.len() < before)
    }
}

#[derive(Default)]
pub struct MemTicketRepo {
    rows: RwLock<Vec<AirTicket>>,
}

#[async_trait]
impl TicketRepository for MemTicketRepo {
    async fn list(&self, filter: &TicketFilter, page: PageParams) -> RepoResult<Page<AirTicket>> {
        let rows = self.rows.read().await;
        let filtered: Vec<AirTicket> = rows
            .iter()
            .filter(|t| {
                filter
                    .airline_id
                    .as_deref()
                    .map_or(true, |id| t.airline_id == id)
            })
            .filter(|t| filter.status.map_or(true, |s| t.status == s))
            .cloned()
            .collect();
        Ok(paginate(filtered, page))
    }

    async fn find(&self, id: &str) -> RepoResult<Option<AirTicket>> {
        Ok(self.rows.read().await.iter().find(|t| t.id == id).cloned())
    }

    async fn create(&self, req: CreateTicketRequest) -> RepoResult<AirTicket> {
        let now = Utc::now();
        let record = AirTicket {
            id: RecordId::generate().into_string(),
            airline_id: req.airline_id,
            passenger_name: req.passenger_name,
            pnr: req.pnr,
            travel_date: req.travel_date,
            origin: req.origin,
            destination: req.destination,
            purchase_price: req.purchase_price,
            sale_price: req.sale_price,
            status: TicketStatus::Booked,
            created_at: now,
            updated_at: now,
        };
        self.rows.write().await.push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: &str, req: UpdateTicketRequest) -> RepoResult<Option<AirTicket>> {
        let mut rows = self.rows.write().await;
        let Some(record) = rows.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        if let Some(status) = req.status {
            record.status = status;
        }
        if let Some(price) = req.sale_price {
            record.sale_price = price;
        }
        record.updated_at = Utc::now();
        Ok(Some(record.clone()))
    }

    async fn delete(&self, id: &str) -> RepoResult<bool> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|t| t.id != id);
        Ok(rows.len() < before)
    }
}

#[derive(Default)]
pub struct MemCattleRepo {
    rows: RwLock<Vec<Cattle>>,
}

#[async_trait]
impl CattleRepository for MemCattleRepo {
    async fn list(&self, filter: &CattleFilter, page: PageParams) -> RepoResult<Page<Cattle>> {
        let rows = self.rows.read().await;
        let filtered: Vec<Cattle> = rows
            .iter()
            .filter(|c| filter.status.map_or(true, |s| c.status == s))
            .filter(|c| filter.search.as_deref().map_or(true, |q| contains(&c.tag_no, q)))
            .cloned()
            .collect();
        Ok(paginate(filtered, page))
    }

    async fn find(&self, id: &str) -> RepoResult<Option<Cattle>> {
        Ok(self.rows.read().await.iter().find(|c| c.id == id).cloned())
    }

    async fn create(&self, req: CreateCattleRequest) -> RepoResult<Cattle> {
        let now = Utc::now();
        let record = Cattle {
            id: RecordId::generate().into_string(),
            tag_no: req.tag_no,
            breed: req.breed,
            gender: req.gender,
            date_of_birth: req.date_of_birth,
            weight_kg: req.weight_kg,
            purchase_price: req.purchase_price,
            purchased_on: req.purchased_on,
            status: CattleStatus::Active,
            notes: req.notes,
            created_at: now,
            updated_at: now,
        };
        self.rows.write().await.push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: &str, req: UpdateCattleRequest) -> RepoResult<Option<Cattle>> {
        let mut rows = self.rows.write().await;
        let Some(record) = rows.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        if let Some(tag_no) = req.tag_no {
            record.tag_no = tag_no;
        }
        if let Some(status) = req.status {
            record.status = status;
        }
        if let Some(weight) = req.weight_kg {
            record.weight_kg = Some(weight);
        }
        record.updated_at = Utc::now();
        Ok(Some(record.clone()))
    }

    async fn delete(&self, id: &str) -> RepoResult<bool> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|c| c.id != id);
        Ok(rows.len() < before)
    }
}

#[derive(Default)]
pub struct MemFeedRepo {
    rows: RwLock<Vec<Feed>>,
    transactions: RwLock<Vec<FeedTransaction>>,
}

#[async_trait]
impl FeedRepository for MemFeedRepo {
    async fn list(&self, page: PageParams) -> RepoResult<Page<Feed>> {
        let rows = self.rows.read().await;
        Ok(paginate(rows.clone(), page))
    }

    async fn find(&self, id: &str) -> RepoResult<Option<Feed>> {
        Ok(self.rows.read().await.iter().find(|f| f.id == id).cloned())
    }

    async fn create(&self, req: CreateFeedRequest) -> RepoResult<Feed> {
        let now = Utc::now();
        let record = Feed {
            id: RecordId::generate().into_string(),
            name: req.name,
            unit: req.unit,
            quantity_on_hand: req.quantity_on_hand,
            unit_cost: req.unit_cost,
            reorder_level: req.reorder_level,
            created_at: now,
            updated_at: now,
        };
        self.rows.write().await.push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: &str, req: UpdateFeedRequest) -> RepoResult<Option<Feed>> {
        let mut rows = self.rows.write().await;
        let Some(record) = rows.iter_mut().find(|f| f.id == id) else {
            return Ok(None);
        };
        if let Some(name) = req.name {
            record.name = name;
        }
        if let Some(cost) = req.unit_cost {
            record.unit_cost = cost;
        }
        record.updated_at = Utc::now();
        Ok(Some(record.clone()))
    }

    async fn delete(&self, id: &str) -> RepoResult<bool> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|f| f.id != id);
        Ok(rows.len() < before)
    }

    async fn record_transaction(
        &self,
        feed_id: &str,
        req: CreateFeedTransactionRequest,
        new_level: f64,
    ) -> RepoResult<FeedTransaction> {
        let mut rows = self.rows.write().await;
        let record = rows
            .iter_mut()
            .find(|f| f.id == feed_id)
            .ok_or_else(|| CoreError::NotFound("feed".into()))?;
        record.quantity_on_hand = new_level;
        record.updated_at = Utc::now();

        let tx = FeedTransaction {
            id: RecordId::generate().into_string(),
            feed_id: feed_id.to_string(),
            kind: req.kind,
            quantity: req.quantity,
            unit_cost: req.unit_cost,
            occurred_on: req.occurred_on,
            note: req.note,
            created_at: Utc::now(),
        };
        self.transactions.write().await.push(tx.clone());
        Ok(tx)
    }

    async fn list_transactions(&self, feed_id: &str) -> RepoResult<Vec<FeedTransaction>> {
        Ok(self
            .transactions
            .read()
            .await
            .iter()
            .filter(|t| t.feed_id == feed_id)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct MemHealthRepo {
    rows: RwLock<Vec<HealthRecord>>,
}

#[async_trait]
impl HealthRepository for MemHealthRepo {
    async fn list(
        &self,
        filter: &HealthFilter,
        page: PageParams,
    ) -> RepoResult<Page<HealthRecord>> {
        let rows = self.rows.read().await;
        let filtered: Vec<HealthRecord> = rows
            .iter()
            .filter(|r| {
                filter
                    .cattle_id
                    .as_deref()
                    .map_or(true, |id| r.cattle_id == id)
            })
            .cloned()
            .collect();
        Ok(paginate(filtered, page))
    }

    async fn find(&self, id: &str) -> RepoResult<Option<HealthRecord>> {
        Ok(self.rows.read().await.iter().find(|r| r.id == id).cloned())
    }

    async fn create(&self, req: CreateHealthRecordRequest) -> RepoResult<HealthRecord> {
        let now = Utc::now();
        let record = HealthRecord {
            id: RecordId::generate().into_string(),
            cattle_id: req.cattle_id,
            record_date: req.record_date,
            diagnosis: req.diagnosis,
            treatment: req.treatment,
            vet_name: req.vet_name,
            cost: req.cost,
            next_visit: req.next_visit,
            created_at: now,
            updated_at: now,
        };
        self.rows.write().await.push(record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        id: &str,
        req: UpdateHealthRecordRequest,
    ) -> RepoResult<Option<HealthRecord>> {
        let mut rows = self.rows.write().await;
        let Some(record) = rows.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        if let Some(diagnosis) = req.diagnosis {
            record.diagnosis = diagnosis;
        }
        if let Some(cost) = req.cost {
            record.cost = cost;
        }
        record.updated_at = Utc::now();
        Ok(Some(record.clone()))
    }

    async fn delete(&self, id: &str) -> RepoResult<bool> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|r| r.id != id);
        Ok(rows.len() < before)
    }
}

#[derive(Default)]
pub struct MemMilkRepo {
    rows: RwLock<Vec<MilkRecord>>,
}

fn milk_matches(record: &MilkRecord, filter: &MilkFilter) -> bool {
    filter
        .cattle_id
        .as_deref()
        .map_or(true, |id| record.cattle_id == id)
        && filter.from.map_or(true, |from| record.record_date >= from)
        && filter.to.map_or(true, |to| record.record_date <= to)
}

#[async_trait]
impl MilkRepository for MemMilkRepo {
    async fn list(&self, filter: &MilkFilter, page: PageParams) -> RepoResult<Page<MilkRecord>> {
        let rows = self.rows.read().await;
        let filtered: Vec<MilkRecord> =
            rows.iter().filter(|r| milk_matches(r, filter)).cloned().collect();
        Ok(paginate(filtered, page))
    }

    async fn find(&self, id: &str) -> RepoResult<Option<MilkRecord>> {
        Ok(self.rows.read().await.iter().find(|r| r.id == id).cloned())
    }

    async fn create(&self, req: CreateMilkRecordRequest) -> RepoResult<MilkRecord> {
        let mut rows = self.rows.write().await;
        let duplicate = rows.iter().any(|r| {
            r.cattle_id == req.cattle_id
                && r.record_date == req.record_date
                && r.session == req.session
        });
        if duplicate {
            return Err(CoreError::Conflict(
                "A record with the same unique fields already exists".to_string(),
            ));
        }
        let now = Utc::now();
        let record = MilkRecord {
            id: RecordId::generate().into_string(),
            cattle_id: req.cattle_id,
            record_date: req.record_date,
            session: req.session,
            quantity_litres: req.quantity_litres,
            created_at: now,
            updated_at: now,
        };
        rows.push(record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        id: &str,
        req: UpdateMilkRecordRequest,
    ) -> RepoResult<Option<MilkRecord>> {
        let mut rows = self.rows.write().await;
        let Some(record) = rows.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        if let Some(date) = req.record_date {
            record.record_date = date;
        }
        if let Some(session) = req.session {
            record.session = session;
        }
        if let Some(litres) = req.quantity_litres {
            record.quantity_litres = litres;
        }
        record.updated_at = Utc::now();
        Ok(Some(record.clone()))
    }

    async fn delete(&self, id: &str) -> RepoResult<bool> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|r| r.id != id);
        Ok(rows.len() < before)
    }

    async fn list_range(&self, filter: &MilkFilter) -> RepoResult<Vec<MilkRecord>> {
        let rows = self.rows.read().await;
        Ok(rows.iter().filter(|r| milk_matches(r, filter)).cloned().collect())
    }
}

#[derive(Default)]
pub struct MemEmployeeRepo {
    rows: RwLock<Vec<Employee>>,
}

#[async_trait]
impl EmployeeRepository for MemEmployeeRepo {
    async fn list(&self, filter: &EmployeeFilter, page: PageParams) -> RepoResult<Page<Employee>> {
        let rows = self.rows.read().await;
        let filtered: Vec<Employee> = rows
            .iter()
            .filter(|e| filter.is_active.map_or(true, |active| e.is_active == active))
            .filter(|e| filter.search.as_deref().map_or(true, |q| contains(&e.name, q)))
            .cloned()
            .collect();
        Ok(paginate(filtered, page))
    }

    async fn find(&self, id: &str) -> RepoResult<Option<Employee>> {
        Ok(self.rows.read().await.iter().find(|e| e.id == id).cloned())
    }

    async fn create(&self, req: CreateEmployeeRequest) -> RepoResult<Employee> {
        let now = Utc::now();
        let record = Employee {
            id: RecordId::generate().into_string(),
            name: req.name,
            designation: req.designation,
            phone: req.phone,
            email: req.email,
            monthly_salary: req.monthly_salary,
            joined_on: req.joined_on,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.rows.write().await.push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: &str, req: UpdateEmployeeRequest) -> RepoResult<Option<Employee>> {
        let mut rows = self.rows.write().await;
        let Some(record) = rows.iter_mut().find(|e| e.id == id) else {
            return Ok(None);
        };
        if let Some(name) = req.name {
            record.name = name;
        }
        if let Some(active) = req.is_active {
            record.is_active = active;
        }
        record.updated_at = Utc::now();
        Ok(Some(record.clone()))
    }

    async fn delete(&self, id: &str) -> RepoResult<bool> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|e| e.id != id);
        Ok(rows.len() < before)
    }
}

#[derive(Default)]
pub struct MemExpenseRepo {
    rows: RwLock<Vec<Expense>>,
}

#[async_trait]
impl ExpenseRepository for MemExpenseRepo {
    async fn list(&self, filter: &ExpenseFilter, page: PageParams) -> RepoResult<Page<Expense>> {
        let rows = self.rows.read().await;
        let filtered: Vec<Expense> = rows
            .iter()
            .filter(|e| filter.category.map_or(true, |c| e.category == c))
            .filter(|e| {
                filter.month.map_or(true, |(year, month)| {
                    use chrono::Datelike;
                    e.spent_on.year() == year && e.spent_on.month() == month
                })
            })
            .cloned()
            .collect();
        Ok(paginate(filtered, page))
    }

    async fn find(&self, id: &str) -> RepoResult<Option<Expense>> {
        Ok(self.rows.read().await.iter().find(|e| e.id == id).cloned())
    }

    async fn create(&self, req: CreateExpenseRequest) -> RepoResult<Expense> {
        let now = Utc::now();
        let record = Expense {
            id: RecordId::generate().into_string(),
            category: req.category,
            description: req.description,
            amount: req.amount,
            spent_on: req.spent_on,
            recorded_by: req.recorded_by,
            created_at: now,
            updated_at: now,
        };
        self.rows.write().await.push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: &str, req: UpdateExpenseRequest) -> RepoResult<Option<Expense>> {
        let mut rows = self.rows.write().await;
        let Some(record) = rows.iter_mut().find(|e| e.id == id) else {
            return Ok(None);
        };
        if let Some(amount) = req.amount {
            record.amount = amount;
        }
        if let Some(description) = req.description {
            record.description = description;
        }
        record.updated_at = Utc::now();
        Ok(Some(record.clone()))
    }

    async fn delete(&self, id: &str) -> RepoResult<bool> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|e| e.id != id);
        Ok(rows.len() < before)
    }
}

#[derive(Default)]
pub struct MemServiceRepo {
    rows: RwLock<Vec<OtherService>>,
}

#[async_trait]
impl ServiceRepository for MemServiceRepo {
    async fn list(
        &self,
        filter: &ServiceFilter,
        page: PageParams,
    ) -> RepoResult<Page<OtherService>> {
        let rows = self.rows.read().await;
        let filtered: Vec<OtherService> = rows
            .iter()
            .filter(|s| filter.status.map_or(true, |status| s.status == status))
            .filter(|s| filter.service_type.map_or(true, |t| s.service_type == t))
            .cloned()
            .collect();
        Ok(paginate(filtered, page))
    }

    async fn find(&self, id: &str) -> RepoResult<Option<OtherService>> {
        Ok(self.rows.read().await.iter().find(|s| s.id == id).cloned())
    }

    async fn create(&self, req: CreateServiceRequest) -> RepoResult<OtherService> {
        let now = Utc::now();
        let record = OtherService {
            id: RecordId::generate().into_string(),
            customer_name: req.customer_name,
            customer_phone: req.customer_phone,
            service_type: req.service_type,
            charge: req.charge,
            cost: req.cost,
            status: ServiceStatus::Pending,
            ordered_on: req.ordered_on,
            delivered_on: None,
            created_at: now,
            updated_at: now,
        };
        self.rows.write().await.push(record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        id: &str,
        req: UpdateServiceRequest,
    ) -> RepoResult<Option<OtherService>> {
        let mut rows = self.rows.write().await;
        let Some(record) = rows.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };
        if let Some(status) = req.status {
            record.status = status;
        }
        if let Some(delivered) = req.delivered_on {
            record.delivered_on = Some(delivered);
        }
        record.updated_at = Utc::now();
        Ok(Some(record.clone()))
    }

    async fn delete(&self, id: &str) -> RepoResult<bool> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|s| s.id != id);
        Ok(rows.len() < before)
    }
}

pub struct MemUserRepo {
    rows: RwLock<Vec<User>>,
}

impl MemUserRepo {
    pub fn seeded() -> Self {
        // Low cost keeps the test suite quick.
        let hash = bcrypt::hash(PASSWORD, 4).expect("hash");
        let admin = User {
            id: RecordId::generate().into_string(),
            name: "Test Admin".to_string(),
            email: ADMIN_EMAIL.to_string(),
            password_hash: hash.clone(),
            role: UserRole::Admin,
            created_at: Utc::now(),
        };
        let staff = User {
            id: RecordId::generate().into_string(),
            name: "Test Staff".to_string(),
            email: STAFF_EMAIL.to_string(),
            password_hash: hash,
            role: UserRole::Staff,
            created_at: Utc::now(),
        };
        Self {
            rows: RwLock::new(vec![admin, staff]),
        }
    }
}

#[async_trait]
impl UserRepository for MemUserRepo {
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        Ok(self
            .rows
            .read()
            .await
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn count(&self) -> RepoResult<i64> {
        Ok(self.rows.read().await.len() as i64)
    }

    async fn create(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        role: UserRole,
    ) -> RepoResult<User> {
        let record = User {
            id: RecordId::generate().into_string(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            role,
            created_at: Utc::now(),
        };
        self.rows.write().await.push(record.clone());
        Ok(record)
    }
}

pub struct MemReportsRepo {
    pub summary: DashboardSummary,
}

#[async_trait]
impl ReportsRepository for MemReportsRepo {
    async fn dashboard(&self) -> RepoResult<DashboardSummary> {
        Ok(self.summary.clone())
    }
}

// ---------------------------------------------------------------------------
// Test state and request helpers
// ---------------------------------------------------------------------------

pub struct TestContext {
    pub state: AppState,
    pub cache: Arc<MemoryCache>,
}

pub fn test_state() -> TestContext {
    test_state_with_rate_limit(10_000)
}

pub fn test_state_with_rate_limit(limit: i64) -> TestContext {
    let cache = Arc::new(MemoryCache::new());
    let state = AppState {
        haji_repo: Arc::new(MemHajiRepo::default()),
        umrah_repo: Arc::new(MemUmrahRepo::default()),
        airline_repo: Arc::new(MemAirlineRepo::default()),
        ticket_repo: Arc::new(MemTicketRepo::default()),
        cattle_repo: Arc::new(MemCattleRepo::default()),
        feed_repo: Arc::new(MemFeedRepo::default()),
        health_repo: Arc::new(MemHealthRepo::default()),
        milk_repo: Arc::new(MemMilkRepo::default()),
        employee_repo: Arc::new(MemEmployeeRepo::default()),
        expense_repo: Arc::new(MemExpenseRepo::default()),
        service_repo: Arc::new(MemServiceRepo::default()),
        user_repo: Arc::new(MemUserRepo::seeded()),
        reports_repo: Arc::new(MemReportsRepo {
            summary: DashboardSummary {
                haji_total: 3,
                umrah_total: 2,
                active_cattle: 5,
                tickets_issued: 4,
                active_employees: 6,
                pending_services: 1,
                ticket_sales: 340_000,
                ticket_margin: 28_000,
            },
        }),
        cache: cache.clone(),
        auth: AuthSettings {
            secret: "test-secret".to_string(),
            expiration: 3600,
        },
        cache_ttl: CacheConfig {
            driver: "memory".to_string(),
            list_ttl_seconds: 30,
            detail_ttl_seconds: 300,
            report_ttl_seconds: 60,
        },
        rate_limit: RateLimitConfig {
            limit,
            window_seconds: 60,
        },
    };
    TestContext { state, cache }
}

pub fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

pub fn auth_request(method: &str, uri: &str, token: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .header(http::header::AUTHORIZATION, format!("Bearer {}", token))
        .body(body.to_string())
        .unwrap()
}

pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Log in through the real endpoint and hand back the bearer token.
pub async fn login(app: &axum::Router, email: &str) -> String {
    let body = serde_json::json!({ "email": email, "password": PASSWORD }).to_string();
    let resp = app
        .clone()
        .oneshot(json_request("POST", "/api/auth/login", &body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK, "login failed for {}", email);
    let json = body_json(resp).await;
    json["data"]["token"].as_str().unwrap().to_string()
}

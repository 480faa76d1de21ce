use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use safar_core::repository::{
    EmployeeFilter, EmployeeRepository, ExpenseFilter, ExpenseRepository, Page, RepoResult,
    ServiceFilter, ServiceRepository,
};
use safar_core::validation::RecordId;
use safar_core::CoreError;
use safar_shared::envelope::PageParams;
use safar_shared::models::office::{
    CreateEmployeeRequest, CreateExpenseRequest, CreateServiceRequest, Employee, Expense,
    OtherService, ServiceStatus, UpdateEmployeeRequest, UpdateExpenseRequest,
    UpdateServiceRequest,
};

use crate::{db_err, parse_column};

pub struct PgEmployeeRepository {
    pool: PgPool,
}

impl PgEmployeeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct EmployeeRow {
    id: String,
    name: String,
    designation: String,
    phone: String,
    email: Option<String>,
    monthly_salary: i64,
    joined_on: NaiveDate,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl EmployeeRow {
    fn into_model(self) -> Employee {
        Employee {
            id: self.id,
            name: self.name,
            designation: self.designation,
            phone: self.phone,
            email: self.email,
            monthly_salary: self.monthly_salary,
            joined_on: self.joined_on,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

const EMPLOYEE_COLUMNS: &str = "id, name, designation, phone, email, monthly_salary, \
     joined_on, is_active, created_at, updated_at";

fn push_employee_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &EmployeeFilter) {
    if let Some(active) = filter.is_active {
        qb.push(" AND is_active = ").push_bind(active);
    }
    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", search);
        qb.push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR designation ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

#[async_trait]
impl EmployeeRepository for PgEmployeeRepository {
    async fn list(&self, filter: &EmployeeFilter, page: PageParams) -> RepoResult<Page<Employee>> {
        let mut count_qb =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM employees WHERE 1=1");
        push_employee_filters(&mut count_qb, filter);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM employees WHERE 1=1",
            EMPLOYEE_COLUMNS
        ));
        push_employee_filters(&mut qb, filter);
        qb.push(" ORDER BY name LIMIT ")
            .push_bind(page.limit_i64())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let rows: Vec<EmployeeRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        Ok((rows.into_iter().map(EmployeeRow::into_model).collect(), total))
    }

    async fn find(&self, id: &str) -> RepoResult<Option<Employee>> {
        let row: Option<EmployeeRow> = sqlx::query_as(&format!(
            "SELECT {} FROM employees WHERE id = $1",
            EMPLOYEE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(row.map(EmployeeRow::into_model))
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

        sqlx::query(
            "INSERT INTO employees (id, name, designation, phone, email, monthly_salary, \
             joined_on, is_active, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(&record.id)
        .bind(&record.name)
        .bind(&record.designation)
        .bind(&record.phone)
        .bind(&record.email)
        .bind(record.monthly_salary)
        .bind(record.joined_on)
        .bind(record.is_active)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(record)
    }

    async fn update(&self, id: &str, req: UpdateEmployeeRequest) -> RepoResult<Option<Employee>> {
        let Some(mut record) = self.find(id).await? else {
            return Ok(None);
        };

        if let Some(name) = req.name {
            record.name = name;
        }
        if let Some(designation) = req.designation {
            record.designation = designation;
        }
        if let Some(phone) = req.phone {
            record.phone = phone;
        }
        if let Some(email) = req.email {
            record.email = Some(email);
        }
        if let Some(salary) = req.monthly_salary {
            record.monthly_salary = salary;
        }
        if let Some(joined) = req.joined_on {
            record.joined_on = joined;
        }
        if let Some(active) = req.is_active {
            record.is_active = active;
        }
        record.updated_at = Utc::now();

        sqlx::query(
            "UPDATE employees SET name = $1, designation = $2, phone = $3, email = $4, \
             monthly_salary = $5, joined_on = $6, is_active = $7, updated_at = $8 WHERE id = $9",
        )
        .bind(&record.name)
        .bind(&record.designation)
        .bind(&record.phone)
        .bind(&record.email)
        .bind(record.monthly_salary)
        .bind(record.joined_on)
        .bind(record.is_active)
        .bind(record.updated_at)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(Some(record))
    }

    async fn delete(&self, id: &str) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM employees WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }
}

pub struct PgExpenseRepository {
    pool: PgPool,
}

impl PgExpenseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ExpenseRow {
    id: String,
    category: String,
    description: String,
    amount: i64,
    spent_on: NaiveDate,
    recorded_by: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ExpenseRow {
    fn into_model(self) -> Result<Expense, CoreError> {
        Ok(Expense {
            id: self.id,
            category: parse_column(&self.category)?,
            description: self.description,
            amount: self.amount,
            spent_on: self.spent_on,
            recorded_by: self.recorded_by,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const EXPENSE_COLUMNS: &str =
    "id, category, description, amount, spent_on, recorded_by, created_at, updated_at";

fn push_expense_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &ExpenseFilter) {
    if let Some(category) = filter.category {
        qb.push(" AND category = ").push_bind(category.to_string());
    }
    if let Some((year, month)) = filter.month {
        // Month window [first, first-of-next).
        let first = NaiveDate::from_ymd_opt(year, month, 1);
        let next = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        };
        if let (Some(first), Some(next)) = (first, next) {
            qb.push(" AND spent_on >= ").push_bind(first);
            qb.push(" AND spent_on < ").push_bind(next);
        }
    }
}

#[async_trait]
impl ExpenseRepository for PgExpenseRepository {
    async fn list(&self, filter: &ExpenseFilter, page: PageParams) -> RepoResult<Page<Expense>> {
        let mut count_qb =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM expenses WHERE 1=1");
        push_expense_filters(&mut count_qb, filter);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM expenses WHERE 1=1",
            EXPENSE_COLUMNS
        ));
        push_expense_filters(&mut qb, filter);
        qb.push(" ORDER BY spent_on DESC, created_at DESC LIMIT ")
            .push_bind(page.limit_i64())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let rows: Vec<ExpenseRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        let items = rows
            .into_iter()
            .map(ExpenseRow::into_model)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((items, total))
    }

    async fn find(&self, id: &str) -> RepoResult<Option<Expense>> {
        let row: Option<ExpenseRow> = sqlx::query_as(&format!(
            "SELECT {} FROM expenses WHERE id = $1",
            EXPENSE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.map(ExpenseRow::into_model).transpose()
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

        sqlx::query(
            "INSERT INTO expenses (id, category, description, amount, spent_on, recorded_by, \
             created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(&record.id)
        .bind(record.category.to_string())
        .bind(&record.description)
        .bind(record.amount)
        .bind(record.spent_on)
        .bind(&record.recorded_by)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(record)
    }

    async fn update(&self, id: &str, req: UpdateExpenseRequest) -> RepoResult<Option<Expense>> {
        let Some(mut record) = self.find(id).await? else {
            return Ok(None);
        };

        if let Some(category) = req.category {
            record.category = category;
        }
        if let Some(description) = req.description {
            record.description = description;
        }
        if let Some(amount) = req.amount {
            record.amount = amount;
        }
        if let Some(spent_on) = req.spent_on {
            record.spent_on = spent_on;
        }
        if let Some(recorded_by) = req.recorded_by {
            record.recorded_by = Some(recorded_by);
        }
        record.updated_at = Utc::now();

        sqlx::query(
            "UPDATE expenses SET category = $1, description = $2, amount = $3, spent_on = $4, \
             recorded_by = $5, updated_at = $6 WHERE id = $7",
        )
        .bind(record.category.to_string())
        .bind(&record.description)
        .bind(record.amount)
        .bind(record.spent_on)
        .bind(&record.recorded_by)
        .bind(record.updated_at)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(Some(record))
    }

    async fn delete(&self, id: &str) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }
}

pub struct PgServiceRepository {
    pool: PgPool,
}

impl PgServiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ServiceRow {
    id: String,
    customer_name: String,
    customer_phone: String,
    service_type: String,
    charge: i64,
    cost: i64,
    status: String,
    ordered_on: NaiveDate,
    delivered_on: Option<NaiveDate>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ServiceRow {
    fn into_model(self) -> Result<OtherService, CoreError> {
        Ok(OtherService {
            id: self.id,
            customer_name: self.customer_name,
            customer_phone: self.customer_phone,
            service_type: parse_column(&self.service_type)?,
            charge: self.charge,
            cost: self.cost,
            status: parse_column(&self.status)?,
            ordered_on: self.ordered_on,
            delivered_on: self.delivered_on,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const SERVICE_COLUMNS: &str = "id, customer_name, customer_phone, service_type, charge, cost, \
     status, ordered_on, delivered_on, created_at, updated_at";

fn push_service_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &ServiceFilter) {
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status.to_string());
    }
    if let Some(service_type) = filter.service_type {
        qb.push(" AND service_type = ").push_bind(service_type.to_string());
    }
}

#[async_trait]
impl ServiceRepository for PgServiceRepository {
    async fn list(
        &self,
        filter: &ServiceFilter,
        page: PageParams,
    ) -> RepoResult<Page<OtherService>> {
        let mut count_qb =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM other_services WHERE 1=1");
        push_service_filters(&mut count_qb, filter);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM other_services WHERE 1=1",
            SERVICE_COLUMNS
        ));
        push_service_filters(&mut qb, filter);
        qb.push(" ORDER BY ordered_on DESC, created_at DESC LIMIT ")
            .push_bind(page.limit_i64())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let rows: Vec<ServiceRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        let items = rows
            .into_iter()
            .map(ServiceRow::into_model)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((items, total))
    }

    async fn find(&self, id: &str) -> RepoResult<Option<OtherService>> {
        let row: Option<ServiceRow> = sqlx::query_as(&format!(
            "SELECT {} FROM other_services WHERE id = $1",
            SERVICE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.map(ServiceRow::into_model).transpose()
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

        sqlx::query(
            "INSERT INTO other_services (id, customer_name, customer_phone, service_type, \
             charge, cost, status, ordered_on, delivered_on, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(&record.id)
        .bind(&record.customer_name)
        .bind(&record.customer_phone)
        .bind(record.service_type.to_string())
        .bind(record.charge)
        .bind(record.cost)
        .bind(record.status.to_string())
        .bind(record.ordered_on)
        .bind(record.delivered_on)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(record)
    }

    async fn update(
        &self,
        id: &str,
        req: UpdateServiceRequest,
    ) -> RepoResult<Option<OtherService>> {
        let Some(mut record) = self.find(id).await? else {
            return Ok(None);
        };

        if let Some(name) = req.customer_name {
            record.customer_name = name;
        }
        if let Some(phone) = req.customer_phone {
            record.customer_phone = phone;
        }
        if let Some(service_type) = req.service_type {
            record.service_type = service_type;
        }
        if let Some(charge) = req.charge {
            record.charge = charge;
        }
        if let Some(cost) = req.cost {
            record.cost = cost;
        }
        if let Some(status) = req.status {
            record.status = status;
        }
        if let Some(delivered) = req.delivered_on {
            record.delivered_on = Some(delivered);
        }
        record.updated_at = Utc::now();

        sqlx::query(
            "UPDATE other_services SET customer_name = $1, customer_phone = $2, \
             service_type = $3, charge = $4, cost = $5, status = $6, ordered_on = $7, \
             delivered_on = $8, updated_at = $9 WHERE id = $10",
        )
        .bind(&record.customer_name)
        .bind(&record.customer_phone)
        .bind(record.service_type.to_string())
        .bind(record.charge)
        .bind(record.cost)
        .bind(record.status.to_string())
        .bind(record.ordered_on)
        .bind(record.delivered_on)
        .bind(record.updated_at)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(Some(record))
    }

    async fn delete(&self, id: &str) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM other_services WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }
}

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use safar_core::repository::{HajiFilter, HajiRepository, Page, RepoResult, UmrahFilter, UmrahRepository};
use safar_core::validation::RecordId;
use safar_core::CoreError;
use safar_shared::envelope::PageParams;
use safar_shared::models::hajj::{
    CreateHajiRequest, CreateUmrahRequest, Haji, Umrah, UpdateHajiRequest, UpdateUmrahRequest,
};
use safar_shared::pii::Masked;
use safar_shared::models::hajj::PilgrimStatus;

use crate::{db_err, parse_column};

pub struct PgHajiRepository {
    pool: PgPool,
}

impl PgHajiRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct HajiRow {
    id: String,
    name: String,
    phone: String,
    email: Option<String>,
    passport_no: String,
    national_id: Option<String>,
    package: String,
    season_year: i32,
    package_amount: i64,
    paid_amount: i64,
    status: String,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl HajiRow {
    fn into_model(self) -> Result<Haji, CoreError> {
        Ok(Haji {
            id: self.id,
            name: self.name,
            phone: self.phone,
            email: self.email,
            passport_no: Masked::new(self.passport_no),
            national_id: self.national_id.map(Masked::new),
            package: parse_column(&self.package)?,
            season_year: self.season_year,
            package_amount: self.package_amount,
            paid_amount: self.paid_amount,
            status: parse_column(&self.status)?,
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const HAJI_COLUMNS: &str = "id, name, phone, email, passport_no, national_id, package, \
     season_year, package_amount, paid_amount, status, notes, created_at, updated_at";

fn push_haji_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &HajiFilter) {
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status.to_string());
    }
    if let Some(year) = filter.season_year {
        qb.push(" AND season_year = ").push_bind(year);
    }
    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", search);
        qb.push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR passport_no ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

#[async_trait]
impl HajiRepository for PgHajiRepository {
    async fn list(&self, filter: &HajiFilter, page: PageParams) -> RepoResult<Page<Haji>> {
        let mut count_qb =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM haji WHERE 1=1");
        push_haji_filters(&mut count_qb, filter);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM haji WHERE 1=1",
            HAJI_COLUMNS
        ));
        push_haji_filters(&mut qb, filter);
        qb.push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(page.limit_i64())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let rows: Vec<HajiRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        let items = rows
            .into_iter()
            .map(HajiRow::into_model)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((items, total))
    }

    async fn find(&self, id: &str) -> RepoResult<Option<Haji>> {
        let row: Option<HajiRow> = sqlx::query_as(&format!(
            "SELECT {} FROM haji WHERE id = $1",
            HAJI_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.map(HajiRow::into_model).transpose()
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

        sqlx::query(
            "INSERT INTO haji (id, name, phone, email, passport_no, national_id, package, \
             season_year, package_amount, paid_amount, status, notes, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
        )
        .bind(&record.id)
        .bind(&record.name)
        .bind(&record.phone)
        .bind(&record.email)
        .bind(record.passport_no.as_str())
        .bind(record.national_id.as_ref().map(|n| n.as_str()))
        .bind(record.package.to_string())
        .bind(record.season_year)
        .bind(record.package_amount)
        .bind(record.paid_amount)
        .bind(record.status.to_string())
        .bind(&record.notes)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(record)
    }

    async fn update(&self, id: &str, req: UpdateHajiRequest) -> RepoResult<Option<Haji>> {
        let Some(mut record) = self.find(id).await? else {
            return Ok(None);
        };

        if let Some(name) = req.name {
            record.name = name;
        }
        if let Some(phone) = req.phone {
            record.phone = phone;
        }
        if let Some(email) = req.email {
            record.email = Some(email);
        }
        if let Some(passport_no) = req.passport_no {
            record.passport_no = Masked::new(passport_no);
        }
        if let Some(national_id) = req.national_id {
            record.national_id = Some(Masked::new(national_id));
        }
        if let Some(package) = req.package {
            record.package = package;
        }
        if let Some(year) = req.season_year {
            record.season_year = year;
        }
        if let Some(amount) = req.package_amount {
            record.package_amount = amount;
        }
        if let Some(paid) = req.paid_amount {
            record.paid_amount = paid;
        }
        if let Some(status) = req.status {
            record.status = status;
        }
        if let Some(notes) = req.notes {
            record.notes = Some(notes);
        }
        record.updated_at = Utc::now();

        sqlx::query(
            "UPDATE haji SET name = $1, phone = $2, email = $3, passport_no = $4, \
             national_id = $5, package = $6, season_year = $7, package_amount = $8, \
             paid_amount = $9, status = $10, notes = $11, updated_at = $12 WHERE id = $13",
        )
        .bind(&record.name)
        .bind(&record.phone)
        .bind(&record.email)
        .bind(record.passport_no.as_str())
        .bind(record.national_id.as_ref().map(|n| n.as_str()))
        .bind(record.package.to_string())
        .bind(record.season_year)
        .bind(record.package_amount)
        .bind(record.paid_amount)
        .bind(record.status.to_string())
        .bind(&record.notes)
        .bind(record.updated_at)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(Some(record))
    }

    async fn delete(&self, id: &str) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM haji WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }
}

pub struct PgUmrahRepository {
    pool: PgPool,
}

impl PgUmrahRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UmrahRow {
    id: String,
    name: String,
    phone: String,
    email: Option<String>,
    passport_no: String,
    package_amount: i64,
    paid_amount: i64,
    departure_date: Option<NaiveDate>,
    return_date: Option<NaiveDate>,
    status: String,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UmrahRow {
    fn into_model(self) -> Result<Umrah, CoreError> {
        Ok(Umrah {
            id: self.id,
            name: self.name,
            phone: self.phone,
            email: self.email,
            passport_no: Masked::new(self.passport_no),
            package_amount: self.package_amount,
            paid_amount: self.paid_amount,
            departure_date: self.departure_date,
            return_date: self.return_date,
            status: parse_column(&self.status)?,
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const UMRAH_COLUMNS: &str = "id, name, phone, email, passport_no, package_amount, paid_amount, \
     departure_date, return_date, status, notes, created_at, updated_at";

fn push_umrah_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &UmrahFilter) {
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status.to_string());
    }
    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", search);
        qb.push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR passport_no ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

#[async_trait]
impl UmrahRepository for PgUmrahRepository {
    async fn list(&self, filter: &UmrahFilter, page: PageParams) -> RepoResult<Page<Umrah>> {
        let mut count_qb =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM umrah WHERE 1=1");
        push_umrah_filters(&mut count_qb, filter);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM umrah WHERE 1=1",
            UMRAH_COLUMNS
        ));
        push_umrah_filters(&mut qb, filter);
        qb.push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(page.limit_i64())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let rows: Vec<UmrahRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        let items = rows
            .into_iter()
            .map(UmrahRow::into_model)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((items, total))
    }

    async fn find(&self, id: &str) -> RepoResult<Option<Umrah>> {
        let row: Option<UmrahRow> = sqlx::query_as(&format!(
            "SELECT {} FROM umrah WHERE id = $1",
            UMRAH_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.map(UmrahRow::into_model).transpose()
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

        sqlx::query(
            "INSERT INTO umrah (id, name, phone, email, passport_no, package_amount, \
             paid_amount, departure_date, return_date, status, notes, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(&record.id)
        .bind(&record.name)
        .bind(&record.phone)
        .bind(&record.email)
        .bind(record.passport_no.as_str())
        .bind(record.package_amount)
        .bind(record.paid_amount)
        .bind(record.departure_date)
        .bind(record.return_date)
        .bind(record.status.to_string())
        .bind(&record.notes)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(record)
    }

    async fn update(&self, id: &str, req: UpdateUmrahRequest) -> RepoResult<Option<Umrah>> {
        let Some(mut record) = self.find(id).await? else {
            return Ok(None);
        };

        if let Some(name) = req.name {
            record.name = name;
        }
        if let Some(phone) = req.phone {
            record.phone = phone;
        }
        if let Some(email) = req.email {
            record.email = Some(email);
        }
        if let Some(passport_no) = req.passport_no {
            record.passport_no = Masked::new(passport_no);
        }
        if let Some(amount) = req.package_amount {
            record.package_amount = amount;
        }
        if let Some(paid) = req.paid_amount {
            record.paid_amount = paid;
        }
        if let Some(departure) = req.departure_date {
            record.departure_date = Some(departure);
        }
        if let Some(ret) = req.return_date {
            record.return_date = Some(ret);
        }
        if let Some(status) = req.status {
            record.status = status;
        }
        if let Some(notes) = req.notes {
            record.notes = Some(notes);
        }
        record.updated_at = Utc::now();

        sqlx::query(
            "UPDATE umrah SET name = $1, phone = $2, email = $3, passport_no = $4, \
             package_amount = $5, paid_amount = $6, departure_date = $7, return_date = $8, \
             status = $9, notes = $10, updated_at = $11 WHERE id = $12",
        )
        .bind(&record.name)
        .bind(&record.phone)
        .bind(&record.email)
        .bind(record.passport_no.as_str())
        .bind(record.package_amount)
        .bind(record.paid_amount)
        .bind(record.departure_date)
        .bind(record.return_date)
        .bind(record.status.to_string())
        .bind(&record.notes)
        .bind(record.updated_at)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(Some(record))
    }

    async fn delete(&self, id: &str) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM umrah WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }
}

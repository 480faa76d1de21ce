use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use safar_core::repository::{
    CattleFilter, CattleRepository, HealthFilter, HealthRepository, Page, RepoResult,
};
use safar_core::validation::RecordId;
use safar_core::CoreError;
use safar_shared::envelope::PageParams;
use safar_shared::models::farm::{
    Cattle, CattleStatus, CreateCattleRequest, CreateHealthRecordRequest, HealthRecord,
    UpdateCattleRequest, UpdateHealthRecordRequest,
};

use crate::{db_err, parse_column};

pub struct PgCattleRepository {
    pool: PgPool,
}

impl PgCattleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CattleRow {
    id: String,
    tag_no: String,
    breed: Option<String>,
    gender: String,
    date_of_birth: Option<NaiveDate>,
    weight_kg: Option<f64>,
    purchase_price: Option<i64>,
    purchased_on: Option<NaiveDate>,
    status: String,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CattleRow {
    fn into_model(self) -> Result<Cattle, CoreError> {
        Ok(Cattle {
            id: self.id,
            tag_no: self.tag_no,
            breed: self.breed,
            gender: parse_column(&self.gender)?,
            date_of_birth: self.date_of_birth,
            weight_kg: self.weight_kg,
            purchase_price: self.purchase_price,
            purchased_on: self.purchased_on,
            status: parse_column(&self.status)?,
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const CATTLE_COLUMNS: &str = "id, tag_no, breed, gender, date_of_birth, weight_kg, \
     purchase_price, purchased_on, status, notes, created_at, updated_at";

fn push_cattle_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &CattleFilter) {
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status.to_string());
    }
    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", search);
        qb.push(" AND (tag_no ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR breed ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

#[async_trait]
impl CattleRepository for PgCattleRepository {
    async fn list(&self, filter: &CattleFilter, page: PageParams) -> RepoResult<Page<Cattle>> {
        let mut count_qb =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM cattle WHERE 1=1");
        push_cattle_filters(&mut count_qb, filter);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM cattle WHERE 1=1",
            CATTLE_COLUMNS
        ));
        push_cattle_filters(&mut qb, filter);
        qb.push(" ORDER BY tag_no LIMIT ")
            .push_bind(page.limit_i64())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let rows: Vec<CattleRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        let items = rows
            .into_iter()
            .map(CattleRow::into_model)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((items, total))
    }

    async fn find(&self, id: &str) -> RepoResult<Option<Cattle>> {
        let row: Option<CattleRow> = sqlx::query_as(&format!(
            "SELECT {} FROM cattle WHERE id = $1",
            CATTLE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.map(CattleRow::into_model).transpose()
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

        sqlx::query(
            "INSERT INTO cattle (id, tag_no, breed, gender, date_of_birth, weight_kg, \
             purchase_price, purchased_on, status, notes, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(&record.id)
        .bind(&record.tag_no)
        .bind(&record.breed)
        .bind(record.gender.to_string())
        .bind(record.date_of_birth)
        .bind(record.weight_kg)
        .bind(record.purchase_price)
        .bind(record.purchased_on)
        .bind(record.status.to_string())
        .bind(&record.notes)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(record)
    }

    async fn update(&self, id: &str, req: UpdateCattleRequest) -> RepoResult<Option<Cattle>> {
        let Some(mut record) = self.find(id).await? else {
            return Ok(None);
        };

        if let Some(tag_no) = req.tag_no {
            record.tag_no = tag_no;
        }
        if let Some(breed) = req.breed {
            record.breed = Some(breed);
        }
        if let Some(gender) = req.gender {
            record.gender = gender;
        }
        if let Some(dob) = req.date_of_birth {
            record.date_of_birth = Some(dob);
        }
        if let Some(weight) = req.weight_kg {
            record.weight_kg = Some(weight);
        }
        if let Some(price) = req.purchase_price {
            record.purchase_price = Some(price);
        }
        if let Some(purchased) = req.purchased_on {
            record.purchased_on = Some(purchased);
        }
        if let Some(status) = req.status {
            record.status = status;
        }
        if let Some(notes) = req.notes {
            record.notes = Some(notes);
        }
        record.updated_at = Utc::now();

        sqlx::query(
            "UPDATE cattle SET tag_no = $1, breed = $2, gender = $3, date_of_birth = $4, \
             weight_kg = $5, purchase_price = $6, purchased_on = $7, status = $8, notes = $9, \
             updated_at = $10 WHERE id = $11",
        )
        .bind(&record.tag_no)
        .bind(&record.breed)
        .bind(record.gender.to_string())
        .bind(record.date_of_birth)
        .bind(record.weight_kg)
        .bind(record.purchase_price)
        .bind(record.purchased_on)
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
        let result = sqlx::query("DELETE FROM cattle WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }
}

pub struct PgHealthRepository {
    pool: PgPool,
}

impl PgHealthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct HealthRow {
    id: String,
    cattle_id: String,
    record_date: NaiveDate,
    diagnosis: String,
    treatment: Option<String>,
    vet_name: Option<String>,
    cost: i64,
    next_visit: Option<NaiveDate>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl HealthRow {
    fn into_model(self) -> HealthRecord {
        HealthRecord {
            id: self.id,
            cattle_id: self.cattle_id,
            record_date: self.record_date,
            diagnosis: self.diagnosis,
            treatment: self.treatment,
            vet_name: self.vet_name,
            cost: self.cost,
            next_visit: self.next_visit,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

const HEALTH_COLUMNS: &str = "id, cattle_id, record_date, diagnosis, treatment, vet_name, \
     cost, next_visit, created_at, updated_at";

#[async_trait]
impl HealthRepository for PgHealthRepository {
    async fn list(
        &self,
        filter: &HealthFilter,
        page: PageParams,
    ) -> RepoResult<Page<HealthRecord>> {
        let mut count_qb =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM health_records WHERE 1=1");
        if let Some(cattle_id) = &filter.cattle_id {
            count_qb.push(" AND cattle_id = ").push_bind(cattle_id.clone());
        }
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM health_records WHERE 1=1",
            HEALTH_COLUMNS
        ));
        if let Some(cattle_id) = &filter.cattle_id {
            qb.push(" AND cattle_id = ").push_bind(cattle_id.clone());
        }
        qb.push(" ORDER BY record_date DESC LIMIT ")
            .push_bind(page.limit_i64())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let rows: Vec<HealthRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        Ok((rows.into_iter().map(HealthRow::into_model).collect(), total))
    }

    async fn find(&self, id: &str) -> RepoResult<Option<HealthRecord>> {
        let row: Option<HealthRow> = sqlx::query_as(&format!(
            "SELECT {} FROM health_records WHERE id = $1",
            HEALTH_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(row.map(HealthRow::into_model))
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

        sqlx::query(
            "INSERT INTO health_records (id, cattle_id, record_date, diagnosis, treatment, \
             vet_name, cost, next_visit, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(&record.id)
        .bind(&record.cattle_id)
        .bind(record.record_date)
        .bind(&record.diagnosis)
        .bind(&record.treatment)
        .bind(&record.vet_name)
        .bind(record.cost)
        .bind(record.next_visit)
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
        req: UpdateHealthRecordRequest,
    ) -> RepoResult<Option<HealthRecord>> {
        let Some(mut record) = self.find(id).await? else {
            return Ok(None);
        };

        if let Some(date) = req.record_date {
            record.record_date = date;
        }
        if let Some(diagnosis) = req.diagnosis {
            record.diagnosis = diagnosis;
        }
        if let Some(treatment) = req.treatment {
            record.treatment = Some(treatment);
        }
        if let Some(vet) = req.vet_name {
            record.vet_name = Some(vet);
        }
        if let Some(cost) = req.cost {
            record.cost = cost;
        }
        if let Some(next) = req.next_visit {
            record.next_visit = Some(next);
        }
        record.updated_at = Utc::now();

        sqlx::query(
            "UPDATE health_records SET record_date = $1, diagnosis = $2, treatment = $3, \
             vet_name = $4, cost = $5, next_visit = $6, updated_at = $7 WHERE id = $8",
        )
        .bind(record.record_date)
        .bind(&record.diagnosis)
        .bind(&record.treatment)
        .bind(&record.vet_name)
        .bind(record.cost)
        .bind(record.next_visit)
        .bind(record.updated_at)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(Some(record))
    }

    async fn delete(&self, id: &str) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM health_records WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }
}

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use safar_core::repository::{MilkFilter, MilkRepository, Page, RepoResult};
use safar_core::validation::RecordId;
use safar_core::CoreError;
use safar_shared::envelope::PageParams;
use safar_shared::models::farm::{CreateMilkRecordRequest, MilkRecord, UpdateMilkRecordRequest};

use crate::{db_err, parse_column};

pub struct PgMilkRepository {
    pool: PgPool,
}

impl PgMilkRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct MilkRow {
    id: String,
    cattle_id: String,
    record_date: NaiveDate,
    session: String,
    quantity_litres: f64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl MilkRow {
    fn into_model(self) -> Result<MilkRecord, CoreError> {
        Ok(MilkRecord {
            id: self.id,
            cattle_id: self.cattle_id,
            record_date: self.record_date,
            session: parse_column(&self.session)?,
            quantity_litres: self.quantity_litres,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const MILK_COLUMNS: &str =
    "id, cattle_id, record_date, session, quantity_litres, created_at, updated_at";

fn push_milk_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &MilkFilter) {
    if let Some(cattle_id) = &filter.cattle_id {
        qb.push(" AND cattle_id = ").push_bind(cattle_id.clone());
    }
    if let Some(from) = filter.from {
        qb.push(" AND record_date >= ").push_bind(from);
    }
    if let Some(to) = filter.to {
        qb.push(" AND record_date <= ").push_bind(to);
    }
}

#[async_trait]
impl MilkRepository for PgMilkRepository {
    async fn list(&self, filter: &MilkFilter, page: PageParams) -> RepoResult<Page<MilkRecord>> {
        let mut count_qb =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM milk_records WHERE 1=1");
        push_milk_filters(&mut count_qb, filter);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM milk_records WHERE 1=1",
            MILK_COLUMNS
        ));
        push_milk_filters(&mut qb, filter);
        qb.push(" ORDER BY record_date DESC, session LIMIT ")
            .push_bind(page.limit_i64())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let rows: Vec<MilkRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        let items = rows
            .into_iter()
            .map(MilkRow::into_model)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((items, total))
    }

    async fn find(&self, id: &str) -> RepoResult<Option<MilkRecord>> {
        let row: Option<MilkRow> = sqlx::query_as(&format!(
            "SELECT {} FROM milk_records WHERE id = $1",
            MILK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.map(MilkRow::into_model).transpose()
    }

    async fn create(&self, req: CreateMilkRecordRequest) -> RepoResult<MilkRecord> {
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

        // The (cattle_id, record_date, session) unique index turns a double
        // entry into CoreError::Conflict via db_err.
        sqlx::query(
            "INSERT INTO milk_records (id, cattle_id, record_date, session, quantity_litres, \
             created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(&record.id)
        .bind(&record.cattle_id)
        .bind(record.record_date)
        .bind(record.session.to_string())
        .bind(record.quantity_litres)
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
        req: UpdateMilkRecordRequest,
    ) -> RepoResult<Option<MilkRecord>> {
        let Some(mut record) = self.find(id).await? else {
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

        sqlx::query(
            "UPDATE milk_records SET record_date = $1, session = $2, quantity_litres = $3, \
             updated_at = $4 WHERE id = $5",
        )
        .bind(record.record_date)
        .bind(record.session.to_string())
        .bind(record.quantity_litres)
        .bind(record.updated_at)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(Some(record))
    }

    async fn delete(&self, id: &str) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM milk_records WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_range(&self, filter: &MilkFilter) -> RepoResult<Vec<MilkRecord>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM milk_records WHERE 1=1",
            MILK_COLUMNS
        ));
        push_milk_filters(&mut qb, filter);
        qb.push(" ORDER BY cattle_id, record_date, session");

        let rows: Vec<MilkRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        rows.into_iter().map(MilkRow::into_model).collect()
    }
}

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use tracing::info;

use safar_core::repository::{FeedRepository, Page, RepoResult};
use safar_core::validation::RecordId;
use safar_core::CoreError;
use safar_shared::envelope::PageParams;
use safar_shared::models::farm::{
    CreateFeedRequest, CreateFeedTransactionRequest, Feed, FeedTransaction, UpdateFeedRequest,
};

use crate::{db_err, parse_column};

pub struct PgFeedRepository {
    pool: PgPool,
}

impl PgFeedRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct FeedRow {
    id: String,
    name: String,
    unit: String,
    quantity_on_hand: f64,
    unit_cost: i64,
    reorder_level: Option<f64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl FeedRow {
    fn into_model(self) -> Result<Feed, CoreError> {
        Ok(Feed {
            id: self.id,
            name: self.name,
            unit: parse_column(&self.unit)?,
            quantity_on_hand: self.quantity_on_hand,
            unit_cost: self.unit_cost,
            reorder_level: self.reorder_level,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct FeedTransactionRow {
    id: String,
    feed_id: String,
    kind: String,
    quantity: f64,
    unit_cost: Option<i64>,
    occurred_on: NaiveDate,
    note: Option<String>,
    created_at: DateTime<Utc>,
}

impl FeedTransactionRow {
    fn into_model(self) -> Result<FeedTransaction, CoreError> {
        Ok(FeedTransaction {
            id: self.id,
            feed_id: self.feed_id,
            kind: parse_column(&self.kind)?,
            quantity: self.quantity,
            unit_cost: self.unit_cost,
            occurred_on: self.occurred_on,
            note: self.note,
            created_at: self.created_at,
        })
    }
}

const FEED_COLUMNS: &str =
    "id, name, unit, quantity_on_hand, unit_cost, reorder_level, created_at, updated_at";

#[async_trait]
impl FeedRepository for PgFeedRepository {
    async fn list(&self, page: PageParams) -> RepoResult<Page<Feed>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM feeds")
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;

        let rows: Vec<FeedRow> = sqlx::query_as(&format!(
            "SELECT {} FROM feeds ORDER BY name LIMIT $1 OFFSET $2",
            FEED_COLUMNS
        ))
        .bind(page.limit_i64())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        let items = rows
            .into_iter()
            .map(FeedRow::into_model)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((items, total))
    }

    async fn find(&self, id: &str) -> RepoResult<Option<Feed>> {
        let row: Option<FeedRow> = sqlx::query_as(&format!(
            "SELECT {} FROM feeds WHERE id = $1",
            FEED_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.map(FeedRow::into_model).transpose()
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

        sqlx::query(
            "INSERT INTO feeds (id, name, unit, quantity_on_hand, unit_cost, reorder_level, \
             created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(&record.id)
        .bind(&record.name)
        .bind(record.unit.to_string())
        .bind(record.quantity_on_hand)
        .bind(record.unit_cost)
        .bind(record.reorder_level)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(record)
    }

    async fn update(&self, id: &str, req: UpdateFeedRequest) -> RepoResult<Option<Feed>> {
        let Some(mut record) = self.find(id).await? else {
            return Ok(None);
        };

        if let Some(name) = req.name {
            record.name = name;
        }
        if let Some(unit) = req.unit {
            record.unit = unit;
        }
        if let Some(cost) = req.unit_cost {
            record.unit_cost = cost;
        }
        if let Some(level) = req.reorder_level {
            record.reorder_level = Some(level);
        }
        record.updated_at = Utc::now();

        sqlx::query(
            "UPDATE feeds SET name = $1, unit = $2, unit_cost = $3, reorder_level = $4, \
             updated_at = $5 WHERE id = $6",
        )
        .bind(&record.name)
        .bind(record.unit.to_string())
        .bind(record.unit_cost)
        .bind(record.reorder_level)
        .bind(record.updated_at)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(Some(record))
    }

    async fn delete(&self, id: &str) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM feeds WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn record_transaction(
        &self,
        feed_id: &str,
        req: CreateFeedTransactionRequest,
        new_level: f64,
    ) -> RepoResult<FeedTransaction> {
        let now = Utc::now();
        let record = FeedTransaction {
            id: RecordId::generate().into_string(),
            feed_id: feed_id.to_string(),
            kind: req.kind,
            quantity: req.quantity,
            unit_cost: req.unit_cost,
            occurred_on: req.occurred_on,
            note: req.note,
            created_at: now,
        };

        // The transaction row and the stock level must move together.
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        sqlx::query(
            "INSERT INTO feed_transactions (id, feed_id, kind, quantity, unit_cost, \
             occurred_on, note, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(&record.id)
        .bind(&record.feed_id)
        .bind(record.kind.to_string())
        .bind(record.quantity)
        .bind(record.unit_cost)
        .bind(record.occurred_on)
        .bind(&record.note)
        .bind(record.created_at)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        sqlx::query("UPDATE feeds SET quantity_on_hand = $1, updated_at = $2 WHERE id = $3")
            .bind(new_level)
            .bind(now)
            .bind(feed_id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;

        info!(
            "Feed {} {} {} -> level {}",
            feed_id, record.kind, record.quantity, new_level
        );

        Ok(record)
    }

    async fn list_transactions(&self, feed_id: &str) -> RepoResult<Vec<FeedTransaction>> {
        let rows: Vec<FeedTransactionRow> = sqlx::query_as(
            "SELECT id, feed_id, kind, quantity, unit_cost, occurred_on, note, created_at \
             FROM feed_transactions WHERE feed_id = $1 ORDER BY occurred_on DESC, created_at DESC",
        )
        .bind(feed_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(FeedTransactionRow::into_model).collect()
    }
}

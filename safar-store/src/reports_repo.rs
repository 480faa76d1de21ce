use async_trait::async_trait;
use sqlx::PgPool;

use safar_core::repository::{ReportsRepository, RepoResult};
use safar_shared::models::reports::DashboardSummary;

use crate::db_err;

pub struct PgReportsRepository {
    pool: PgPool,
}

impl PgReportsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn count(&self, sql: &str) -> RepoResult<i64> {
        sqlx::query_scalar(sql)
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)
    }
}

#[async_trait]
impl ReportsRepository for PgReportsRepository {
    async fn dashboard(&self) -> RepoResult<DashboardSummary> {
        let haji_total = self.count("SELECT COUNT(*) FROM haji").await?;
        let umrah_total = self.count("SELECT COUNT(*) FROM umrah").await?;
        let active_cattle = self
            .count("SELECT COUNT(*) FROM cattle WHERE status = 'ACTIVE'")
            .await?;
        let tickets_issued = self
            .count("SELECT COUNT(*) FROM air_tickets WHERE status = 'ISSUED'")
            .await?;
        let active_employees = self
            .count("SELECT COUNT(*) FROM employees WHERE is_active")
            .await?;
        let pending_services = self
            .count("SELECT COUNT(*) FROM other_services WHERE status = 'PENDING'")
            .await?;

        // SUM(bigint) comes back NUMERIC, cast to keep the scalar i64.
        let (ticket_sales, ticket_margin): (i64, i64) = sqlx::query_as(
            "SELECT CAST(COALESCE(SUM(sale_price), 0) AS BIGINT), \
             CAST(COALESCE(SUM(sale_price - purchase_price), 0) AS BIGINT) \
             FROM air_tickets WHERE status = 'ISSUED'",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(DashboardSummary {
            haji_total,
            umrah_total,
            active_cattle,
            tickets_issued,
            active_employees,
            pending_services,
            ticket_sales,
            ticket_margin,
        })
    }
}

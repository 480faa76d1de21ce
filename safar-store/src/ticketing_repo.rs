use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use safar_core::repository::{
    AirlineFilter, AirlineRepository, Page, RepoResult, TicketFilter, TicketRepository,
};
use safar_core::validation::RecordId;
use safar_core::CoreError;
use safar_shared::envelope::PageParams;
use safar_shared::models::ticketing::{
    AirTicket, Airline, CreateAirlineRequest, CreateTicketRequest, TicketStatus,
    UpdateAirlineRequest, UpdateTicketRequest,
};

use crate::{db_err, parse_column};

pub struct PgAirlineRepository {
    pool: PgPool,
}

impl PgAirlineRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct AirlineRow {
    id: String,
    name: String,
    code: String,
    contact_phone: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AirlineRow {
    fn into_model(self) -> Airline {
        Airline {
            id: self.id,
            name: self.name,
            code: self.code,
            contact_phone: self.contact_phone,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

const AIRLINE_COLUMNS: &str =
    "id, name, code, contact_phone, is_active, created_at, updated_at";

fn push_airline_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &AirlineFilter) {
    if let Some(active) = filter.is_active {
        qb.push(" AND is_active = ").push_bind(active);
    }
    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", search);
        qb.push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR code ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

#[async_trait]
impl AirlineRepository for PgAirlineRepository {
    async fn list(&self, filter: &AirlineFilter, page: PageParams) -> RepoResult<Page<Airline>> {
        let mut count_qb =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM airlines WHERE 1=1");
        push_airline_filters(&mut count_qb, filter);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM airlines WHERE 1=1",
            AIRLINE_COLUMNS
        ));
        push_airline_filters(&mut qb, filter);
        qb.push(" ORDER BY name LIMIT ")
            .push_bind(page.limit_i64())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let rows: Vec<AirlineRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        Ok((rows.into_iter().map(AirlineRow::into_model).collect(), total))
    }

    async fn find(&self, id: &str) -> RepoResult<Option<Airline>> {
        let row: Option<AirlineRow> = sqlx::query_as(&format!(
            "SELECT {} FROM airlines WHERE id = $1",
            AIRLINE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(row.map(AirlineRow::into_model))
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

        sqlx::query(
            "INSERT INTO airlines (id, name, code, contact_phone, is_active, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(&record.id)
        .bind(&record.name)
        .bind(&record.code)
        .bind(&record.contact_phone)
        .bind(record.is_active)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(record)
    }

    async fn update(&self, id: &str, req: UpdateAirlineRequest) -> RepoResult<Option<Airline>> {
        let Some(mut record) = self.find(id).await? else {
            return Ok(None);
        };

        if let Some(name) = req.name {
            record.name = name;
        }
        if let Some(code) = req.code {
            record.code = code;
        }
        if let Some(phone) = req.contact_phone {
            record.contact_phone = Some(phone);
        }
        if let Some(active) = req.is_active {
            record.is_active = active;
        }
        record.updated_at = Utc::now();

        sqlx::query(
            "UPDATE airlines SET name = $1, code = $2, contact_phone = $3, is_active = $4, \
             updated_at = $5 WHERE id = $6",
        )
        .bind(&record.name)
        .bind(&record.code)
        .bind(&record.contact_phone)
        .bind(record.is_active)
        .bind(record.updated_at)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(Some(record))
    }

    async fn delete(&self, id: &str) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM airlines WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }
}

pub struct PgTicketRepository {
    pool: PgPool,
}

impl PgTicketRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct TicketRow {
    id: String,
    airline_id: String,
    passenger_name: String,
    pnr: String,
    travel_date: NaiveDate,
    origin: String,
    destination: String,
    purchase_price: i64,
    sale_price: i64,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TicketRow {
    fn into_model(self) -> Result<AirTicket, CoreError> {
        Ok(AirTicket {
            id: self.id,
            airline_id: self.airline_id,
            passenger_name: self.passenger_name,
            pnr: self.pnr,
            travel_date: self.travel_date,
            origin: self.origin,
            destination: self.destination,
            purchase_price: self.purchase_price,
            sale_price: self.sale_price,
            status: parse_column(&self.status)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const TICKET_COLUMNS: &str = "id, airline_id, passenger_name, pnr, travel_date, origin, \
     destination, purchase_price, sale_price, status, created_at, updated_at";

fn push_ticket_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &TicketFilter) {
    if let Some(airline_id) = &filter.airline_id {
        qb.push(" AND airline_id = ").push_bind(airline_id.clone());
    }
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status.to_string());
    }
}

#[async_trait]
impl TicketRepository for PgTicketRepository {
    async fn list(&self, filter: &TicketFilter, page: PageParams) -> RepoResult<Page<AirTicket>> {
        let mut count_qb =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM air_tickets WHERE 1=1");
        push_ticket_filters(&mut count_qb, filter);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM air_tickets WHERE 1=1",
            TICKET_COLUMNS
        ));
        push_ticket_filters(&mut qb, filter);
        qb.push(" ORDER BY travel_date DESC, created_at DESC LIMIT ")
            .push_bind(page.limit_i64())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let rows: Vec<TicketRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        let items = rows
            .into_iter()
            .map(TicketRow::into_model)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((items, total))
    }

    async fn find(&self, id: &str) -> RepoResult<Option<AirTicket>> {
        let row: Option<TicketRow> = sqlx::query_as(&format!(
            "SELECT {} FROM air_tickets WHERE id = $1",
            TICKET_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.map(TicketRow::into_model).transpose()
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

        sqlx::query(
            "INSERT INTO air_tickets (id, airline_id, passenger_name, pnr, travel_date, origin, \
             destination, purchase_price, sale_price, status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(&record.id)
        .bind(&record.airline_id)
        .bind(&record.passenger_name)
        .bind(&record.pnr)
        .bind(record.travel_date)
        .bind(&record.origin)
        .bind(&record.destination)
        .bind(record.purchase_price)
        .bind(record.sale_price)
        .bind(record.status.to_string())
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(record)
    }

    async fn update(&self, id: &str, req: UpdateTicketRequest) -> RepoResult<Option<AirTicket>> {
        let Some(mut record) = self.find(id).await? else {
            return Ok(None);
        };

        if let Some(name) = req.passenger_name {
            record.passenger_name = name;
        }
        if let Some(pnr) = req.pnr {
            record.pnr = pnr;
        }
        if let Some(date) = req.travel_date {
            record.travel_date = date;
        }
        if let Some(origin) = req.origin {
            record.origin = origin;
        }
        if let Some(destination) = req.destination {
            record.destination = destination;
        }
        if let Some(price) = req.purchase_price {
            record.purchase_price = price;
        }
        if let Some(price) = req.sale_price {
            record.sale_price = price;
        }
        if let Some(status) = req.status {
            record.status = status;
        }
        record.updated_at = Utc::now();

        sqlx::query(
            "UPDATE air_tickets SET passenger_name = $1, pnr = $2, travel_date = $3, \
             origin = $4, destination = $5, purchase_price = $6, sale_price = $7, \
             status = $8, updated_at = $9 WHERE id = $10",
        )
        .bind(&record.passenger_name)
        .bind(&record.pnr)
        .bind(record.travel_date)
        .bind(&record.origin)
        .bind(&record.destination)
        .bind(record.purchase_price)
        .bind(record.sale_price)
        .bind(record.status.to_string())
        .bind(record.updated_at)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(Some(record))
    }

    async fn delete(&self, id: &str) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM air_tickets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }
}

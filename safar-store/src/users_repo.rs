use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use safar_core::repository::{RepoResult, UserRepository};
use safar_core::validation::RecordId;
use safar_core::CoreError;
use safar_shared::models::auth::{User, UserRole};

use crate::{db_err, parse_column};

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_model(self) -> Result<User, CoreError> {
        Ok(User {
            id: self.id,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            role: parse_column(&self.role)?,
            created_at: self.created_at,
        })
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, name, email, password_hash, role, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.map(UserRow::into_model).transpose()
    }

    async fn count(&self) -> RepoResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)
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

        sqlx::query(
            "INSERT INTO users (id, name, email, password_hash, role, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(&record.id)
        .bind(&record.name)
        .bind(&record.email)
        .bind(&record.password_hash)
        .bind(record.role.to_string())
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(record)
    }
}

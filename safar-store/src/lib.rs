pub mod app_config;
pub mod cache;
pub mod cattle_repo;
pub mod database;
pub mod feed_repo;
pub mod hajj_repo;
pub mod milk_repo;
pub mod office_repo;
pub mod reports_repo;
pub mod ticketing_repo;
pub mod users_repo;

pub use cache::{Cache, MemoryCache, RedisCache};
pub use database::DbClient;

use safar_core::CoreError;

/// Map driver errors onto the domain error type. Unique violations are the
/// one case handlers care to distinguish.
pub(crate) fn db_err(err: sqlx::Error) -> CoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            CoreError::Conflict("A record with the same unique fields already exists".to_string())
        }
        _ => CoreError::Internal(err.to_string()),
    }
}

/// Status columns are TEXT; a row that fails to parse is corrupt data, not
/// caller error.
pub(crate) fn parse_column<T: std::str::FromStr<Err = String>>(value: &str) -> Result<T, CoreError> {
    value.parse::<T>().map_err(CoreError::Internal)
}

pub mod envelope;
pub mod models;
pub mod pii;

pub use envelope::{ApiResponse, ListResponse, PageParams, Pagination};
pub use pii::Masked;

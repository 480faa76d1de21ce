use serde::{Deserialize, Serialize};

/// The `{success, data, message}` body every endpoint responds with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
        }
    }

    /// Success body with no payload, e.g. after a delete.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
        }
    }

    /// Failure body; the message is what clients surface to the user.
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }
}

/// The `{success, data, pagination}` body returned by collection endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub success: bool,
    pub data: Vec<T>,
    pub pagination: Pagination,
}

impl<T> ListResponse<T> {
    pub fn new(data: Vec<T>, pagination: Pagination) -> Self {
        Self {
            success: true,
            data,
            pagination,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub total_pages: i64,
}

impl Pagination {
    pub fn new(params: PageParams, total: i64) -> Self {
        let params = params.normalized();
        let limit = i64::from(params.limit);
        let total_pages = if total <= 0 { 0 } else { (total + limit - 1) / limit };
        Self {
            page: params.page,
            limit: params.limit,
            total,
            total_pages,
        }
    }
}

/// Common `?page=&limit=` query parameters shared by every list endpoint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageParams {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

const MAX_LIMIT: u32 = 100;

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    20
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
        }
    }
}

impl PageParams {
    /// Build from raw `?page=&limit=` query values, already normalized.
    pub fn from_query(page: Option<u32>, limit: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or_else(default_page),
            limit: limit.unwrap_or_else(default_limit),
        }
        .normalized()
    }

    /// Clamp out-of-range values instead of rejecting the request.
    pub fn normalized(self) -> Self {
        Self {
            page: self.page.max(1),
            limit: self.limit.clamp(1, MAX_LIMIT),
        }
    }

    pub fn offset(&self) -> i64 {
        let p = self.normalized();
        i64::from(p.page - 1) * i64::from(p.limit)
    }

    pub fn limit_i64(&self) -> i64 {
        i64::from(self.normalized().limit)
    }
}

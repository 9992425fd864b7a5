//! # Common API Types
//!
//! Response envelopes shared by every handler.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::pagination::Page;

/// Uniform response envelope
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    /// Whether the operation succeeded
    pub is_success: bool,
    /// Short human-readable outcome
    #[schema(example = "Get data successfully.")]
    pub message: String,
    /// Underlying cause of a failure
    pub error: Option<String>,
    /// Operation payload
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Successful outcome carrying `data`.
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            is_success: true,
            message: message.into(),
            error: None,
            data: Some(data),
        }
    }

    /// Handled failure; `data` stays empty unless set with [`Self::with_data`].
    pub fn failure(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            is_success: false,
            message: message.into(),
            error: Some(error.into()),
            data: None,
        }
    }

    pub fn with_data(mut self, data: T) -> Self {
        self.data = Some(data);
        self
    }
}

/// Envelope for paginated listings, with absolute links to adjacent pages
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T> {
    pub is_success: bool,
    pub message: String,
    pub error: Option<String>,
    pub data: Page<T>,
    /// Absolute URL of the next page, null on the last page
    #[schema(example = "http://localhost:8080/users?page=3")]
    pub next_page_url: Option<String>,
    /// Absolute URL of the previous page, null on the first page
    #[schema(example = "http://localhost:8080/users?page=1")]
    pub previous_page_url: Option<String>,
}

impl<T> PaginatedResponse<T> {
    pub fn success(
        message: impl Into<String>,
        data: Page<T>,
        next_page_url: Option<String>,
        previous_page_url: Option<String>,
    ) -> Self {
        Self {
            is_success: true,
            message: message.into(),
            error: None,
            data,
            next_page_url,
            previous_page_url,
        }
    }
}

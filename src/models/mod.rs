//! # Data Models
//!
//! This module contains the SeaORM entities used throughout the ONG backend.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod organization;
pub mod role;
pub mod user;

pub use organization::Entity as Organization;
pub use role::Entity as Role;
pub use user::Entity as User;

/// Basic service information response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    /// The name of the service
    pub service: String,
    /// The version of the service
    pub version: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            service: "ong-backend".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

//! # Services
//!
//! Business operations behind the HTTP handlers. Services borrow the shared
//! resources held in [`crate::server::AppState`] for the duration of a call.

pub mod auth;
pub mod users;

pub use auth::{AuthService, AuthenticatedUser, RegisterUser};
pub use users::{UserListing, UserService, UserUpdate};

//! # ONG Backend Library
//!
//! Users and authentication API for a non-profit's content site: paginated
//! user listing, registration with a profile photo, JWT login and a
//! consistent JSON response envelope.

pub mod auth;
pub mod config;
pub mod crypto;
pub mod db;
pub mod error;
pub mod handlers;
pub mod mail;
pub mod models;
pub mod pagination;
pub mod repositories;
pub mod seeds;
pub mod server;
pub mod services;
pub mod storage;
pub mod telemetry;
pub use migration;

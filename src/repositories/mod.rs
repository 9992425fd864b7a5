//! # Repository Layer
//!
//! Repositories encapsulate SeaORM operations per entity. They are generic
//! over [`sea_orm::ConnectionTrait`] so the same code runs on the pool or
//! inside a [`UnitOfWork`] transaction.

pub mod organization;
pub mod role;
pub mod unit_of_work;
pub mod user;

pub use organization::OrganizationRepository;
pub use role::RoleRepository;
pub use unit_of_work::UnitOfWork;
pub use user::{NewUser, UserRepository};

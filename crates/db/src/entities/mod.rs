//! `SeaORM` entities.

pub mod prelude;

pub mod approval_requests;
pub mod approval_rules;
pub mod expenses;
pub mod organizations;
pub mod sea_orm_active_enums;
pub mod users;

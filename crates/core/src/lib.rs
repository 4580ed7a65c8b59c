//! Core business logic for Spendflow.
//!
//! This crate contains the approval-workflow engine with ZERO web or database
//! dependencies. Storage and exchange rates are reached through the traits in
//! [`workflow::store`] and [`currency::service`].
//!
//! # Modules
//!
//! - `expense` - Expense and employee snapshots
//! - `currency` - Best-effort conversion into the organization currency
//! - `workflow` - Chain building, decision evaluation, and coordination

pub mod currency;
pub mod expense;
pub mod workflow;

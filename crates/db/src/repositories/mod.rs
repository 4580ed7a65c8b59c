//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod approval_request;
pub mod approval_rule;
pub mod error;
pub mod expense;
pub mod organization;
pub mod user;
pub mod workflow;

pub use approval_request::ApprovalRequestRepository;
pub use approval_rule::ApprovalRuleRepository;
pub use error::RepositoryError;
pub use expense::ExpenseRepository;
pub use organization::{CreateOrganizationInput, OrganizationRepository};
pub use user::{CreateUserInput, UpdateUserInput, UserRepository};
pub use workflow::{SeaOrmExpenseScope, SeaOrmWorkflowStore};

//! Entity re-exports.

pub use super::approval_requests::Entity as ApprovalRequests;
pub use super::approval_rules::Entity as ApprovalRules;
pub use super::expenses::Entity as Expenses;
pub use super::organizations::Entity as Organizations;
pub use super::users::Entity as Users;

//! Expense and employee snapshots consumed by the workflow engine.

pub mod types;

pub use types::{Employee, Expense, ExpenseCategory, NewExpense, UserRole};

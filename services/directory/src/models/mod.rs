//! Directory models

pub mod account;
pub mod employee;
pub mod session;

// Re-export for convenience
pub use account::{
    Account, AccountChanges, AccountSummary, Credentials, CredentialsRequest, Role,
    UpdateAccountRequest,
};
pub use employee::{Coordinate, Employee, EmployeeFields, EmployeePayload};
pub use session::Session;

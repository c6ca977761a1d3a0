// Coordinators layer - Workflow orchestration
//
// Coordinators compose store and provider operations into account
// workflows. They decide the sequence of operations and own transactions.

pub mod account_coordinator;
pub mod registration_coordinator;

pub use account_coordinator::AccountCoordinator;
pub use registration_coordinator::{Registration, RegistrationCoordinator};

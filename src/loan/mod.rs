//! Loan data structures and batch loading

mod data;
pub mod loader;

pub use data::{LoanKind, LoanRecord, LoanSpec};
pub use loader::{load_loans, load_loans_from_reader};

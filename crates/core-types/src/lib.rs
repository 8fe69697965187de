pub mod enums;
pub mod error;
pub mod structs;
pub mod validation;

// Re-export the core types to provide a clean public API.
pub use enums::CopyStatus;
pub use error::CoreError;
pub use structs::{
    Author, BookCopy, BookSummary, CheckoutReceipt, CopyDiscrepancy, Loan, LoanPeriod, NewBook,
    NewMember, OverdueLoan, ReturnReceipt,
};

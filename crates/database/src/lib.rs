//! # Libris Database Crate
//!
//! This crate is the application's only window onto the PostgreSQL library
//! schema (authors, books, copies, members and loans).
//!
//! ## Architectural Principles
//!
//! - **Adapter:** All SQL lives here. The rest of the application sees typed
//!   operations and the row structs from `core-types`.
//! - **One transaction per operation:** every write path begins a transaction
//!   on a pooled connection and commits once at the end. Any early return
//!   drops the transaction, which rolls it back.
//! - **Runtime-checked queries:** queries are built with `sqlx::query*`
//!   functions, so the crate builds without a live database.
//!
//! ## Public API
//!
//! - `connect` / `run_migrations`: pool creation and schema setup.
//! - `DbRepository`: catalogue, membership, search and the overdue report.
//! - `LoanLedger`: checkout, return and the consistency audit.
//! - `DbError`: the error type returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod ledger;
pub mod repository;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, connect_options, run_migrations};
pub use error::DbError;
pub use ledger::LoanLedger;
pub use repository::DbRepository;

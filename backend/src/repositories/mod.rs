//! Database repositories
//!
//! Provides the data access layer over the credential store.

pub mod account;

pub use account::{AccountRecord, AccountRepository};

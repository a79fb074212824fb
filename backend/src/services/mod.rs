//! Business logic services
//!
//! Services encapsulate business logic and coordinate between
//! repositories, the hasher, and the token service.

pub mod account;
pub mod session;

pub use account::AccountService;
pub use session::{AccessContext, SessionService};

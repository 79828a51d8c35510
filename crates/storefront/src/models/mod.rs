//! Session-backed models for the storefront.

pub mod session;

pub use session::{PendingAside, VisitorSession};

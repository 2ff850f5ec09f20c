//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod budget;
pub mod dashboard;
pub mod expenses;
pub mod insights;
pub mod session;

// Re-export all handlers for use in router
pub use budget::*;
pub use dashboard::*;
pub use expenses::*;
pub use insights::*;
pub use session::*;

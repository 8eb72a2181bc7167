//! System orchestration, startup, and shutdown logic.

pub mod error;
pub mod store_system;
pub mod telemetry;

pub use error::*;
pub use store_system::*;
pub use telemetry::*;

//! Regharvest Common Library
//!
//! Shared error taxonomy and logging setup for the regharvest workspace.
//!
//! # Overview
//!
//! - **Error Handling**: the [`HarvestError`] taxonomy shared by every
//!   component that talks to the remote API or the durable record table
//! - **Logging**: [`logging::LogConfig`] and [`logging::init_logging`] for
//!   console/file tracing output
//!
//! # Example
//!
//! ```no_run
//! use regharvest_common::{HarvestError, Result};
//!
//! fn load_table(path: &str) -> Result<()> {
//!     if !std::path::Path::new(path).exists() {
//!         return Err(HarvestError::table(format!("no table at {}", path)));
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod logging;

// Re-export commonly used types
pub use error::{HarvestError, Result};

//! # Tenantry Common
//!
//! Foundational pieces shared by every Tenantry crate.
//!
//! ## Modules
//!
//! - [`error`] - Severity classification implemented by each crate's error enum
//! - [`logging`] - Helpers for rendering structured values in log lines

pub mod error;
pub mod logging;

pub use error::{ErrorSeverity, Severity};
pub use logging::Pretty;

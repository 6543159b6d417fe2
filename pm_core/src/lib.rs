//! ABOUTME: Core error type and tracing utilities
//! ABOUTME: Foundation crate used by all other promysql components

pub mod error;
pub mod telemetry;

pub use error::{Error, Result};

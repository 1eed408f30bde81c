//! Recast Core - typed overlay container for parsed records
//!
//! This crate provides a typed overlay over a loosely-structured record (as
//! produced by a markup-document parser) with a uniform collection-like
//! interface: indexed read/write/delete, iteration, deferred per-key **cast**
//! and **transform** pipelines, and normalization of the whole structure into
//! plain, JSON-serializable data.
//!
//! # Main Components
//!
//! - **Error Handling**: error types using `thiserror` and `anyhow`
//! - **Fields**: the stored value type and its serialization capabilities
//! - **Overlay Container**: the record owner and normalization orchestrator
//! - **Pipelines**: deferred-commit cast/transform builders that chain
//!   fluently
//!
//! # Example
//!
//! ```
//! use recast_core::{Overlay, Result};
//! use serde_json::{json, Value};
//!
//! fn main() -> Result<()> {
//!     let mut record = Overlay::new(json!({"greeting": "hello"}));
//!     record.transform("greeting").to(|v: Value| -> Result<Value> {
//!         Ok(json!(format!("{}, world", v.as_str().unwrap_or_default())))
//!     })?;
//!     assert_eq!(record.read("greeting")?, json!("hello, world"));
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod field;
pub mod overlay;
pub mod pipeline;

// Re-export main types for convenience
pub use error::{Error, Result};
pub use field::{Field, FieldObject};
pub use overlay::Overlay;
pub use pipeline::{CastMode, Caster, Pending, TransformMode, Transformer};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_error_creation() {
        let err = Error::key_not_found("missing");
        assert!(err.to_string().contains("missing"));
    }
}

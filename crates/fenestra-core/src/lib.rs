//! # fenestra-core
//!
//! Core types, traits, and abstractions for the fenestra window catalog.
//!
//! This crate provides the foundational data structures and trait definitions
//! that other fenestra crates depend on.

pub mod defaults;
pub mod error;
pub mod hash;
pub mod logging;
pub mod models;
pub mod traits;
pub mod upload;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use hash::content_hash;
pub use models::{
    AnalysisResult, Covering, Daytime, Location, Material, OpenState, Panes, WindowAttributes,
    WindowKind, WindowRecord,
};
pub use traits::{ListWindowsRequest, ListWindowsResponse, WindowRepository};
pub use upload::{mime_for_extension, normalized_extension, validate_upload, ValidatedUpload};

//! # fenestra-vision
//!
//! Vision-model analysis for the window catalog.
//!
//! The [`WindowAnalyzer`] wraps a pluggable [`VisionBackend`] and applies the
//! fallback policy: every failure path (missing credential, transport error,
//! non-success status, timeout, unparsable response) collapses into the fixed
//! fallback result. Nothing in this crate can fail an ingestion request.

pub mod analyzer;
pub mod backend;
pub mod extract;

pub use analyzer::{WindowAnalyzer, ANALYSIS_PROMPT};
pub use backend::{OpenAiVisionBackend, VisionBackend, VisionConfig};
pub use extract::extract_embedded_json;

//! Centralized default constants and environment variable names.
//!
//! **This module is the single source of truth** for shared default values.
//! All crates reference these constants instead of defining their own magic
//! numbers.

// =============================================================================
// UPLOADS
// =============================================================================

/// Maximum accepted upload size in bytes (5 MiB).
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Directory where uploaded images are stored.
pub const UPLOAD_DIR: &str = "uploads";

/// URL path prefix under which stored images are served.
pub const UPLOAD_URL_PREFIX: &str = "/uploads";

// =============================================================================
// ANALYSIS
// =============================================================================

/// Maximum characters kept from a vision-model description.
pub const DESCRIPTION_MAX_CHARS: usize = 500;

/// Default OpenAI-compatible API endpoint.
pub const OPENAI_URL: &str = "https://api.openai.com/v1";

/// Default vision model.
pub const VISION_MODEL: &str = "gpt-4o-mini";

/// Default bound on a single vision request, in seconds.
pub const VISION_TIMEOUT_SECS: u64 = 60;

/// Token budget requested from the vision model.
pub const VISION_MAX_TOKENS: u32 = 300;

// =============================================================================
// PAGINATION
// =============================================================================

/// Default page size for the catalog listing.
pub const PAGE_LIMIT: i64 = 12;

/// Maximum accepted page size.
pub const PAGE_LIMIT_MAX: i64 = 100;

/// Maximum characters kept from a description search term.
pub const SEARCH_MAX_CHARS: usize = 100;

// =============================================================================
// SERVER
// =============================================================================

/// Default bind address for the HTTP server.
pub const BIND_ADDR: &str = "0.0.0.0:8000";

/// Default public base URL used to build image URLs.
pub const PUBLIC_BASE_URL: &str = "http://localhost:8000";

/// Default CORS origins (the catalog frontend in local development).
pub const ALLOWED_ORIGINS: &str = "http://localhost:3000,http://127.0.0.1:3000";

// =============================================================================
// ENVIRONMENT VARIABLE NAMES
// =============================================================================

pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_UPLOAD_DIR: &str = "UPLOAD_DIR";
pub const ENV_MAX_UPLOAD_BYTES: &str = "MAX_UPLOAD_BYTES";
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";
pub const ENV_VISION_MODEL: &str = "OPENAI_VISION_MODEL";
pub const ENV_VISION_TIMEOUT: &str = "VISION_TIMEOUT_SECS";
pub const ENV_BIND_ADDR: &str = "BIND_ADDR";
pub const ENV_PUBLIC_BASE_URL: &str = "PUBLIC_BASE_URL";
pub const ENV_ALLOWED_ORIGINS: &str = "ALLOWED_ORIGINS";

//! Structured logging field name constants for fenestra.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation tools can query by standardized names across every
//! subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events (startup, shutdown), operation completions |
//! | DEBUG | Decision points, intermediate values, config choices |

/// Subsystem originating the log event.
/// Values: "api", "db", "vision"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "pool", "ingest", "analyzer", "query"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "upload", "list", "analyze", "insert"
pub const OPERATION: &str = "op";

/// Window record UUID being operated on.
pub const WINDOW_ID: &str = "window_id";

/// Content hash of the upload being processed.
pub const CONTENT_HASH: &str = "content_hash";

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of results returned by a listing.
pub const RESULT_COUNT: &str = "result_count";

/// Model name used for vision analysis.
pub const MODEL: &str = "model";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";

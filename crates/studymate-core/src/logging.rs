//! Structured logging schema and field name constants for studymate.
//!
//! Every span carries `subsystem`, `component` and `op` identity fields,
//! written as literals in `#[instrument]`. Measurements are declared as
//! `tracing::field::Empty` and recorded through the constants below once the
//! value is known, so every subsystem reports the same names.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events (startup, shutdown), operation completions |
//! | DEBUG | Decision points, intermediate values, config choices |
//! | TRACE | Per-item iteration, high-volume data |

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of items returned (questions, citations, notes).
pub const RESULT_COUNT: &str = "result_count";

/// Byte length of a model response.
pub const RESPONSE_LEN: &str = "response_len";

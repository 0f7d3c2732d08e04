//! Tracing/logging setup shared by binaries and tests.

/// Initialize process-wide JSON logging.
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(LogFormat::Json);
}

/// Initialize logging with an explicit output format.
pub fn init_with(format: LogFormat) {
    tracing::init(format);
}

pub use crate::tracing::LogFormat;

/// Subscriber configuration (filters, layers).
pub mod tracing;

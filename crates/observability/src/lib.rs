//! Tracing and logging (shared setup).

/// Initialize process-wide logging (JSON unless `SHOPKEEP_LOG_FORMAT=pretty`).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(LogFormat::from_env());
}

/// Tracing configuration (filters, output format).
pub mod tracing;

pub use self::tracing::LogFormat;

//! Public surface for profchat.
//!
//! Re-exports the workspace crates and provides a logging helper so the
//! binary and embedders initialise output the same way.

/// Re-export for convenience.
pub use profchat_config as config;
pub use profchat_core as core;
/// Re-export for convenience.
pub use profchat_protocol as protocol;
pub use profchat_server as server;
pub use profchat_tui as tui;

/// Initialize `env_logger` with millisecond timestamps.
///
/// Honours `RUST_LOG`; calling it twice is harmless.
pub fn init_logging() {
    let _ = env_logger::builder()
        .format_timestamp_millis()
        .parse_default_env()
        .try_init();
}

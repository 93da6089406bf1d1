//! `tracing` subscriber setup and panic logging.

use std::backtrace::Backtrace;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset: `level` for this crate and the HTTP layers.
pub fn default_filter(level: Level) -> EnvFilter {
    let level = level.as_str().to_lowercase();
    EnvFilter::new(format!("rest_scaffold={level},tower_http={level},sqlx=warn"))
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
pub fn init(level: Level) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(level)))
        .init();
}

/// Log every panic with its location and a backtrace before unwinding continues.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let message = info
            .payload()
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".into());
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_default();
        tracing::error!(
            panic = %message,
            location = %location,
            backtrace = %Backtrace::force_capture(),
            "panic"
        );
    }));
}

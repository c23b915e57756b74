//! Public SDK surface for Jarvis.
//!
//! This crate re-exports the building blocks, provides an HTTP client for a
//! running server, and a small initialization helper for logging.

pub mod client;

/// Re-export for convenience.
pub use jarvis_rs_config as config;
pub use jarvis_rs_core as core;
/// Re-export for convenience.
pub use jarvis_rs_memory as memory;
/// Re-export for convenience.
pub use jarvis_rs_protocol as protocol;
pub use jarvis_rs_server as server;
pub use jarvis_rs_tools as tools;

pub use client::{ClientError, JarvisClient};

#[inline]
/// Initialize logging using env_logger if the "logging" feature is enabled.
///
/// The filter comes from `RUST_LOG` and defaults to `info`. Calling this more
/// than once is harmless.
pub fn init_logging() {
    #[cfg(feature = "logging")]
    {
        let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .try_init();
    }
}

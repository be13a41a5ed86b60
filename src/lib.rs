//! SORT and THREAD (RFC 5256) building blocks: the nearest-ancestor THREAD
//! tree codec, base subject extraction, and the typed command and response
//! values that carry them.

pub mod config;
pub mod error;
pub mod models;
pub mod protocol;
pub mod threading;

pub use error::{Error, Result};

use env_logger::Env;
use std::sync::Once;

static LOGGER: Once = Once::new();

/// Initialize `env_logger` once, honoring `RUST_LOG` and defaulting to `info`.
pub fn init_logger() {
    LOGGER.call_once(|| {
        env_logger::Builder::from_env(Env::default().default_filter_or("info"))
            .format_timestamp(None)
            .init();
    });
}

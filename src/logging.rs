//! Logging initialization utilities.

use env_logger::Env;

const DEFAULT_FILTER: &str = "info";

/// Initialize logging with a default filter level. `RUST_LOG` overrides it.
pub fn init() {
    builder().init();
}

/// Like [`init`], but returns `false` instead of panicking when a logger is
/// already installed.
pub fn try_init() -> bool {
    builder().try_init().is_ok()
}

fn builder() -> env_logger::Builder {
    let env = Env::default().default_filter_or(DEFAULT_FILTER);
    env_logger::Builder::from_env(env)
}

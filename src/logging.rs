//! Logging setup
//!
//! Library code only emits through the `log` facade. Binaries embedding
//! envguard call [`init`] once at startup; `RUST_LOG` still wins over the
//! default filter.

/// Install the `env_logger` backend
///
/// Defaults to `info`, or `debug` when `verbose` is set. Calling it twice is
/// harmless; the second call is ignored.
pub fn init(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    if env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .try_init()
        .is_err()
    {
        log::debug!("Logger already initialized");
    }
}

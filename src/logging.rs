//! Diagnostic logging setup.
//!
//! Events go to **stderr** so stdout stays clean for command output. The
//! filter comes from `RUST_LOG` and defaults to warnings only; `--verbose`
//! raises this crate and the core crate to `debug`.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "warn";
const VERBOSE_FILTER: &str = "warn,microplastics_watch=debug,microplastics_watch_core=debug";

fn filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose {
            VERBOSE_FILTER
        } else {
            DEFAULT_FILTER
        })
    })
}

/// Installs the global subscriber. Safe to call more than once; later
/// calls are ignored.
pub fn init(verbose: bool) {
    let _ = tracing_subscriber::registry()
        .with(filter(verbose))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(atty::is(atty::Stream::Stderr)),
        )
        .try_init();
}

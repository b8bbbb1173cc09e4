//! Tracing subscriber setup.
//!
//! The subscriber is only installed when `TYSHAPE_LOG` or `RUST_LOG` is set.
//! `TYSHAPE_LOG` takes precedence and uses the `RUST_LOG` filter syntax,
//! e.g. `TYSHAPE_LOG=tyshape_checker::relation=trace`. Output goes to stderr.

use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "TYSHAPE_LOG";

fn build_filter() -> EnvFilter {
    match std::env::var(LOG_ENV) {
        Ok(value) => EnvFilter::builder().parse_lossy(value),
        Err(_) => EnvFilter::from_default_env(),
    }
}

/// Install the global subscriber. Returns `false` when logging was not
/// requested or a subscriber is already installed.
pub fn init_tracing() -> bool {
    if std::env::var(LOG_ENV).is_err() && std::env::var("RUST_LOG").is_err() {
        return false;
    }
    tracing_subscriber::fmt()
        .with_env_filter(build_filter())
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}

//! Tracing initialization for the binary.

use std::sync::Once;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

static INIT: Once = Once::new();

/// Environment variable holding per-target directives, e.g.
/// `COMPLYGUARD_LOG=complyguard_domain=debug,complyguard_inventory=info`.
pub const LOG_ENV: &str = "COMPLYGUARD_LOG";

const DEFAULT_DIRECTIVE: &str = "complyguard=info";

/// Install the stderr subscriber. Idempotent.
///
/// `COMPLYGUARD_LOG` wins; otherwise `--log-level` applies to the complyguard
/// crates; otherwise `complyguard=info`.
pub fn init_tracing(log_level: Option<&str>) {
    INIT.call_once(|| {
        let fallback = match log_level {
            Some(level) => format!("complyguard={level}"),
            None => DEFAULT_DIRECTIVE.to_string(),
        };
        let filter = EnvFilter::try_from_env(LOG_ENV)
            .or_else(|_| EnvFilter::try_new(&fallback))
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .with(filter)
            .init();
    });
}

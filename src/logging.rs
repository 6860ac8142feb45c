use std::sync::Once;

use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "LIGHTBOX_LOG";
const DEFAULT_DIRECTIVE: &str = "info";

static INIT: Once = Once::new();

/// Install the global fmt subscriber on stderr. Safe to call more than once.
pub fn init() {
    INIT.call_once(|| {
        let filter = env_filter();
        if let Err(err) = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init()
        {
            eprintln!("lightbox: tracing subscriber already installed: {err}");
        }
    });
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

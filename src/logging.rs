//! Diagnostic logging on stderr. Stdout is reserved for results.
//!
//! `RUST_LOG` takes precedence over the `[logging]` config section:
//! ```bash
//! RUST_LOG=flypath::fetch=debug flypath search -f CDG -t ALG -d 2026-03-26
//! ```

use std::sync::Once;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::LoggingConfig;

static INIT: Once = Once::new();

pub fn filter_directives(config: &LoggingConfig) -> String {
    let mut directives = config.default.clone();
    for (module, level) in &config.modules {
        directives.push_str(&format!(",{module}={level}"));
    }
    directives
}

/// Installs the global subscriber. Only the first call takes effect.
pub fn init(config: &LoggingConfig) {
    INIT.call_once(|| {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::try_new(filter_directives(config)).unwrap_or_else(|_| EnvFilter::new("warn"))
        };

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_filter(filter);

        tracing_subscriber::registry().with(fmt_layer).init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_include_module_overrides() {
        let mut config = LoggingConfig::default();
        config
            .modules
            .insert("flypath::fetch".into(), "debug".into());
        assert_eq!(filter_directives(&config), "warn,flypath::fetch=debug");
    }
}

//! Log output: JSON lines (ndjson) by default, human-readable text otherwise.

use crate::config::LogConfig;
use serde::Serialize;
use std::io::Write;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

pub struct StructuredLogger;

impl StructuredLogger {
    /// Install the global subscriber on stdout. `RUST_LOG` wins over `config.level`
    /// (which `DEBUG=true` has already lowered to `debug`).
    pub fn init(config: &LogConfig) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(Self::directives(&config.level)));
        let stdout = tracing_subscriber::fmt::layer().with_writer(std::io::stdout);
        let registry = tracing_subscriber::registry().with(filter);
        if config.json {
            registry.with(stdout.json().flatten_event(true)).init();
        } else {
            registry.with(stdout).init();
        }
    }

    /// Service events and request traces at `level`; dependencies stay at warn.
    fn directives(level: &str) -> String {
        format!("warn,flow_sentinel={level},tower_http={level}")
    }

    /// Write one value as a JSON line, bypassing tracing (demo output)
    pub fn emit_json(event: &impl Serialize, w: &mut impl Write) {
        if let Ok(line) = serde_json::to_string(event) {
            let _ = writeln!(w, "{line}");
        }
    }
}

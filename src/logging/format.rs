//! Pipeline logs via tracing; the run summary goes out as a single ndjson line.

use serde::Serialize;
use std::io::Write;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

pub struct StructuredLogger;

impl StructuredLogger {
    /// Install the global subscriber on stderr, leaving stdout for the summary line.
    /// Level comes from RUST_LOG, else `default_level`. A second call is a no-op.
    pub fn init(json: bool, default_level: &str) {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
        let registry = tracing_subscriber::registry().with(filter);
        let _ = if json {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_span_events(FmtSpan::NONE)
                        .with_writer(std::io::stderr),
                )
                .try_init()
        } else {
            registry
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .try_init()
        };
    }

    /// Write one value as a JSON line
    pub fn emit_json(event: &impl Serialize, w: &mut impl Write) -> std::io::Result<()> {
        let line = serde_json::to_string(event)?;
        writeln!(w, "{}", line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emits_one_line() {
        #[derive(Serialize)]
        struct Line<'a> {
            rows: usize,
            path: &'a str,
        }
        let mut buf = Vec::new();
        StructuredLogger::emit_json(&Line { rows: 3, path: "t.zst" }, &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "{\"rows\":3,\"path\":\"t.zst\"}\n");
    }

    #[test]
    fn init_twice_is_harmless() {
        StructuredLogger::init(false, "warn");
        StructuredLogger::init(true, "info");
    }
}

use core::fmt;
use std::fs::OpenOptions;
use std::sync::Once;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::fmt::format::{self, FormatEvent, FormatFields};
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, fmt as tracingfmt};

/// Column where the message starts, before colour codes
const MESSAGE_COLUMN: usize = 72;

/// `LEVEL <stream> [crate/module] file:line:  message`, one line per event
struct BridgeFormatter;

/// Picks the `stream` field out of an event; the bridge tags per-call lines with it
#[derive(Default)]
struct StreamField(Option<String>);

impl tracing::field::Visit for StreamField {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
        if field.name() == "stream" {
            self.0 = Some(format!("{:?}", value));
        }
    }
}

fn level_colour(level: tracing::Level) -> &'static str {
    match level {
        tracing::Level::ERROR => "\x1b[31m",
        tracing::Level::WARN => "\x1b[33m",
        tracing::Level::INFO => "\x1b[32m",
        tracing::Level::DEBUG => "\x1b[34m",
        tracing::Level::TRACE => "\x1b[35m",
    }
}

/// "crates/dvm-entities/src/tx/dmr_tx.rs" becomes "[entities/tx] dmr_tx.rs"
fn short_location(file: &str) -> String {
    let Some((krate, rel)) = file.split_once("/src/") else {
        return file.to_string();
    };
    let krate = krate.rsplit('/').next().unwrap_or(krate);
    let krate = krate.strip_prefix("dvm-").unwrap_or(krate);
    match rel.rsplit_once('/') {
        Some((dir, name)) => {
            let module = dir.split('/').next().unwrap_or(dir);
            format!("[{}/{}] {}", krate, module, name)
        }
        None => format!("[{}] {}", krate, rel),
    }
}

/// Removes `stream=...` from the rendered fields, it is printed in its own column
fn strip_stream_field(fields: &mut String) {
    let Some(at) = fields.find("stream=") else {
        return;
    };
    match fields[at..].find(' ') {
        Some(len) => fields.replace_range(at..at + len + 1, ""),
        None => fields.truncate(at),
    }
}

impl<S, N> FormatEvent<S, N> for BridgeFormatter
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(&self, ctx: &FmtContext<'_, S, N>, mut writer: format::Writer<'_>, event: &tracing::Event<'_>) -> fmt::Result {
        let meta = event.metadata();

        let mut stream = StreamField::default();
        event.record(&mut stream);

        let mut fields = String::new();
        ctx.field_format().format_fields(format::Writer::new(&mut fields), event)?;
        if stream.0.is_some() {
            strip_stream_field(&mut fields);
        }

        let (colour, reset) = if writer.has_ansi_escapes() {
            (level_colour(*meta.level()), "\x1b[0m")
        } else {
            ("", "")
        };
        let prefix = format!(
            "{}{:<5}{} {:>10} {}:{}:",
            colour,
            meta.level(),
            reset,
            stream.0.as_deref().unwrap_or(""),
            short_location(meta.file().unwrap_or("unknown")),
            meta.line().unwrap_or(0)
        );
        writeln!(writer, "{:<width$} {}", prefix, fields, width = MESSAGE_COLUMN)
    }
}

static INIT_LOG: Once = Once::new();

/// Adds a directive to `filter`, silently skipping malformed ones
fn with_directive(filter: EnvFilter, directive: &str) -> EnvFilter {
    match directive.parse() {
        Ok(d) => filter.add_directive(d),
        Err(_) => filter,
    }
}

/// Trace level on stdout, used by the test suites
pub fn setup_logging_verbose() {
    setup_logging(EnvFilter::new("trace"), None);
}

/// Info level on stdout with per-module directives, plus a debug level file when
/// `verbose_logfile` is given. The returned guard must outlive all logging.
pub fn setup_logging_default(verbose_logfile: Option<String>) -> Option<WorkerGuard> {
    let stdout_filter = get_default_stdout_filter();
    let logfile_and_filter = verbose_logfile.map(|file| (file, get_default_logfile_filter()));
    setup_logging(stdout_filter, logfile_and_filter)
}

pub fn get_default_stdout_filter() -> EnvFilter {
    let mut filter = EnvFilter::new("info");
    for directive in [
        // Per-frame chatter from the lower layers
        "dvm_core::bitbuffer=warn",
        "dvm_pdus=info",
        "dvm_entities::network=info",
        "dvm_entities::audio=info",
        // Call level events
        "dvm_entities::call=debug",
        "dvm_entities::tx=debug",
        "dvm_entities::bridge=debug",
    ] {
        filter = with_directive(filter, directive);
    }
    filter
}

fn get_default_logfile_filter() -> EnvFilter {
    with_directive(EnvFilter::new("debug"), "dvm_core::bitbuffer=info")
}

/// Installs the global subscriber once. Returns the file writer guard when a log file
/// could be opened.
fn setup_logging(stdout_filter: EnvFilter, outfile: Option<(String, EnvFilter)>) -> Option<WorkerGuard> {
    let file = outfile.and_then(|(path, filter)| {
        match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(f) => Some((f, filter)),
            Err(e) => {
                eprintln!("could not open log file {}: {}, logging to stdout only", path, e);
                None
            }
        }
    });

    if let Some((file, outfile_filter)) = file {
        let (file_writer, guard) = tracing_appender::non_blocking(file);

        INIT_LOG.call_once(|| {
            let file_layer = tracingfmt::layer()
                .event_format(BridgeFormatter)
                .with_writer(file_writer)
                .with_ansi(false);
            let stdout_layer = tracingfmt::layer().event_format(BridgeFormatter);

            tracing_subscriber::registry()
                .with(file_layer.with_filter(outfile_filter))
                .with(stdout_layer.with_filter(stdout_filter))
                .init();
        });

        Some(guard)
    } else {
        INIT_LOG.call_once(|| {
            let stdout_layer = tracingfmt::layer().event_format(BridgeFormatter);
            tracing_subscriber::registry()
                .with(stdout_layer.with_filter(stdout_filter))
                .init();
        });
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_location() {
        assert_eq!(short_location("crates/dvm-entities/src/tx/dmr_tx.rs"), "[entities/tx] dmr_tx.rs");
        assert_eq!(short_location("crates/dvm-core/src/debug.rs"), "[core] debug.rs");
        assert_eq!(short_location("build.rs"), "build.rs");
    }

    #[test]
    fn test_strip_stream_field() {
        let mut fields = String::from("stream=0000BEEF TX DMR frame");
        strip_stream_field(&mut fields);
        assert_eq!(fields, "TX DMR frame");
        let mut tail = String::from("RX stream=1");
        strip_stream_field(&mut tail);
        assert_eq!(tail, "RX ");
    }
}

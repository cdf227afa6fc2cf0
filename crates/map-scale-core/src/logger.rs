//! Logging setup for binaries and examples.
//!
//! Library code only talks to the `log` facade. [`init_with_level`] installs a
//! stderr sink printing `[elapsed LEVEL target] message`; with the `tracing`
//! feature, [`init_tracing`] installs a `tracing-subscriber` instead.

use std::fmt;
use std::io::Write;
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::Instant;

use log::{Level, LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt::format::FmtSpan, util::SubscriberInitExt, EnvFilter};

struct StderrSink {
    max_level: LevelFilter,
    epoch: Instant,
}

fn write_line(
    out: &mut impl Write,
    secs: f64,
    level: Level,
    target: &str,
    args: &fmt::Arguments<'_>,
) -> std::io::Result<()> {
    writeln!(out, "[{secs:8.3}s {level:<5} {target}] {args}")
}

impl Log for StderrSink {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let _ = write_line(
                &mut std::io::stderr().lock(),
                self.epoch.elapsed().as_secs_f64(),
                record.level(),
                record.target(),
                record.args(),
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static SINK: OnceLock<StderrSink> = OnceLock::new();

/// Route `log` records at or above `level` to stderr.
///
/// Only the first call installs the sink; later calls return `Ok(())`.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if SINK.get().is_some() {
        return Ok(());
    }
    let sink = SINK.get_or_init(|| StderrSink {
        max_level: level,
        epoch: Instant::now(),
    });
    log::set_logger(sink)?;
    log::set_max_level(level);
    Ok(())
}

/// `off`, `error`, `warn`, `info`, `debug` or `trace` (any case); `Info` otherwise.
pub fn parse_level(name: &str) -> LevelFilter {
    LevelFilter::from_str(name.trim()).unwrap_or(LevelFilter::Info)
}

/// Install a `tracing` subscriber filtered by `RUST_LOG` (default `info`).
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool) {
    init_tracing_with_level(json, LevelFilter::Info);
}

/// Install a `tracing` subscriber; `level` applies unless `RUST_LOG` is set.
///
/// `json` selects flattened JSON events; otherwise human-readable lines with
/// uptime stamps. Span close events carry stage timings.
#[cfg(feature = "tracing")]
pub fn init_tracing_with_level(json: bool, level: LevelFilter) {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing_level(level).into())
        .from_env_lossy();
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE);
    let _ = if json {
        builder.json().flatten_event(true).finish().try_init()
    } else {
        builder
            .with_timer(tracing_subscriber::fmt::time::Uptime::default())
            .finish()
            .try_init()
    };
}

#[cfg(feature = "tracing")]
fn tracing_level(level: LevelFilter) -> tracing_subscriber::filter::LevelFilter {
    use tracing_subscriber::filter::LevelFilter as Tracing;
    match level {
        LevelFilter::Off => Tracing::OFF,
        LevelFilter::Error => Tracing::ERROR,
        LevelFilter::Warn => Tracing::WARN,
        LevelFilter::Info => Tracing::INFO,
        LevelFilter::Debug => Tracing::DEBUG,
        LevelFilter::Trace => Tracing::TRACE,
    }
}

//! Logging configuration of the node.

use backtrace::Backtrace;
use clap::ValueEnum;
use tracing::Level;
use tracing_log::LogTracer;
use tracing_subscriber::filter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Layer;
use tracing_subscriber::Registry;

/// Verbosity of the node, selectable from the command line.
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
        write!(f, "{name}")
    }
}

impl From<LogLevel> for Level {
    fn from(val: LogLevel) -> Self {
        match val {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

/// Setup a hook that records panics as `tracing` events at the ERROR
/// verbosity level, with a backtrace.
pub fn set_panic_hook() {
    std::panic::set_hook(Box::new(|panic| {
        let backtrace = Backtrace::new();
        tracing::error!("{}\n\n{:?}", panic, backtrace);
    }));
}

/// Install the global subscriber: formatted events to stderr, filtered by
/// `level`, with `log` records converted to tracing events.
pub fn init_logging(level: LogLevel) {
    set_panic_hook();

    let subscriber = Registry::default();
    let level_filter = filter::LevelFilter::from_level(level.into());

    // Stderr
    let subscriber = subscriber.with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_filter(level_filter),
    );

    // Enable log compatible layer to convert log record to tracing span.
    // We will ignore any errors that returned by this functions.
    let _ = LogTracer::init();

    // Ignore errors returned by set_global_default.
    let _ = tracing::subscriber::set_global_default(subscriber);
}

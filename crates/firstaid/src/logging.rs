//! Diagnostics for firstaid.
//!
//! Everything is logged through `tracing` to stderr. Stdout carries the
//! walkthrough screens and must stay free of log lines.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Log target that the default filter applies to.
const CRATE_TARGET: &str = "firstaid";

/// How much the binary logs, picked with `-q` and `-v`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// `-q`: errors only.
    Quiet,
    /// Warnings, such as a config file that was ignored.
    #[default]
    Normal,
    /// `-v`: navigation and dialer activity.
    Verbose,
    /// `-vv`
    Trace,
}

impl Verbosity {
    /// The most detailed level that is shown.
    #[must_use]
    pub fn to_level_filter(&self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::WARN,
            Self::Verbose => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }

    /// Filter directive used when `RUST_LOG` is unset, e.g. `firstaid=warn`.
    #[must_use]
    pub fn directive(&self) -> String {
        let level = match self {
            Self::Quiet => "error",
            Self::Normal => "warn",
            Self::Verbose => "debug",
            Self::Trace => "trace",
        };
        format!("{CRATE_TARGET}={level}")
    }
}

/// `RUST_LOG` wins when it parses; otherwise the verbosity decides.
fn filter_for(verbosity: Verbosity, rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .and_then(|spec| EnvFilter::try_new(spec).ok())
        .unwrap_or_else(|| EnvFilter::new(verbosity.directive()))
}

/// Install the stderr subscriber. Later calls are no-ops.
pub fn init_logging(verbosity: Verbosity) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    let _ = tracing_subscriber::registry()
        .with(filter_for(verbosity, rust_log.as_deref()))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_file(false)
                .with_line_number(false),
        )
        .try_init();
}

/// Warnings and errors through the test writer, for tests that log.
#[cfg(test)]
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use tracing::level_filters::LevelFilter;

    use super::*;

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(Verbosity::default(), Verbosity::Normal);
        assert_eq!(Verbosity::Quiet.to_level_filter(), Level::ERROR);
        assert_eq!(Verbosity::Normal.to_level_filter(), Level::WARN);
        assert_eq!(Verbosity::Verbose.to_level_filter(), Level::DEBUG);
        assert_eq!(Verbosity::Trace.to_level_filter(), Level::TRACE);
    }

    #[test]
    fn test_directive_targets_crate() {
        assert_eq!(Verbosity::Quiet.directive(), "firstaid=error");
        assert_eq!(Verbosity::Normal.directive(), "firstaid=warn");
        assert_eq!(Verbosity::Trace.directive(), "firstaid=trace");
    }

    #[test]
    fn test_filter_uses_verbosity_without_rust_log() {
        let filter = filter_for(Verbosity::Verbose, None);
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn test_rust_log_overrides_verbosity() {
        let filter = filter_for(Verbosity::Quiet, Some("trace"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::TRACE));
    }

    #[test]
    fn test_unparseable_rust_log_is_ignored() {
        let filter = filter_for(Verbosity::Normal, Some("firstaid=loudly"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_test_logging();
        init_logging(Verbosity::Verbose);
        init_logging(Verbosity::Quiet);
    }
}

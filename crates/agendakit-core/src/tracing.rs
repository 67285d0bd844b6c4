//! Tracing setup shared by the client and the server.
//!
//! Each process role maps to a [`LogProfile`]; [`init_tracing`] installs
//! the matching subscriber once at startup:
//!
//! ```ignore
//! use agendakit_core::tracing::{LogProfile, TracingConfig, init_tracing};
//!
//! // Interactive CLI run
//! init_tracing(TracingConfig::from(LogProfile::Quiet))?;
//! ```

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    prelude::*,
    registry::LookupSpan,
};

/// Why [`init_tracing`] refused to come up.
#[derive(Debug, Error)]
pub enum TracingError {
    /// A global subscriber was already installed.
    #[error("failed to install global tracing subscriber: {0}")]
    Install(#[from] tracing::subscriber::SetGlobalDefaultError),

    /// The filter directive did not parse.
    #[error("invalid env filter directive: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),
}

/// The three ways this workspace logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogProfile {
    /// Interactive runs: warnings only, in a human format.
    Quiet,
    /// Interactive runs with `--debug`: compact lines with call sites,
    /// no timestamps.
    Verbose,
    /// The long-running server: JSON lines with span open/close events.
    Daemon,
}

impl LogProfile {
    fn default_level(self) -> Level {
        match self {
            Self::Quiet => Level::WARN,
            Self::Verbose => Level::DEBUG,
            Self::Daemon => Level::INFO,
        }
    }
}

/// What [`init_tracing`] installs: a profile plus optional overrides.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    profile: LogProfile,
    level: Option<Level>,
    env_filter: Option<String>,
}

impl From<LogProfile> for TracingConfig {
    fn from(profile: LogProfile) -> Self {
        Self {
            profile,
            level: None,
            env_filter: None,
        }
    }
}

impl TracingConfig {
    /// Raises or lowers the profile's default level.
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = Some(level);
        self
    }

    /// Full filter directive, overriding the level entirely.
    #[must_use]
    pub fn with_env_filter(mut self, directive: impl Into<String>) -> Self {
        self.env_filter = Some(directive.into());
        self
    }

    fn filter(&self) -> Result<EnvFilter, TracingError> {
        if let Some(directive) = &self.env_filter {
            return Ok(EnvFilter::try_new(directive)?);
        }
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return Ok(filter);
        }
        let level = self.level.unwrap_or_else(|| self.profile.default_level());
        Ok(EnvFilter::new(format!("agendakit={}", level)))
    }

    fn layer<S>(&self) -> Box<dyn Layer<S> + Send + Sync>
    where
        S: tracing::Subscriber + for<'a> LookupSpan<'a> + 'static,
    {
        match self.profile {
            LogProfile::Quiet => fmt::layer().pretty().boxed(),
            LogProfile::Verbose => fmt::layer()
                .compact()
                .with_file(true)
                .with_line_number(true)
                .without_time()
                .boxed(),
            LogProfile::Daemon => fmt::layer()
                .json()
                .with_file(true)
                .with_line_number(true)
                .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
                .boxed(),
        }
    }
}

/// Installs the global subscriber described by `config`.
///
/// Call once at process start; a second call fails because the first
/// subscriber stays installed. `RUST_LOG` overrides the configured default
/// level when set.
pub fn init_tracing(config: TracingConfig) -> Result<(), TracingError> {
    let subscriber = tracing_subscriber::registry()
        .with(config.filter()?)
        .with(config.layer());
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

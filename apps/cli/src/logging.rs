//! # Logger
//!
//! Console logging for the `dtwin` binary. Records go to stderr so stdout stays reserved for
//! documents. `RUST_LOG` overrides the programmatic filter.
//!
//! ```rust,no_run
//! # use dtwin_cli::logging::{Logger, LevelFilter};
//! Logger::builder().name("dtwin").level(LevelFilter::DEBUG).init().unwrap();
//! ```

pub use tracing::level_filters::LevelFilter;

use private::Sealed;
use std::borrow::Cow;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Target of the workspace crates; `dtwin` also matches `dtwin_models` and `dtwin_cli`.
pub const CRATE_TARGET: &str = "dtwin";

#[dtwin_derive::dtwin_error]
pub enum LoggerError {
    /// A global subscriber is already installed in this process.
    #[error("Tracing subscriber error{}: {source}", format_context(.context))]
    Subscriber {
        source: tracing_subscriber::util::TryInitError,
        context: Option<Cow<'static, str>>,
    },

    #[error("Invalid logger configuration{}: {message}", format_context(.context))]
    InvalidConfiguration { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

#[derive(Debug)]
pub struct LoggerConfig {
    level: LevelFilter,
    json: bool,
    ansi: bool,
    env_filter: Option<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self { level: LevelFilter::INFO, json: false, ansi: true, env_filter: None }
    }
}

#[derive(Debug)]
pub struct NoName;
#[derive(Debug)]
pub struct WithName(String);

mod private {
    pub trait Sealed {}
}
impl Sealed for NoName {}
impl Sealed for WithName {}

/// Entry point of the builder.
#[derive(Debug)]
pub struct Logger;

impl Logger {
    pub fn builder() -> LoggerBuilder<NoName> {
        LoggerBuilder { config: LoggerConfig::default(), name: NoName }
    }
}

/// Configures and installs the global tracing subscriber.
#[derive(Debug)]
pub struct LoggerBuilder<N: Sealed = NoName> {
    config: LoggerConfig,
    name: N,
}

impl LoggerBuilder<NoName> {
    pub fn name(self, name: impl Into<String>) -> LoggerBuilder<WithName> {
        LoggerBuilder { config: self.config, name: WithName(name.into()) }
    }
}

impl LoggerBuilder<WithName> {
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.config.level = level;
        self
    }

    /// Module-directed filter such as `dtwin=debug,dtwin_cli=trace`.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn env_filter(mut self, filter: impl Into<String>) -> Self {
        self.config.env_filter = Some(filter.into());
        self
    }

    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn json(mut self, enabled: bool) -> Self {
        self.config.json = enabled;
        self
    }

    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn ansi(mut self, enabled: bool) -> Self {
        self.config.ansi = enabled;
        self
    }

    /// Installs the subscriber.
    ///
    /// # Errors
    /// [`LoggerError::InvalidConfiguration`] for an empty name or an unparsable filter,
    /// [`LoggerError::Subscriber`] when a global subscriber already exists.
    pub fn init(self) -> Result<(), LoggerError> {
        if self.name.0.trim().is_empty() {
            return Err(LoggerError::invalid_configuration("Logger name must not be empty"));
        }

        let env_filter = build_env_filter(&self.config)?;
        let console = layer().with_writer(std::io::stderr).with_target(true);
        let console = if self.config.json {
            console.json().boxed()
        } else {
            console.compact().with_ansi(self.config.ansi).boxed()
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(console)
            .try_init()
            .context(format!("Failed to install the {} logger", self.name.0))
    }
}

fn build_env_filter(config: &LoggerConfig) -> Result<EnvFilter, LoggerError> {
    let builder = EnvFilter::builder().with_default_directive(config.level.into());
    if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        return Ok(builder.from_env_lossy());
    }

    let filter = directives(config);
    builder.parse(filter.as_ref()).map_err(|err| LoggerError::InvalidConfiguration {
        message: err.to_string().into(),
        context: Some(format!("filter `{filter}`").into()),
    })
}

/// The caller's filter plus a `dtwin=<level>` directive (at least `info`) unless the filter
/// already names the crate target.
fn directives(config: &LoggerConfig) -> Cow<'_, str> {
    let crate_level = format!("{CRATE_TARGET}={}", config.level.max(LevelFilter::INFO));
    match config.env_filter.as_deref() {
        Some(filter) if names_crate_target(filter) => Cow::Borrowed(filter),
        Some(filter) if filter.trim().is_empty() => Cow::Owned(crate_level),
        Some(filter) => Cow::Owned(format!("{filter},{crate_level}")),
        None => Cow::Owned(crate_level),
    }
}

fn names_crate_target(filter: &str) -> bool {
    filter
        .split(',')
        .filter_map(|directive| directive.trim().split(['=', '[']).next())
        .any(|target| target == CRATE_TARGET)
}

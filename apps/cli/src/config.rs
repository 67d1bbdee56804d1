use config::{Config, Environment, File};
use dtwin::EngineConfig;
use serde::Deserialize;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "dtwin";
/// Prefix of overriding environment variables (`DTWIN__ENGINE__PRETTY=true`).
pub const ENV_PREFIX: &str = "DTWIN";

#[dtwin_derive::dtwin_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Settings of the `dtwin` binary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub engine: EngineConfig,
    /// Default target directory of `dtwin models`.
    pub output: Option<PathBuf>,
}

/// Loads [`CliConfig`] from a file overlaid with `DTWIN__` environment variables.
///
/// An explicit `path` must exist. Without one, `dtwin.toml` is read when present.
///
/// # Errors
/// Returns [`ConfigError::Config`] when the file is missing or malformed, or when a value
/// does not fit its field.
pub fn load_config(path: Option<&Path>) -> Result<CliConfig, ConfigError> {
    let file = match path {
        Some(path) => File::from(path).required(true),
        None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    debug!(path = ?path, "loading configuration");

    let config = Config::builder()
        .add_source(file)
        .add_source(Environment::with_prefix(ENV_PREFIX).separator("__").try_parsing(true))
        .build()
        .context("Failed to build config")?
        .try_deserialize::<CliConfig>()
        .context("Failed to deserialize config")?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn explicit_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "output = \"schemas\"\n\n[engine]\npretty = true").unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert!(config.engine.pretty);
        assert_eq!(config.output.as_deref(), Some(Path::new("schemas")));
        assert_eq!(config.engine.reserved_exclusions, EngineConfig::default().reserved_exclusions);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = load_config(Some(Path::new("/nonexistent/dtwin.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to build config"));
    }
}

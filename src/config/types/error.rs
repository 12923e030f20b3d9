//! Configuration errors and validation diagnostics.

use owo_colors::OwoColorize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read `{}`", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    #[error("invalid TOML in `{}`", .0.display())]
    Toml(PathBuf, #[source] toml::de::Error),

    #[error("credentials file `{}` is not valid JSON", .0.display())]
    Json(PathBuf, #[source] serde_json::Error),

    #[error(
        "no deployment target for `{environment}`: add [deploy.targets.{environment}] to the config or an entry to `{}`",
        credentials.display()
    )]
    ConfigurationMissing {
        environment: String,
        credentials: PathBuf,
    },

    /// Rendered in full by its own `Display`, so no `source()`.
    #[error("{0}")]
    Invalid(ConfigDiagnostics),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// One finding about one config field, e.g. `styles.browsers.safari`.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub field: String,
    pub message: String,
    pub hint: Option<String>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field.cyan(), self.message)?;
        if let Some(hint) = &self.hint {
            write!(f, "\n    {} {hint}", "hint:".yellow())?;
        }
        Ok(())
    }
}

/// Everything validation found, reported in one go.
#[derive(Debug, Default)]
pub struct ConfigDiagnostics {
    items: Vec<Diagnostic>,
}

impl ConfigDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, severity: Severity, field: String, message: String, hint: Option<String>) {
        self.items.push(Diagnostic {
            severity,
            field,
            message,
            hint,
        });
    }

    pub fn error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.push(Severity::Error, field.into(), message.into(), None);
    }

    pub fn error_with_hint(
        &mut self,
        field: impl Into<String>,
        message: impl Into<String>,
        hint: impl Into<String>,
    ) {
        self.push(Severity::Error, field.into(), message.into(), Some(hint.into()));
    }

    pub fn warn(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.push(Severity::Warning, field.into(), message.into(), None);
    }

    fn of(&self, severity: Severity) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(move |d| d.severity == severity)
    }

    pub fn errors(&self) -> Vec<&Diagnostic> {
        self.of(Severity::Error).collect()
    }

    pub fn has_errors(&self) -> bool {
        self.of(Severity::Error).next().is_some()
    }

    /// Log the warnings, then fail if any error was collected.
    pub fn finish(self) -> Result<(), ConfigError> {
        for warning in self.of(Severity::Warning) {
            crate::log!("config"; "warning: {warning}");
        }
        if self.has_errors() {
            Err(ConfigError::Invalid(self))
        } else {
            Ok(())
        }
    }
}

impl fmt::Display for ConfigDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let errors = self.errors();
        write!(f, "{}", "invalid configuration:".red().bold())?;
        for error in &errors {
            write!(f, "\n  {} {error}", "-".red())?;
        }
        if errors.len() > 1 {
            write!(f, "\n{} errors", errors.len())?;
        }
        Ok(())
    }
}

impl std::error::Error for ConfigDiagnostics {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_config_error_display() {
        let io_err = ConfigError::Io(
            PathBuf::from("sluice.toml"),
            Error::new(ErrorKind::NotFound, "file not found"),
        );
        assert_eq!(io_err.to_string(), "cannot read `sluice.toml`");

        let missing = ConfigError::ConfigurationMissing {
            environment: "staging".into(),
            credentials: PathBuf::from("hostconfig.json"),
        };
        let display = missing.to_string();
        assert!(display.contains("[deploy.targets.staging]"));
        assert!(display.contains("hostconfig.json"));
    }

    #[test]
    fn test_warnings_do_not_fail() {
        let mut diag = ConfigDiagnostics::new();
        diag.warn("styles.command", "`sass` not found");
        assert!(!diag.has_errors());
        assert!(diag.finish().is_ok());
    }

    #[test]
    fn test_errors_fail_with_all_findings() {
        let mut diag = ConfigDiagnostics::new();
        diag.error_with_hint("images.jpeg_quality", "must be 1..=100", "use 80");
        diag.error("styles.command", "must not be empty");
        diag.warn("deploy.targets", "`curl` not found");

        let Err(ConfigError::Invalid(diag)) = diag.finish() else {
            panic!("expected invalid configuration");
        };
        let fields: Vec<_> = diag.errors().iter().map(|d| d.field.as_str()).collect();
        assert_eq!(fields, ["images.jpeg_quality", "styles.command"]);
        assert!(diag.to_string().contains("2 errors"));
    }
}

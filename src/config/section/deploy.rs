//! `[deploy]` section configuration.
//!
//! Targets are keyed by environment name. They can live inline in
//! `sluice.toml` or, to keep passwords out of version control, in a JSON
//! credentials file with the same shape:
//!
//! ```toml
//! [deploy]
//! credentials = "hostconfig.json"   # relative to the root, `~` allowed
//!
//! [deploy.targets.production]
//! protocol = "ftp"                  # ftp | ftps | sftp | local
//! host = "example.com"
//! port = 21                         # optional
//! user = "deploy"
//! password = "secret"
//! remote_root = "/public_html"       # absolute; drop the `/` for login-relative
//! ```
//!
//! ```json
//! { "staging": { "protocol": "sftp", "host": "stage.example.com",
//!                "user": "deploy", "password": "secret", "remote_root": "/srv/www" } }
//! ```
//!
//! Inline targets take precedence over the credentials file.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::{ConfigDiagnostics, ConfigError};
use crate::core::Environment;
use crate::deploy::DeploymentTarget;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    /// JSON credentials file (environment name to target).
    pub credentials: PathBuf,

    /// Inline targets, keyed by environment name.
    pub targets: BTreeMap<String, TargetConfig>,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            credentials: PathBuf::from("hostconfig.json"),
            targets: BTreeMap::new(),
        }
    }
}

/// Remote transfer protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Ftp,
    Ftps,
    Sftp,
    /// Mirror into a directory (mounted share)
    Local,
}

/// One deployment target as written in configuration.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetConfig {
    pub protocol: Protocol,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    pub remote_root: String,
}

impl fmt::Debug for TargetConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetConfig")
            .field("protocol", &self.protocol)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("remote_root", &self.remote_root)
            .finish()
    }
}

impl TargetConfig {
    fn bind(&self, environment: Environment) -> DeploymentTarget {
        DeploymentTarget {
            protocol: self.protocol,
            host: self.host.clone(),
            port: self.port,
            user: self.user.clone(),
            password: self.password.clone(),
            remote_root: self.remote_root.clone(),
            environment,
        }
    }

    fn validate(&self, field: &str, diag: &mut ConfigDiagnostics) {
        if self.protocol != Protocol::Local && self.host.is_empty() {
            diag.error(format!("{field}.host"), "required for remote protocols");
        }
        if self.remote_root.is_empty() {
            diag.error(format!("{field}.remote_root"), "must not be empty");
        }
    }
}

impl DeployConfig {
    /// Absolute credentials path (`~` expanded, relative to `root`).
    pub fn credentials_path(&self, root: &Path) -> PathBuf {
        let raw = self.credentials.to_string_lossy();
        let expanded = PathBuf::from(shellexpand::tilde(&raw).into_owned());
        if expanded.is_relative() {
            root.join(expanded)
        } else {
            expanded
        }
    }

    /// Build the deployment target for `environment`.
    pub fn target_for(
        &self,
        environment: Environment,
        root: &Path,
    ) -> Result<DeploymentTarget, ConfigError> {
        if let Some(target) = self.targets.get(environment.name()) {
            return Ok(target.bind(environment));
        }

        let path = self.credentials_path(root);
        let missing = || ConfigError::ConfigurationMissing {
            environment: environment.name().to_string(),
            credentials: path.clone(),
        };

        if !path.is_file() {
            return Err(missing());
        }
        let content =
            std::fs::read_to_string(&path).map_err(|e| ConfigError::Io(path.clone(), e))?;
        let file: BTreeMap<String, TargetConfig> =
            serde_json::from_str(&content).map_err(|e| ConfigError::Json(path.clone(), e))?;

        file.get(environment.name())
            .map(|target| target.bind(environment))
            .ok_or_else(missing)
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        for (name, target) in &self.targets {
            let field = format!("deploy.targets.{name}");
            if Environment::from_flag(name).is_none_or(|env| env.name() != name) {
                diag.error_with_hint(
                    field.clone(),
                    format!("unknown environment `{name}`"),
                    "use development, staging or production",
                );
            }
            target.validate(&field, diag);
        }

        let needs_curl = self.targets.values().any(|t| t.protocol != Protocol::Local);
        if needs_curl && which::which("curl").is_err() {
            diag.warn("deploy.targets", "`curl` not found, remote deploys will fail");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;
    use tempfile::TempDir;

    #[test]
    fn test_inline_target() {
        let config = test_parse_config(
            "[deploy.targets.production]\nprotocol = \"ftp\"\nhost = \"example.com\"\nuser = \"u\"\npassword = \"p\"\nremote_root = \"/www\"\n",
        );
        let target = config
            .deploy
            .target_for(Environment::Production, Path::new("/nowhere"))
            .unwrap();
        assert_eq!(target.protocol, Protocol::Ftp);
        assert_eq!(target.host, "example.com");
        assert_eq!(target.environment, Environment::Production);
    }

    #[test]
    fn test_credentials_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("hostconfig.json"),
            r#"{"staging": {"protocol": "sftp", "host": "stage.example.com", "user": "u", "password": "p", "remote_root": "/srv"}}"#,
        )
        .unwrap();

        let deploy = DeployConfig::default();
        let target = deploy.target_for(Environment::Staging, dir.path()).unwrap();
        assert_eq!(target.protocol, Protocol::Sftp);
        assert_eq!(target.remote_root, "/srv");

        let err = deploy
            .target_for(Environment::Production, dir.path())
            .unwrap_err();
        assert!(matches!(err, ConfigError::ConfigurationMissing { .. }));
    }

    #[test]
    fn test_missing_everything() {
        let dir = TempDir::new().unwrap();
        let err = DeployConfig::default()
            .target_for(Environment::Staging, dir.path())
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::ConfigurationMissing { ref environment, .. } if environment == "staging"
        ));
    }

    #[test]
    fn test_invalid_credentials_json() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("hostconfig.json"), "{ nope").unwrap();
        let err = DeployConfig::default()
            .target_for(Environment::Staging, dir.path())
            .unwrap_err();
        assert!(matches!(err, ConfigError::Json(..)));
    }

    #[test]
    fn test_password_redacted_in_debug() {
        let target = TargetConfig {
            protocol: Protocol::Ftp,
            host: "h".into(),
            port: None,
            user: "u".into(),
            password: "hunter2".into(),
            remote_root: "/".into(),
        };
        assert!(!format!("{target:?}").contains("hunter2"));
    }

    #[test]
    fn test_validate_unknown_environment() {
        let config = test_parse_config(
            "[deploy.targets.qa]\nprotocol = \"local\"\nremote_root = \"/mnt/www\"\n",
        );
        let mut diag = ConfigDiagnostics::new();
        config.deploy.validate(&mut diag);
        assert!(diag.errors().iter().any(|e| e.field == "deploy.targets.qa"));
    }
}

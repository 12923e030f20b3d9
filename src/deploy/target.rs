//! Deployment targets.

use std::fmt;

use crate::config::Protocol;
use crate::core::Environment;

/// Where one deployment run uploads to.
///
/// Built from configuration for exactly one run and only ever borrowed.
#[derive(Clone, PartialEq, Eq)]
pub struct DeploymentTarget {
    pub protocol: Protocol,
    pub host: String,
    pub port: Option<u16>,
    pub user: String,
    pub password: String,
    pub remote_root: String,
    pub environment: Environment,
}

impl DeploymentTarget {
    /// Credential-free description for log lines (`ftp://deploy@example.com/www`).
    pub fn display(&self) -> String {
        match self.protocol {
            Protocol::Local => self.remote_root.clone(),
            protocol => {
                let scheme = match protocol {
                    Protocol::Ftps => "ftps",
                    Protocol::Sftp => "sftp",
                    _ => "ftp",
                };
                let user = if self.user.is_empty() {
                    String::new()
                } else {
                    format!("{}@", self.user)
                };
                let port = self.port.map(|p| format!(":{p}")).unwrap_or_default();
                format!(
                    "{scheme}://{user}{}{port}/{}",
                    self.host,
                    self.remote_root.trim_start_matches('/')
                )
            }
        }
    }
}

impl fmt::Debug for DeploymentTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeploymentTarget")
            .field("protocol", &self.protocol)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("remote_root", &self.remote_root)
            .field("environment", &self.environment)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(protocol: Protocol) -> DeploymentTarget {
        DeploymentTarget {
            protocol,
            host: "example.com".into(),
            port: None,
            user: "deploy".into(),
            password: "hunter2".into(),
            remote_root: "/www".into(),
            environment: Environment::Production,
        }
    }

    #[test]
    fn test_display_hides_password() {
        let t = target(Protocol::Ftp);
        assert_eq!(t.display(), "ftp://deploy@example.com/www");
        assert!(!format!("{t:?}").contains("hunter2"));
    }

    #[test]
    fn test_display_with_port_and_local() {
        let mut t = target(Protocol::Sftp);
        t.port = Some(2222);
        assert_eq!(t.display(), "sftp://deploy@example.com:2222/www");
        assert_eq!(target(Protocol::Local).display(), "/www");
    }
}

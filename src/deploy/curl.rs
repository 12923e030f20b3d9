//! FTP, FTPS and SFTP through the `curl` command line tool.
//!
//! Credentials never appear on the command line: they are written to curl's
//! stdin as a config file (`--config -`).
//!
//! | Operation | Invocation                                        |
//! |-----------|---------------------------------------------------|
//! | stat      | `curl --head URL`, `Last-Modified` from the reply |
//! | upload    | `curl --ftp-create-dirs -T FILE URL`              |
//!
//! A `remote_root` starting with `/` is absolute. curl resolves FTP URL
//! paths against the login directory, so absolute FTP roots are anchored
//! with `%2F`; without the leading `/` the root stays login-relative.
//! SFTP URL paths are always absolute.

use std::path::Path;
use std::time::SystemTime;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use super::{DeploymentTarget, Transport, TransportError};
use crate::config::Protocol;
use crate::utils::date::DateTimeUtc;
use crate::utils::exec::{Cmd, SILENT_FILTER};
use crate::utils::path::to_slash;

/// Characters kept verbatim in URL path segments.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'.')
    .remove(b'-')
    .remove(b'_')
    .remove(b'~');

/// curl exit codes meaning "no such remote file".
///
/// 9: FTP denied access to the directory (it does not exist yet),
/// 19: FTP could not retrieve the file, 78: remote file not found.
const ABSENT_CODES: [i32; 3] = [9, 19, 78];

pub struct CurlTransport {
    /// `scheme://host[:port]`
    origin: String,
    /// Encoded remote root, empty for the top
    root: String,
    /// `%2F` for an absolute FTP root
    anchor: &'static str,
    ssl: bool,
    config: String,
}

impl CurlTransport {
    pub fn new(target: &DeploymentTarget) -> Self {
        let scheme = match target.protocol {
            Protocol::Sftp => "sftp",
            _ => "ftp",
        };
        let port = target.port.map(|p| format!(":{p}")).unwrap_or_default();
        let absolute = target.remote_root.starts_with('/');

        Self {
            origin: format!("{scheme}://{}{port}", target.host),
            root: encode_path(target.remote_root.trim_matches('/')),
            anchor: if scheme == "ftp" && absolute { "%2F" } else { "" },
            ssl: target.protocol == Protocol::Ftps,
            config: credentials_config(&target.user, &target.password),
        }
    }

    /// Remote URL of a repository-relative path.
    fn url(&self, rel: &Path) -> String {
        let rel = encode_path(&to_slash(rel));
        if self.root.is_empty() {
            format!("{}/{}{rel}", self.origin, self.anchor)
        } else {
            format!("{}/{}{}/{rel}", self.origin, self.anchor, self.root)
        }
    }

    fn command(&self) -> Cmd {
        let cmd = Cmd::new("curl")
            .args(["--silent", "--show-error", "--config", "-"])
            .stdin(&self.config);
        if self.ssl { cmd.arg("--ssl-reqd") } else { cmd }
    }
}

impl Transport for CurlTransport {
    fn name(&self) -> &'static str {
        "curl"
    }

    fn is_available(&self) -> bool {
        which::which("curl").is_ok()
    }

    fn stat(&self, rel: &Path) -> Result<Option<SystemTime>, TransportError> {
        let stat_err = |message: String| TransportError::Stat {
            path: rel.to_path_buf(),
            message,
        };

        let output = self
            .command()
            .arg("--head")
            .arg(self.url(rel))
            .output()
            .map_err(|e| stat_err(e.to_string()))?;

        match output.status.code() {
            Some(0) => Ok(last_modified(&String::from_utf8_lossy(&output.stdout))),
            Some(code) if ABSENT_CODES.contains(&code) => Ok(None),
            _ => Err(stat_err(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            )),
        }
    }

    fn upload(&self, local: &Path, rel: &Path) -> Result<(), TransportError> {
        self.command()
            .arg("--ftp-create-dirs")
            .arg("-T")
            .arg(local)
            .arg(self.url(rel))
            .filter(&SILENT_FILTER)
            .run()
            .map_err(|e| TransportError::Upload {
                path: rel.to_path_buf(),
                message: e.to_string(),
            })?;
        Ok(())
    }
}

/// Percent-encode each segment of a slash-separated path.
fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| utf8_percent_encode(segment, SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

/// curl config file text carrying the login.
fn credentials_config(user: &str, password: &str) -> String {
    if user.is_empty() {
        return String::new();
    }
    let quote = |s: &str| s.replace('\\', "\\\\").replace('"', "\\\"");
    format!("user = \"{}:{}\"\n", quote(user), quote(password))
}

/// `Last-Modified` header of a `curl --head` reply.
fn last_modified(head: &str) -> Option<SystemTime> {
    head.lines().find_map(|line| {
        let (name, value) = line.split_once(':')?;
        name.trim()
            .eq_ignore_ascii_case("last-modified")
            .then(|| DateTimeUtc::parse_rfc2822(value))
            .flatten()
            .map(DateTimeUtc::to_system_time)
    })
}

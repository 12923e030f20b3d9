//! Transport interface.
//!
//! A transport knows two things about the remote side: when a file was last
//! modified there, and how to put a file there. The upload decision lives
//! elsewhere ([`super::should_upload`]).

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use thiserror::Error;

use super::{CurlTransport, DeploymentTarget, LocalTransport};
use crate::config::Protocol;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("{transport} transport is not available: {hint}")]
    Unavailable {
        transport: &'static str,
        hint: String,
    },

    #[error("cannot stat remote {path}: {message}")]
    Stat { path: PathBuf, message: String },

    #[error("cannot upload {path}: {message}")]
    Upload { path: PathBuf, message: String },
}

/// Remote side of a deployment.
pub trait Transport: Send + Sync {
    /// Name for log lines.
    fn name(&self) -> &'static str;

    /// Whether the transport can run on this system.
    fn is_available(&self) -> bool;

    /// Last modification time of `rel` on the remote, `None` when absent.
    fn stat(&self, rel: &Path) -> Result<Option<SystemTime>, TransportError>;

    /// Copy `local` to `rel` on the remote, creating directories as needed.
    fn upload(&self, local: &Path, rel: &Path) -> Result<(), TransportError>;
}

/// Transport for `target`'s protocol.
pub fn transport_for(target: &DeploymentTarget) -> Result<Box<dyn Transport>, TransportError> {
    let transport: Box<dyn Transport> = match target.protocol {
        Protocol::Local => Box::new(LocalTransport::new(&target.remote_root)),
        Protocol::Ftp | Protocol::Ftps | Protocol::Sftp => Box::new(CurlTransport::new(target)),
    };

    if !transport.is_available() {
        return Err(TransportError::Unavailable {
            transport: transport.name(),
            hint: match target.protocol {
                Protocol::Local => format!("`{}` is not a directory", target.remote_root),
                _ => "install curl".to_string(),
            },
        });
    }
    Ok(transport)
}

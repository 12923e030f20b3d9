//! Deployment: upload the resolved file set, skipping files whose remote
//! copy is already up to date.
//!
//! # Module Structure
//!
//! ```text
//! deploy/
//! ├── target.rs     # DeploymentTarget
//! ├── decision.rs   # should_upload
//! ├── transport.rs  # Transport trait, transport_for
//! ├── local.rs      # directory mirror
//! ├── curl.rs       # ftp / ftps / sftp through curl
//! └── report.rs     # DeployReport
//! ```

mod curl;
mod decision;
mod local;
mod report;
mod target;
mod transport;

#[cfg(test)]
mod tests;

pub use curl::CurlTransport;
pub use decision::should_upload;
pub use local::LocalTransport;
pub use report::{DeployReport, Outcome};
pub use target::DeploymentTarget;
pub use transport::{Transport, TransportError, transport_for};

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::freshness::get_mtime;
use crate::{debug, log};

/// Upload every file of `files` (relative to `root`) that is newer than its
/// remote copy.
///
/// Files are processed sequentially in sorted order. A failed remote stat
/// counts as "absent". A local file that can no longer be read or a failed
/// upload is recorded and the run continues. Only a transport that cannot
/// run at all fails the call, before anything is transferred.
pub fn deploy(
    root: &Path,
    files: &BTreeSet<PathBuf>,
    target: &DeploymentTarget,
    transport: &dyn Transport,
) -> Result<DeployReport, TransportError> {
    if !transport.is_available() {
        return Err(TransportError::Unavailable {
            transport: transport.name(),
            hint: format!("cannot reach {}", target.display()),
        });
    }
    log!("deploy"; "{} files to {} ({})", files.len(), target.display(), transport.name());

    let mut report = DeployReport::default();
    for rel in files {
        let local = root.join(rel);
        let Some(local_mtime) = get_mtime(&local) else {
            log!("deploy"; "cannot read {}", local.display());
            report.record(rel.clone(), Outcome::Failed("local file is missing".into()));
            continue;
        };

        let remote_mtime = transport.stat(rel).unwrap_or_else(|e| {
            log!("deploy"; "{e}, uploading anyway");
            None
        });

        if !should_upload(local_mtime, remote_mtime) {
            debug!("deploy"; "up to date: {}", rel.display());
            report.record(rel.clone(), Outcome::Skipped);
            continue;
        }

        match transport.upload(&local, rel) {
            Ok(()) => {
                debug!("deploy"; "uploaded: {}", rel.display());
                report.record(rel.clone(), Outcome::Uploaded);
            }
            Err(e) => {
                log!("deploy"; "{e}");
                report.record(rel.clone(), Outcome::Failed(e.to_string()));
            }
        }
    }

    log!("deploy"; "{}", report.summary());
    Ok(report)
}

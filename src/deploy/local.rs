//! Directory mirror transport (mounted shares, tests).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use super::{Transport, TransportError};

pub struct LocalTransport {
    root: PathBuf,
}

impl LocalTransport {
    pub fn new(root: impl AsRef<Path>) -> Self {
        let raw = root.as_ref().to_string_lossy();
        Self {
            root: PathBuf::from(shellexpand::tilde(&raw).into_owned()),
        }
    }
}

impl Transport for LocalTransport {
    fn name(&self) -> &'static str {
        "local"
    }

    fn is_available(&self) -> bool {
        self.root.is_dir()
    }

    fn stat(&self, rel: &Path) -> Result<Option<SystemTime>, TransportError> {
        let path = self.root.join(rel);
        match fs::metadata(&path).and_then(|m| m.modified()) {
            Ok(mtime) => Ok(Some(mtime)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(TransportError::Stat {
                path: rel.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    fn upload(&self, local: &Path, rel: &Path) -> Result<(), TransportError> {
        let dest = self.root.join(rel);
        let upload_err = |e: io::Error| TransportError::Upload {
            path: rel.to_path_buf(),
            message: e.to_string(),
        };

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(upload_err)?;
        }
        fs::copy(local, &dest).map_err(upload_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_stat_and_upload() {
        let local = TempDir::new().unwrap();
        let remote = TempDir::new().unwrap();
        let transport = LocalTransport::new(remote.path());
        assert!(transport.is_available());

        let rel = Path::new("js/app.js");
        assert_eq!(transport.stat(rel).unwrap(), None);

        let source = local.path().join("app.js");
        fs::write(&source, "app();").unwrap();
        transport.upload(&source, rel).unwrap();

        assert!(transport.stat(rel).unwrap().is_some());
        assert_eq!(fs::read_to_string(remote.path().join(rel)).unwrap(), "app();");
    }

    #[test]
    fn test_missing_root_unavailable() {
        let transport = LocalTransport::new("/nonexistent/sluice/remote");
        assert!(!transport.is_available());
    }
}

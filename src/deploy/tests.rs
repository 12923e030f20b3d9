use super::*;
use crate::config::Protocol;
use crate::core::Environment;
use std::fs;
use std::sync::Mutex;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

fn set_mtime(path: &Path, time: SystemTime) {
    fs::File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(time)
        .unwrap();
}

fn local_target(remote: &Path) -> DeploymentTarget {
    DeploymentTarget {
        protocol: Protocol::Local,
        host: String::new(),
        port: None,
        user: String::new(),
        password: String::new(),
        remote_root: remote.display().to_string(),
        environment: Environment::Staging,
    }
}

fn files(names: &[&str]) -> BTreeSet<PathBuf> {
    names.iter().map(PathBuf::from).collect()
}

#[test]
fn test_newer_remote_skipped_absent_uploaded() {
    let local = TempDir::new().unwrap();
    let remote = TempDir::new().unwrap();
    let now = SystemTime::now();

    fs::write(local.path().join("x.js"), "x();").unwrap();
    fs::write(local.path().join("y.js"), "y();").unwrap();
    set_mtime(&local.path().join("x.js"), now - Duration::from_secs(3600));

    fs::write(remote.path().join("x.js"), "remote x").unwrap();
    set_mtime(&remote.path().join("x.js"), now);

    let target = local_target(remote.path());
    let transport = transport_for(&target).unwrap();
    let report = deploy(local.path(), &files(&["x.js", "y.js"]), &target, &*transport).unwrap();

    assert_eq!(report.skipped().collect::<Vec<_>>(), vec![Path::new("x.js")]);
    assert_eq!(report.uploaded().collect::<Vec<_>>(), vec![Path::new("y.js")]);
    assert_eq!(fs::read_to_string(remote.path().join("x.js")).unwrap(), "remote x");
    assert_eq!(fs::read_to_string(remote.path().join("y.js")).unwrap(), "y();");
}

#[test]
fn test_older_remote_replaced() {
    let local = TempDir::new().unwrap();
    let remote = TempDir::new().unwrap();
    let now = SystemTime::now();

    fs::create_dir_all(local.path().join("css")).unwrap();
    fs::write(local.path().join("css/a.css"), "new").unwrap();
    fs::create_dir_all(remote.path().join("css")).unwrap();
    fs::write(remote.path().join("css/a.css"), "old").unwrap();
    set_mtime(&remote.path().join("css/a.css"), now - Duration::from_secs(3600));

    let target = local_target(remote.path());
    let report = deploy(
        local.path(),
        &files(&["css/a.css"]),
        &target,
        &LocalTransport::new(remote.path()),
    )
    .unwrap();

    assert_eq!(report.uploaded().count(), 1);
    assert_eq!(fs::read_to_string(remote.path().join("css/a.css")).unwrap(), "new");
}

/// Records uploads; fails stat and upload for chosen files.
struct FlakyTransport {
    stat_fails: &'static str,
    upload_fails: &'static str,
    uploads: Mutex<Vec<PathBuf>>,
}

impl Transport for FlakyTransport {
    fn name(&self) -> &'static str {
        "flaky"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn stat(&self, rel: &Path) -> Result<Option<SystemTime>, TransportError> {
        if rel == Path::new(self.stat_fails) {
            return Err(TransportError::Stat {
                path: rel.to_path_buf(),
                message: "connection reset".into(),
            });
        }
        Ok(None)
    }

    fn upload(&self, _local: &Path, rel: &Path) -> Result<(), TransportError> {
        if rel == Path::new(self.upload_fails) {
            return Err(TransportError::Upload {
                path: rel.to_path_buf(),
                message: "timeout".into(),
            });
        }
        self.uploads.lock().unwrap().push(rel.to_path_buf());
        Ok(())
    }
}

#[test]
fn test_failures_do_not_stop_the_run() {
    let local = TempDir::new().unwrap();
    for name in ["a.js", "b.js", "c.js"] {
        fs::write(local.path().join(name), name).unwrap();
    }

    let transport = FlakyTransport {
        stat_fails: "a.js",
        upload_fails: "b.js",
        uploads: Mutex::new(Vec::new()),
    };
    let target = local_target(local.path());
    let report =
        deploy(local.path(), &files(&["a.js", "b.js", "c.js"]), &target, &transport).unwrap();

    // failed stat counts as absent
    assert_eq!(
        *transport.uploads.lock().unwrap(),
        vec![PathBuf::from("a.js"), PathBuf::from("c.js")]
    );
    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, Path::new("b.js"));
    assert!(failures[0].1.contains("timeout"));
}

#[test]
fn test_missing_local_file_is_recorded() {
    let local = TempDir::new().unwrap();
    let remote = TempDir::new().unwrap();
    // b.js vanished between resolving the file set and uploading
    fs::write(local.path().join("a.js"), "a();").unwrap();
    fs::write(local.path().join("c.js"), "c();").unwrap();

    let target = local_target(remote.path());
    let report = deploy(
        local.path(),
        &files(&["a.js", "b.js", "c.js"]),
        &target,
        &LocalTransport::new(remote.path()),
    )
    .unwrap();

    assert_eq!(
        report.uploaded().collect::<Vec<_>>(),
        vec![Path::new("a.js"), Path::new("c.js")]
    );
    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, Path::new("b.js"));
    assert!(remote.path().join("c.js").is_file());
    assert!(!remote.path().join("b.js").exists());
}

#[test]
fn test_unavailable_transport_transfers_nothing() {
    let local = TempDir::new().unwrap();
    fs::write(local.path().join("a.js"), "a();").unwrap();
    let missing = local.path().join("remote");
    let target = local_target(&missing);

    let result = deploy(
        local.path(),
        &files(&["a.js"]),
        &target,
        &LocalTransport::new(&missing),
    );
    assert!(matches!(result, Err(TransportError::Unavailable { .. })));
    assert!(!missing.exists());
}

#[test]
fn test_unavailable_local_root() {
    let target = local_target(Path::new("/nonexistent/sluice/remote"));
    assert!(matches!(
        transport_for(&target),
        Err(TransportError::Unavailable { transport: "local", .. })
    ));
}

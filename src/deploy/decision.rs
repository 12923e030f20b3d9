//! Upload decision.

use std::time::SystemTime;

/// Whether a local file must be uploaded.
///
/// Upload when the remote copy is absent or strictly older than the local
/// file. An equal timestamp counts as up to date.
pub fn should_upload(local: SystemTime, remote: Option<SystemTime>) -> bool {
    remote.is_none_or(|remote| remote < local)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_should_upload() {
        let now = SystemTime::now();
        let hour = Duration::from_secs(3600);

        assert!(should_upload(now, None));
        assert!(should_upload(now, Some(now - hour)));
        assert!(!should_upload(now, Some(now)));
        assert!(!should_upload(now, Some(now + hour)));
    }
}

//! Process-wide shutdown state.
//!
//! Ctrl+C before a watch loop is registered exits immediately. Once the watch
//! loop registers its channel, Ctrl+C only asks it to stop, so stage runs in
//! flight finish writing their outputs.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Context;
use tokio::sync::mpsc::UnboundedSender;

/// Shutdown has been requested (Ctrl+C received)
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Shutdown signal sender for the watch loop
static SHUTDOWN_TX: OnceLock<UnboundedSender<()>> = OnceLock::new();

/// Install the Ctrl+C handler; call once, first thing in `main`.
///
/// A second Ctrl+C while the watch loop is draining exits immediately.
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        let repeated = SHUTDOWN.swap(true, Ordering::SeqCst);

        match SHUTDOWN_TX.get() {
            Some(tx) if !repeated => {
                crate::log!("watch"; "shutting down...");
                let _ = tx.send(());
            }
            // Nothing long-running to stop gracefully
            _ => std::process::exit(130),
        }
    })
    .context("cannot install the Ctrl+C handler")
}

/// Route the next Ctrl+C to the watch loop instead of exiting.
pub fn register_watch(shutdown_tx: UnboundedSender<()>) {
    let _ = SHUTDOWN_TX.set(shutdown_tx);
}

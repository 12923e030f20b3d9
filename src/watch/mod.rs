//! Watch mode: re-run stages when their sources change.
//!
//! ```text
//! notify ─▶ bridge thread ─▶ Debouncer ─▶ Coordinator ─▶ spawn_blocking(run)
//!                                              ▲                  │
//!                                              └──── completion ◀─┘
//! ```
//!
//! One event loop owns all state. Stage runs happen on blocking workers, so
//! different stages build concurrently while one stage never overlaps
//! itself. Ctrl+C stops the loop once in-flight runs have finished.

mod coordinator;
mod debouncer;

pub use coordinator::Coordinator;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use notify::{RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::core::EnvironmentContext;
use crate::log;
use crate::logger::{status_error, status_success};
use crate::pipeline::{self, PipelineError, PipelineStage, StageName, StageReport};
use debouncer::Debouncer;

type Completion = (StageName, Result<StageReport, PipelineError>);

/// Watch the source directories of `stages` until Ctrl+C.
pub fn watch(stages: Vec<PipelineStage>, env: EnvironmentContext) -> Result<()> {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    rt.block_on(event_loop(stages.into_iter().map(Arc::new).collect(), env))
}

async fn event_loop(stages: Vec<Arc<PipelineStage>>, env: EnvironmentContext) -> Result<()> {
    let mut roots: Vec<PathBuf> = stages.iter().map(|s| s.source_dir.clone()).collect();
    roots.sort();
    roots.dedup();

    // notify has no async interface; bridge through a thread
    let (notify_tx, notify_rx) = std::sync::mpsc::channel();
    let mut watcher = notify::recommended_watcher(move |res| {
        let _ = notify_tx.send(res);
    })
    .context("failed to create file watcher")?;

    for root in &roots {
        if root.is_dir() {
            watcher
                .watch(root, RecursiveMode::Recursive)
                .with_context(|| format!("failed to watch {}", root.display()))?;
        } else {
            log!("watch"; "{} does not exist, not watching", root.display());
        }
    }

    let (event_tx, mut event_rx) = mpsc::channel::<notify::Event>(64);
    std::thread::spawn(move || {
        while let Ok(result) = notify_rx.recv() {
            match result {
                Ok(event) => {
                    if event_tx.blocking_send(event).is_err() {
                        break;
                    }
                }
                Err(e) => log!("watch"; "notify error: {}", e),
            }
        }
    });

    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<Completion>();
    let (shutdown_tx, mut shutdown_rx) = mpsc::unbounded_channel();
    crate::core::register_watch(shutdown_tx);

    let names: Vec<_> = stages.iter().map(|s| s.name.as_str()).collect();
    log!("watch"; "watching {} (Ctrl+C to stop)", names.join(", "));

    let mut coordinator = Coordinator::new(stages);
    let mut debouncer = Debouncer::new();
    let mut stopping = false;

    loop {
        tokio::select! {
            biased;
            Some(()) = shutdown_rx.recv() => {
                stopping = true;
                if !coordinator.is_busy() {
                    break;
                }
            }
            Some((name, result)) = done_rx.recv() => {
                show_status(name, &result);
                if coordinator.on_finished(name) {
                    if stopping {
                        // drop the pending re-run
                        coordinator.on_finished(name);
                    } else {
                        spawn_run(&coordinator, name, env, &done_tx);
                    }
                }
                if stopping && !coordinator.is_busy() {
                    break;
                }
            }
            Some(event) = event_rx.recv(), if !stopping => debouncer.add_event(&event),
            _ = tokio::time::sleep(debouncer.sleep_duration()), if !stopping => {
                if let Some(paths) = debouncer.take_if_ready() {
                    let started = coordinator.on_changes(paths.iter().map(PathBuf::as_path));
                    for name in started {
                        spawn_run(&coordinator, name, env, &done_tx);
                    }
                }
            }
            else => break,
        }
    }

    drop(watcher);
    Ok(())
}

fn spawn_run(
    coordinator: &Coordinator,
    name: StageName,
    env: EnvironmentContext,
    done_tx: &mpsc::UnboundedSender<Completion>,
) {
    let Some(stage) = coordinator.stage(name).map(Arc::clone) else {
        return;
    };
    let done_tx = done_tx.clone();
    tokio::task::spawn_blocking(move || {
        let result = pipeline::run(&stage, &env);
        let _ = done_tx.send((stage.name, result));
    });
}

fn show_status(name: StageName, result: &Result<StageReport, PipelineError>) {
    match result {
        Ok(report) if report.is_clean() => status_success(&report.summary()),
        Ok(report) => {
            let detail: Vec<String> = report.failures.iter().map(ToString::to_string).collect();
            status_error(&report.summary(), &detail.join("\n"));
        }
        Err(e) => status_error(&format!("{name} failed"), &e.to_string()),
    }
}

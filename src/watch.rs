//! File watcher: runs `check` on startup, then re-runs on build output changes.

use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

use notify::{RecursiveMode, Watcher as _};

use crate::checks::CheckKind;
use crate::commands;
use crate::config::Config;
use crate::diagnostics;
use crate::error;
use crate::report::Format;

/// Debounce delay between filesystem events and re-check.
const DEBOUNCE_MS: u64 = 100;

/// Exit code for a run that failed before producing a report.
const EXIT_RUNTIME_ERROR: u8 = 2;

/// Create a filesystem watcher that sends events on the given channel.
///
/// # Errors
///
/// Returns `Error::WatchFailed` if the watcher cannot be created.
fn create_watcher(
    tx: crossbeam_channel::Sender<()>,
) -> Result<notify::RecommendedWatcher, error::Error> {
    return notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
        if let Ok(event) = res
            && matches!(
                event.kind,
                notify::EventKind::Create(_)
                    | notify::EventKind::Modify(_)
                    | notify::EventKind::Remove(_)
            )
        {
            let _ = tx.send(());
        }
    })
    .map_err(|e| {
        return error::Error::WatchFailed {
            reason: format!("watcher setup failed: {e}"),
        };
    });
}

/// Entry point for the watch command.
///
/// Runs an initial check, then watches the build output root recursively and
/// re-checks on changes. Each run takes a fresh snapshot.
///
/// # Errors
///
/// Returns errors from config loading or watcher setup.
pub fn run(root_override: Option<&Path>, format: Format, only: &[CheckKind]) -> Result<ExitCode, error::Error> {
    let config = Config::load(Path::new("."))?;
    let root = config.root(root_override);

    eprintln!("watch: initial check");
    let mut last_code = run_check(root_override, format, only);

    let (tx, rx) = crossbeam_channel::unbounded();
    let mut watcher = create_watcher(tx)?;

    // The generator may not have produced the root yet; watch its parent until it does.
    let watched = if root.exists() {
        root.clone()
    } else {
        tracing::warn!(root = %root.display(), "build output missing, watching parent directory");
        root.parent().filter(|p| return !p.as_os_str().is_empty()).unwrap_or(Path::new(".")).to_path_buf()
    };
    watcher.watch(&watched, RecursiveMode::Recursive).map_err(|e| {
        return error::Error::WatchFailed {
            reason: format!("cannot watch {}: {e}", watched.display()),
        };
    })?;

    eprintln!("watch: monitoring {}, press Ctrl+C to stop", watched.display());

    while rx.recv().is_ok() {
        let debounce = Duration::from_millis(DEBOUNCE_MS);
        while rx.recv_timeout(debounce).is_ok() {}
        eprintln!("watch: change detected, re-checking...");
        last_code = run_check(root_override, format, only);
    }

    return Ok(last_code);
}

/// Run check once and print result. Returns the exit code from check.
fn run_check(root_override: Option<&Path>, format: Format, only: &[CheckKind]) -> ExitCode {
    return match commands::check(root_override, format, only) {
        Ok(code) => code,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::from(EXIT_RUNTIME_ERROR)
        },
    };
}

//! File watcher: renders on startup, then re-renders when documents, the
//! config, or the checked-out revision change.

use std::path::{Component, Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use notify::{RecursiveMode, Watcher as _};

use crate::commands::{self, Overrides};
use crate::config::CONFIG_FILE;
use crate::error;
use crate::scanner::DocFormat;

/// Debounce delay between filesystem events and re-render.
const DEBOUNCE_MS: u64 = 100;

/// Create a filesystem watcher that sends events on the given channel,
/// ignoring everything written under `out_dir`.
///
/// # Errors
///
/// Returns an error if the watcher cannot be created.
fn create_watcher(
    tx: crossbeam_channel::Sender<()>,
    out_dir: PathBuf,
) -> Result<notify::RecommendedWatcher, error::Error> {
    return notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
        if let Ok(event) = res
            && matches!(
                event.kind,
                notify::EventKind::Create(_)
                    | notify::EventKind::Modify(_)
                    | notify::EventKind::Remove(_)
            )
            && event.paths.iter().any(|p| return is_relevant(p, &out_dir))
        {
            let _ = tx.send(());
        }
    })
    .map_err(|e| return error::Error::Watch { reason: e.to_string() });
}

/// Whether a changed path can affect rendered output.
fn is_relevant(path: &Path, out_dir: &Path) -> bool {
    if path.starts_with(out_dir) {
        return false;
    }
    if touches_revision(path) {
        return true;
    }
    return DocFormat::from_path(path).is_some()
        || path.file_name().is_some_and(|n| return n == CONFIG_FILE);
}

/// Entry point for the watch command.
///
/// Renders once, then watches the tree and re-renders on changes.
///
/// # Errors
///
/// Returns errors from the initial path setup or watcher creation.
pub fn run(overrides: &Overrides, out_dir: &Path) -> Result<ExitCode, error::Error> {
    let root = PathBuf::from(".");

    eprintln!("watch: initial render");
    let mut last_code = run_render(&root, overrides, out_dir);

    std::fs::create_dir_all(out_dir)?;
    let out_abs = std::fs::canonicalize(out_dir)?;
    let root_abs = std::fs::canonicalize(&root)?;

    let (tx, rx) = crossbeam_channel::unbounded();
    let mut watcher = create_watcher(tx, out_abs)?;
    watcher
        .watch(&root_abs, RecursiveMode::Recursive)
        .map_err(|e| return error::Error::Watch { reason: e.to_string() })?;

    eprintln!("watch: monitoring for changes, press Ctrl+C to stop");

    while rx.recv().is_ok() {
        let debounce = Duration::from_millis(DEBOUNCE_MS);
        while rx.recv_timeout(debounce).is_ok() {}
        eprintln!("watch: change detected, re-rendering...");
        last_code = run_render(&root, overrides, out_dir);
    }

    return Ok(last_code);
}

/// Render once and report. The revision is looked up again every time.
fn run_render(root: &Path, overrides: &Overrides, out_dir: &Path) -> ExitCode {
    return match commands::render(root, overrides, out_dir) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(3_u8)
        },
    };
}

/// HEAD moves and tag updates inside `.git`.
fn touches_revision(path: &Path) -> bool {
    let in_git = path.components().any(|c| return c == Component::Normal(".git".as_ref()));
    if !in_git {
        return false;
    }
    return path.file_name().is_some_and(|n| return n == "HEAD")
        || path.components().any(|c| return c == Component::Normal("refs".as_ref()));
}

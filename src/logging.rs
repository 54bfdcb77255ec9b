use std::fs;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const DEFAULT_FILTER: &str = "cbook=info";
const LOG_FILE_NAME: &str = "cbook.log";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber: a daily rolling file under `log_dir` plus a
/// stderr layer. While the TUI owns the terminal only errors reach stderr.
///
/// The returned guard flushes the file writer on drop; keep it alive for the
/// whole run. `None` means no file layer was installed.
pub fn init(log_dir: &Path, tui_mode: bool) -> Option<WorkerGuard> {
    let mut guard = None;
    let file_layer = match fs::create_dir_all(log_dir) {
        Ok(()) => {
            let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_NAME);
            let (writer, worker_guard) = tracing_appender::non_blocking(appender);
            guard = Some(worker_guard);
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_filter(env_filter()),
            )
        }
        Err(err) => {
            eprintln!(
                "warning: failed to create log directory {}: {}",
                log_dir.display(),
                err
            );
            None
        }
    };

    let console_filter = if tui_mode {
        EnvFilter::new("error")
    } else {
        env_filter()
    };
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(console_filter);

    // An already installed subscriber stays; the new layers are discarded.
    if let Err(err) = tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .try_init()
    {
        eprintln!(
            "warning: logging already initialised, not writing to {}: {}",
            log_dir.display(),
            err
        );
        return None;
    }

    guard
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn second_init_reports_and_keeps_no_guard() {
        let dir = TempDir::new().unwrap();
        let first = init(&dir.path().join("first"), false);
        assert!(first.is_some());
        assert!(dir.path().join("first").is_dir());

        let second = init(&dir.path().join("second"), false);
        assert!(second.is_none());
    }
}

use std::env;
use std::fs;
use std::path::Path;
use tracing::subscriber::DefaultGuard;
use tracing::{debug, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;
use tracing_subscriber::{fmt, EnvFilter};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Keeps the run's subscriber installed and the file writer flushing.
pub struct LogGuard {
    _default: DefaultGuard,
    _worker: Option<WorkerGuard>,
}

fn console_layer<S>() -> impl Layer<S> + Send + Sync
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false)
        .with_timer(ChronoLocal::new(TIME_FORMAT.to_string()))
        .with_ansi(true)
}

/// Build the run's log sink: one subscriber fanning out to stdout and a log
/// file. It is installed for the current thread only and removed when the
/// guard drops. If the log directory can't be created, only stdout is used.
pub fn init_logger() -> LogGuard {
    let filter = env::var("TRACING_LEVEL").unwrap_or_else(|_| "info".to_string());
    let log_file_path =
        env::var("LOG_FILE_PATH").unwrap_or_else(|_| "./log/comic-tidy.log".to_string());
    build_logger(&filter, &log_file_path)
}

fn build_logger(filter: &str, log_file_path: &str) -> LogGuard {
    let filter_layer = EnvFilter::new(filter);
    let log_file = Path::new(log_file_path);
    let log_dir = log_file.parent().unwrap_or_else(|| Path::new("."));
    let file_name = log_file
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "comic-tidy.log".into());

    if let Err(err) = fs::create_dir_all(log_dir) {
        eprintln!(
            "Cannot create log directory {}: {}; logging to stdout only",
            log_dir.display(),
            err
        );
        let subscriber = tracing_subscriber::registry()
            .with(console_layer())
            .with(filter_layer);
        return LogGuard {
            _default: tracing::subscriber::set_default(subscriber),
            _worker: None,
        };
    }

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, worker) = tracing_appender::non_blocking(file_appender);

    let subscriber = tracing_subscriber::registry()
        .with(console_layer())
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_target(false)
                .with_timer(ChronoLocal::new(TIME_FORMAT.to_string()))
                .with_ansi(false),
        )
        .with(filter_layer);

    let default = tracing::subscriber::set_default(subscriber);
    debug!("Logging to stdout and {}", log_file_path);

    LogGuard {
        _default: default,
        _worker: Some(worker),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_unwritable_log_dir_falls_back_to_stdout() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("log");
        fs::write(&blocker, b"not a directory").unwrap();
        let log_file = blocker.join("comic-tidy.log");

        let guard = build_logger("info", log_file.to_str().unwrap());

        assert!(guard._worker.is_none());
        assert!(blocker.is_file());
    }

    #[test]
    fn test_log_dir_is_created() {
        let dir = tempdir().unwrap();
        let log_dir = dir.path().join("nested").join("log");
        let log_file = log_dir.join("comic-tidy.log");

        let guard = build_logger("info", log_file.to_str().unwrap());

        assert!(guard._worker.is_some());
        assert!(log_dir.is_dir());
        drop(guard);
    }
}

use std::path::Path;

use tracing::warn;
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{
    EnvFilter, Layer, filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

fn stderr_filter(debug: u8) -> EnvFilter {
    let default_level = match debug {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy()
}

/// Installs the global subscriber: stderr at the requested verbosity plus a
/// daily rolling file under `log_dir` when it can be opened.
///
/// The returned guard must be held until exit so buffered file logs are flushed.
pub fn init_logging(debug: u8, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(atty::is(atty::Stream::Stderr))
        .with_target(false)
        .with_filter(stderr_filter(debug));

    let mut file_error = None;
    let file_parts = log_dir.and_then(|dir| {
        let appender = std::fs::create_dir_all(dir).map_err(|e| e.to_string()).and_then(|_| {
            RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix("webapp")
                .filename_suffix("log")
                .build(dir)
                .map_err(|e| e.to_string())
        });

        match appender {
            Ok(appender) => Some(tracing_appender::non_blocking(appender)),
            Err(e) => {
                file_error = Some((dir.to_path_buf(), e));
                None
            }
        }
    });

    let (file_layer, guard) = match file_parts {
        Some((writer, guard)) => (
            Some(
                fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_filter(LevelFilter::DEBUG),
            ),
            Some(guard),
        ),
        None => (None, None),
    };

    let _ = tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init();

    if let Some((dir, error)) = file_error {
        warn!(dir = %dir.display(), %error, "file logging disabled");
    }

    guard
}

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, fmt::format::FmtSpan, EnvFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install a non-blocking rolling file logger. Nothing may write to stdout or
/// stderr while the TUI owns the terminal, so the file is the only sink.
///
/// The returned guard must be held for the lifetime of the process or tail
/// log lines are lost.
pub fn init_tracing() -> WorkerGuard {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,leadlens_tui=debug,leadlens_client=debug"));

    let log_dir = "logs";
    std::fs::create_dir_all(log_dir).expect("Failed to create logs directory");
    let file_appender = tracing_appender::rolling::daily(log_dir, "leadlens.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(false)
        .with_writer(non_blocking_file);

    // try_init so re-initialization (e.g. across tests) is not fatal
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init();

    guard
}

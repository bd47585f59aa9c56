use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const CRATE_TARGET: &str = "ticket_intake";

/// Filter directive used when `RUST_LOG` is not set. An explicit `level`
/// wins over `verbose`; other crates stay at `info` only in verbose mode.
pub fn default_directive(verbose: bool, level: Option<&str>) -> String {
    let level = level
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_lowercase);
    match (level, verbose) {
        (Some(level), true) => format!("{}={},info", CRATE_TARGET, level),
        (Some(level), false) => format!("{}={}", CRATE_TARGET, level),
        (None, true) => format!("{}=debug,info", CRATE_TARGET),
        (None, false) => format!("{}=info", CRATE_TARGET),
    }
}

fn env_filter(verbose: bool, level: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, level)))
}

/// Compact human-readable output for terminal use. `RUST_LOG` wins over
/// both `verbose` and `level`.
pub fn init_cli_logger(verbose: bool, level: Option<&str>) {
    tracing_subscriber::registry()
        .with(env_filter(verbose, level))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

/// One JSON object per line, for log shippers.
pub fn init_json_logger(verbose: bool, level: Option<&str>) {
    tracing_subscriber::registry()
        .with(env_filter(verbose, level))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .with_writer(std::io::stderr)
                .json(),
        )
        .init();
}

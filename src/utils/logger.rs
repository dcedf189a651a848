use chrono::Local;
use eyre::Result;
use fern::Dispatch;
use log::LevelFilter;

/// Log level from a `RUST_LOG` style value, Info when absent or invalid
fn level_from(value: Option<&str>) -> LevelFilter {
    value
        .and_then(|level| level.trim().parse().ok())
        .unwrap_or(LevelFilter::Info)
}

/// Sets up the application logger with console output.
///
/// # Returns
/// * `Result<()>` - Success or failure of logger setup
///
/// # Errors
/// * If a logger has already been installed
pub fn setup_logger() -> Result<()> {
    Dispatch::new()
        .level(level_from(std::env::var("RUST_LOG").ok().as_deref()))
        // diesel/tokio internals are noisy at debug
        .level_for("tokio_postgres", LevelFilter::Warn)
        .chain(std::io::stdout())
        // Format log messages with time and log level
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} [{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                message
            ));
        })
        .apply()?;
    Ok(())
}

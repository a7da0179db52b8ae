//! User-facing status lines and diagnostic logging setup.
use crate::configs::error::ConfigError;
use colored::*;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Environment variable selecting the diagnostic log level.
pub const LOG_ENV: &str = "NIBRAS_LOG";

/// Install the global tracing subscriber, writing to stderr at the level named by
/// `NIBRAS_LOG` (warn when unset).
pub fn init_logging() {
    let level = match std::env::var(LOG_ENV)
        .unwrap_or_else(|_| "warn".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();

    // a second call (e.g. from tests) keeps the first subscriber
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Start of a major step.
pub fn step(message: &str) {
    println!("\n{} {}", "::".blue().bold(), message.bold());
}

pub fn info(message: &str) {
    println!("   {} {}", "info:".cyan(), message);
}

pub fn success(message: &str) {
    println!("   {} {}", "done:".green(), message);
}

pub fn warn(message: &str) {
    eprintln!("   {} {}", "warning:".yellow().bold(), message);
}

pub fn error(message: &str) {
    eprintln!("{} {}", "error:".red().bold(), message);
}

/// Print an error with the prefix matching its severity.
pub fn failure(err: &ConfigError) {
    if err.is_fatal() {
        error(&err.to_string());
    } else {
        warn(&err.to_string());
    }
}

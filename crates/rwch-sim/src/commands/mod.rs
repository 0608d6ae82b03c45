pub mod inspect;
pub mod run;
pub mod validate;

use rwch_core::{ErrorInfo, RwchError, Verbosity};
use serde::Serialize;
use tracing::Level;

/// Installs the stderr subscriber; quiet runs install none.
pub fn init_logging(verbosity: Verbosity) {
    let level = match verbosity {
        Verbosity::Quiet => return,
        Verbosity::Warn => Level::WARN,
        Verbosity::Info => Level::INFO,
        Verbosity::Debug => Level::DEBUG,
    };
    // a second install in the same process keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn parse_verbosity(value: &str) -> Result<Verbosity, String> {
    match value {
        "quiet" => Ok(Verbosity::Quiet),
        "warn" => Ok(Verbosity::Warn),
        "info" => Ok(Verbosity::Info),
        "debug" => Ok(Verbosity::Debug),
        other => Err(format!("unknown verbosity `{other}`, expected quiet, warn, info or debug")),
    }
}

pub fn to_json<T: Serialize>(value: &T) -> Result<String, RwchError> {
    serde_json::to_string_pretty(value)
        .map_err(|err| RwchError::Serde(ErrorInfo::new("json-encode", err.to_string())))
}

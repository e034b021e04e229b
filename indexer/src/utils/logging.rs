use log::{debug, error, info, warn};

/// Initialize the logger, defaulting to `info` when `RUST_LOG` is unset
pub fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

/// Log an informational message
pub fn log_info(message: &str) {
    info!("{}", message);
}

/// Log a debug message
pub fn log_debug(message: &str) {
    debug!("{}", message);
}

/// Log a warning message
pub fn log_warning(message: &str) {
    warn!("{}", message);
}

/// Log an error message
pub fn log_error(message: &str) {
    error!("{}", message);
}

/// Log the database target without its credentials
pub fn log_database_connection_details(url: &str) {
    info!("Database connection details: {}", redact_credentials(url));
}

/// Strip `user:password@` from a connection URL
fn redact_credentials(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}***@{}", &url[..scheme_end + 3], &url[at + 1..])
        }
        _ => url.to_string(),
    }
}

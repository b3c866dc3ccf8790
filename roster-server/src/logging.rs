//! Structured logging to stderr, filtered through `RUST_LOG`.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::ServerError;

/// Install the global subscriber. `default_filter` applies when `RUST_LOG` is unset.
///
/// # Errors
/// Returns an error if a subscriber has already been installed.
pub fn init(default_filter: &str) -> Result<(), ServerError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_line_number(true))
        .try_init()
        .map_err(|e| ServerError::Logging(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_an_error() {
        let _ = init("warn");
        assert!(matches!(init("warn"), Err(ServerError::Logging(_))));
    }
}

//! Terminal client for the roster API.
//!
//! [`UsersScreen`] holds the state of the screen (the creation form, the user list and the
//! loading/error/submitting states) and talks to the API through a [`roster::Client`] with a
//! normalized cache. After a user is created the cached `GetUsers` result is extended in place
//! (see [`cache`]) so the list updates without waiting for the refetch.

pub mod cache;
pub mod config;
pub mod error;
pub mod screen;
pub mod tui;

use roster::{default_exchanges::FetchExchangeImpl, Client, ClientBuilder, FetchExchange};
use roster_normalized_cache::{NormalizedCacheExchange, NormalizedCacheImpl};

pub use config::AppConfig;
pub use error::{AppError, FormError};
pub use screen::{ScreenState, User, UserForm, UsersScreen};

/// The client the app runs with: normalized cache in front of the HTTP transport.
pub type RosterClient = Client<NormalizedCacheImpl<FetchExchangeImpl>>;

pub fn build_client(api_url: &str) -> Result<RosterClient, AppError> {
    let builder = ClientBuilder::new(api_url).map_err(|e| AppError::InvalidUrl {
        url: api_url.to_owned(),
        message: e.to_string()
    })?;
    Ok(builder
        .with_exchange(FetchExchange)
        .with_exchange(NormalizedCacheExchange::new())
        .build())
}

/// Log to stderr, but only when `RUST_LOG` asks for it. Output would otherwise draw over the
/// terminal UI.
pub fn init_logging() -> Result<(), AppError> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => return Ok(())
    };
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .try_init()
        .map_err(|e| AppError::Logging(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_urls() {
        match build_client("not a url") {
            Err(AppError::InvalidUrl { url, .. }) => assert_eq!(url, "not a url"),
            _ => panic!("expected an invalid url error")
        }
    }
}

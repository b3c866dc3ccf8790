//! GraphQL API serving a list of users from an in-memory store.
//!
//! The API exposes `getUsers`, `getUserById(id)` and `createUser(name, age, isMarried)`.
//! [`RosterServer`] wires the [`executor`] to an axum router, and the store sits behind the
//! [`UserRepository`] port.

pub mod config;
pub mod error;
pub mod executor;
pub mod logging;
pub mod repository;
pub mod resolvers;
pub mod schema;
pub mod server;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use config::ServerConfig;
pub use error::ServerError;
pub use repository::{InMemoryUserRepository, NewUser, RepositoryError, User, UserRepository};
pub use schema::{Schema, SCHEMA_SDL};
pub use server::RosterServer;

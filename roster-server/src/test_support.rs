//! Test doubles for the [`UserRepository`] port.
//!
//! Shared by unit tests in `src/` and integration tests in other crates, which enable the
//! `test-support` feature.

use async_trait::async_trait;

use crate::repository::{NewUser, RepositoryError, User, UserRepository};

/// A repository whose backing store is never reachable. Every call fails with
/// [`RepositoryError::Unavailable`].
#[derive(Debug, Clone)]
pub struct UnavailableUserRepository {
    message: String
}

impl UnavailableUserRepository {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into()
        }
    }

    fn error(&self) -> RepositoryError {
        RepositoryError::Unavailable {
            message: self.message.clone()
        }
    }
}

impl Default for UnavailableUserRepository {
    fn default() -> Self {
        Self::new("connection refused")
    }
}

#[async_trait]
impl UserRepository for UnavailableUserRepository {
    async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        Err(self.error())
    }

    async fn get_by_id(&self, _id: &str) -> Result<Option<User>, RepositoryError> {
        Err(self.error())
    }

    async fn append(&self, _user: NewUser) -> Result<User, RepositoryError> {
        Err(self.error())
    }
}

//! Storage port for user records.
//!
//! Resolvers only talk to [`UserRepository`], so the in-memory store can be
//! swapped for a persistent backend without touching the executor.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Serialize;
use thiserror::Error;

/// A stored user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub age: i32,
    pub is_married: bool
}

/// The fields supplied when creating a user. The id is assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub age: i32,
    pub is_married: bool
}

/// Errors raised by repository implementations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// The backing store could not be reached.
    #[error("user store unavailable: {message}")]
    Unavailable { message: String }
}

/// Port for reading and appending user records.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Every user in insertion order.
    async fn list(&self) -> Result<Vec<User>, RepositoryError>;

    /// The first user with the given id, or `None` if there is none.
    async fn get_by_id(&self, id: &str) -> Result<Option<User>, RepositoryError>;

    /// Assign the next id to `user`, append it and return the stored record.
    async fn append(&self, user: NewUser) -> Result<User, RepositoryError>;
}

/// Process-lifetime store. Ids come from a counter that never goes backwards,
/// so they stay unique even under concurrent creation.
#[derive(Debug)]
pub struct InMemoryUserRepository {
    users: RwLock<Vec<User>>,
    next_id: AtomicU64
}

impl InMemoryUserRepository {
    /// An empty store whose first user gets id `1`.
    pub fn empty() -> Self {
        Self::with_users(Vec::new())
    }

    /// The demo data set: Lee, Kim and Park.
    pub fn seeded() -> Self {
        Self::with_users(vec![
            seed_user("1", "Lee", 25, true),
            seed_user("2", "Kim", 26, false),
            seed_user("3", "Park", 27, true)
        ])
    }

    /// A store holding `users`. The counter starts after the highest numeric id.
    pub fn with_users(users: Vec<User>) -> Self {
        let next_id = users
            .iter()
            .filter_map(|user| user.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0)
            + 1;
        Self {
            users: RwLock::new(users),
            next_id: AtomicU64::new(next_id)
        }
    }

    /// Number of stored users.
    pub fn len(&self) -> usize {
        self.users.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.read().is_empty()
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::seeded()
    }
}

fn seed_user(id: &str, name: &str, age: i32, is_married: bool) -> User {
    User {
        id: id.to_owned(),
        name: name.to_owned(),
        age,
        is_married
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        Ok(self.users.read().clone())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self.users.read().iter().find(|user| user.id == id).cloned())
    }

    async fn append(&self, user: NewUser) -> Result<User, RepositoryError> {
        let mut users = self.users.write();
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let user = User {
            id: id.to_string(),
            name: user.name,
            age: user.age,
            is_married: user.is_married
        };
        users.push(user.clone());
        tracing::debug!(id = %user.id, "appended user");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn repository() -> InMemoryUserRepository {
        InMemoryUserRepository::seeded()
    }

    fn new_user(name: &str, age: i32, is_married: bool) -> NewUser {
        NewUser {
            name: name.to_owned(),
            age,
            is_married
        }
    }

    #[rstest]
    #[tokio::test]
    async fn lists_seed_data_in_order(repository: InMemoryUserRepository) {
        let users = repository.list().await.expect("list users");
        let names: Vec<_> = users.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, ["Lee", "Kim", "Park"]);
        assert_eq!(users, repository.list().await.expect("list again"));
    }

    #[rstest]
    #[case("2", Some("Kim"))]
    #[case("3", Some("Park"))]
    #[case("4", None)]
    #[case("", None)]
    #[tokio::test]
    async fn finds_users_by_id(
        repository: InMemoryUserRepository,
        #[case] id: &str,
        #[case] expected: Option<&str>
    ) {
        let user = repository.get_by_id(id).await.expect("lookup");
        assert_eq!(user.as_ref().map(|u| u.name.as_str()), expected);
        if let Some(user) = user {
            assert_eq!(user.id, id);
        }
    }

    #[rstest]
    #[tokio::test]
    async fn appends_with_the_next_id(repository: InMemoryUserRepository) {
        let created = repository
            .append(new_user("Ann", 30, false))
            .await
            .expect("append");

        assert_eq!(created, seed_user("4", "Ann", 30, false));
        let users = repository.list().await.expect("list");
        assert_eq!(users.len(), 4);
        assert_eq!(users.last(), Some(&created));
    }

    #[rstest]
    #[tokio::test]
    async fn empty_store_starts_at_one() {
        let repository = InMemoryUserRepository::empty();
        assert!(repository.is_empty());
        let created = repository
            .append(new_user("Ann", 30, false))
            .await
            .expect("append");
        assert_eq!(created.id, "1");
    }

    #[rstest]
    #[tokio::test]
    async fn ids_stay_unique_under_concurrent_appends() {
        let repository = Arc::new(InMemoryUserRepository::seeded());
        let handles: Vec<_> = (0..32)
            .map(|i| {
                let repository = Arc::clone(&repository);
                tokio::spawn(async move {
                    repository
                        .append(new_user(&format!("user-{i}"), i, i % 2 == 0))
                        .await
                })
            })
            .collect();
        for handle in handles {
            handle.await.expect("join").expect("append");
        }

        let users = repository.list().await.expect("list");
        let mut ids: Vec<u64> = users.iter().map(|u| u.id.parse().expect("numeric id")).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 35);
        assert_eq!(repository.len(), 35);
    }
}

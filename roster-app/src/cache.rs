//! Keeps the cached user list in step with `createUser`.

use roster::Extensions;
use roster_normalized_cache::NormalizedCacheExtension;
use roster_queries::{
    create_user::create_user::CreateUserCreateUser,
    get_users::{self, get_users::GetUsersGetUsers},
    CreateUser, GetUsers
};

/// Cache extension for `CreateUser`: appends the created user to the cached `GetUsers` result.
pub fn append_created_user() -> NormalizedCacheExtension {
    NormalizedCacheExtension::new().update::<CreateUser, _>(|data, store, dependencies| {
        let created = match data.as_ref().and_then(|data| data.create_user.as_ref()) {
            Some(created) => created.clone(),
            None => return
        };
        store.update_query(
            GetUsers,
            get_users::get_users::Variables,
            move |cached| merge_created(cached, created),
            dependencies
        );
    })
}

/// Query extensions to attach to every `CreateUser` request.
pub fn creation_extensions() -> Extensions {
    roster::ext![append_created_user()]
}

/// Append `created` to a cached list. Returns `None`, which leaves the cache alone, when nothing
/// is cached, the cached list is null, or the list already holds the user.
pub(crate) fn merge_created(
    cached: Option<get_users::get_users::ResponseData>,
    created: CreateUserCreateUser
) -> Option<get_users::get_users::ResponseData> {
    let mut data = cached?;
    let users = data.get_users.as_mut()?;
    if created.id.is_some() && users.iter().flatten().any(|user| user.id == created.id) {
        tracing::debug!(id = ?created.id, "created user already in the cached list");
        return None;
    }
    users.push(Some(GetUsersGetUsers {
        id: created.id,
        name: created.name,
        age: created.age,
        is_married: created.is_married
    }));
    Some(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use get_users::get_users::ResponseData;

    fn user(id: &str, name: &str) -> Option<GetUsersGetUsers> {
        Some(GetUsersGetUsers {
            id: Some(id.to_owned()),
            name: Some(name.to_owned()),
            age: Some(30),
            is_married: Some(false)
        })
    }

    fn created(id: &str, name: &str) -> CreateUserCreateUser {
        CreateUserCreateUser {
            id: Some(id.to_owned()),
            name: Some(name.to_owned()),
            age: Some(30),
            is_married: Some(false)
        }
    }

    fn cached(users: Vec<Option<GetUsersGetUsers>>) -> ResponseData {
        ResponseData {
            get_users: Some(users)
        }
    }

    #[test]
    fn appends_after_existing_users() {
        let cached = cached(vec![user("1", "Lee"), None, user("2", "Kim")]);
        let merged = merge_created(Some(cached), created("4", "Ann")).expect("merged");
        let names: Vec<_> = merged
            .get_users
            .expect("list")
            .into_iter()
            .map(|u| u.and_then(|u| u.name))
            .collect();
        assert_eq!(
            names,
            [Some("Lee".into()), None, Some("Kim".into()), Some("Ann".into())]
        );
    }

    #[test]
    fn never_duplicates_a_user() {
        let cached = cached(vec![user("1", "Lee"), user("4", "Ann")]);
        assert!(merge_created(Some(cached), created("4", "Ann")).is_none());
    }

    #[test]
    fn leaves_a_null_list_alone() {
        let cached = ResponseData { get_users: None };
        assert!(merge_created(Some(cached), created("4", "Ann")).is_none());
    }

    #[test]
    fn leaves_an_uncached_list_alone() {
        assert!(merge_created(None, created("4", "Ann")).is_none());
    }

    #[test]
    fn extensions_carry_the_updater() {
        let extensions = creation_extensions();
        assert!(extensions.get::<NormalizedCacheExtension>().is_some());
    }
}

use crate::{HashSet, QueryStore};
use roster::GraphQLQuery;
use std::{any::Any, collections::HashMap, sync::Arc};

/// Options to pass to the normalized cache.
#[derive(Default)]
pub struct NormalizedCacheOptions {
    /// An optional `HashMap` of typenames to unique ID keys.
    /// The keys are the names of the fields, not the IDs themselves.
    /// So if your `User` has a unique ID called `ident`, you should
    /// set `"User" => "ident"`.
    /// The default ID keys are `id` and `_id`, so those don't need to be mapped.
    pub custom_keys: Option<HashMap<&'static str, String>>
}

pub(crate) type UpdateFn =
    Arc<dyn Fn(&(dyn Any + Send + Sync), QueryStore, &mut HashSet<String>) + Send + Sync>;

/// A query extension that lets you pass additional logic into the cache.
#[derive(Default, Clone)]
pub struct NormalizedCacheExtension {
    pub(crate) update: Option<UpdateFn>
}

impl NormalizedCacheExtension {
    /// Create a new query extension with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// A custom updater function to run against related queries, such as lists of the same
    /// entity. It runs after the result of a mutation has been written. The function has 3
    /// parameters:
    ///
    /// * `current_data` - The returned data of the mutation you're running.
    /// * `store` - A [`QueryStore`](./struct.QueryStore.html) object used to run custom update
    /// logic against other queries.
    /// * `dependencies` - This must be passed through to the `QueryStore` without modification.
    ///
    /// # Example
    ///
    /// ```
    /// # use roster_normalized_cache::NormalizedCacheExtension;
    /// use roster_queries::{get_users::{self, get_users::GetUsersGetUsers}, CreateUser, GetUsers};
    ///
    /// let extension = NormalizedCacheExtension::new()
    ///     .update::<CreateUser, _>(|current_data, store, dependencies| {
    ///         let created = match current_data.as_ref().and_then(|data| data.create_user.as_ref()) {
    ///             Some(created) => created.clone(),
    ///             None => return
    ///         };
    ///         store.update_query(GetUsers, get_users::get_users::Variables, move |data| {
    ///             data.map(|mut data| {
    ///                 if let Some(users) = data.get_users.as_mut() {
    ///                     users.push(Some(GetUsersGetUsers {
    ///                         id: created.id,
    ///                         name: created.name,
    ///                         age: created.age,
    ///                         is_married: created.is_married
    ///                     }));
    ///                 }
    ///                 data
    ///             })
    ///         }, dependencies)
    ///     });
    /// ```
    pub fn update<Q: GraphQLQuery, F>(mut self, update: F) -> Self
    where
        F: Fn(&Option<Q::ResponseData>, QueryStore, &mut HashSet<String>) + Send + Sync + 'static
    {
        self.update = Some(Arc::new(move |data, store, dependencies| {
            match data.downcast_ref::<Option<Q::ResponseData>>() {
                Some(data) => update(data, store, dependencies),
                None => tracing::warn!("cache update registered for a different operation")
            }
        }));
        self
    }
}

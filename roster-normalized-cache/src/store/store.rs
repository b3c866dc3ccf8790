use crate::{
    store::data::{InMemoryData, Link},
    HashSet
};
use fnv::FnvBuildHasher;
use roster::{
    codegen::FieldSelector,
    exchange::{Client, OperationResult, OperationType},
    utils::progressive_hash,
    GraphQLQuery, QueryError
};
use serde_json::{Map, Value};
use std::{collections::HashMap, sync::Arc};

const QUERY_ROOT: &str = "Query";

pub fn is_root(typename: &str) -> bool {
    typename == "Query" || typename == "Mutation" || typename == "Subscription"
}

fn field_key(field_name: &str, args: &str) -> String {
    let mut key = String::with_capacity(field_name.len() + args.len());
    key.push_str(field_name);
    key.push_str(args);
    key
}

/// A reference to the store used to run custom query updates
#[derive(Clone)]
pub struct QueryStore {
    pub(crate) store: Arc<Store>
}

impl QueryStore {
    /// Run a custom update function against the cache.
    ///
    /// # Parameters
    ///
    /// * `_query` - The [`GraphQLQuery`](../roster/trait.GraphQLQuery.html) object for the query
    /// you want to update.
    /// * `variables` - The `Variables` for the query you want to update. It will only update
    /// cached results for that set of variables.
    /// * `updater_fn` - The custom updater function. This takes in an `Option<ResponseData>` that
    /// represents the current state and should return an `Option<ResponseData>` that represents
    /// the new state. Returning `None` leaves the cache untouched.
    /// The current state is cloned, so feel free to modify and return it.
    /// * `dependencies` - This is passed into the update closure and should simply be passed
    /// through.
    pub fn update_query<Q: GraphQLQuery, F>(
        &self,
        _query: Q,
        variables: Q::Variables,
        updater_fn: F,
        dependencies: &mut HashSet<String>
    ) where
        F: FnOnce(Option<Q::ResponseData>) -> Option<Q::ResponseData>
    {
        self.store
            .update_query::<Q, _>(variables, updater_fn, dependencies);
    }

    /// Read the cached result of a query, if every field it selects is in the cache.
    pub fn read_query<Q: GraphQLQuery>(
        &self,
        _query: Q,
        variables: &Q::Variables
    ) -> Option<Q::ResponseData> {
        let mut dependencies = HashSet::default();
        self.store.read_query::<Q>(variables, &mut dependencies)
    }
}

impl From<Arc<Store>> for QueryStore {
    fn from(store: Arc<Store>) -> Self {
        Self { store }
    }
}

/// The normalized data and the queries that depend on each entity.
pub struct Store {
    data: InMemoryData
}

impl Store {
    pub fn new(custom_keys: HashMap<&'static str, String, FnvBuildHasher>) -> Self {
        Self {
            data: InMemoryData::new(custom_keys)
        }
    }

    /// The cache key of an entity: the root typename for root types, `Typename:id` for
    /// everything with a key field. `None` means the entity can't be normalized.
    pub fn key_of_entity(&self, typename: &str, entity: &Map<String, Value>) -> Option<String> {
        if is_root(typename) {
            return Some(typename.to_string());
        }

        let id = match self.data.custom_keys.get(typename) {
            Some(custom_key) => entity.get(custom_key),
            None => entity.get("id").or_else(|| entity.get("_id"))
        };
        let id = match id? {
            Value::String(id) => id.clone(),
            Value::Number(id) => id.to_string(),
            _ => return None
        };

        let mut key = String::with_capacity(typename.len() + id.len() + 1);
        key.push_str(typename);
        key.push(':');
        key.push_str(&id);
        Some(key)
    }

    /// Normalize a result into the store. Every entity and root field touched is added to
    /// `dependencies`.
    pub fn write_query<Q: GraphQLQuery>(
        &self,
        result: &OperationResult<Q::ResponseData>,
        variables: &Q::Variables,
        dependencies: &mut HashSet<String>
    ) -> Result<(), QueryError> {
        let data = match result.response.data {
            Some(ref data) => data,
            None => return Ok(())
        };
        self.write_data::<Q>(
            result.meta.operation_type,
            data,
            variables,
            dependencies
        )
    }

    fn write_data<Q: GraphQLQuery>(
        &self,
        operation_type: OperationType,
        data: &Q::ResponseData,
        variables: &Q::Variables,
        dependencies: &mut HashSet<String>
    ) -> Result<(), QueryError> {
        let value = serde_json::to_value(data)?;
        let object = match value {
            Value::Object(object) => object,
            _ => return Ok(())
        };
        let selection = Q::selection(variables);
        self.write_selection(
            operation_type.to_str(),
            &selection,
            &object,
            dependencies
        );
        Ok(())
    }

    /// Read a query from the store. Returns `None` if any selected field is missing.
    pub fn read_query<Q: GraphQLQuery>(
        &self,
        variables: &Q::Variables,
        dependencies: &mut HashSet<String>
    ) -> Option<Q::ResponseData> {
        let selection = Q::selection(variables);
        let object = self.read_selection(QUERY_ROOT, &selection, dependencies)?;
        match serde_json::from_value(Value::Object(object)) {
            Ok(data) => Some(data),
            Err(e) => {
                tracing::warn!(error = %e, "cached data didn't match the response type");
                None
            }
        }
    }

    pub fn update_query<Q: GraphQLQuery, F>(
        &self,
        variables: Q::Variables,
        updater_fn: F,
        dependencies: &mut HashSet<String>
    ) where
        F: FnOnce(Option<Q::ResponseData>) -> Option<Q::ResponseData>
    {
        let (_, meta) = Q::build_query(variables.clone());
        let key = progressive_hash(meta.query_key, &variables);

        let mut query_dependencies = HashSet::default();
        let data = self.read_query::<Q>(&variables, &mut query_dependencies);
        if let Some(updated_data) = updater_fn(data) {
            match self.write_data::<Q>(
                meta.operation_type,
                &updated_data,
                &variables,
                &mut query_dependencies
            ) {
                Ok(()) => {
                    self.set_dependencies(key, &query_dependencies);
                    dependencies.extend(query_dependencies);
                }
                Err(e) => tracing::warn!(error = %e, "failed to write updated query")
            }
        }
    }

    pub fn set_dependencies(&self, query_key: u64, dependencies: &HashSet<String>) {
        self.data.set_dependencies(query_key, dependencies);
    }

    /// Rerun every query depending on one of `entities`, except the one that caused the change.
    pub fn rerun_queries<C: Client>(
        &self,
        entities: HashSet<String>,
        originating_query: u64,
        client: &C
    ) {
        let queries: HashSet<u64> = entities
            .iter()
            .flat_map(|entity| self.data.get_dependencies(entity))
            .filter(|query| *query != originating_query)
            .collect();

        tracing::debug!(count = queries.len(), "rerunning dependent queries");
        for query in queries {
            client.rerun_query(query);
        }
    }

    fn add_dependency(entity_key: &str, field_key: &str, dependencies: &mut HashSet<String>) {
        match entity_key {
            QUERY_ROOT => {
                dependencies.insert(format!("{}.{}", QUERY_ROOT, field_key));
            }
            "Mutation" | "Subscription" => {}
            _ => {
                if !dependencies.contains(entity_key) {
                    dependencies.insert(entity_key.to_owned());
                }
            }
        }
    }

    fn write_selection(
        &self,
        entity_key: &str,
        selection: &[FieldSelector],
        data: &Map<String, Value>,
        dependencies: &mut HashSet<String>
    ) {
        for field in selection {
            let value = match data.get(field.field_name()) {
                Some(value) => value,
                None => continue
            };
            match field {
                FieldSelector::Scalar(field_name, args) => {
                    let key = field_key(field_name, args);
                    Self::add_dependency(entity_key, &key, dependencies);
                    self.data.write_record(entity_key, key, value.clone());
                }
                FieldSelector::Object(field_name, args, typename, subselection) => {
                    let key = field_key(field_name, args);
                    Self::add_dependency(entity_key, &key, dependencies);
                    let link = self.write_link_value(
                        entity_key,
                        &key,
                        typename,
                        subselection,
                        value,
                        dependencies
                    );
                    self.data.write_link(entity_key, key, link);
                }
            }
        }
    }

    fn write_link_value(
        &self,
        parent_key: &str,
        field_key: &str,
        typename: &str,
        selection: &[FieldSelector],
        value: &Value,
        dependencies: &mut HashSet<String>
    ) -> Link {
        match value {
            Value::Object(entity) => {
                let fallback = format!("{}.{}", parent_key, field_key);
                Link::Single(self.write_entity(&fallback, typename, selection, entity, dependencies))
            }
            Value::Array(items) => Link::List(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| {
                        let entity = item.as_object()?;
                        let fallback = format!("{}.{}.{}", parent_key, field_key, i);
                        Some(self.write_entity(&fallback, typename, selection, entity, dependencies))
                    })
                    .collect()
            ),
            _ => Link::Null
        }
    }

    fn write_entity(
        &self,
        fallback_key: &str,
        typename: &str,
        selection: &[FieldSelector],
        entity: &Map<String, Value>,
        dependencies: &mut HashSet<String>
    ) -> String {
        let key = self
            .key_of_entity(typename, entity)
            .unwrap_or_else(|| fallback_key.to_owned());
        self.write_selection(&key, selection, entity, dependencies);
        key
    }

    fn read_selection(
        &self,
        entity_key: &str,
        selection: &[FieldSelector],
        dependencies: &mut HashSet<String>
    ) -> Option<Map<String, Value>> {
        let mut object = Map::with_capacity(selection.len());
        for field in selection {
            let value = match field {
                FieldSelector::Scalar(field_name, args) => {
                    let key = field_key(field_name, args);
                    Self::add_dependency(entity_key, &key, dependencies);
                    self.data.read_record(entity_key, &key)?
                }
                FieldSelector::Object(field_name, args, _, subselection) => {
                    let key = field_key(field_name, args);
                    Self::add_dependency(entity_key, &key, dependencies);
                    match self.data.read_link(entity_key, &key)? {
                        Link::Null => Value::Null,
                        Link::Single(entity) => {
                            Value::Object(self.read_selection(&entity, subselection, dependencies)?)
                        }
                        Link::List(entities) => Value::Array(
                            entities
                                .iter()
                                .map(|entity| match entity {
                                    Some(entity) => self
                                        .read_selection(entity, subselection, dependencies)
                                        .map(Value::Object),
                                    None => Some(Value::Null)
                                })
                                .collect::<Option<Vec<_>>>()?
                        )
                    }
                }
            };
            object.insert(field.field_name().to_owned(), value);
        }
        Some(object)
    }
}

#[cfg(test)]
mod tests {
    use super::Store;
    use crate::HashSet;
    use roster::{
        exchange::{OperationMeta, OperationResult, OperationType},
        Response
    };
    use roster_queries::{
        get_user_by_id::{self, GetUserById},
        get_users::{get_users::*, GetUsers}
    };
    use serde_json::{json, Map, Value};
    use std::collections::HashMap;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object")
        }
    }

    fn users_result() -> OperationResult<ResponseData> {
        let data: ResponseData = serde_json::from_value(json!({
            "getUsers": [
                { "id": "1", "name": "Lee", "age": 25, "isMarried": true },
                { "id": "2", "name": "Kim", "age": 26, "isMarried": false }
            ]
        }))
        .unwrap();
        OperationResult {
            key: 1,
            meta: OperationMeta {
                query_key: 1,
                operation_type: OperationType::Query,
                involved_types: vec!["User"]
            },
            response: Response {
                debug_info: None,
                data: Some(data),
                errors: None
            }
        }
    }

    #[test]
    fn entity_keys_use_typename_and_id() {
        let store = Store::new(HashMap::default());
        assert_eq!(
            store.key_of_entity("User", &object(json!({ "id": "4" }))),
            Some("User:4".to_string())
        );
        assert_eq!(
            store.key_of_entity("User", &object(json!({ "_id": 7 }))),
            Some("User:7".to_string())
        );
        assert_eq!(store.key_of_entity("User", &object(json!({ "name": "Ann" }))), None);
        assert_eq!(
            store.key_of_entity("Query", &object(json!({}))),
            Some("Query".to_string())
        );
    }

    #[test]
    fn custom_keys_replace_the_default_id() {
        let mut custom_keys = HashMap::default();
        custom_keys.insert("User", "name".to_string());
        let store = Store::new(custom_keys);

        assert_eq!(
            store.key_of_entity("User", &object(json!({ "id": "1", "name": "Lee" }))),
            Some("User:Lee".to_string())
        );
    }

    #[test]
    fn written_queries_read_back_with_dependencies() {
        let store = Store::new(HashMap::default());
        let result = users_result();
        let mut written = HashSet::default();
        store
            .write_query::<GetUsers>(&result, &Variables, &mut written)
            .unwrap();

        assert!(written.contains("Query.getUsers"));
        assert!(written.contains("User:1"));
        assert!(written.contains("User:2"));

        let mut read = HashSet::default();
        let cached = store.read_query::<GetUsers>(&Variables, &mut read).unwrap();
        assert_eq!(Some(cached), result.response.data);
        assert_eq!(read, written);
    }

    #[test]
    fn missing_fields_are_a_cache_miss() {
        let store = Store::new(HashMap::default());
        store
            .write_query::<GetUsers>(&users_result(), &Variables, &mut HashSet::default())
            .unwrap();

        // The entity is cached, but the root field with these arguments isn't.
        let variables = get_user_by_id::get_user_by_id::Variables { id: "2".to_string() };
        assert!(store
            .read_query::<GetUserById>(&variables, &mut HashSet::default())
            .is_none());
    }

    #[test]
    fn updates_rewrite_the_cached_query() {
        let store = Store::new(HashMap::default());
        store
            .write_query::<GetUsers>(&users_result(), &Variables, &mut HashSet::default())
            .unwrap();

        let mut dependencies = HashSet::default();
        store.update_query::<GetUsers, _>(
            Variables,
            |data| {
                data.map(|mut data| {
                    if let Some(users) = data.get_users.as_mut() {
                        users.push(Some(GetUsersGetUsers {
                            id: Some("3".to_string()),
                            name: Some("Park".to_string()),
                            age: Some(27),
                            is_married: Some(true)
                        }));
                    }
                    data
                })
            },
            &mut dependencies
        );

        assert!(dependencies.contains("Query.getUsers"));
        assert!(dependencies.contains("User:3"));
        let cached = store
            .read_query::<GetUsers>(&Variables, &mut HashSet::default())
            .unwrap();
        let names: Vec<_> = cached
            .get_users
            .unwrap_or_default()
            .into_iter()
            .flatten()
            .filter_map(|user| user.name)
            .collect();
        assert_eq!(names, vec!["Lee", "Kim", "Park"]);
    }

    #[test]
    fn null_lists_and_items_survive_the_round_trip() {
        let store = Store::new(HashMap::default());
        let mut result = users_result();
        result.response.data = Some(
            serde_json::from_value(json!({
                "getUsers": [{ "id": "1", "name": null, "age": 25, "isMarried": true }, null]
            }))
            .unwrap()
        );
        store
            .write_query::<GetUsers>(&result, &Variables, &mut HashSet::default())
            .unwrap();
        let cached = store
            .read_query::<GetUsers>(&Variables, &mut HashSet::default())
            .unwrap();
        assert_eq!(Some(cached), result.response.data);

        result.response.data = Some(serde_json::from_value(json!({ "getUsers": null })).unwrap());
        store
            .write_query::<GetUsers>(&result, &Variables, &mut HashSet::default())
            .unwrap();
        let cached = store
            .read_query::<GetUsers>(&Variables, &mut HashSet::default())
            .unwrap();
        assert_eq!(cached.get_users, None);
    }

    #[test]
    fn updating_an_uncached_query_gets_none() {
        let store = Store::new(HashMap::default());
        let mut seen = None;
        store.update_query::<GetUsers, _>(
            Variables,
            |data| {
                seen = Some(data.is_none());
                data
            },
            &mut HashSet::default()
        );
        assert_eq!(seen, Some(true));
    }
}

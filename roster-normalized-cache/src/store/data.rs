use crate::HashSet;
use fnv::FnvBuildHasher;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;

type FlurryMap<K, V> = flurry::HashMap<K, V, FnvBuildHasher>;
type CacheMap<V> = FlurryMap<String, Mutex<HashMap<String, V>>>;

/// Both directions of the query/entity relation, so a query's old dependencies can be dropped
/// when it is read or written again.
#[derive(Default)]
struct Dependents {
    by_entity: HashMap<String, HashSet<u64>>,
    by_query: HashMap<u64, HashSet<String>>
}

/// Where an object field of an entity points to.
#[derive(Hash, PartialEq, Eq, Clone, Debug)]
pub enum Link {
    Single(String),
    /// `None` items are null entries in the list.
    List(Vec<Option<String>>),
    Null
}

/// The normalized records. Scalars live in `records`, object fields in `links`, both keyed by
/// entity key and then by field key (field name plus serialized arguments).
pub struct InMemoryData {
    records: CacheMap<Value>,
    links: CacheMap<Link>,
    dependencies: Mutex<Dependents>,
    pub(crate) custom_keys: HashMap<&'static str, String, FnvBuildHasher>
}

impl InMemoryData {
    pub fn new(custom_keys: HashMap<&'static str, String, FnvBuildHasher>) -> Self {
        Self {
            records: FlurryMap::with_hasher(FnvBuildHasher::default()),
            links: FlurryMap::with_hasher(FnvBuildHasher::default()),
            dependencies: Mutex::new(Dependents::default()),
            custom_keys
        }
    }

    /// Register `query_key` as depending on exactly the given entities, replacing whatever it
    /// depended on before.
    pub fn set_dependencies(&self, query_key: u64, dependencies: &HashSet<String>) {
        let mut dependents = self.dependencies.lock();
        let Dependents { by_entity, by_query } = &mut *dependents;

        if let Some(previous) = by_query.remove(&query_key) {
            for entity in previous {
                if let Some(queries) = by_entity.get_mut(&entity) {
                    queries.remove(&query_key);
                    if queries.is_empty() {
                        by_entity.remove(&entity);
                    }
                }
            }
        }
        if dependencies.is_empty() {
            return;
        }

        for dependency in dependencies {
            by_entity
                .entry(dependency.clone())
                .or_insert_with(HashSet::default)
                .insert(query_key);
        }
        by_query.insert(query_key, dependencies.clone());
    }

    pub fn get_dependencies(&self, entity_key: &str) -> Vec<u64> {
        let dependencies = self.dependencies.lock();
        dependencies
            .by_entity
            .get(entity_key)
            .map(|queries| queries.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn read_record(&self, entity_key: &str, field_key: &str) -> Option<Value> {
        let records = self.records.pin();
        records
            .get(entity_key)
            .and_then(|entity| entity.lock().get(field_key).cloned())
    }

    pub fn read_link(&self, entity_key: &str, field_key: &str) -> Option<Link> {
        let links = self.links.pin();
        links
            .get(entity_key)
            .and_then(|entity| entity.lock().get(field_key).cloned())
    }

    pub fn write_record(&self, entity_key: &str, field_key: String, value: Value) {
        write_field(&self.records, entity_key, field_key, value);
    }

    pub fn write_link(&self, entity_key: &str, field_key: String, link: Link) {
        write_field(&self.links, entity_key, field_key, link);
    }

    #[cfg(test)]
    pub fn entity_count(&self) -> usize {
        self.records.pin().len()
    }

    #[cfg(test)]
    pub fn tracked_entities(&self) -> usize {
        self.dependencies.lock().by_entity.len()
    }
}

fn write_field<V: Send + Sync + 'static>(
    map: &CacheMap<V>,
    entity_key: &str,
    field_key: String,
    value: V
) {
    let map = map.pin();
    let entity = match map.get(entity_key) {
        Some(entity) => entity,
        None => match map.try_insert(entity_key.to_owned(), Mutex::new(HashMap::new())) {
            Ok(entity) => entity,
            Err(e) => e.current
        }
    };
    entity.lock().insert(field_key, value);
}

#[cfg(test)]
mod tests {
    use super::{InMemoryData, Link};
    use crate::HashSet;
    use serde_json::json;
    use std::collections::HashMap;

    fn data() -> InMemoryData {
        InMemoryData::new(HashMap::default())
    }

    #[test]
    fn records_and_links_are_kept_per_entity() {
        let data = data();
        data.write_record("User:1", "name".to_string(), json!("Lee"));
        data.write_record("User:1", "age".to_string(), json!(25));
        data.write_link(
            "Query",
            "getUsers".to_string(),
            Link::List(vec![Some("User:1".to_string()), None])
        );

        assert_eq!(data.read_record("User:1", "name"), Some(json!("Lee")));
        assert_eq!(data.read_record("User:1", "age"), Some(json!(25)));
        assert_eq!(data.read_record("User:1", "isMarried"), None);
        assert_eq!(data.read_record("User:2", "name"), None);
        assert_eq!(
            data.read_link("Query", "getUsers"),
            Some(Link::List(vec![Some("User:1".to_string()), None]))
        );
        assert_eq!(data.entity_count(), 1);
    }

    #[test]
    fn later_writes_replace_fields() {
        let data = data();
        data.write_record("User:1", "name".to_string(), json!("Lee"));
        data.write_record("User:1", "name".to_string(), json!("Lea"));

        assert_eq!(data.read_record("User:1", "name"), Some(json!("Lea")));
    }

    #[test]
    fn dependencies_accumulate_per_entity() {
        let data = data();
        let mut entities = HashSet::default();
        entities.insert("User:1".to_string());
        data.set_dependencies(1, &entities);
        data.set_dependencies(2, &entities);

        let mut dependents = data.get_dependencies("User:1");
        dependents.sort_unstable();
        assert_eq!(dependents, vec![1, 2]);
        assert!(data.get_dependencies("User:2").is_empty());
    }

    #[test]
    fn dependencies_are_replaced_per_query() {
        let data = data();
        let mut before = HashSet::default();
        before.insert("User:1".to_string());
        before.insert("Query.getUsers".to_string());
        data.set_dependencies(1, &before);

        let mut after = HashSet::default();
        after.insert("User:2".to_string());
        data.set_dependencies(1, &after);

        assert!(data.get_dependencies("User:1").is_empty());
        assert!(data.get_dependencies("Query.getUsers").is_empty());
        assert_eq!(data.get_dependencies("User:2"), vec![1]);
        assert_eq!(data.tracked_entities(), 1);

        data.set_dependencies(1, &HashSet::default());
        assert_eq!(data.tracked_entities(), 0);
    }
}

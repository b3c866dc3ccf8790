use crate::{
    cache_exchange::NormalizedCacheExchange, NormalizedCacheExtension, NormalizedCacheImpl
};
use parking_lot::Mutex;
use roster::{
    exchange::{
        Client, Exchange, ExchangeFactory, ExchangeResult, Operation, OperationOptions,
        OperationResult
    },
    ext,
    utils::progressive_hash,
    DebugInfo, Error, GraphQLQuery, RequestPolicy, Response, ResultSource
};
use roster_queries::{
    create_user::{self, CreateUser},
    get_user_by_id::{self, GetUserById},
    get_users::{self, get_users::GetUsersGetUsers, GetUsers}
};
use serde_json::{json, Value};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc
};

fn make_op<Q: GraphQLQuery>(
    _query: Q,
    variables: Q::Variables,
    request_policy: RequestPolicy
) -> Operation<Q::Variables> {
    let (query, meta) = Q::build_query(variables);
    Operation {
        key: progressive_hash(meta.query_key, &query.variables),
        query,
        meta,
        options: OperationOptions {
            url: "http://0.0.0.0".parse().unwrap(),
            request_policy,
            extra_headers: None,
            extensions: None
        }
    }
}

lazy_static! {
    static ref SEED: Value = json!([
        { "id": "1", "name": "Lee", "age": 25, "isMarried": true },
        { "id": "2", "name": "Kim", "age": 26, "isMarried": false },
        { "id": "3", "name": "Park", "age": 27, "isMarried": true }
    ]);
}

/// Answers operations from an in-memory user list, like the API would.
#[derive(Clone)]
struct Fetch {
    users: Arc<Mutex<Vec<Value>>>,
    calls: Arc<AtomicUsize>,
    fail: bool
}

impl Fetch {
    fn new() -> Self {
        Fetch {
            users: Arc::new(Mutex::new(SEED.as_array().cloned().unwrap())),
            calls: Arc::new(AtomicUsize::new(0)),
            fail: false
        }
    }

    fn failing() -> Self {
        Fetch {
            fail: true,
            ..Fetch::new()
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn rename(&self, id: &str, name: &str) {
        for user in self.users.lock().iter_mut() {
            if user["id"] == id {
                user["name"] = json!(name);
            }
        }
    }

    fn answer(&self, operation_name: &str, variables: Value) -> Value {
        let mut users = self.users.lock();
        match operation_name {
            "GetUsers" => json!({ "getUsers": users.clone() }),
            "GetUserById" => {
                let user = users
                    .iter()
                    .find(|user| user["id"] == variables["id"])
                    .cloned()
                    .unwrap_or(Value::Null);
                json!({ "getUserById": user })
            }
            "CreateUser" => {
                let user = json!({
                    "id": (users.len() + 1).to_string(),
                    "name": variables["name"],
                    "age": variables["age"],
                    "isMarried": variables["isMarried"]
                });
                users.push(user.clone());
                json!({ "createUser": user })
            }
            other => panic!("unexpected operation {}", other)
        }
    }
}

#[async_trait]
impl Exchange for Fetch {
    async fn run<Q: GraphQLQuery, C: Client>(
        &self,
        operation: Operation<Q::Variables>,
        _client: C
    ) -> ExchangeResult<Q::ResponseData> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let response = if self.fail {
            Response {
                debug_info: None,
                data: None,
                errors: Some(vec![Error {
                    message: "Something went wrong".to_string(),
                    locations: None,
                    path: None,
                    extensions: None
                }])
            }
        } else {
            let variables = serde_json::to_value(&operation.query.variables)?;
            let data = self.answer(operation.query.operation_name, variables);
            Response {
                debug_info: Some(DebugInfo {
                    source: ResultSource::Network
                }),
                data: Some(serde_json::from_value(data)?),
                errors: None
            }
        };

        Ok(OperationResult {
            key: operation.key,
            meta: operation.meta,
            response
        })
    }
}

#[derive(Clone, Default)]
struct DummyClient {
    reruns: Arc<Mutex<Vec<u64>>>
}

impl DummyClient {
    fn reruns(&self) -> Vec<u64> {
        self.reruns.lock().clone()
    }
}

impl Client for DummyClient {
    fn rerun_query(&self, query_key: u64) {
        self.reruns.lock().push(query_key);
    }
}

fn build(fetch: &Fetch) -> NormalizedCacheImpl<Fetch> {
    NormalizedCacheExchange::new().build(fetch.clone())
}

fn get_users_op(request_policy: RequestPolicy) -> Operation<get_users::get_users::Variables> {
    make_op(GetUsers, get_users::get_users::Variables, request_policy)
}

fn get_user_op(id: &str) -> Operation<get_user_by_id::get_user_by_id::Variables> {
    make_op(
        GetUserById,
        get_user_by_id::get_user_by_id::Variables { id: id.to_string() },
        RequestPolicy::CacheFirst
    )
}

fn create_user_op(name: &str, age: i64) -> Operation<create_user::create_user::Variables> {
    make_op(
        CreateUser,
        create_user::create_user::Variables {
            name: name.to_string(),
            age,
            is_married: false
        },
        RequestPolicy::NetworkOnly
    )
}

fn users(data: Option<get_users::get_users::ResponseData>) -> Vec<GetUsersGetUsers> {
    data.and_then(|data| data.get_users)
        .unwrap_or_default()
        .into_iter()
        .flatten()
        .collect()
}

fn append_created_user() -> NormalizedCacheExtension {
    NormalizedCacheExtension::new().update::<CreateUser, _>(|data, store, dependencies| {
        let created = match data.as_ref().and_then(|data| data.create_user.clone()) {
            Some(created) => created,
            None => return
        };
        store.update_query(
            GetUsers,
            get_users::get_users::Variables,
            move |data| {
                data.map(|mut data| {
                    if let Some(users) = data.get_users.as_mut() {
                        users.push(Some(GetUsersGetUsers {
                            id: created.id,
                            name: created.name,
                            age: created.age,
                            is_married: created.is_married
                        }));
                    }
                    data
                })
            },
            dependencies
        );
    })
}

#[tokio::test]
async fn serves_repeated_queries_from_the_cache() {
    let fetch = Fetch::new();
    let exchange = build(&fetch);
    let client = DummyClient::default();

    let first = exchange
        .run::<GetUsers, _>(get_users_op(RequestPolicy::CacheFirst), client.clone())
        .await
        .unwrap();
    let second = exchange
        .run::<GetUsers, _>(get_users_op(RequestPolicy::CacheFirst), client.clone())
        .await
        .unwrap();

    assert_eq!(fetch.calls(), 1);
    assert_eq!(
        first.response.debug_info.unwrap().source,
        ResultSource::Network
    );
    assert_eq!(
        second.response.debug_info.unwrap().source,
        ResultSource::Cache,
        "Result didn't come from the cache"
    );
    assert_eq!(first.response.data, second.response.data);
}

#[tokio::test]
async fn network_only_results_are_still_written() {
    let fetch = Fetch::new();
    let exchange = build(&fetch);
    let client = DummyClient::default();

    for _ in 0..2 {
        exchange
            .run::<GetUsers, _>(get_users_op(RequestPolicy::NetworkOnly), client.clone())
            .await
            .unwrap();
    }
    assert_eq!(fetch.calls(), 2);

    let cached = exchange
        .run::<GetUsers, _>(get_users_op(RequestPolicy::CacheOnly), client.clone())
        .await
        .unwrap();
    assert_eq!(fetch.calls(), 2);
    assert_eq!(users(cached.response.data).len(), 3);
}

#[tokio::test]
async fn cache_only_misses_return_no_data() {
    let fetch = Fetch::new();
    let exchange = build(&fetch);

    let result = exchange
        .run::<GetUsers, _>(
            get_users_op(RequestPolicy::CacheOnly),
            DummyClient::default()
        )
        .await
        .unwrap();

    assert_eq!(fetch.calls(), 0);
    assert!(result.response.data.is_none());
    assert!(result.response.errors.is_none());
}

#[tokio::test]
async fn results_with_errors_are_not_cached() {
    let fetch = Fetch::failing();
    let exchange = build(&fetch);
    let client = DummyClient::default();

    let result = exchange
        .run::<GetUsers, _>(get_users_op(RequestPolicy::CacheFirst), client.clone())
        .await
        .unwrap();
    assert_eq!(
        result.response.error_message(),
        Some("Something went wrong")
    );

    let cached = exchange
        .run::<GetUsers, _>(get_users_op(RequestPolicy::CacheOnly), client.clone())
        .await
        .unwrap();
    assert!(cached.response.data.is_none());
}

#[tokio::test]
async fn entities_are_shared_between_queries() {
    let fetch = Fetch::new();
    let exchange = build(&fetch);
    let client = DummyClient::default();

    let by_id = get_user_op("2");
    let by_id_key = by_id.key;
    exchange
        .run::<GetUserById, _>(by_id, client.clone())
        .await
        .unwrap();

    fetch.rename("2", "Kimberly");
    exchange
        .run::<GetUsers, _>(get_users_op(RequestPolicy::NetworkOnly), client.clone())
        .await
        .unwrap();

    assert_eq!(client.reruns(), vec![by_id_key]);
    let cached = exchange
        .run::<GetUserById, _>(get_user_op("2"), client.clone())
        .await
        .unwrap();
    assert_eq!(fetch.calls(), 2);
    assert_eq!(
        cached.response.data.unwrap().get_user_by_id.unwrap().name,
        Some("Kimberly".to_string())
    );
}

#[tokio::test]
async fn missing_users_are_cached_as_null() {
    let fetch = Fetch::new();
    let exchange = build(&fetch);
    let client = DummyClient::default();

    for _ in 0..2 {
        let result = exchange
            .run::<GetUserById, _>(get_user_op("99"), client.clone())
            .await
            .unwrap();
        assert_eq!(result.response.data.unwrap().get_user_by_id, None);
    }
    assert_eq!(fetch.calls(), 1);
}

#[tokio::test]
async fn mutations_update_related_queries() {
    let fetch = Fetch::new();
    let exchange = build(&fetch);
    let client = DummyClient::default();

    let list = get_users_op(RequestPolicy::CacheFirst);
    let list_key = list.key;
    exchange.run::<GetUsers, _>(list, client.clone()).await.unwrap();

    let mut create = create_user_op("Ann", 30);
    create.options.extensions = Some(ext![append_created_user()]);
    let created = exchange
        .run::<CreateUser, _>(create, client.clone())
        .await
        .unwrap();
    assert_eq!(
        created.response.data.unwrap().create_user.unwrap().id,
        Some("4".to_string())
    );
    assert_eq!(client.reruns(), vec![list_key]);

    let cached = exchange
        .run::<GetUsers, _>(get_users_op(RequestPolicy::CacheOnly), client.clone())
        .await
        .unwrap();
    let users = users(cached.response.data);
    assert_eq!(users.len(), 4);
    assert_eq!(users[3].name.as_deref(), Some("Ann"));
    assert_eq!(users[3].age, Some(30));
    assert_eq!(fetch.calls(), 2);
}

#[tokio::test]
async fn mutations_without_an_updater_leave_lists_alone() {
    let fetch = Fetch::new();
    let exchange = build(&fetch);
    let client = DummyClient::default();

    exchange
        .run::<GetUsers, _>(get_users_op(RequestPolicy::CacheFirst), client.clone())
        .await
        .unwrap();
    exchange
        .run::<CreateUser, _>(create_user_op("Ann", 30), client.clone())
        .await
        .unwrap();

    assert!(client.reruns().is_empty());
    let cached = exchange
        .run::<GetUsers, _>(get_users_op(RequestPolicy::CacheOnly), client.clone())
        .await
        .unwrap();
    assert_eq!(users(cached.response.data).len(), 3);
}

#[tokio::test]
async fn failed_mutations_skip_the_updater() {
    let fetch = Fetch::failing();
    let exchange = build(&fetch);
    let client = DummyClient::default();

    let mut create = create_user_op("Ann", 30);
    create.options.extensions = Some(ext![append_created_user()]);
    let result = exchange
        .run::<CreateUser, _>(create, client.clone())
        .await
        .unwrap();

    assert!(result.response.data.is_none());
    assert!(client.reruns().is_empty());
}

use crate::{
    client::ClientImpl, types::Observable, utils::progressive_hash, Exchange, GraphQLQuery,
    QueryError, QueryOptions, Response
};
use futures::{
    channel::mpsc::{self, Sender},
    SinkExt
};
use stable_vec::StableVec;
use std::{any::Any, future::Future, pin::Pin, sync::Arc};

pub type OperationObservable<Q, M> =
    Observable<Result<Response<<Q as GraphQLQuery>::ResponseData>, QueryError>, M>;

type BoxedResult = Arc<dyn Any + Send + Sync>;
type RerunFn = Arc<dyn Fn() -> Pin<Box<dyn Future<Output = BoxedResult> + Send>> + Send + Sync>;

pub(crate) struct Subscription {
    pub(crate) listeners: StableVec<Sender<BoxedResult>>,
    // Erases the query type and variables so subscriptions of any query fit in one map.
    pub(crate) rerun: RerunFn
}

pub(crate) async fn subscribe_with_options<Q: GraphQLQuery, M: Exchange>(
    client: &Arc<ClientImpl<M>>,
    _query: Q,
    variables: Q::Variables,
    options: QueryOptions
) -> OperationObservable<Q, M> {
    let (query, meta) = Q::build_query(variables.clone());
    let (mut sender, receiver) = mpsc::channel(8);
    let key = progressive_hash(meta.query_key, &variables);

    let operation = client.create_request_operation::<Q>(query, meta, options);

    let observable = {
        let mut subscriptions = client.active_subscriptions.lock();
        let index = if let Some(subscription) = subscriptions.get_mut(&key) {
            subscription.listeners.push(sender.clone())
        } else {
            let rerun_client = client.clone();
            let operation = operation.clone();
            let mut listeners = StableVec::new();
            let index = listeners.push(sender.clone());
            let subscription = Subscription {
                listeners,
                rerun: Arc::new(move || {
                    let client = rerun_client.clone();
                    let operation = operation.clone();

                    Box::pin(async move {
                        let res = client.execute_request_operation::<Q>(operation).await;
                        let boxed: BoxedResult = Arc::new(res);
                        boxed
                    })
                })
            };
            subscriptions.insert(key, subscription);
            index
        };
        Observable::new(key, receiver, client.clone(), index)
    };

    let res = client.execute_request_operation::<Q>(operation).await;
    if sender.send(Arc::new(res)).await.is_err() {
        tracing::debug!(key, "observable dropped before the first result");
    }
    observable
}

/// Execute the watched query again and push the result to every listener.
pub(crate) fn rerun_query<M: Exchange>(client: &Arc<ClientImpl<M>>, key: u64) {
    let rerun = {
        let subscriptions = client.active_subscriptions.lock();
        subscriptions.get(&key).map(|sub| sub.rerun.clone())
    };
    let rerun = match rerun {
        Some(rerun) => rerun,
        None => return
    };

    tracing::debug!(key, "rerunning watched query");
    let client = client.clone();
    tokio::spawn(async move {
        let value = rerun().await;

        let listeners: Vec<Sender<BoxedResult>> = {
            let subscriptions = client.active_subscriptions.lock();
            match subscriptions.get(&key) {
                Some(subscription) => subscription.listeners.values().cloned().collect(),
                None => return
            }
        };

        for mut listener in listeners {
            if listener.send(value.clone()).await.is_err() {
                tracing::debug!(key, "listener went away during rerun");
            }
        }
    });
}

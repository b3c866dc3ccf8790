use crate::{
    exchange::Client as ExchangeClient,
    types::{HeaderFn, OperationOptions},
    utils::progressive_hash,
    Exchange, GraphQLQuery, Operation, OperationMeta, QueryBody, QueryError, QueryOptions,
    RequestPolicy, Response
};
#[cfg(feature = "observable")]
use parking_lot::Mutex;
#[cfg(feature = "observable")]
use std::collections::HashMap;
use std::sync::Arc;
use url::Url;

#[cfg(feature = "observable")]
use crate::client::observable::{OperationObservable, Subscription};

/// The shared state behind a [`Client`](../struct.Client.html).
pub struct ClientImpl<M: Exchange> {
    pub(crate) url: Url,
    pub(crate) exchange: M,
    pub(crate) extra_headers: Option<HeaderFn>,
    pub(crate) request_policy: RequestPolicy,
    #[cfg(feature = "observable")]
    pub(crate) active_subscriptions: Arc<Mutex<HashMap<u64, Subscription>>>
}

impl<M: Exchange> ClientImpl<M> {
    #[cfg(feature = "observable")]
    pub(crate) fn clear_observable(&self, key: u64, index: usize) {
        let mut subscriptions = self.active_subscriptions.lock();
        if let Some(subscription) = subscriptions.get_mut(&key) {
            subscription.listeners.remove(index);
            if subscription.listeners.is_empty() {
                subscriptions.remove(&key);
            }
        }
    }

    pub(crate) async fn execute_request_operation<Q: GraphQLQuery>(
        self: &Arc<Self>,
        operation: Operation<Q::Variables>
    ) -> Result<Response<Q::ResponseData>, QueryError> {
        tracing::debug!(
            operation = operation.query.operation_name,
            key = operation.key,
            policy = ?operation.options.request_policy,
            "executing operation"
        );
        self.exchange
            .run::<Q, _>(operation, self.clone())
            .await
            .map(|operation_result| operation_result.response)
    }

    pub async fn query<Q: GraphQLQuery>(
        self: &Arc<Self>,
        query: Q,
        variables: Q::Variables
    ) -> Result<Response<Q::ResponseData>, QueryError> {
        self.query_with_options(query, variables, QueryOptions::default())
            .await
    }

    pub async fn query_with_options<Q: GraphQLQuery>(
        self: &Arc<Self>,
        _query: Q,
        variables: Q::Variables,
        options: QueryOptions
    ) -> Result<Response<Q::ResponseData>, QueryError> {
        let (query, meta) = Q::build_query(variables);
        let operation = self.create_request_operation::<Q>(query, meta, options);
        self.execute_request_operation::<Q>(operation).await
    }

    #[cfg(feature = "observable")]
    pub async fn subscribe<Q: GraphQLQuery>(
        self: &Arc<Self>,
        query: Q,
        variables: Q::Variables
    ) -> OperationObservable<Q, M> {
        self.subscribe_with_options(query, variables, QueryOptions::default())
            .await
    }

    #[cfg(feature = "observable")]
    pub async fn subscribe_with_options<Q: GraphQLQuery>(
        self: &Arc<Self>,
        query: Q,
        variables: Q::Variables,
        options: QueryOptions
    ) -> OperationObservable<Q, M> {
        super::observable::subscribe_with_options(self, query, variables, options).await
    }

    /// Merge the per-query options with the client defaults. The operation key is derived from
    /// the static query key and the variables, so equal requests share a key.
    pub(crate) fn create_request_operation<Q: GraphQLQuery>(
        &self,
        query: QueryBody<Q::Variables>,
        meta: OperationMeta,
        options: QueryOptions
    ) -> Operation<Q::Variables> {
        let key = progressive_hash(meta.query_key, &query.variables);
        let extra_headers = options
            .extra_headers
            .or_else(|| self.extra_headers.clone());

        Operation {
            key,
            meta,
            query,
            options: OperationOptions {
                url: options.url.unwrap_or_else(|| self.url.clone()),
                extra_headers,
                request_policy: options.request_policy.unwrap_or(self.request_policy),
                extensions: options.extensions
            }
        }
    }
}

impl<M: Exchange> ExchangeClient for Arc<ClientImpl<M>> {
    #[cfg(feature = "observable")]
    fn rerun_query(&self, query_key: u64) {
        super::observable::rerun_query(self, query_key);
    }

    #[cfg(not(feature = "observable"))]
    fn rerun_query(&self, _query_key: u64) {}
}

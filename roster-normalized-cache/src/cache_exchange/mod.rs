//! Contains the exchange factory and implementation. The factory is the only thing needed for most
//! users and is reexported from the root.

use crate::{
    store::{QueryStore, Store},
    types::{NormalizedCacheExtension, NormalizedCacheOptions},
    HashSet
};
use roster::{
    exchange::{
        Client, Exchange, ExchangeFactory, ExchangeResult, Operation, OperationResult,
        OperationType
    },
    DebugInfo, GraphQLQuery, RequestPolicy, Response, ResultSource
};
use std::sync::Arc;

#[cfg(test)]
mod tests;

/// The normalized cache exchange. This will store normalized queries by unique ID.
#[derive(Default)]
pub struct NormalizedCacheExchange {
    options: Option<NormalizedCacheOptions>
}

impl NormalizedCacheExchange {
    /// Create a new cache exchange with extra options.
    pub fn with_options(options: NormalizedCacheOptions) -> Self {
        Self {
            options: Some(options)
        }
    }

    /// Create a new cache exchange with default options
    pub fn new() -> Self {
        Self { options: None }
    }
}

impl<TNext: Exchange> ExchangeFactory<TNext> for NormalizedCacheExchange {
    type Output = NormalizedCacheImpl<TNext>;

    fn build(self, next: TNext) -> NormalizedCacheImpl<TNext> {
        let options = self.options.unwrap_or_default();
        let custom_keys = options
            .custom_keys
            .map(|keys| keys.into_iter().collect())
            .unwrap_or_default();
        NormalizedCacheImpl {
            next,
            store: Arc::new(Store::new(custom_keys))
        }
    }
}

/// The implementation of the normalized cache. Exposed in case someone needs it, but most users
/// shouldn't.
pub struct NormalizedCacheImpl<TNext: Exchange> {
    next: TNext,
    store: Arc<Store>
}

fn has_errors<R: Clone>(response: &Response<R>) -> bool {
    response
        .errors
        .as_ref()
        .map(|errors| !errors.is_empty())
        .unwrap_or(false)
}

impl<TNext: Exchange> NormalizedCacheImpl<TNext> {
    /// A handle to the underlying store, e.g. to inspect or update cached queries directly.
    pub fn store(&self) -> QueryStore {
        self.store.clone().into()
    }

    fn write_query<Q: GraphQLQuery, C: Client>(
        &self,
        result: &OperationResult<Q::ResponseData>,
        variables: &Q::Variables,
        client: &C
    ) {
        if has_errors(&result.response) {
            tracing::debug!(key = result.key, "not caching a result with errors");
            return;
        }

        let mut dependencies = HashSet::default();
        if let Err(e) = self
            .store
            .write_query::<Q>(result, variables, &mut dependencies)
        {
            tracing::warn!(error = %e, "failed to write query result to the cache");
            return;
        }
        self.store.set_dependencies(result.key, &dependencies);
        self.store.rerun_queries(dependencies, result.key, client);
    }

    fn write_mutation<Q: GraphQLQuery, C: Client>(
        &self,
        result: &OperationResult<Q::ResponseData>,
        variables: &Q::Variables,
        client: &C,
        extension: Option<&NormalizedCacheExtension>
    ) {
        if has_errors(&result.response) {
            tracing::debug!(key = result.key, "skipping cache update for a failed mutation");
            return;
        }

        let mut dependencies = HashSet::default();
        if let Err(e) = self
            .store
            .write_query::<Q>(result, variables, &mut dependencies)
        {
            tracing::warn!(error = %e, "failed to write mutation result to the cache");
        }
        if let Some(updater) = extension.and_then(|ext| ext.update.as_ref()) {
            updater(
                &result.response.data,
                self.store.clone().into(),
                &mut dependencies
            );
        }
        self.store.rerun_queries(dependencies, result.key, client);
    }

    fn read_query<Q: GraphQLQuery>(
        &self,
        operation: &Operation<Q::Variables>
    ) -> Option<OperationResult<Q::ResponseData>> {
        let mut dependencies = HashSet::default();
        let cached = self
            .store
            .read_query::<Q>(&operation.query.variables, &mut dependencies)?;
        self.store.set_dependencies(operation.key, &dependencies);

        Some(OperationResult {
            key: operation.key,
            meta: operation.meta.clone(),
            response: Response {
                debug_info: Some(DebugInfo {
                    source: ResultSource::Cache
                }),
                data: Some(cached),
                errors: None
            }
        })
    }
}

#[async_trait]
impl<TNext: Exchange> Exchange for NormalizedCacheImpl<TNext> {
    async fn run<Q: GraphQLQuery, C: Client>(
        &self,
        operation: Operation<Q::Variables>,
        client: C
    ) -> ExchangeResult<Q::ResponseData> {
        let operation_type = operation.meta.operation_type;
        let request_policy = operation.options.request_policy;

        if operation_type == OperationType::Query && request_policy != RequestPolicy::NetworkOnly {
            if let Some(cached) = self.read_query::<Q>(&operation) {
                tracing::debug!(key = operation.key, "cache hit");
                return Ok(cached);
            }
            if request_policy == RequestPolicy::CacheOnly {
                tracing::debug!(key = operation.key, "cache miss with cache-only policy");
                return Ok(OperationResult {
                    key: operation.key,
                    meta: operation.meta,
                    response: Response {
                        debug_info: Some(DebugInfo {
                            source: ResultSource::Cache
                        }),
                        data: None,
                        errors: None
                    }
                });
            }
        }

        let extension = operation
            .options
            .extensions
            .as_ref()
            .and_then(|ext| ext.get::<NormalizedCacheExtension>())
            .cloned();
        let variables = operation.query.variables.clone();
        let result = self.next.run::<Q, _>(operation, client.clone()).await?;

        match operation_type {
            OperationType::Query => self.write_query::<Q, _>(&result, &variables, &client),
            OperationType::Mutation => {
                self.write_mutation::<Q, _>(&result, &variables, &client, extension.as_ref())
            }
            OperationType::Subscription => {}
        }
        Ok(result)
    }
}

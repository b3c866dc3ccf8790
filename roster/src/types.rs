#[cfg(feature = "observable")]
use crate::client::ClientImpl;
use crate::{GraphQLQuery, QueryBody, QueryError, Response};
#[cfg(feature = "observable")]
use futures::{channel::mpsc::Receiver, Stream};
use serde::de::DeserializeOwned;
#[cfg(feature = "observable")]
use std::{
    any::Any,
    marker::PhantomData,
    pin::Pin,
    task::{Context, Poll}
};
use std::{fmt, sync::Arc};
use url::Url;

pub type ExchangeResult<R> = Result<OperationResult<R>, QueryError>;

/// A bi-directional middleware. Exchanges either answer an operation themselves or forward it
/// to the next exchange in the chain, acting on the result on the way back.
#[async_trait]
pub trait Exchange: Send + Sync + 'static {
    async fn run<Q: GraphQLQuery, C: Client>(
        &self,
        operation: Operation<Q::Variables>,
        client: C
    ) -> ExchangeResult<Q::ResponseData>;
}

/// Builds an exchange on top of the next exchange in the chain.
pub trait ExchangeFactory<TNext: Exchange> {
    type Output: Exchange;

    fn build(self, next: TNext) -> Self::Output;
}

/// The handle exchanges receive to talk back to the client, e.g. to rerun watched queries
/// after the cache changed.
pub trait Client: Clone + Send + Sync + 'static {
    fn rerun_query(&self, query_key: u64);
}

/// Static information about the response shape of a query.
pub trait QueryInfo<TVars> {
    fn selection(variables: &TVars) -> Vec<FieldSelector>;
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum OperationType {
    Query,
    Mutation,
    Subscription
}

impl OperationType {
    pub fn to_str(&self) -> &'static str {
        match self {
            OperationType::Query => "Query",
            OperationType::Mutation => "Mutation",
            OperationType::Subscription => "Subscription"
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

impl From<u8> for OperationType {
    fn from(u: u8) -> Self {
        match u {
            1 => OperationType::Mutation,
            2 => OperationType::Subscription,
            _ => OperationType::Query
        }
    }
}

/// Where a query is allowed to get its result from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestPolicy {
    /// Use the cached result if it is complete, go to the network otherwise.
    CacheFirst,
    /// Never go to the network. A cache miss yields an empty response.
    CacheOnly,
    /// Always go to the network. The result is still written to caches.
    NetworkOnly
}

impl Default for RequestPolicy {
    fn default() -> Self {
        RequestPolicy::CacheFirst
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderPair(pub String, pub String);

pub type HeaderFn = Arc<dyn Fn() -> Vec<HeaderPair> + Send + Sync>;

/// The abstract selection tree of a query, as emitted alongside the response types.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldSelector {
    /// field name, arguments
    Scalar(&'static str, String),
    /// field name, arguments, typename, inner selection
    Object(&'static str, String, &'static str, Vec<FieldSelector>)
}

impl FieldSelector {
    pub fn field_name(&self) -> &'static str {
        match self {
            FieldSelector::Scalar(name, _) => name,
            FieldSelector::Object(name, ..) => name
        }
    }
}

#[derive(Clone, Debug)]
pub struct OperationMeta {
    pub query_key: u32,
    pub operation_type: OperationType,
    pub involved_types: Vec<&'static str>
}

#[derive(Clone)]
pub struct OperationOptions {
    pub url: Url,
    pub extra_headers: Option<HeaderFn>,
    pub request_policy: RequestPolicy,
    pub extensions: Option<Extensions>
}

#[derive(Clone)]
pub struct Operation<V: serde::Serialize + Clone + Send + Sync> {
    pub key: u64,
    pub meta: OperationMeta,
    pub query: QueryBody<V>,
    pub options: OperationOptions
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResultSource {
    Cache,
    Network
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DebugInfo {
    pub source: ResultSource
}

#[derive(Clone, Debug)]
pub struct OperationResult<R: DeserializeOwned + Send + Sync + Clone> {
    pub key: u64,
    pub meta: OperationMeta,
    pub response: Response<R>
}

/// A stream of results for a watched query. A new item is pushed every time the query is
/// rerun, which happens when a cache exchange detects that its data changed.
#[cfg(feature = "observable")]
pub struct Observable<T, M: Exchange> {
    inner: Receiver<Arc<dyn Any + Send + Sync>>,
    client: Arc<ClientImpl<M>>,
    key: u64,
    index: usize,
    t: PhantomData<fn() -> T>
}

#[cfg(feature = "observable")]
impl<T: Clone, M: Exchange> Observable<T, M> {
    pub(crate) fn new(
        key: u64,
        inner: Receiver<Arc<dyn Any + Send + Sync>>,
        client: Arc<ClientImpl<M>>,
        index: usize
    ) -> Self {
        Observable {
            inner,
            client,
            key,
            index,
            t: PhantomData
        }
    }
}

#[cfg(feature = "observable")]
impl<T, M: Exchange> Stream for Observable<T, M>
where
    T: 'static + Clone
{
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let inner = &mut self.get_mut().inner;
        match Pin::new(inner).poll_next(cx) {
            Poll::Ready(Some(boxed)) => Poll::Ready(boxed.downcast_ref::<T>().cloned()),
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => Poll::Pending
        }
    }
}

#[cfg(feature = "observable")]
impl<T, M: Exchange> Drop for Observable<T, M> {
    fn drop(&mut self) {
        self.client.clear_observable(self.key, self.index)
    }
}

pub type ExtensionMap = type_map::concurrent::TypeMap;
pub type Extensions = Arc<ExtensionMap>;

/// Per-query overrides of the client defaults.
#[derive(Default, Clone)]
pub struct QueryOptions {
    pub url: Option<Url>,
    pub extra_headers: Option<HeaderFn>,
    pub request_policy: Option<RequestPolicy>,
    pub extensions: Option<Extensions>
}

impl QueryOptions {
    pub fn with_request_policy(mut self, request_policy: RequestPolicy) -> Self {
        self.request_policy = Some(request_policy);
        self
    }

    pub fn with_extensions(mut self, extensions: Extensions) -> Self {
        self.extensions = Some(extensions);
        self
    }
}

use std::sync::Arc;

mod builder;
mod r#impl;
#[cfg(feature = "observable")]
mod observable;

use crate::{
    default_exchanges::TerminatorExchange, Exchange, GraphQLQuery, QueryError, QueryOptions,
    Response
};
pub use builder::ClientBuilder;
#[cfg(feature = "observable")]
pub use observable::OperationObservable;
pub use r#impl::ClientImpl;

/// The GraphQL client. Cheap to clone, all clones share the same exchange chain and caches.
#[repr(transparent)]
pub struct Client<M: Exchange = TerminatorExchange>(pub Arc<ClientImpl<M>>);

impl<M: Exchange> Clone for Client<M> {
    fn clone(&self) -> Self {
        Client(self.0.clone())
    }
}

impl Client {
    pub fn builder<U: AsRef<str>>(url: U) -> Result<ClientBuilder, url::ParseError> {
        ClientBuilder::new(url)
    }
}

impl<M: Exchange> Client<M> {
    /// Run a query or mutation with the client's default options.
    pub async fn query<Q: GraphQLQuery>(
        &self,
        _query: Q,
        variables: Q::Variables
    ) -> Result<Response<Q::ResponseData>, QueryError> {
        self.0.query(_query, variables).await
    }

    /// Run a query or mutation, overriding the client's defaults where `options` sets them.
    pub async fn query_with_options<Q: GraphQLQuery>(
        &self,
        _query: Q,
        variables: Q::Variables,
        options: QueryOptions
    ) -> Result<Response<Q::ResponseData>, QueryError> {
        self.0.query_with_options(_query, variables, options).await
    }

    /// Run a query and keep watching it. The first item is the initial result, every later
    /// item is pushed when an exchange reruns the query.
    #[cfg(feature = "observable")]
    pub async fn subscribe<Q: GraphQLQuery>(
        &self,
        query: Q,
        variables: Q::Variables
    ) -> OperationObservable<Q, M> {
        self.0.subscribe(query, variables).await
    }

    #[cfg(feature = "observable")]
    pub async fn subscribe_with_options<Q: GraphQLQuery>(
        &self,
        _query: Q,
        variables: Q::Variables,
        options: QueryOptions
    ) -> OperationObservable<Q, M> {
        self.0
            .subscribe_with_options(_query, variables, options)
            .await
    }
}

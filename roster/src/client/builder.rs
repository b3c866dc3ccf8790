use crate::{
    client::ClientImpl,
    default_exchanges::TerminatorExchange,
    types::{HeaderFn, HeaderPair},
    Client, Exchange, ExchangeFactory, RequestPolicy
};
#[cfg(feature = "observable")]
use parking_lot::Mutex;
#[cfg(feature = "observable")]
use std::collections::HashMap;
use std::sync::Arc;
use url::Url;

pub struct ClientBuilder<M: Exchange = TerminatorExchange> {
    exchange: M,
    url: Url,
    extra_headers: Option<HeaderFn>,
    request_policy: RequestPolicy
}

impl ClientBuilder<TerminatorExchange> {
    /// Start building a client for the GraphQL endpoint at `url`.
    pub fn new<U: AsRef<str>>(url: U) -> Result<Self, url::ParseError> {
        let url = Url::parse(url.as_ref())?;
        Ok(ClientBuilder {
            exchange: TerminatorExchange,
            url,
            extra_headers: None,
            request_policy: RequestPolicy::CacheFirst
        })
    }
}

impl<M: Exchange> ClientBuilder<M> {
    /// Add the default exchanges to the chain.
    #[cfg(feature = "default-exchanges")]
    pub fn with_default_exchanges(self) -> ClientBuilder<impl Exchange> {
        self.with_exchange(crate::default_exchanges::FetchExchange)
    }

    /// Add an exchange to the chain. Keep in mind that exchanges are executed bottom to top, so the first one added will be the last one executed.
    pub fn with_exchange<F>(self, exchange_factory: F) -> ClientBuilder<F::Output>
    where
        F: ExchangeFactory<M>
    {
        let exchange = exchange_factory.build(self.exchange);
        ClientBuilder {
            exchange,
            url: self.url,
            extra_headers: self.extra_headers,
            request_policy: self.request_policy
        }
    }

    pub fn with_extra_headers<F: Fn() -> Vec<HeaderPair> + Send + Sync + 'static>(
        mut self,
        header_fn: F
    ) -> Self {
        self.extra_headers = Some(Arc::new(header_fn));
        self
    }

    pub fn with_request_policy(mut self, request_policy: RequestPolicy) -> Self {
        self.request_policy = request_policy;
        self
    }

    pub fn build(self) -> Client<M> {
        let client = ClientImpl {
            url: self.url,
            exchange: self.exchange,
            extra_headers: self.extra_headers,
            request_policy: self.request_policy,
            #[cfg(feature = "observable")]
            active_subscriptions: Arc::new(Mutex::new(HashMap::new()))
        };

        Client(Arc::new(client))
    }
}

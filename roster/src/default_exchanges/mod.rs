//! The exchanges that ship with the client.
//! Note that the fetch exchange requires the `default-exchanges` feature.

use crate::{
    exchange::{Client, Exchange, ExchangeResult, Operation},
    GraphQLQuery
};

#[cfg(feature = "default-exchanges")]
mod fetch;

#[cfg(feature = "default-exchanges")]
pub use fetch::{FetchError, FetchExchange, FetchExchangeImpl};

#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("unexpected end of exchange chain")]
    UnexpectedEndOfChain
}

/// The terminating exchange.
/// This will always be the last exchange in the chain and will simply return an error if called.
pub struct TerminatorExchange;

#[async_trait]
impl Exchange for TerminatorExchange {
    async fn run<Q: GraphQLQuery, C: Client>(
        &self,
        _operation: Operation<Q::Variables>,
        _client: C
    ) -> ExchangeResult<Q::ResponseData> {
        Err(ChainError::UnexpectedEndOfChain.into())
    }
}

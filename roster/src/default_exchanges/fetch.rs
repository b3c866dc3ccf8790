use crate::{
    exchange::{Client, Exchange, ExchangeFactory, ExchangeResult, Operation, OperationResult},
    types::OperationOptions,
    DebugInfo, GraphQLQuery, HeaderPair, QueryBody, Response, ResultSource
};
use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("fetch error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("decoding error: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("server returned error code: {0}\n{1}")]
    NotOk(StatusCode, String)
}

/// The default fetch exchange. POSTs the query body as JSON using `reqwest` and decodes the
/// GraphQL response. A non-2xx response is still decoded if its body is a GraphQL response, so
/// request errors reported by the server end up in `Response::errors`.
pub struct FetchExchange;

impl<TNext: Exchange> ExchangeFactory<TNext> for FetchExchange {
    type Output = FetchExchangeImpl;

    fn build(self, _next: TNext) -> Self::Output {
        FetchExchangeImpl {
            client: reqwest::Client::new()
        }
    }
}

pub struct FetchExchangeImpl {
    client: reqwest::Client
}

impl FetchExchangeImpl {
    async fn fetch<Q: GraphQLQuery>(
        &self,
        extra_headers: Vec<HeaderPair>,
        options: &OperationOptions,
        query: &QueryBody<Q::Variables>
    ) -> Result<Response<Q::ResponseData>, FetchError> {
        let mut request = self
            .client
            .post(options.url.clone())
            .header("Accept", "application/json")
            .json(query);

        for HeaderPair(key, value) in extra_headers {
            request = request.header(key.as_str(), value.as_str());
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        match serde_json::from_slice::<Response<Q::ResponseData>>(&body) {
            Ok(decoded) => Ok(decoded),
            Err(_) if !status.is_success() => Err(FetchError::NotOk(
                status,
                String::from_utf8_lossy(&body).into_owned()
            )),
            Err(e) => Err(FetchError::Decode(e))
        }
    }
}

#[async_trait]
impl Exchange for FetchExchangeImpl {
    async fn run<Q: GraphQLQuery, C: Client>(
        &self,
        operation: Operation<Q::Variables>,
        _client: C
    ) -> ExchangeResult<Q::ResponseData> {
        let extra_headers = match operation.options.extra_headers {
            Some(ref extra_headers) => extra_headers(),
            None => Vec::new()
        };

        tracing::debug!(
            url = %operation.options.url,
            operation = operation.query.operation_name,
            "sending operation"
        );
        let mut response = self
            .fetch::<Q>(extra_headers, &operation.options, &operation.query)
            .await?;
        response.debug_info = Some(DebugInfo {
            source: ResultSource::Network
        });

        Ok(OperationResult {
            key: operation.key,
            meta: operation.meta,
            response
        })
    }
}

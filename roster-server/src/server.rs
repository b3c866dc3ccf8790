//! HTTP surface of the roster API.
//!
//! # Routes
//!
//! - `POST /` - execute a GraphQL request sent as JSON
//! - `GET /?query=..&variables=..&operationName=..` - execute a read-only GraphQL request
//! - `GET /health` - liveness check
//! - `GET /schema.graphql` - the schema in SDL form
//!
//! # Example
//!
//! ```no_run
//! use roster_server::{InMemoryUserRepository, RosterServer};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let server = RosterServer::new(Arc::new(InMemoryUserRepository::seeded()))
//!         .expect("schema is valid");
//!
//!     server.run("127.0.0.1:4000").await.expect("server failed");
//! }
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::{Body, Bytes},
    extract::{DefaultBodyLimit, Query, State},
    http::{header, HeaderValue, Method, Request, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router
};
use serde::Deserialize;
use serde_json::{Map, Value};
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::executor::{
    ErrorCode, Execution, ExecutionStatus, Executor, GraphQLError, GraphQLRequest, GraphQLResponse
};
use crate::repository::{InMemoryUserRepository, UserRepository};
use crate::resolvers::Resolvers;
use crate::schema::Schema;

const MAX_BODY_SIZE: usize = 1024 * 1024;

/// The API server: schema, resolvers and the HTTP routes in front of them.
pub struct RosterServer {
    executor: Arc<Executor>
}

impl RosterServer {
    pub fn new(repository: Arc<dyn UserRepository>) -> Result<Self, ServerError> {
        let schema = Schema::roster()?;
        Ok(Self {
            executor: Arc::new(Executor::new(schema, Resolvers::new(repository)))
        })
    }

    pub fn from_config(config: &ServerConfig) -> Result<Self, ServerError> {
        let repository = if config.no_seed {
            InMemoryUserRepository::empty()
        } else {
            InMemoryUserRepository::seeded()
        };
        Self::new(Arc::new(repository))
    }

    pub fn router(&self) -> Router {
        router(self.executor.clone())
    }

    /// Bind `addr` and serve until Ctrl-C.
    pub async fn run(self, addr: &str) -> Result<(), ServerError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.to_owned(),
                source
            })?;
        self.serve(listener, shutdown_signal()).await
    }

    /// Serve on an already bound listener until `shutdown` completes.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(%addr, "roster API listening");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(ServerError::Io)
    }
}

fn router(executor: Arc<Executor>) -> Router {
    Router::new()
        .route("/", get(graphql_get).post(graphql_post))
        .route("/health", get(health))
        .route("/schema.graphql", get(schema_sdl))
        .layer(middleware::from_fn(cors))
        .layer(middleware::from_fn(log_requests))
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .with_state(executor)
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(%error, "cannot listen for Ctrl-C, serving until killed");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

async fn graphql_post(State(executor): State<Arc<Executor>>, body: Bytes) -> Response {
    let request: GraphQLRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(error) => return bad_request(format!("POST body sent invalid JSON: {error}"))
    };
    if request.query.trim().is_empty() {
        return bad_request("GraphQL operations must contain a non-empty `query`.");
    }
    respond(executor.execute(request).await)
}

#[derive(Debug, Deserialize)]
struct GetParams {
    query: Option<String>,
    variables: Option<String>,
    #[serde(rename = "operationName")]
    operation_name: Option<String>
}

async fn graphql_get(
    State(executor): State<Arc<Executor>>,
    Query(params): Query<GetParams>
) -> Response {
    let query = match params.query.filter(|query| !query.trim().is_empty()) {
        Some(query) => query,
        None => return bad_request("GraphQL operations must contain a non-empty `query`.")
    };
    let variables = match params.variables.as_deref() {
        None | Some("") => None,
        Some(raw) => match serde_json::from_str::<Option<Map<String, Value>>>(raw) {
            Ok(variables) => variables,
            Err(error) => {
                return bad_request(format!("`variables` is not a JSON object: {error}"))
            }
        }
    };

    let request = GraphQLRequest {
        query,
        variables,
        operation_name: params.operation_name
    };
    respond(executor.execute_read_only(request).await)
}

async fn health() -> &'static str {
    "ok"
}

async fn schema_sdl(State(executor): State<Arc<Executor>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        executor.schema().sdl().to_owned()
    )
}

fn respond(execution: Execution) -> Response {
    let status = match execution.status {
        ExecutionStatus::Executed => StatusCode::OK,
        ExecutionStatus::RequestError => StatusCode::BAD_REQUEST,
        ExecutionStatus::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED
    };
    let mut response = (status, Json(execution.response)).into_response();
    if status == StatusCode::METHOD_NOT_ALLOWED {
        response
            .headers_mut()
            .insert(header::ALLOW, HeaderValue::from_static("POST"));
    }
    response
}

fn bad_request(message: impl Into<String>) -> Response {
    let response = GraphQLResponse::from_errors(vec![
        GraphQLError::new(message).with_code(ErrorCode::BadRequest)
    ]);
    (StatusCode::BAD_REQUEST, Json(response)).into_response()
}

/// Answers preflight requests and allows any origin to call the API.
async fn cors(request: Request<Body>, next: Next) -> Response {
    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(request).await
    };

    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*")
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS")
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("content-type, authorization")
    );
    response
}

async fn log_requests(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let started = Instant::now();

    let response = next.run(request).await;

    tracing::debug!(
        %method,
        path = %path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "handled request"
    );
    response
}

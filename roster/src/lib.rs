//! A small typed GraphQL client with common built-in features
//! as well as the ability to extend its functionality through exchanges.
//!
//! # Getting Started
//!
//! Every operation is a zero-size type implementing [`GraphQLQuery`](./trait.GraphQLQuery.html),
//! with a companion module holding its `Variables`, its `ResponseData` and any involved output
//! types. The `roster-queries` crate contains the operations used by the roster app.
//!
//! ```ignore
//! use roster::{ClientBuilder, FetchExchange};
//! use roster_queries::get_user_by_id::{get_user_by_id::Variables, GetUserById};
//!
//! let client = ClientBuilder::new("http://localhost:4000")?
//!     .with_exchange(FetchExchange)
//!     .build();
//!
//! let result = client.query(GetUserById, Variables { id: "2".to_string() }).await?;
//! assert_eq!(result.data.unwrap().get_user_by_id.unwrap().name.as_deref(), Some("Kim"));
//! ```
//!
//! # Exchanges
//!
//! Exchanges are like a bi-directional middleware.
//! They act on both the incoming and outgoing queries,
//! passing them on if they can't return a result themselves.
//!
//! ## FetchExchange
//!
//! The fetch exchange will serialize the query, send it over the network and deserialize the
//! response using `reqwest`. This should be your first exchange in the builder chain (and
//! therefore the last one executed), as it never forwards a query.
//!
//! Caching is provided by the `roster-normalized-cache` crate, which stores entities by their
//! unique ID and lets mutations update related queries.
//!
//! # Features
//!
//! * `default-exchanges` **(default)** - Include the fetch exchange.
//! * `observable` **(default)** - Include support for watched queries and all related types.

#[macro_use]
extern crate serde;
#[macro_use]
extern crate async_trait;

use std::{collections::HashMap, fmt, fmt::Display};
use types::*;

pub mod client;
pub mod default_exchanges;
mod error;
pub(crate) mod types;
pub mod utils;

pub use client::{Client, ClientBuilder};
#[cfg(feature = "default-exchanges")]
pub use default_exchanges::{FetchError, FetchExchange};
pub use error::QueryError;
use serde::{de::DeserializeOwned, Serialize};
#[cfg(feature = "observable")]
pub use types::Observable;
pub use types::{
    DebugInfo, ExtensionMap, Extensions, HeaderPair, QueryOptions, RequestPolicy, ResultSource
};

/// Types used by custom exchanges. Regular users probably don't need these.
pub mod exchange {
    pub use crate::types::{
        Client, Exchange, ExchangeFactory, ExchangeResult, Operation, OperationMeta,
        OperationOptions, OperationResult, OperationType
    };
}

/// Types used by operation definitions. Exchanges may use these to walk the response shape.
pub mod codegen {
    pub use crate::types::{FieldSelector, QueryInfo};
}

/// The form in which queries are sent over HTTP in most implementations. This will be built
/// using the [GraphQLQuery](./trait.GraphQLQuery.html) trait normally.
#[derive(Debug, Serialize, Clone)]
pub struct QueryBody<Variables: Serialize + Send + Sync + Clone> {
    /// The values for the variables. They must match those declared in the queries.
    pub variables: Variables,
    /// The GraphQL query, as a string.
    pub query: &'static str,
    /// The GraphQL operation name, as a string.
    #[serde(rename = "operationName")]
    pub operation_name: &'static str
}

/// Builds a GraphQL request body for an operation.
/// It is implemented on the zero-size type naming the operation.
pub trait GraphQLQuery: Send + Sync + 'static {
    /// The shape of the variables expected by the query.
    type Variables: Serialize + Send + Sync + Clone + 'static;
    /// The top-level shape of the response data (the `data` field in the GraphQL response).
    type ResponseData: Serialize
        + DeserializeOwned
        + Send
        + Sync
        + Clone
        + 'static
        + QueryInfo<Self::Variables>;

    /// Produce a GraphQL query struct that can be JSON serialized and sent to a GraphQL API.
    fn build_query(variables: Self::Variables) -> (QueryBody<Self::Variables>, OperationMeta);

    fn selection(variables: &Self::Variables) -> Vec<FieldSelector> {
        <Self::ResponseData as QueryInfo<Self::Variables>>::selection(variables)
    }
}

/// The generic shape taken by the responses of GraphQL APIs.
///
/// [Spec](https://spec.graphql.org/October2021/#sec-Response-Format)
///
/// ```
/// # use serde_json::json;
/// # use serde::Deserialize;
/// #
/// # #[derive(Debug, Deserialize, PartialEq, Clone)]
/// # struct User {
/// #     id: String,
/// # }
/// #
/// # #[derive(Debug, Deserialize, PartialEq, Clone)]
/// # struct ResponseData {
/// #     #[serde(rename = "getUsers")]
/// #     get_users: Vec<User>,
/// # }
/// #
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use roster::Response;
///
/// let body: Response<ResponseData> = serde_json::from_value(json!({
///     "data": {
///         "getUsers": [{"id": "1"}],
///     },
///     "errors": [],
/// }))?;
///
/// let expected: Response<ResponseData> = Response {
///     data: Some(ResponseData {
///         get_users: vec![User { id: "1".to_owned() }],
///     }),
///     errors: Some(vec![]),
///     debug_info: None
/// };
///
/// assert_eq!(body, expected);
///
/// #     Ok(())
/// # }
/// ```
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Response<Data: Clone> {
    /// Where the result came from. Never part of the wire format.
    #[serde(skip)]
    pub debug_info: Option<DebugInfo>,
    /// The absent, partial or complete response data.
    pub data: Option<Data>,
    /// The top-level errors returned by the server.
    pub errors: Option<Vec<Error>>
}

impl<Data: Clone> Response<Data> {
    /// The first error message, if the server returned any errors.
    pub fn error_message(&self) -> Option<&str> {
        self.errors
            .as_ref()
            .and_then(|errors| errors.first())
            .map(|error| error.message.as_str())
    }
}

/// An element in the top-level `errors` array of a response body.
///
/// ```
/// # use serde_json::json;
/// # use serde::Deserialize;
/// #
/// # #[derive(Debug, Deserialize, PartialEq, Clone)]
/// # struct ResponseData {
/// #     something: i32
/// # }
/// #
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use roster::*;
///
/// let body: Response<ResponseData> = serde_json::from_value(json!({
///     "data": null,
///     "errors": [
///         {
///             "message": "Variable \"$age\" of required type \"Int!\" was not provided.",
///             "locations": [{ "line": 1, "column": 40 }]
///         },
///         {
///             "message": "Something went wrong",
///             "path": ["getUsers", 2]
///         },
///      ],
/// }))?;
///
/// let errors = body.errors.unwrap();
/// assert_eq!(errors[0].locations, Some(vec![Location { line: 1, column: 40 }]));
/// assert_eq!(
///     errors[1].path,
///     Some(vec![PathFragment::Key("getUsers".into()), PathFragment::Index(2)])
/// );
/// assert_eq!(errors[1].to_string(), "getUsers/2:0:0: Something went wrong");
///
/// #     Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Error {
    /// The human-readable error message. This is the only required field.
    pub message: String,
    /// Which locations in the query the error applies to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locations: Option<Vec<Location>>,
    /// Which path in the query the error applies to, e.g. `["users", 0, "email"]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<PathFragment>>,
    /// Additional errors. Their exact format is defined by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<HashMap<String, serde_json::Value>>
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Use `/` as a separator like JSON Pointer.
        let path = self
            .path
            .as_ref()
            .map(|fragments| {
                fragments
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("/")
            })
            .unwrap_or_else(|| "<query>".to_string());

        // Get the location of the error. We'll use just the first location for this.
        let loc = self
            .locations
            .as_ref()
            .and_then(|locations| locations.iter().next())
            .cloned()
            .unwrap_or_default();

        write!(f, "{}:{}:{}: {}", path, loc.line, loc.column, self.message)
    }
}

/// Part of a path in a query. It can be an object key or an array index. See [Error](./struct.Error.html).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PathFragment {
    /// A key inside an object
    Key(String),
    /// An index inside an array
    Index(i32)
}

/// Represents a location inside a query string. Used in errors. See [Error](./struct.Error.html).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Location {
    /// The line number in the query string where the error originated (starting from 1).
    pub line: i32,
    /// The column number in the query string where the error originated (starting from 1).
    pub column: i32
}

impl Display for PathFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            PathFragment::Key(ref key) => write!(f, "{}", key),
            PathFragment::Index(ref idx) => write!(f, "{}", idx)
        }
    }
}

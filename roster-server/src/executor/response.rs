//! Wire types of the GraphQL-over-HTTP exchange.

use graphql_parser::Pos;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A request body: `{ query, variables?, operationName? }`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GraphQLRequest {
    pub query: String,
    #[serde(default)]
    pub variables: Option<Map<String, Value>>,
    #[serde(default, rename = "operationName")]
    pub operation_name: Option<String>
}

impl GraphQLRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn with_variables(mut self, variables: Value) -> Self {
        if let Value::Object(variables) = variables {
            self.variables = Some(variables);
        }
        self
    }

    pub fn with_operation_name(mut self, operation_name: impl Into<String>) -> Self {
        self.operation_name = Some(operation_name.into());
        self
    }
}

/// A response body. `data` is absent when the request never reached execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphQLResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GraphQLError>
}

impl GraphQLResponse {
    pub fn from_errors(errors: Vec<GraphQLError>) -> Self {
        Self { data: None, errors }
    }
}

/// Machine-readable error classes, reported under `extensions.code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    GraphqlParseFailed,
    GraphqlValidationFailed,
    BadUserInput,
    BadRequest,
    OperationResolutionFailure,
    InternalServerError
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorExtensions {
    pub code: ErrorCode
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub line: usize,
    pub column: usize
}

impl From<Pos> for Location {
    fn from(pos: Pos) -> Self {
        Self {
            line: pos.line,
            column: pos.column
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize)
}

/// One entry of the `errors` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQLError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<Location>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<PathSegment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<ErrorExtensions>
}

impl GraphQLError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            locations: Vec::new(),
            path: Vec::new(),
            extensions: None
        }
    }

    pub fn at(mut self, pos: Pos) -> Self {
        self.locations.push(pos.into());
        self
    }

    pub fn with_path(mut self, path: &[PathSegment]) -> Self {
        self.path = path.to_vec();
        self
    }

    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.extensions = Some(ErrorExtensions { code });
        self
    }

    pub fn code(&self) -> Option<ErrorCode> {
        self.extensions.as_ref().map(|ext| ext.code)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn empty_fields_are_left_out() {
        let response = GraphQLResponse {
            data: Some(json!({ "getUsers": [] })),
            errors: Vec::new()
        };
        assert_eq!(
            serde_json::to_value(&response).expect("serialize"),
            json!({ "data": { "getUsers": [] } })
        );
    }

    #[test]
    fn errors_carry_location_path_and_code() {
        let error = GraphQLError::new("boom")
            .at(Pos { line: 1, column: 3 })
            .with_path(&[PathSegment::Key("getUsers".into()), PathSegment::Index(0)])
            .with_code(ErrorCode::BadUserInput);
        let response = GraphQLResponse::from_errors(vec![error]);

        assert_eq!(
            serde_json::to_value(&response).expect("serialize"),
            json!({
                "errors": [{
                    "message": "boom",
                    "locations": [{ "line": 1, "column": 3 }],
                    "path": ["getUsers", 0],
                    "extensions": { "code": "BAD_USER_INPUT" }
                }]
            })
        );
    }

    #[test]
    fn requests_accept_null_variables() {
        let request: GraphQLRequest = serde_json::from_value(json!({
            "query": "{ getUsers { id } }",
            "variables": null
        }))
        .expect("deserialize");
        assert!(request.variables.is_none());
        assert!(request.operation_name.is_none());
    }
}

//! Field resolvers for the root types, backed by a [`UserRepository`].

use std::sync::Arc;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::executor::{ObjectValue, ResolvedValue};
use crate::repository::{NewUser, RepositoryError, User, UserRepository};

#[derive(Debug, Error)]
pub enum ResolverError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("argument \"{0}\" is missing or has the wrong type")]
    InvalidArgument(&'static str),

    #[error("no resolver for field \"{type_name}.{field}\"")]
    UnknownField { type_name: String, field: String }
}

impl ObjectValue for User {
    fn typename(&self) -> &'static str {
        "User"
    }

    fn field(&self, name: &str, _arguments: &Map<String, Value>) -> ResolvedValue {
        match name {
            "id" => ResolvedValue::leaf(self.id.clone()),
            "name" => ResolvedValue::leaf(self.name.clone()),
            "age" => ResolvedValue::leaf(self.age),
            "isMarried" => ResolvedValue::leaf(self.is_married),
            _ => ResolvedValue::Null
        }
    }
}

#[derive(Clone)]
pub struct Resolvers {
    repository: Arc<dyn UserRepository>
}

impl Resolvers {
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self { repository }
    }

    /// Resolve a root field. Arguments have already been coerced to their declared types.
    pub async fn resolve(
        &self,
        type_name: &str,
        field: &str,
        arguments: &Map<String, Value>
    ) -> Result<ResolvedValue, ResolverError> {
        match (type_name, field) {
            ("Query", "getUsers") => {
                let users = self.repository.list().await?;
                Ok(ResolvedValue::List(
                    users.into_iter().map(ResolvedValue::object).collect()
                ))
            }
            ("Query", "getUserById") => {
                let id = string_argument(arguments, "id")?;
                Ok(self.repository.get_by_id(id).await?.into())
            }
            ("Mutation", "createUser") => {
                let user = NewUser {
                    name: string_argument(arguments, "name")?.to_owned(),
                    age: int_argument(arguments, "age")?,
                    is_married: arguments
                        .get("isMarried")
                        .and_then(Value::as_bool)
                        .ok_or(ResolverError::InvalidArgument("isMarried"))?
                };
                let created = self.repository.append(user).await?;
                tracing::info!(id = %created.id, name = %created.name, "created user");
                Ok(ResolvedValue::object(created))
            }
            _ => Err(ResolverError::UnknownField {
                type_name: type_name.to_owned(),
                field: field.to_owned()
            })
        }
    }
}

fn string_argument<'a>(
    arguments: &'a Map<String, Value>,
    name: &'static str
) -> Result<&'a str, ResolverError> {
    arguments
        .get(name)
        .and_then(Value::as_str)
        .ok_or(ResolverError::InvalidArgument(name))
}

fn int_argument(arguments: &Map<String, Value>, name: &'static str) -> Result<i32, ResolverError> {
    arguments
        .get(name)
        .and_then(Value::as_i64)
        .and_then(|int| i32::try_from(int).ok())
        .ok_or(ResolverError::InvalidArgument(name))
}

//! Parses, validates and executes GraphQL requests against the roster schema.
//!
//! A request goes through four stages. Any failure before the last one rejects the whole
//! request without touching the store:
//!
//! 1. parse the document,
//! 2. select the operation to run,
//! 3. validate it against the [`Schema`] and coerce the variables,
//! 4. resolve the root fields (mutations strictly in order) and complete the values against
//!    the selection set.

mod response;
mod validation;
mod value;
mod variables;

use std::collections::{HashMap, HashSet};

use graphql_parser::query::{
    self, Definition, Directive, Document, Field, FragmentDefinition, OperationDefinition,
    Selection, SelectionSet, TypeCondition, VariableDefinition
};
use graphql_parser::{parse_query, Pos};
use serde_json::{Map, Value};

pub use response::{
    ErrorCode, ErrorExtensions, GraphQLError, GraphQLRequest, GraphQLResponse, Location,
    PathSegment
};
pub use value::{ObjectValue, ResolvedValue};

use crate::resolvers::Resolvers;
use crate::schema::{FieldDef, Schema, TypeRef};
use variables::{coerce_input, coerce_variable_values, literal_to_json};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Query,
    Mutation,
    Subscription
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Query => "query",
            OperationKind::Mutation => "mutation",
            OperationKind::Subscription => "subscription"
        }
    }
}

/// The operation picked out of a document, with the fragments it may spread.
pub(crate) struct Operation<'a> {
    pub(crate) kind: OperationKind,
    pub(crate) name: Option<&'a str>,
    pub(crate) variable_definitions: &'a [VariableDefinition],
    pub(crate) selection_set: &'a SelectionSet,
    pub(crate) fragments: HashMap<&'a str, &'a FragmentDefinition>,
    pub(crate) position: Pos
}

impl<'a> Operation<'a> {
    pub(crate) fn select(
        document: &'a Document,
        operation_name: Option<&str>
    ) -> Result<Self, GraphQLError> {
        let mut fragments = HashMap::new();
        let mut operations = Vec::new();
        for definition in &document.definitions {
            match definition {
                Definition::Fragment(fragment) => {
                    fragments.insert(fragment.name.as_str(), fragment);
                }
                Definition::Operation(operation) => operations.push(operation)
            }
        }

        let failure =
            |message: String| GraphQLError::new(message).with_code(ErrorCode::OperationResolutionFailure);
        let selected = match operation_name {
            Some(name) => operations
                .into_iter()
                .find(|operation| name_of(operation) == Some(name))
                .ok_or_else(|| failure(format!("Unknown operation named \"{name}\".")))?,
            None => match operations.as_slice() {
                [only] => *only,
                [] => return Err(failure("Must provide an operation.".to_owned())),
                _ => {
                    return Err(failure(
                        "Must provide operation name if query contains multiple operations."
                            .to_owned()
                    ))
                }
            }
        };

        let (kind, name, variable_definitions, selection_set, position) = match selected {
            OperationDefinition::SelectionSet(set) => {
                (OperationKind::Query, None, &[][..], set, set.span.0)
            }
            OperationDefinition::Query(query) => (
                OperationKind::Query,
                query.name.as_deref(),
                &query.variable_definitions[..],
                &query.selection_set,
                query.position
            ),
            OperationDefinition::Mutation(mutation) => (
                OperationKind::Mutation,
                mutation.name.as_deref(),
                &mutation.variable_definitions[..],
                &mutation.selection_set,
                mutation.position
            ),
            OperationDefinition::Subscription(subscription) => (
                OperationKind::Subscription,
                subscription.name.as_deref(),
                &subscription.variable_definitions[..],
                &subscription.selection_set,
                subscription.position
            )
        };

        Ok(Operation {
            kind,
            name,
            variable_definitions,
            selection_set,
            fragments,
            position
        })
    }
}

fn name_of(operation: &OperationDefinition) -> Option<&str> {
    match operation {
        OperationDefinition::SelectionSet(_) => None,
        OperationDefinition::Query(query) => query.name.as_deref(),
        OperationDefinition::Mutation(mutation) => mutation.name.as_deref(),
        OperationDefinition::Subscription(subscription) => subscription.name.as_deref()
    }
}

/// How far a request got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStatus {
    /// The operation ran. Field errors may still be present.
    Executed,
    /// The request was rejected before execution.
    RequestError,
    /// A mutation arrived over a transport that only allows reads.
    MethodNotAllowed
}

#[derive(Debug)]
pub struct Execution {
    pub response: GraphQLResponse,
    pub status: ExecutionStatus
}

impl Execution {
    fn rejected(errors: Vec<GraphQLError>) -> Self {
        Self {
            response: GraphQLResponse::from_errors(errors),
            status: ExecutionStatus::RequestError
        }
    }
}

pub struct Executor {
    schema: Schema,
    resolvers: Resolvers
}

impl Executor {
    pub fn new(schema: Schema, resolvers: Resolvers) -> Self {
        Self { schema, resolvers }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Execute a request of any operation type.
    pub async fn execute(&self, request: GraphQLRequest) -> Execution {
        self.run(request, true).await
    }

    /// Execute a request that must not have side effects. Mutations are refused.
    pub async fn execute_read_only(&self, request: GraphQLRequest) -> Execution {
        self.run(request, false).await
    }

    async fn run(&self, request: GraphQLRequest, mutations_allowed: bool) -> Execution {
        let document = match parse_query(&request.query) {
            Ok(document) => document,
            Err(error) => {
                tracing::debug!(%error, "rejecting unparsable document");
                return Execution::rejected(vec![GraphQLError::new(format!(
                    "Syntax Error: {error}"
                ))
                .with_code(ErrorCode::GraphqlParseFailed)]);
            }
        };

        let operation = match Operation::select(&document, request.operation_name.as_deref()) {
            Ok(operation) => operation,
            Err(error) => return Execution::rejected(vec![error])
        };

        if operation.kind == OperationKind::Mutation && !mutations_allowed {
            return Execution {
                response: GraphQLResponse::from_errors(vec![GraphQLError::new(
                    "Can only perform a mutation operation from a POST request."
                )
                .with_code(ErrorCode::BadRequest)]),
                status: ExecutionStatus::MethodNotAllowed
            };
        }

        let errors = validation::validate(&self.schema, &operation);
        if !errors.is_empty() {
            tracing::debug!(count = errors.len(), "operation failed validation");
            return Execution::rejected(errors);
        }

        let provided = request.variables.unwrap_or_default();
        let variables =
            match coerce_variable_values(&self.schema, operation.variable_definitions, &provided) {
                Ok(variables) => variables,
                Err(errors) => return Execution::rejected(errors)
            };

        tracing::debug!(
            operation = operation.name.unwrap_or("<anonymous>"),
            kind = operation.kind.as_str(),
            "executing operation"
        );

        let mut context = ExecutionContext {
            schema: &self.schema,
            operation: &operation,
            variables: &variables,
            errors: Vec::new()
        };
        let data = self.execute_root(&mut context).await;

        Execution {
            response: GraphQLResponse {
                data: Some(data),
                errors: context.errors
            },
            status: ExecutionStatus::Executed
        }
    }

    /// Resolve the root fields one after another, in document order.
    async fn execute_root(&self, context: &mut ExecutionContext<'_>) -> Value {
        let schema = &self.schema;
        let root_name = match context.operation.kind {
            OperationKind::Query => Some(schema.query_type()),
            OperationKind::Mutation => schema.mutation_type(),
            OperationKind::Subscription => None
        };
        let root = match root_name.and_then(|name| schema.object(name)) {
            Some(root) => root,
            None => return Value::Null
        };

        let mut fields = Vec::new();
        context.collect_fields(
            &root.name,
            context.operation.selection_set,
            &mut fields,
            &mut HashSet::new()
        );

        let mut data = Map::new();
        for (key, group) in fields {
            let field = group[0];
            if field.name == "__typename" {
                data.insert(key, Value::String(root.name.clone()));
                continue;
            }
            let definition = match root.field(&field.name) {
                Some(definition) => definition,
                None => continue
            };

            let mut path = vec![PathSegment::Key(key.clone())];
            let resolved = match context.arguments(definition, field, &path) {
                Some(arguments) => self
                    .resolvers
                    .resolve(&root.name, &field.name, &arguments)
                    .await
                    .map_err(|error| {
                        tracing::warn!(field = %field.name, %error, "resolver failed");
                        context.errors.push(
                            GraphQLError::new(error.to_string())
                                .at(field.position)
                                .with_path(&path)
                                .with_code(ErrorCode::InternalServerError)
                        );
                    }),
                None => Err(())
            };

            let value = match resolved {
                Ok(resolved) => {
                    context.complete_value(&definition.ty, resolved, &root.name, &group, &mut path)
                }
                Err(()) if definition.ty.is_non_null() => None,
                Err(()) => Some(Value::Null)
            };
            match value {
                Some(value) => {
                    data.insert(key, value);
                }
                None => return Value::Null
            }
        }
        Value::Object(data)
    }
}

struct ExecutionContext<'a> {
    schema: &'a Schema,
    operation: &'a Operation<'a>,
    variables: &'a Map<String, Value>,
    errors: Vec<GraphQLError>
}

impl<'a> ExecutionContext<'a> {
    /// Group the selected fields by response key, following fragments that apply to `type_name`.
    fn collect_fields(
        &self,
        type_name: &str,
        set: &'a SelectionSet,
        out: &mut Vec<(String, Vec<&'a Field>)>,
        visited: &mut HashSet<&'a str>
    ) {
        for item in &set.items {
            match item {
                Selection::Field(field) => {
                    if !self.should_include(&field.directives) {
                        continue;
                    }
                    let key = field.alias.as_ref().unwrap_or(&field.name);
                    match out.iter_mut().find(|(existing, _)| existing == key) {
                        Some((_, group)) => group.push(field),
                        None => out.push((key.clone(), vec![field]))
                    }
                }
                Selection::FragmentSpread(spread) => {
                    let name = spread.fragment_name.as_str();
                    if !self.should_include(&spread.directives) || !visited.insert(name) {
                        continue;
                    }
                    if let Some(fragment) = self.operation.fragments.get(name).copied() {
                        let TypeCondition::On(condition) = &fragment.type_condition;
                        if condition == type_name {
                            self.collect_fields(type_name, &fragment.selection_set, out, visited);
                        }
                    }
                }
                Selection::InlineFragment(inline) => {
                    if !self.should_include(&inline.directives) {
                        continue;
                    }
                    let applies = match &inline.type_condition {
                        Some(TypeCondition::On(condition)) => condition == type_name,
                        None => true
                    };
                    if applies {
                        self.collect_fields(type_name, &inline.selection_set, out, visited);
                    }
                }
            }
        }
    }

    /// `@skip(if:)` and `@include(if:)`.
    fn should_include(&self, directives: &[Directive]) -> bool {
        directives.iter().all(|directive| {
            let condition = directive
                .arguments
                .iter()
                .find(|(name, _)| name == "if")
                .map(|(_, value)| literal_to_json(value, self.variables));
            !matches!(
                (directive.name.as_str(), condition),
                ("skip", Some(Value::Bool(true))) | ("include", Some(Value::Bool(false)))
            )
        })
    }

    fn field_error(&mut self, message: impl Into<String>, field: &Field, path: &[PathSegment]) {
        self.errors
            .push(GraphQLError::new(message).at(field.position).with_path(path));
    }

    /// Argument values with variables substituted. Variables that were not provided leave
    /// their argument out.
    fn arguments(
        &mut self,
        definition: &FieldDef,
        field: &Field,
        path: &[PathSegment]
    ) -> Option<Map<String, Value>> {
        let mut arguments = Map::new();
        for (name, value) in &field.arguments {
            if let query::Value::Variable(variable) = value {
                if !self.variables.contains_key(variable) {
                    continue;
                }
            }
            let argument = match definition.argument(name) {
                Some(argument) => argument,
                None => continue
            };
            let json = literal_to_json(value, self.variables);
            match coerce_input(self.schema, &argument.ty, &json) {
                Ok(coerced) => {
                    arguments.insert(name.clone(), coerced);
                }
                Err(reason) => {
                    self.field_error(
                        format!("Argument \"{name}\" has invalid value {json}; {reason}"),
                        field,
                        path
                    );
                    return None;
                }
            }
        }
        Some(arguments)
    }

    /// Shape a resolved value by its declared type. `None` means a null reached a non-null
    /// position and must propagate to the nearest nullable parent.
    fn complete_value(
        &mut self,
        ty: &TypeRef,
        resolved: ResolvedValue,
        parent: &str,
        fields: &[&'a Field],
        path: &mut Vec<PathSegment>
    ) -> Option<Value> {
        let field = fields[0];
        match ty {
            TypeRef::NonNull(inner) => {
                let was_null = resolved.is_null();
                let value = self.complete_value(inner, resolved, parent, fields, path)?;
                if value.is_null() {
                    if was_null {
                        self.field_error(
                            format!(
                                "Cannot return null for non-nullable field {parent}.{}.",
                                field.name
                            ),
                            field,
                            path
                        );
                    }
                    return None;
                }
                Some(value)
            }
            _ if resolved.is_null() => Some(Value::Null),
            TypeRef::List(inner) => {
                let items = match resolved {
                    ResolvedValue::List(items) => items,
                    _ => {
                        self.field_error(
                            format!(
                                "Expected Iterable, but did not find one for field \"{parent}.{}\".",
                                field.name
                            ),
                            field,
                            path
                        );
                        return Some(Value::Null);
                    }
                };
                let mut completed = Vec::with_capacity(items.len());
                for (index, item) in items.into_iter().enumerate() {
                    path.push(PathSegment::Index(index));
                    let value = self.complete_value(inner, item, parent, fields, path);
                    path.pop();
                    match value {
                        Some(value) => completed.push(value),
                        None => return Some(Value::Null)
                    }
                }
                Some(Value::Array(completed))
            }
            TypeRef::Named(name) => match resolved {
                ResolvedValue::Leaf(value) if self.schema.is_scalar(name) => Some(value),
                ResolvedValue::Object(object) if self.schema.object(name).is_some() => {
                    Some(self.complete_object(object.as_ref(), fields, path).unwrap_or(Value::Null))
                }
                _ => {
                    self.field_error(
                        format!(
                            "Expected a value of type \"{name}\" for field \"{parent}.{}\".",
                            field.name
                        ),
                        field,
                        path
                    );
                    Some(Value::Null)
                }
            }
        }
    }

    fn complete_object(
        &mut self,
        object: &dyn ObjectValue,
        fields: &[&'a Field],
        path: &mut Vec<PathSegment>
    ) -> Option<Value> {
        let schema = self.schema;
        let typename = object.typename();
        let definition = schema.object(typename)?;

        let mut grouped = Vec::new();
        let mut visited = HashSet::new();
        for field in fields {
            self.collect_fields(typename, &field.selection_set, &mut grouped, &mut visited);
        }

        let mut map = Map::new();
        for (key, group) in grouped {
            let field = group[0];
            if field.name == "__typename" {
                map.insert(key, Value::String(typename.to_owned()));
                continue;
            }
            let field_definition = match definition.field(&field.name) {
                Some(field_definition) => field_definition,
                None => continue
            };

            path.push(PathSegment::Key(key.clone()));
            let completed = match self.arguments(field_definition, field, path) {
                Some(arguments) => {
                    let resolved = object.field(&field.name, &arguments);
                    self.complete_value(&field_definition.ty, resolved, typename, &group, path)
                }
                None if field_definition.ty.is_non_null() => None,
                None => Some(Value::Null)
            };
            path.pop();
            map.insert(key, completed?);
        }
        Some(Value::Object(map))
    }
}

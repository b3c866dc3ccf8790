//! Static checks of the selected operation against the schema.

use std::collections::{HashMap, HashSet};

use graphql_parser::query::{Field, Selection, SelectionSet, TypeCondition, VariableDefinition};
use graphql_parser::Pos;
use serde_json::Map;

use super::response::{ErrorCode, GraphQLError};
use super::variables::{coerce_literal, literal_to_json, referenced_variables};
use super::{Operation, OperationKind};
use crate::schema::{ArgumentDef, ObjectDef, Schema, TypeRef};

pub(crate) fn validate(schema: &Schema, operation: &Operation<'_>) -> Vec<GraphQLError> {
    let mut validator = Validator {
        schema,
        operation,
        variables: HashMap::new(),
        spreading: HashSet::new(),
        errors: Vec::new()
    };
    validator.variable_definitions(operation.variable_definitions);

    let root = match operation.kind {
        OperationKind::Query => Some(schema.query_type()),
        OperationKind::Mutation => schema.mutation_type(),
        OperationKind::Subscription => None
    };
    match root.and_then(|name| schema.object(name)) {
        Some(root) => validator.selection_set(root, operation.selection_set),
        None => validator.error(
            format!(
                "Schema is not configured to execute {} operation.",
                operation.kind.as_str()
            ),
            operation.position
        )
    }
    validator.errors
}

struct Validator<'s, 'q> {
    schema: &'s Schema,
    operation: &'s Operation<'q>,
    variables: HashMap<&'q str, (TypeRef, bool)>,
    spreading: HashSet<&'q str>,
    errors: Vec<GraphQLError>
}

impl<'s, 'q> Validator<'s, 'q> {
    fn error(&mut self, message: String, pos: Pos) {
        self.errors.push(
            GraphQLError::new(message)
                .at(pos)
                .with_code(ErrorCode::GraphqlValidationFailed)
        );
    }

    fn variable_definitions(&mut self, definitions: &'q [VariableDefinition]) {
        for definition in definitions {
            let ty = TypeRef::from(&definition.var_type);
            let named = ty.named();
            if !self.schema.is_scalar(named) {
                let message = if self.schema.object(named).is_some() {
                    format!(
                        "Variable \"${}\" cannot be non-input type \"{ty}\".",
                        definition.name
                    )
                } else {
                    format!("Unknown type \"{named}\".")
                };
                self.error(message, definition.position);
            }

            if let Some(default) = &definition.default_value {
                if let Err(reason) = coerce_literal(self.schema, &ty, default) {
                    self.error(
                        format!(
                            "Variable \"${}\" has invalid default value: {reason}",
                            definition.name
                        ),
                        definition.position
                    );
                }
            }

            let has_default = definition.default_value.is_some();
            if self
                .variables
                .insert(&definition.name, (ty, has_default))
                .is_some()
            {
                self.error(
                    format!(
                        "There can be only one variable named \"${}\".",
                        definition.name
                    ),
                    definition.position
                );
            }
        }
    }

    fn selection_set(&mut self, parent: &'s ObjectDef, set: &'q SelectionSet) {
        for item in &set.items {
            match item {
                Selection::Field(field) => self.field(parent, field),
                Selection::FragmentSpread(spread) => {
                    let name = spread.fragment_name.as_str();
                    let operation = self.operation;
                    let fragment = match operation.fragments.get(name) {
                        Some(fragment) => *fragment,
                        None => {
                            self.error(format!("Unknown fragment \"{name}\"."), spread.position);
                            continue;
                        }
                    };
                    let TypeCondition::On(condition) = &fragment.type_condition;
                    if !self.type_condition_applies(parent, condition, Some(name), spread.position) {
                        continue;
                    }
                    if !self.spreading.insert(name) {
                        self.error(
                            format!("Cannot spread fragment \"{name}\" within itself."),
                            spread.position
                        );
                        continue;
                    }
                    self.selection_set(parent, &fragment.selection_set);
                    self.spreading.remove(name);
                }
                Selection::InlineFragment(inline) => {
                    if let Some(TypeCondition::On(condition)) = &inline.type_condition {
                        if !self.type_condition_applies(parent, condition, None, inline.position) {
                            continue;
                        }
                    }
                    self.selection_set(parent, &inline.selection_set);
                }
            }
        }
    }

    fn type_condition_applies(
        &mut self,
        parent: &ObjectDef,
        condition: &str,
        fragment: Option<&str>,
        pos: Pos
    ) -> bool {
        if condition == parent.name {
            return true;
        }
        let message = match (self.schema.object(condition), fragment) {
            (None, _) => format!("Unknown type \"{condition}\"."),
            (Some(_), Some(fragment)) => format!(
                "Fragment \"{fragment}\" cannot be spread here as objects of type \"{}\" can never be of type \"{condition}\".",
                parent.name
            ),
            (Some(_), None) => format!(
                "Fragment cannot be spread here as objects of type \"{}\" can never be of type \"{condition}\".",
                parent.name
            )
        };
        self.error(message, pos);
        false
    }

    fn field(&mut self, parent: &'s ObjectDef, field: &'q Field) {
        if field.name == "__typename" {
            if !field.selection_set.items.is_empty() {
                self.error(
                    "Field \"__typename\" must not have a selection since type \"String!\" has no subfields."
                        .to_owned(),
                    field.position
                );
            }
            return;
        }

        let definition = match parent.field(&field.name) {
            Some(definition) => definition,
            None => {
                self.error(
                    format!(
                        "Cannot query field \"{}\" on type \"{}\".",
                        field.name, parent.name
                    ),
                    field.position
                );
                return;
            }
        };

        let mut seen = HashSet::new();
        for (name, value) in &field.arguments {
            if !seen.insert(name.as_str()) {
                self.error(
                    format!("There can be only one argument named \"{name}\"."),
                    field.position
                );
            }
            match definition.argument(name) {
                Some(argument) => self.argument(argument, value, field.position),
                None => self.error(
                    format!(
                        "Unknown argument \"{name}\" on field \"{}.{}\".",
                        parent.name, field.name
                    ),
                    field.position
                )
            }
        }

        for argument in &definition.arguments {
            let provided = field.arguments.iter().any(|(name, _)| *name == argument.name);
            if !provided && argument.ty.is_non_null() && !argument.has_default {
                self.error(
                    format!(
                        "Field \"{}\" argument \"{}\" of type \"{}\" is required, but it was not provided.",
                        field.name, argument.name, argument.ty
                    ),
                    field.position
                );
            }
        }

        let schema = self.schema;
        let return_type = &definition.ty;
        match schema.object(return_type.named()) {
            Some(_) if field.selection_set.items.is_empty() => self.error(
                format!(
                    "Field \"{}\" of type \"{return_type}\" must have a selection of subfields. Did you mean \"{} {{ ... }}\"?",
                    field.name, field.name
                ),
                field.position
            ),
            Some(object) => self.selection_set(object, &field.selection_set),
            None if !field.selection_set.items.is_empty() => self.error(
                format!(
                    "Field \"{}\" must not have a selection since type \"{return_type}\" has no subfields.",
                    field.name
                ),
                field.position
            ),
            None => {}
        }
    }

    fn argument(&mut self, argument: &ArgumentDef, value: &graphql_parser::query::Value, pos: Pos) {
        let mut used = Vec::new();
        referenced_variables(value, &mut used);

        if used.is_empty() {
            if let Err(reason) = coerce_literal(self.schema, &argument.ty, value) {
                self.error(
                    format!(
                        "Argument \"{}\" has invalid value {}; {reason}",
                        argument.name,
                        literal_to_json(value, &Map::new())
                    ),
                    pos
                );
            }
            return;
        }

        let direct = matches!(value, graphql_parser::query::Value::Variable(_));
        for name in used {
            let (variable_type, has_default) = match self.variables.get(name) {
                Some(entry) => entry.clone(),
                None => {
                    self.error(format!("Variable \"${name}\" is not defined."), pos);
                    continue;
                }
            };
            if direct && !variable_fits(&variable_type, has_default, &argument.ty) {
                self.error(
                    format!(
                        "Variable \"${name}\" of type \"{variable_type}\" used in position expecting type \"{}\".",
                        argument.ty
                    ),
                    pos
                );
            }
        }
    }
}

/// Whether a variable of `variable` type may flow into a `location` typed position.
fn variable_fits(variable: &TypeRef, has_default: bool, location: &TypeRef) -> bool {
    match (variable, location) {
        (TypeRef::Named(_) | TypeRef::List(_), TypeRef::NonNull(inner)) if has_default => {
            is_subtype(variable, inner)
        }
        _ => is_subtype(variable, location)
    }
}

fn is_subtype(variable: &TypeRef, location: &TypeRef) -> bool {
    match (variable, location) {
        (TypeRef::NonNull(variable), TypeRef::NonNull(location)) => is_subtype(variable, location),
        (TypeRef::NonNull(variable), location) => is_subtype(variable, location),
        (_, TypeRef::NonNull(_)) => false,
        (TypeRef::List(variable), TypeRef::List(location)) => is_subtype(variable, location),
        (TypeRef::List(_), _) | (_, TypeRef::List(_)) => false,
        (TypeRef::Named(variable), TypeRef::Named(location)) => variable == location
    }
}

#[cfg(test)]
mod tests {
    use graphql_parser::parse_query;
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn schema() -> Schema {
        Schema::roster().expect("schema parses")
    }

    fn messages(schema: &Schema, source: &str) -> Vec<String> {
        let document = parse_query(source).expect("query parses");
        let operation = Operation::select(&document, None).expect("operation selected");
        validate(schema, &operation)
            .into_iter()
            .map(|error| error.message)
            .collect()
    }

    #[rstest]
    #[case("{ getUsers { id name age isMarried } }")]
    #[case("query ById($id: ID!) { getUserById(id: $id) { ...Parts } } fragment Parts on User { id name }")]
    #[case("mutation { createUser(name: \"Ann\", age: 30, isMarried: false) { id __typename } }")]
    #[case("{ a: getUsers { ... on User { name } } b: getUserById(id: 1) { id } }")]
    fn valid_operations_pass(schema: Schema, #[case] source: &str) {
        assert_eq!(messages(&schema, source), Vec::<String>::new());
    }

    #[rstest]
    #[case("{ getUsers { email } }", "Cannot query field \"email\" on type \"User\".")]
    #[case("{ getUserById { id } }", "Field \"getUserById\" argument \"id\" of type \"ID!\" is required, but it was not provided.")]
    #[case("{ getUsers(limit: 1) { id } }", "Unknown argument \"limit\" on field \"Query.getUsers\".")]
    #[case("{ getUsers }", "Field \"getUsers\" of type \"[User]\" must have a selection of subfields. Did you mean \"getUsers { ... }\"?")]
    #[case("{ getUsers { name { first } } }", "Field \"name\" must not have a selection since type \"String\" has no subfields.")]
    #[case("{ getUserById(id: $id) { id } }", "Variable \"$id\" is not defined.")]
    #[case("{ getUsers { ...Missing } }", "Unknown fragment \"Missing\".")]
    #[case("{ getUsers { ...A } } fragment A on User { ...A }", "Cannot spread fragment \"A\" within itself.")]
    #[case("{ getUsers { ...Q } } fragment Q on Query { getUsers { id } }", "Fragment \"Q\" cannot be spread here as objects of type \"User\" can never be of type \"Query\".")]
    #[case("query ($id: ID) { getUserById(id: $id) { id } }", "Variable \"$id\" of type \"ID\" used in position expecting type \"ID!\".")]
    #[case("mutation { createUser(name: \"Ann\", age: \"old\", isMarried: false) { id } }", "Argument \"age\" has invalid value \"old\"; Int cannot represent non-integer value: \"old\"")]
    #[case("mutation { createUser(name: \"Ann\", age: 30.0, isMarried: false) { id } }", "Argument \"age\" has invalid value 30.0; Int cannot represent non-integer value: 30.0")]
    #[case("query ($id: ID = 1.5) { getUserById(id: $id) { id } }", "Variable \"$id\" has invalid default value: ID cannot represent value: 1.5")]
    #[case("subscription { getUsers { id } }", "Schema is not configured to execute subscription operation.")]
    fn invalid_operations_are_rejected(
        schema: Schema,
        #[case] source: &str,
        #[case] expected: &str
    ) {
        let messages = messages(&schema, source);
        assert!(
            messages.iter().any(|message| message == expected),
            "expected {expected:?} in {messages:?}"
        );
    }

    #[rstest]
    fn errors_point_at_the_offending_field(schema: Schema) {
        let document = parse_query("{\n  getUsers {\n    email\n  }\n}").expect("query parses");
        let operation = Operation::select(&document, None).expect("operation selected");
        let errors = validate(&schema, &operation);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].locations[0].line, 3);
        assert_eq!(errors[0].locations[0].column, 5);
        assert_eq!(errors[0].code(), Some(ErrorCode::GraphqlValidationFailed));
    }

    #[rstest]
    fn nullable_variables_with_defaults_fit_required_arguments() {
        let variable = TypeRef::Named("ID".into());
        let location = TypeRef::NonNull(Box::new(TypeRef::Named("ID".into())));
        assert!(variable_fits(&variable, true, &location));
        assert!(!variable_fits(&variable, false, &location));
    }
}

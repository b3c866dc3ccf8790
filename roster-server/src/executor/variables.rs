//! Input coercion for variables and argument literals.

use graphql_parser::query::{self, VariableDefinition};
use serde_json::{Map, Number, Value};

use super::response::{ErrorCode, GraphQLError};
use crate::schema::{Schema, TypeRef};

/// Coerce the provided variable values against the operation's definitions. Defaults fill in
/// missing values. Every failure is reported, not just the first one.
pub(crate) fn coerce_variable_values(
    schema: &Schema,
    definitions: &[VariableDefinition],
    provided: &Map<String, Value>
) -> Result<Map<String, Value>, Vec<GraphQLError>> {
    let mut coerced = Map::new();
    let mut errors = Vec::new();

    for definition in definitions {
        let ty = TypeRef::from(&definition.var_type);
        let name = &definition.name;
        let error = |message: String| {
            GraphQLError::new(message)
                .at(definition.position)
                .with_code(ErrorCode::BadUserInput)
        };

        let value = match (provided.get(name), &definition.default_value) {
            (Some(value), _) => value.clone(),
            (None, Some(default)) => literal_to_json(default, &Map::new()),
            (None, None) if ty.is_non_null() => {
                errors.push(error(format!(
                    "Variable \"${name}\" of required type \"{ty}\" was not provided."
                )));
                continue;
            }
            (None, None) => continue
        };

        if value.is_null() && ty.is_non_null() {
            errors.push(error(format!(
                "Variable \"${name}\" of non-null type \"{ty}\" must not be null."
            )));
            continue;
        }

        match coerce_input(schema, &ty, &value) {
            Ok(value) => {
                coerced.insert(name.clone(), value);
            }
            Err(reason) => errors.push(error(format!(
                "Variable \"${name}\" got invalid value {value}; {reason}"
            )))
        }
    }

    if errors.is_empty() {
        Ok(coerced)
    } else {
        Err(errors)
    }
}

/// Coerce a JSON input value to `ty`. The error is a human readable reason.
pub(crate) fn coerce_input(schema: &Schema, ty: &TypeRef, value: &Value) -> Result<Value, String> {
    match ty {
        TypeRef::NonNull(inner) => {
            if value.is_null() {
                Err(format!("Expected non-nullable type \"{ty}\" not to be null."))
            } else {
                coerce_input(schema, inner, value)
            }
        }
        _ if value.is_null() => Ok(Value::Null),
        TypeRef::List(inner) => match value {
            Value::Array(items) => items
                .iter()
                .map(|item| coerce_input(schema, inner, item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            // A single value is accepted where a list is expected.
            other => Ok(Value::Array(vec![coerce_input(schema, inner, other)?]))
        },
        TypeRef::Named(name) => coerce_scalar(schema, name, value)
    }
}

fn coerce_scalar(schema: &Schema, name: &str, value: &Value) -> Result<Value, String> {
    match name {
        "Int" => match value.as_i64().or_else(|| integral_float(value)) {
            Some(int) if i32::try_from(int).is_ok() => Ok(Value::from(int)),
            Some(_) => Err(format!(
                "Int cannot represent non 32-bit signed integer value: {value}"
            )),
            None => Err(format!("Int cannot represent non-integer value: {value}"))
        },
        "Float" => value
            .as_f64()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| format!("Float cannot represent non numeric value: {value}")),
        "String" => match value {
            Value::String(_) => Ok(value.clone()),
            _ => Err(format!("String cannot represent a non string value: {value}"))
        },
        "Boolean" => match value {
            Value::Bool(_) => Ok(value.clone()),
            _ => Err(format!("Boolean cannot represent a non boolean value: {value}"))
        },
        "ID" => match value {
            Value::String(_) => Ok(value.clone()),
            Value::Number(number) if number.is_i64() || number.is_u64() => {
                Ok(Value::String(number.to_string()))
            }
            _ => Err(format!("ID cannot represent value: {value}"))
        },
        custom if schema.is_scalar(custom) => Ok(value.clone()),
        unknown => Err(format!("Unknown type \"{unknown}\"."))
    }
}

/// Coerce an argument or default value literal to `ty`. Follows [`coerce_input`], except that a
/// float literal is never accepted as an Int, even when it has no fractional part.
pub(crate) fn coerce_literal(
    schema: &Schema,
    ty: &TypeRef,
    value: &query::Value
) -> Result<Value, String> {
    match (ty, value) {
        (TypeRef::NonNull(_), query::Value::Null) => {
            Err(format!("Expected non-nullable type \"{ty}\" not to be null."))
        }
        (TypeRef::NonNull(inner), _) => coerce_literal(schema, inner, value),
        (_, query::Value::Null) => Ok(Value::Null),
        (TypeRef::List(inner), query::Value::List(items)) => items
            .iter()
            .map(|item| coerce_literal(schema, inner, item))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        (TypeRef::List(inner), other) => Ok(Value::Array(vec![coerce_literal(schema, inner, other)?])),
        (TypeRef::Named(name), query::Value::Float(_)) if name == "Int" => Err(format!(
            "Int cannot represent non-integer value: {}",
            literal_to_json(value, &Map::new())
        )),
        (TypeRef::Named(name), _) => coerce_scalar(schema, name, &literal_to_json(value, &Map::new()))
    }
}

/// JSON has a single number type, so whole floats in variables count as Ints.
fn integral_float(value: &Value) -> Option<i64> {
    let float = value.as_f64()?;
    (float.fract() == 0.0 && float.abs() <= i64::MAX as f64).then(|| float as i64)
}

/// Turn an argument literal into JSON, substituting variables. Unknown variables become null.
pub(crate) fn literal_to_json(value: &query::Value, variables: &Map<String, Value>) -> Value {
    match value {
        query::Value::Variable(name) => variables.get(name).cloned().unwrap_or(Value::Null),
        query::Value::Int(number) => number.as_i64().map(Value::from).unwrap_or(Value::Null),
        query::Value::Float(float) => Number::from_f64(*float)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        query::Value::String(string) => Value::String(string.clone()),
        query::Value::Boolean(boolean) => Value::Bool(*boolean),
        query::Value::Null => Value::Null,
        query::Value::Enum(name) => Value::String(name.clone()),
        query::Value::List(items) => Value::Array(
            items
                .iter()
                .map(|item| literal_to_json(item, variables))
                .collect()
        ),
        query::Value::Object(fields) => Value::Object(
            fields
                .iter()
                .map(|(key, value)| (key.clone(), literal_to_json(value, variables)))
                .collect()
        )
    }
}

/// Names of the variables referenced anywhere inside a literal.
pub(crate) fn referenced_variables<'a>(value: &'a query::Value, out: &mut Vec<&'a str>) {
    match value {
        query::Value::Variable(name) => out.push(name),
        query::Value::List(items) => {
            for item in items {
                referenced_variables(item, out);
            }
        }
        query::Value::Object(fields) => {
            for value in fields.values() {
                referenced_variables(value, out);
            }
        }
        _ => {}
    }
}

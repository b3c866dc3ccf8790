//! The SDL served by the API and the type registry the executor validates against.

use std::collections::HashMap;
use std::fmt;

use graphql_parser::schema::{self, Definition, TypeDefinition};
use thiserror::Error;

/// The schema of the roster API.
pub const SCHEMA_SDL: &str = r#"type Query {
    getUsers: [User]
    getUserById(id: ID!): User
}

type Mutation {
    createUser(name: String!, age: Int!, isMarried: Boolean!): User
}

type User {
    id: ID
    name: String
    age: Int
    isMarried: Boolean
}
"#;

const BUILTIN_SCALARS: [&str; 5] = ["ID", "String", "Int", "Float", "Boolean"];

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to parse schema: {0}")]
    Parse(String),

    #[error("type \"{0}\" is defined more than once")]
    DuplicateType(String),

    #[error("field \"{type_name}.{field}\" refers to unknown type \"{referenced}\"")]
    UnknownType {
        type_name: String,
        field: String,
        referenced: String
    },

    #[error("root type \"{0}\" is not defined")]
    MissingRoot(String)
}

/// A type reference as written in SDL or in a variable definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    Named(String),
    List(Box<TypeRef>),
    NonNull(Box<TypeRef>)
}

impl TypeRef {
    /// The innermost named type.
    pub fn named(&self) -> &str {
        match self {
            TypeRef::Named(name) => name,
            TypeRef::List(inner) | TypeRef::NonNull(inner) => inner.named()
        }
    }

    pub fn is_non_null(&self) -> bool {
        matches!(self, TypeRef::NonNull(_))
    }
}

impl From<&schema::Type> for TypeRef {
    fn from(ty: &schema::Type) -> Self {
        match ty {
            schema::Type::NamedType(name) => TypeRef::Named(name.clone()),
            schema::Type::ListType(inner) => TypeRef::List(Box::new(inner.as_ref().into())),
            schema::Type::NonNullType(inner) => TypeRef::NonNull(Box::new(inner.as_ref().into()))
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named(name) => f.write_str(name),
            TypeRef::List(inner) => write!(f, "[{inner}]"),
            TypeRef::NonNull(inner) => write!(f, "{inner}!")
        }
    }
}

#[derive(Debug, Clone)]
pub struct ArgumentDef {
    pub name: String,
    pub ty: TypeRef,
    pub has_default: bool
}

#[derive(Debug, Clone)]
pub struct FieldDef {
    pub name: String,
    pub arguments: Vec<ArgumentDef>,
    pub ty: TypeRef
}

impl FieldDef {
    pub fn argument(&self, name: &str) -> Option<&ArgumentDef> {
        self.arguments.iter().find(|arg| arg.name == name)
    }
}

#[derive(Debug, Clone)]
pub struct ObjectDef {
    pub name: String,
    pub fields: Vec<FieldDef>
}

impl ObjectDef {
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|field| field.name == name)
    }
}

/// Object types by name plus the names of the root operation types.
#[derive(Debug, Clone)]
pub struct Schema {
    objects: HashMap<String, ObjectDef>,
    scalars: Vec<String>,
    query_type: String,
    mutation_type: Option<String>,
    sdl: String
}

impl Schema {
    /// Parse SDL into a registry. Every referenced type must be a defined object or a scalar.
    pub fn parse(sdl: &str) -> Result<Self, SchemaError> {
        let document =
            schema::parse_schema(sdl).map_err(|e| SchemaError::Parse(e.to_string()))?;

        let mut objects = HashMap::new();
        let mut scalars: Vec<String> = BUILTIN_SCALARS.iter().map(|s| s.to_string()).collect();
        let mut query_type = None;
        let mut mutation_type = None;

        for definition in &document.definitions {
            match definition {
                Definition::SchemaDefinition(roots) => {
                    query_type = roots.query.clone();
                    mutation_type = roots.mutation.clone();
                }
                Definition::TypeDefinition(TypeDefinition::Object(object)) => {
                    let def = ObjectDef {
                        name: object.name.clone(),
                        fields: object
                            .fields
                            .iter()
                            .map(|field| FieldDef {
                                name: field.name.clone(),
                                arguments: field
                                    .arguments
                                    .iter()
                                    .map(|arg| ArgumentDef {
                                        name: arg.name.clone(),
                                        ty: (&arg.value_type).into(),
                                        has_default: arg.default_value.is_some()
                                    })
                                    .collect(),
                                ty: (&field.field_type).into()
                            })
                            .collect()
                    };
                    if objects.insert(def.name.clone(), def).is_some() {
                        return Err(SchemaError::DuplicateType(object.name.clone()));
                    }
                }
                Definition::TypeDefinition(TypeDefinition::Scalar(scalar)) => {
                    scalars.push(scalar.name.clone());
                }
                _ => {}
            }
        }

        let query_type = query_type.unwrap_or_else(|| "Query".to_owned());
        if !objects.contains_key(&query_type) {
            return Err(SchemaError::MissingRoot(query_type));
        }
        let mutation_type = match mutation_type {
            Some(name) if !objects.contains_key(&name) => {
                return Err(SchemaError::MissingRoot(name));
            }
            Some(name) => Some(name),
            None => objects
                .contains_key("Mutation")
                .then(|| "Mutation".to_owned())
        };

        let schema = Self {
            objects,
            scalars,
            query_type,
            mutation_type,
            sdl: sdl.to_owned()
        };
        schema.check_references()?;
        Ok(schema)
    }

    /// The roster API schema.
    pub fn roster() -> Result<Self, SchemaError> {
        Self::parse(SCHEMA_SDL)
    }

    fn check_references(&self) -> Result<(), SchemaError> {
        for object in self.objects.values() {
            for field in &object.fields {
                let referenced = std::iter::once(&field.ty)
                    .chain(field.arguments.iter().map(|arg| &arg.ty))
                    .map(TypeRef::named)
                    .find(|name| !self.is_scalar(name) && !self.objects.contains_key(*name));
                if let Some(referenced) = referenced {
                    return Err(SchemaError::UnknownType {
                        type_name: object.name.clone(),
                        field: field.name.clone(),
                        referenced: referenced.to_owned()
                    });
                }
            }
        }
        Ok(())
    }

    pub fn object(&self, name: &str) -> Option<&ObjectDef> {
        self.objects.get(name)
    }

    pub fn is_scalar(&self, name: &str) -> bool {
        self.scalars.iter().any(|scalar| scalar == name)
    }

    pub fn query_type(&self) -> &str {
        &self.query_type
    }

    pub fn mutation_type(&self) -> Option<&str> {
        self.mutation_type.as_deref()
    }

    pub fn sdl(&self) -> &str {
        &self.sdl
    }
}

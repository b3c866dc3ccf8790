use serde_json::{Map, Value};

/// What a resolver hands back to the executor before the selection set is applied.
pub enum ResolvedValue {
    Null,
    Leaf(Value),
    List(Vec<ResolvedValue>),
    Object(Box<dyn ObjectValue>)
}

impl ResolvedValue {
    pub fn object<T: ObjectValue + 'static>(value: T) -> Self {
        ResolvedValue::Object(Box::new(value))
    }

    pub fn leaf(value: impl Into<Value>) -> Self {
        ResolvedValue::Leaf(value.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ResolvedValue::Null)
    }
}

impl<T: ObjectValue + 'static> From<Option<T>> for ResolvedValue {
    fn from(value: Option<T>) -> Self {
        value.map(ResolvedValue::object).unwrap_or(ResolvedValue::Null)
    }
}

/// An object whose fields the executor can read.
pub trait ObjectValue: Send + Sync {
    /// The schema type this object belongs to.
    fn typename(&self) -> &'static str;

    fn field(&self, name: &str, arguments: &Map<String, Value>) -> ResolvedValue;
}

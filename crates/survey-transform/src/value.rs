use serde::{Serialize, Serializer};
use serde_json::{Number, Value};

/// Report-ready form of a stored response.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayValue {
    Integer(i64),
    /// Always finite.
    Float(f64),
    Text(String),
    List(Vec<DisplayValue>),
    /// Structured value kept as parsed.
    Json(Value),
}

impl DisplayValue {
    /// Convert a parsed JSON value, keeping scalars typed.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::String(text) => DisplayValue::Text(text),
            Value::Number(number) => match number.as_i64() {
                Some(integer) => DisplayValue::Integer(integer),
                None => match number.as_f64() {
                    Some(float) if float.is_finite() => DisplayValue::Float(float),
                    _ => DisplayValue::Json(Value::Number(number)),
                },
            },
            Value::Array(items) => {
                DisplayValue::List(items.into_iter().map(DisplayValue::from_json).collect())
            }
            other => DisplayValue::Json(other),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            DisplayValue::Integer(integer) => Value::from(*integer),
            DisplayValue::Float(float) => Number::from_f64(*float)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            DisplayValue::Text(text) => Value::String(text.clone()),
            DisplayValue::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            DisplayValue::Json(value) => value.clone(),
        }
    }
}

impl Serialize for DisplayValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DisplayValue::Integer(integer) => serializer.serialize_i64(*integer),
            DisplayValue::Float(float) => serializer.serialize_f64(*float),
            DisplayValue::Text(text) => serializer.serialize_str(text),
            DisplayValue::List(items) => serializer.collect_seq(items),
            DisplayValue::Json(value) => value.serialize(serializer),
        }
    }
}

impl From<&str> for DisplayValue {
    fn from(value: &str) -> Self {
        DisplayValue::Text(value.to_string())
    }
}

impl From<i64> for DisplayValue {
    fn from(value: i64) -> Self {
        DisplayValue::Integer(value)
    }
}

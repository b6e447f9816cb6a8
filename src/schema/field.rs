use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::fmt;

/// Primitive type a schema field is declared with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[serde(alias = "string", alias = "str")]
    Text,
    #[serde(alias = "int")]
    Integer,
    #[serde(alias = "float")]
    Number,
    #[serde(alias = "bool")]
    Boolean,
}

impl FieldType {
    /// Returns the JSON-Schema type name
    pub fn json_type(&self) -> &'static str {
        match self {
            Self::Text => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
        }
    }

    /// Converts a candidate value to this type
    ///
    /// Returns `None` when the value cannot be converted. Values already of
    /// the right type come back unchanged, so conversion is idempotent.
    ///
    /// | Type | Accepts |
    /// |------|---------|
    /// | Text | strings |
    /// | Integer | integers, floats with no fraction, integer strings |
    /// | Number | any number, numeric strings |
    /// | Boolean | booleans, `true/false/yes/no/1/0` strings |
    pub fn coerce(&self, value: &Value) -> Option<Value> {
        match self {
            Self::Text => value.as_str().map(|s| Value::String(s.to_string())),
            Self::Integer => coerce_integer(value),
            Self::Number => coerce_number(value),
            Self::Boolean => coerce_boolean(value),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.json_type())
    }
}

fn coerce_integer(value: &Value) -> Option<Value> {
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(value.clone()),
        Value::Number(n) => {
            let f = n.as_f64()?;
            if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                Some(Value::from(f as i64))
            } else {
                None
            }
        }
        Value::String(s) => s.trim().parse::<i64>().ok().map(Value::from),
        _ => None,
    }
}

fn coerce_number(value: &Value) -> Option<Value> {
    match value {
        Value::Number(_) => Some(value.clone()),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(i) = s.parse::<i64>() {
                return Some(Value::from(i));
            }
            let f = s.parse::<f64>().ok()?;
            Number::from_f64(f).map(Value::Number)
        }
        _ => None,
    }
}

fn coerce_boolean(value: &Value) -> Option<Value> {
    match value {
        Value::Bool(_) => Some(value.clone()),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(Value::Bool(true)),
            "false" | "no" | "0" => Some(Value::Bool(false)),
            _ => None,
        },
        Value::Number(n) => match n.as_i64() {
            Some(1) => Some(Value::Bool(true)),
            Some(0) => Some(Value::Bool(false)),
            _ => None,
        },
        _ => None,
    }
}

/// Declaration of a single field in a [`Schema`](super::Schema)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Canonical name; records are always emitted under this key
    pub name: String,

    /// Declared primitive type
    #[serde(rename = "type")]
    pub field_type: FieldType,

    /// Human-readable hint passed to the extraction model
    #[serde(default)]
    pub description: String,

    /// Whether the field must be present and non-null
    #[serde(default = "default_required")]
    pub required: bool,

    /// Alternative keys accepted on input
    #[serde(default)]
    pub aliases: Vec<String>,
}

fn default_required() -> bool {
    true
}

impl FieldSpec {
    /// Creates a required field with no description and no aliases
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            description: String::new(),
            required: true,
            aliases: Vec::new(),
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Looks this field up in a candidate object, canonical name first
    ///
    /// Null values are treated as absent.
    pub fn lookup<'a>(&self, object: &'a serde_json::Map<String, Value>) -> Option<&'a Value> {
        std::iter::once(&self.name)
            .chain(self.aliases.iter())
            .filter_map(|key| object.get(key))
            .find(|value| !value.is_null())
    }
}

/// Short description of a JSON value's kind, used in violation messages
pub(crate) fn describe_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("boolean {}", b),
        Value::Number(n) => format!("number {}", n),
        Value::String(s) if s.chars().count() > 40 => {
            let head: String = s.chars().take(40).collect();
            format!("string \"{}...\"", head)
        }
        Value::String(s) => format!("string \"{}\"", s),
        Value::Array(_) => "array".to_string(),
        Value::Object(_) => "object".to_string(),
    }
}

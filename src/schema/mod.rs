//! Record schema and field-by-field validation
//!
//! A [`Schema`] declares the fields an extracted row must carry. Candidates
//! coming back from the extraction model are untyped JSON; [`Schema::validate`]
//! turns one candidate into a typed [`Record`] or reports every offending
//! field at once.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use sumi_extract::schema::{FieldSpec, FieldType, Schema};
//!
//! let schema = Schema::new(
//!     "Product",
//!     vec![
//!         FieldSpec::new("name", FieldType::Text),
//!         FieldSpec::new("price", FieldType::Number),
//!     ],
//! );
//!
//! let record = schema.validate(&json!({"name": "A", "price": "10"})).unwrap();
//! assert_eq!(record.get("price"), Some(&json!(10)));
//! ```

mod error;
mod field;

pub use error::{FieldViolation, SchemaValidationError, ViolationKind};
pub use field::{FieldSpec, FieldType};

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// One validated row of extracted data
///
/// Keys are exactly the schema's canonical field names, in schema order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Returns the value of a field by canonical name
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Iterates over `(field, value)` pairs in schema order
    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the record as a JSON value
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

/// Declared structure of an extracted record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Name shown to the extraction model
    #[serde(default = "default_title")]
    pub title: String,

    /// Fields in output order
    pub fields: Vec<FieldSpec>,
}

fn default_title() -> String {
    "Record".to_string()
}

impl Schema {
    pub fn new(title: impl Into<String>, fields: Vec<FieldSpec>) -> Self {
        Self {
            title: title.into(),
            fields,
        }
    }

    /// The leaderboard schema used by default
    ///
    /// Matches the columns of a model-ranking table: rank, model name,
    /// arena score, 95% confidence interval, votes, organization and license.
    pub fn leaderboard() -> Self {
        Self::new(
            "LeaderboardEntry",
            vec![
                FieldSpec::new("rank", FieldType::Integer)
                    .describe("Position in the ranking")
                    .alias("Rank"),
                FieldSpec::new("model", FieldType::Text)
                    .describe("Name of the AI model (e.g. Claude 3.5 Sonnet (20241022))")
                    .alias("Model"),
                FieldSpec::new("arena score", FieldType::Number)
                    .describe("Main arena score")
                    .alias("arena_score"),
                FieldSpec::new("95% CI", FieldType::Text)
                    .describe("95% confidence interval")
                    .alias("ci_95"),
                FieldSpec::new("votes", FieldType::Integer).describe("Number of votes received"),
                FieldSpec::new("organization", FieldType::Text)
                    .describe("Company or organization responsible for the model"),
                FieldSpec::new("license", FieldType::Text)
                    .describe("License type of the model")
                    .alias("License"),
            ],
        )
    }

    /// Returns the field with the given canonical name
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Validates one candidate against the schema
    ///
    /// Every field is checked before returning, so the error lists all
    /// offending fields. Unknown keys are ignored. Absent optional fields are
    /// emitted as `null`.
    pub fn validate(&self, candidate: &Value) -> Result<Record, SchemaValidationError> {
        let object = candidate.as_object().ok_or_else(|| SchemaValidationError {
            violations: vec![FieldViolation {
                field: String::new(),
                kind: ViolationKind::NotAnObject {
                    found: field::describe_value(candidate),
                },
            }],
        })?;

        let mut record = Map::new();
        let mut violations = Vec::new();

        for spec in &self.fields {
            match spec.lookup(object) {
                Some(value) => match spec.field_type.coerce(value) {
                    Some(converted) => {
                        record.insert(spec.name.clone(), converted);
                    }
                    None => violations.push(FieldViolation {
                        field: spec.name.clone(),
                        kind: ViolationKind::WrongType {
                            expected: spec.field_type,
                            found: field::describe_value(value),
                        },
                    }),
                },
                None if spec.required => violations.push(FieldViolation {
                    field: spec.name.clone(),
                    kind: ViolationKind::Missing,
                }),
                None => {
                    record.insert(spec.name.clone(), Value::Null);
                }
            }
        }

        if violations.is_empty() {
            Ok(Record(record))
        } else {
            Err(SchemaValidationError { violations })
        }
    }

    /// Describes the schema as a JSON Schema object for the extraction model
    pub fn json_schema(&self) -> Value {
        let mut properties = Map::new();
        for spec in &self.fields {
            let mut property = Map::new();
            property.insert("title".to_string(), json!(spec.name));
            property.insert("type".to_string(), json!(spec.field_type.json_type()));
            if !spec.description.is_empty() {
                property.insert("description".to_string(), json!(spec.description));
            }
            properties.insert(spec.name.clone(), Value::Object(property));
        }

        let required: Vec<&str> = self
            .fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name.as_str())
            .collect();

        json!({
            "title": self.title,
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

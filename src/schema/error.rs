use super::FieldType;
use std::fmt;

/// Why a single field of a candidate was rejected
#[derive(Debug, Clone, PartialEq)]
pub enum ViolationKind {
    /// The candidate is not a JSON object at all
    NotAnObject { found: String },

    /// A required field is absent or null
    Missing,

    /// The value cannot be converted to the declared type
    WrongType { expected: FieldType, found: String },
}

/// One offending field of a candidate record
#[derive(Debug, Clone, PartialEq)]
pub struct FieldViolation {
    pub field: String,
    pub kind: ViolationKind,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ViolationKind::NotAnObject { found } => {
                write!(f, "expected an object, found {}", found)
            }
            ViolationKind::Missing => write!(f, "{}: missing required field", self.field),
            ViolationKind::WrongType { expected, found } => {
                write!(f, "{}: expected {}, found {}", self.field, expected, found)
            }
        }
    }
}

/// A candidate failed schema validation
///
/// Lists every offending field, never just the first one.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaValidationError {
    pub violations: Vec<FieldViolation>,
}

impl SchemaValidationError {
    /// Names of the offending fields, in schema order
    pub fn fields(&self) -> Vec<&str> {
        self.violations.iter().map(|v| v.field.as_str()).collect()
    }
}

impl fmt::Display for SchemaValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} violation(s): ", self.violations.len())?;
        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", violation)?;
        }
        Ok(())
    }
}

impl std::error::Error for SchemaValidationError {}

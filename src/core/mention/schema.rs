//! JSON boundary for mention lists.
//!
//! The structural part (an array of objects with string fields) is checked by
//! a compiled JSON schema. The one-entity-kind rule is a whole-array
//! refinement delegated to [`validate_references`], so the schema path and
//! the library path cannot drift apart.

use super::reference::RawReferenceInput;
use super::validate::{
    validate_references, MalformedReferenceError, CHANNEL_ENTITY_FIELD, USER_ENTITY_FIELD,
};
use jsonschema::Validator;
use serde_json::{json, Value};
use std::fmt;

#[derive(Debug)]
pub enum SchemaError {
    /// The schema document itself failed to compile.
    Compile(String),
    /// The input does not have the expected shape.
    Structure(Vec<String>),
    /// The input has the right shape but could not be decoded.
    Decode(serde_json::Error),
    /// At least one element names zero or two entity kinds.
    Malformed(MalformedReferenceError),
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::Compile(msg) => write!(f, "Invalid mention schema: {msg}"),
            SchemaError::Structure(errors) => {
                write!(f, "Mentions do not match the expected shape: ")?;
                write!(f, "{}", errors.join("; "))
            }
            SchemaError::Decode(err) => write!(f, "Failed to decode mentions: {err}"),
            SchemaError::Malformed(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for SchemaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SchemaError::Compile(_) | SchemaError::Structure(_) => None,
            SchemaError::Decode(err) => Some(err),
            SchemaError::Malformed(err) => Some(err),
        }
    }
}

impl From<MalformedReferenceError> for SchemaError {
    fn from(err: MalformedReferenceError) -> Self {
        SchemaError::Malformed(err)
    }
}

/// Schema document describing a mention list.
pub fn mention_schema_document() -> Value {
    let rule = format!(
        "Each mention must set exactly one of {USER_ENTITY_FIELD} or {CHANNEL_ENTITY_FIELD}."
    );
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "title": "mentions",
        "description": rule,
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "token": {
                    "type": "string",
                    "description": "Text following @ in the message, quoted in the message when it contains spaces"
                },
                USER_ENTITY_FIELD: {
                    "type": "string",
                    "description": "Directory id of the mentioned user"
                },
                CHANNEL_ENTITY_FIELD: {
                    "type": "string",
                    "description": "Id of the mentioned channel, e.g. 19:...@thread.tacv2"
                }
            },
            "required": ["token"]
        }
    })
}

pub struct MentionSchema {
    validator: Validator,
}

impl MentionSchema {
    pub fn new() -> Result<Self, SchemaError> {
        let validator = jsonschema::validator_for(&mention_schema_document())
            .map_err(|err| SchemaError::Compile(err.to_string()))?;
        Ok(Self { validator })
    }

    /// Checks structure, then the entity-kind rule, and returns the decoded
    /// inputs in their original order.
    pub fn parse(&self, value: &Value) -> Result<Vec<RawReferenceInput>, SchemaError> {
        let errors: Vec<String> = self
            .validator
            .iter_errors(value)
            .map(|err| err.to_string())
            .collect();
        if !errors.is_empty() {
            return Err(SchemaError::Structure(errors));
        }

        let inputs: Vec<RawReferenceInput> =
            serde_json::from_value(value.clone()).map_err(SchemaError::Decode)?;
        validate_references(&inputs)?;
        Ok(inputs)
    }

    pub fn parse_str(&self, raw: &str) -> Result<Vec<RawReferenceInput>, SchemaError> {
        let value: Value = serde_json::from_str(raw).map_err(SchemaError::Decode)?;
        self.parse(&value)
    }
}

//! XOR validation for caller-supplied mentions.
//!
//! Both the programmatic API and the JSON boundary schema
//! ([`super::schema::MentionSchema`]) funnel through [`validate_references`].

use super::reference::{RawReferenceInput, ValidatedReference};
use std::fmt;

pub const USER_ENTITY_FIELD: &str = "userEntityId";
pub const CHANNEL_ENTITY_FIELD: &str = "channelEntityId";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceViolation {
    BothPresent,
    NeitherPresent,
}

/// Raised when any mention in a batch does not name exactly one entity kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedReferenceError {
    pub index: usize,
    pub token: String,
    pub violation: ReferenceViolation,
}

impl fmt::Display for MalformedReferenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.violation {
            ReferenceViolation::BothPresent => write!(
                f,
                "Mention '{}' (index {}) sets both {USER_ENTITY_FIELD} and {CHANNEL_ENTITY_FIELD}; exactly one of them is required",
                self.token, self.index
            ),
            ReferenceViolation::NeitherPresent => write!(
                f,
                "Mention '{}' (index {}) sets neither {USER_ENTITY_FIELD} nor {CHANNEL_ENTITY_FIELD}; exactly one of them is required",
                self.token, self.index
            ),
        }
    }
}

impl std::error::Error for MalformedReferenceError {}

pub fn validate_reference(
    input: &RawReferenceInput,
) -> Result<ValidatedReference, ReferenceViolation> {
    match (input.user_id(), input.channel_id()) {
        (Some(user), None) => Ok(ValidatedReference::User {
            token: input.token.clone(),
            entity_id: user.to_string(),
        }),
        (None, Some(channel)) => Ok(ValidatedReference::Channel {
            token: input.token.clone(),
            entity_id: channel.to_string(),
        }),
        (Some(_), Some(_)) => Err(ReferenceViolation::BothPresent),
        (None, None) => Err(ReferenceViolation::NeitherPresent),
    }
}

/// Validates a whole batch, failing on the first offending element.
pub fn validate_references(
    inputs: &[RawReferenceInput],
) -> Result<Vec<ValidatedReference>, MalformedReferenceError> {
    inputs
        .iter()
        .enumerate()
        .map(|(index, input)| {
            validate_reference(input).map_err(|violation| MalformedReferenceError {
                index,
                token: input.token.clone(),
                violation,
            })
        })
        .collect()
}

//! Mention resolution and markup injection.
//!
//! Data flows one way through the submodules:
//! raw inputs -> [`validate`] -> [`normalize`] (labels) -> [`inject`]
//! (content spans + wire records).

pub mod inject;
pub mod normalize;
pub mod reference;
pub mod schema;
pub mod validate;

pub use inject::{build_token_pattern, inject_mentions, inject_mentions_as};
pub use normalize::{
    normalize_references, DirectoryLookup, LookupError, NormalizeWarning, Normalized,
    OfflineDirectory,
};
pub use reference::{
    ChannelReference, RawReferenceInput, Reference, UserReference, ValidatedReference,
};
pub use schema::{MentionSchema, SchemaError};
pub use validate::{validate_references, MalformedReferenceError, ReferenceViolation};

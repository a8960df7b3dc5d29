//! Fills in display labels for validated mentions.
//!
//! Users are resolved through a [`DirectoryLookup`]; a failed or empty lookup
//! degrades to the caller's token. Channels are taken as given and only get a
//! shape check, which warns but never rejects.

use super::reference::{Reference, ValidatedReference};
use async_trait::async_trait;
use futures_util::future::join_all;
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

pub const CHANNEL_ID_PREFIX: &str = "19:";
pub const CHANNEL_ID_SUFFIX: &str = "@thread.tacv2";
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    NotFound,
    Timeout(Duration),
    Request(String),
    /// No directory is reachable, e.g. when running without credentials.
    Unavailable,
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupError::NotFound => write!(f, "not found"),
            LookupError::Timeout(after) => write!(f, "timed out after {}ms", after.as_millis()),
            LookupError::Request(msg) => write!(f, "request failed: {msg}"),
            LookupError::Unavailable => write!(f, "directory unavailable"),
        }
    }
}

impl std::error::Error for LookupError {}

/// Resolves an entity id to the name shown for it.
#[async_trait]
pub trait DirectoryLookup: Send + Sync {
    async fn lookup_display_name(&self, entity_id: &str) -> Result<String, LookupError>;
}

/// Directory used when no credentials are configured; every lookup fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineDirectory;

#[async_trait]
impl DirectoryLookup for OfflineDirectory {
    async fn lookup_display_name(&self, _entity_id: &str) -> Result<String, LookupError> {
        Err(LookupError::Unavailable)
    }
}

/// Non-fatal problems encountered while normalizing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizeWarning {
    LookupFailed {
        token: String,
        entity_id: String,
        error: LookupError,
    },
    ChannelShape {
        token: String,
        entity_id: String,
    },
}

impl fmt::Display for NormalizeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizeWarning::LookupFailed {
                token,
                entity_id,
                error,
            } => write!(
                f,
                "Could not resolve user {entity_id} ({error}); showing '{token}' instead"
            ),
            NormalizeWarning::ChannelShape { token, entity_id } => write!(
                f,
                "Channel id '{entity_id}' for '{token}' does not look like {CHANNEL_ID_PREFIX}...{CHANNEL_ID_SUFFIX}"
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Normalized {
    pub references: Vec<Reference>,
    pub warnings: Vec<NormalizeWarning>,
}

pub fn is_channel_id_shape(entity_id: &str) -> bool {
    entity_id.len() > CHANNEL_ID_PREFIX.len() + CHANNEL_ID_SUFFIX.len()
        && entity_id.starts_with(CHANNEL_ID_PREFIX)
        && entity_id.ends_with(CHANNEL_ID_SUFFIX)
}

/// Normalizes every reference, running user lookups concurrently.
///
/// Output order always matches input order.
pub async fn normalize_references(
    directory: &dyn DirectoryLookup,
    references: Vec<ValidatedReference>,
    timeout: Duration,
) -> Normalized {
    let results = join_all(
        references
            .into_iter()
            .map(|reference| normalize_one(directory, reference, timeout)),
    )
    .await;

    let mut normalized = Normalized::default();
    for (reference, warning) in results {
        normalized.references.push(reference);
        if let Some(warning) = warning {
            normalized.warnings.push(warning);
        }
    }
    normalized
}

async fn normalize_one(
    directory: &dyn DirectoryLookup,
    reference: ValidatedReference,
    timeout: Duration,
) -> (Reference, Option<NormalizeWarning>) {
    match reference {
        ValidatedReference::User { token, entity_id } => {
            let lookup = tokio::time::timeout(timeout, directory.lookup_display_name(&entity_id))
                .await
                .unwrap_or(Err(LookupError::Timeout(timeout)));

            match lookup {
                Ok(name) if !name.trim().is_empty() => {
                    debug!(%entity_id, display_name = %name, "Resolved user mention");
                    (Reference::user(token, entity_id, name), None)
                }
                outcome => {
                    let error = outcome.err().unwrap_or(LookupError::NotFound);
                    warn!(%entity_id, %token, %error, "User lookup failed; using token as label");
                    let label = token.clone();
                    let warning = NormalizeWarning::LookupFailed {
                        token: token.clone(),
                        entity_id: entity_id.clone(),
                        error,
                    };
                    (Reference::user(token, entity_id, label), Some(warning))
                }
            }
        }
        ValidatedReference::Channel { token, entity_id } => {
            let warning = if is_channel_id_shape(&entity_id) {
                None
            } else {
                warn!(%entity_id, %token, "Channel id has unexpected shape");
                Some(NormalizeWarning::ChannelShape {
                    token: token.clone(),
                    entity_id: entity_id.clone(),
                })
            };
            let label = token.clone();
            (Reference::channel(token, entity_id, label), warning)
        }
    }
}

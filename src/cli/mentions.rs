//! Mention input from the command line.

use std::error::Error;
use std::io::Read;

use crate::core::mention::{MentionSchema, RawReferenceInput};

const USER_KIND: &str = "=user:";
const CHANNEL_KIND: &str = "=channel:";

/// Parses `TOKEN=user:ID` or `TOKEN=channel:ID`.
///
/// The token may contain spaces or `=`; the earliest kind marker wins. An
/// empty id is passed through so the validator reports it.
pub fn parse_mention_flag(raw: &str) -> Result<RawReferenceInput, String> {
    let user = raw.find(USER_KIND).map(|pos| (pos, USER_KIND));
    let channel = raw.find(CHANNEL_KIND).map(|pos| (pos, CHANNEL_KIND));
    let marker = match (user, channel) {
        (Some(u), Some(c)) => Some(if u.0 <= c.0 { u } else { c }),
        (u, c) => u.or(c),
    };

    let Some((pos, kind)) = marker else {
        return Err(format!(
            "Invalid mention '{raw}': expected TOKEN=user:ID or TOKEN=channel:ID"
        ));
    };

    let token = &raw[..pos];
    let id = &raw[pos + kind.len()..];
    if token.is_empty() {
        return Err(format!("Invalid mention '{raw}': token is empty"));
    }

    Ok(if kind == USER_KIND {
        RawReferenceInput::user(token, id)
    } else {
        RawReferenceInput::channel(token, id)
    })
}

/// Returns flag mentions as given, or the mentions from a JSON file checked
/// against the boundary schema.
pub fn resolve_mentions(
    flags: Vec<RawReferenceInput>,
    json_path: Option<&str>,
) -> Result<Vec<RawReferenceInput>, Box<dyn Error>> {
    let Some(path) = json_path else {
        return Ok(flags);
    };

    let raw = if path == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path)
            .map_err(|err| format!("Failed to read mentions from {path}: {err}"))?
    };

    Ok(MentionSchema::new()?.parse_str(&raw)?)
}

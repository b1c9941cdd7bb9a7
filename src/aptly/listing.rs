// src/aptly/listing.rs

//! Parsers for aptly's human-readable listing output
//!
//! The only structure relied upon:
//! - repo/snapshot entries start with a `*` bullet followed by `[name]`
//! - publication entries start with a `*` bullet followed by the
//!   publication name as the first whitespace-delimited token, and carry a
//!   `publishes {component: [name]: ...}, {...}` clause
//!
//! Anything else is ignored, so a format change yields empty results.

use crate::naming::PublicationName;

/// One parsed line of `aptly publish list`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicationEntry {
    pub name: PublicationName,
    pub line: String,
}

/// Strip the bullet marker from a listing line
fn bullet_body(line: &str) -> Option<&str> {
    line.trim_start().strip_prefix('*').map(str::trim_start)
}

/// First `[bracketed]` token in `text`
fn first_bracketed(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text[start + 1..].find(']')? + start + 1;
    let name = &text[start + 1..end];
    (!name.is_empty()).then_some(name)
}

/// Check whether a line mentions `[name]`
pub fn mentions(line: &str, name: &str) -> bool {
    line.contains(&format!("[{}]", name))
}

/// Parse `aptly repo list` / `aptly snapshot list` output into names
///
/// Each entry is returned with its full line so callers can filter on
/// what the description mentions.
pub fn parse_bracketed_entries(output: &str) -> Vec<(String, String)> {
    output
        .lines()
        .filter_map(|line| {
            let body = bullet_body(line)?;
            if !body.starts_with('[') {
                return None;
            }
            let name = first_bracketed(body)?;
            Some((name.to_string(), line.to_string()))
        })
        .collect()
}

/// Parse `aptly publish list` output
pub fn parse_publications(output: &str) -> Vec<PublicationEntry> {
    output
        .lines()
        .filter_map(|line| {
            let body = bullet_body(line)?;
            let token = body.split_whitespace().next()?;
            let name = PublicationName::from_listing(token)?;
            Some(PublicationEntry {
                name,
                line: line.to_string(),
            })
        })
        .collect()
}

/// Extract the backing names from a publication line's `publishes` clause
///
/// Returns the first bracketed name of each `{...}` group, in order.
pub fn parse_publishes_clause(line: &str) -> Vec<String> {
    let Some(idx) = line.find("publishes") else {
        return Vec::new();
    };
    let mut rest = &line[idx + "publishes".len()..];
    let mut names = Vec::new();

    while let Some(open) = rest.find('{') {
        let group = &rest[open + 1..];
        let close = matching_brace(group).unwrap_or(group.len());
        if let Some(name) = first_bracketed(&group[..close]) {
            names.push(name.to_string());
        }
        rest = &group[close..];
    }

    names
}

/// Offset of the `}` closing a group whose `{` was just consumed
fn matching_brace(group: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in group.char_indices() {
        match c {
            '{' => depth += 1,
            '}' if depth == 0 => return Some(i),
            '}' => depth -= 1,
            _ => {}
        }
    }
    None
}

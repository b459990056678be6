//! Parsers for human-readable command replies.
//!
//! These are pure string functions for the layer above the client; the client
//! itself always returns replies as opaque strings.

/// Parsed reply of the `list` command.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlayerList {
    pub online: u32,
    pub max: u32,
    pub players: Vec<String>,
}

impl PlayerList {
    /// Parse `"There are 2 of a max of 20 players online: Alice, Bob"`.
    ///
    /// Returns `None` when the reply carries no `<n> of a max of <m>` counts.
    pub fn parse(reply: &str) -> Option<Self> {
        const MARKER: &str = " of a max of ";

        let at = reply.find(MARKER)?;
        let online = trailing_number(&reply[..at])?;
        let max = leading_number(&reply[at + MARKER.len()..])?;

        Some(Self {
            online,
            max,
            players: parse_name_list(reply),
        })
    }
}

/// Names listed after the first `:` of a reply, comma separated.
///
/// Works for `list`, `whitelist list` and `banlist players`. A reply without a
/// colon (e.g. `"There are no whitelisted players"`) yields an empty list.
pub fn parse_name_list(reply: &str) -> Vec<String> {
    let Some((_, names)) = reply.split_once(':') else {
        return Vec::new();
    };

    names
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect()
}

fn trailing_number(s: &str) -> Option<u32> {
    let digits = s.len() - s.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    s[s.len() - digits..].parse().ok()
}

fn leading_number(s: &str) -> Option<u32> {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s[..end].parse().ok()
}

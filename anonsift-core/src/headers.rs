//! Identity-leaking header registry
//!
//! Header names that misbehaving relays commonly reflect back with the
//! original client address in them. Checked case-insensitively because
//! echo oracles differ in how they canonicalize header names.

use std::collections::HashMap;

/// Headers inspected during the stage-2 probe
pub static LEAK_HEADERS: &[&str] = &[
    "X-Forwarded-For",
    "X-Real-Ip",
    "X-Forwarded",
    "Forwarded-For",
    "Forwarded",
    "Via",
    "X-Client-Ip",
    "Client-Ip",
    "True-Client-Ip",
    "Cf-Connecting-Ip",
];

/// Find the first inspected header whose value contains `needle`
///
/// Returns the header name as the oracle reported it, not the registry
/// spelling.
pub fn find_leak<'a>(headers: &'a HashMap<String, String>, needle: &str) -> Option<&'a str> {
    for inspected in LEAK_HEADERS {
        let hit = headers
            .iter()
            .find(|(name, value)| name.eq_ignore_ascii_case(inspected) && value.contains(needle));
        if let Some((name, _)) = hit {
            return Some(name.as_str());
        }
    }
    None
}

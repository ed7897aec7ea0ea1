// 🪪 Identity Resolver - stable team keys across differently-shaped pages
//
// Numeric team ids survive mid-season renames, so they win whenever the link
// carries one. Some page types omit the id; those fall back to the trimmed,
// case-folded team name.

use once_cell::sync::Lazy;
use regex::Regex;

/// Recognized id patterns, in priority order
static TEAM_ID_PATTERNS: Lazy<[Regex; 2]> = Lazy::new(|| {
    [
        Regex::new(r"/team/(\d+)\b").expect("invalid regex: team path"),
        Regex::new(r"[?&]teamId=(\d+)\b").expect("invalid regex: teamId query"),
    ]
});

/// A team reference as it appears on a page: link target plus display name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamRef {
    pub href: String,
    pub name: String,
}

impl TeamRef {
    pub fn new(href: impl Into<String>, name: impl Into<String>) -> Self {
        TeamRef {
            href: href.into(),
            name: name.into(),
        }
    }

    pub fn team_id(&self) -> Option<String> {
        extract_team_id(&self.href)
    }

    pub fn name_key(&self) -> String {
        name_key(&self.name)
    }

    /// Preferred key: id, else normalized name. None when both are empty.
    pub fn key(&self) -> Option<String> {
        resolve_key(&self.href, &self.name)
    }
}

/// Pull a numeric team id out of a link
pub fn extract_team_id(href: &str) -> Option<String> {
    TEAM_ID_PATTERNS
        .iter()
        .find_map(|pattern| pattern.captures(href))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Case-insensitive, whitespace-trimmed team name
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

pub fn resolve_key(href: &str, name: &str) -> Option<String> {
    if let Some(id) = extract_team_id(href) {
        return Some(id);
    }
    let key = name_key(name);
    if key.is_empty() {
        None
    } else {
        Some(key)
    }
}

// ============================================================================
// TESTS
// ============================================================================

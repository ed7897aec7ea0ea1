// 👤 Manager Name Canonicalizer - one career identity per person
//
// The source site shows whatever display name a manager had that year, so the
// same person can appear as "Matt" one season and "Matt Van" the next.
// Exact-match only: no fuzzy matching, unmapped names pass through.
//
// Only cross-season seams call this (standings combine, roster combine,
// career aggregation). Per-season tables keep the scraped name as evidence.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ManagerAliases {
    aliases: BTreeMap<String, String>,
}

impl ManagerAliases {
    /// Empty table: every name maps to itself (after trimming)
    pub fn new() -> Self {
        ManagerAliases {
            aliases: BTreeMap::new(),
        }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        ManagerAliases {
            aliases: pairs
                .into_iter()
                .map(|(raw, canonical)| (raw.into().trim().to_string(), canonical.into()))
                .collect(),
        }
    }

    /// Known renames for the home league
    pub fn league_defaults() -> Self {
        Self::from_pairs([
            ("Chris Beth", "Chris"),
            ("Fancett", "Big Dog"),
            ("Matt", "Matt Van"),
            ("Matthew", "Heddle"),
            ("Raymond", "Ray"),
        ])
    }

    /// Trim, then exact lookup
    pub fn canonicalize(&self, raw: &str) -> String {
        let cleaned = raw.trim();
        self.aliases
            .get(cleaned)
            .cloned()
            .unwrap_or_else(|| cleaned.to_string())
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

impl Default for ManagerAliases {
    fn default() -> Self {
        Self::league_defaults()
    }
}

// ============================================================================
// TESTS
// ============================================================================

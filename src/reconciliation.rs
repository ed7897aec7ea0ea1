// ⚖️ Season Merger - three pages, one record per team
//
// The regular-standings page decides which teams exist. The final standings
// page and the owners page may only enrich those teams; rows that match no
// base team (mid-season replacements, stray markup) are dropped.
//
// Dropping a few rows is normal. Dropping ALL of them means the page layout
// changed, so a page that applies zero rows is a hard failure.

use crate::error::{LeagueError, Result};
use crate::identity::{name_key, TeamRef};
use crate::numeric::{parse_decimal, parse_record};
use crate::pages::standings::{OwnerRow, PlayoffRow, RegularRow};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// TEAM SEASON RECORD
// ============================================================================

/// One team, one season
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamSeasonRecord {
    /// Numeric site id, empty when no page linked one
    pub team_id: String,
    pub team_name: String,

    /// Kept as text: the source does not promise a number here
    pub regular_season_rank: String,

    pub wins: i64,
    pub losses: i64,
    pub ties: i64,

    pub points_for: Option<f64>,
    pub points_against: Option<f64>,

    /// Empty when the team had no playoff placement
    pub playoff_rank: String,

    /// As scraped; canonicalized only at cross-season seams
    pub manager_name: String,
    pub moves: Option<i64>,
    pub trades: Option<i64>,
}

impl TeamSeasonRecord {
    pub fn from_regular(row: &RegularRow) -> Self {
        let (wins, losses, ties) = parse_record(&row.record);
        TeamSeasonRecord {
            team_id: row.team.team_id().unwrap_or_default(),
            team_name: row.team.name.clone(),
            regular_season_rank: row.rank.clone(),
            wins,
            losses,
            ties,
            points_for: parse_decimal(&row.points_for),
            points_against: parse_decimal(&row.points_against),
            ..Default::default()
        }
    }

    /// "W-L-T"
    pub fn record(&self) -> String {
        format!("{}-{}-{}", self.wins, self.losses, self.ties)
    }
}

// ============================================================================
// MERGE REPORT
// ============================================================================

/// How one enrichment page fared against the base set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeReport {
    pub page: &'static str,
    pub applied: usize,
    pub dropped: usize,
}

impl MergeReport {
    /// Zero applied rows for a whole page is a parse failure
    pub fn ensure_applied(&self, season: &str, snippet: impl FnOnce() -> String) -> Result<()> {
        if self.applied == 0 {
            return Err(LeagueError::ZeroMatch {
                season: season.to_string(),
                page: self.page,
                snippet: snippet(),
            });
        }
        Ok(())
    }
}

// ============================================================================
// SEASON MERGER
// ============================================================================

pub struct SeasonMerger {
    season: String,
    /// identity key → record; BTreeMap keeps iteration deterministic
    records: BTreeMap<String, TeamSeasonRecord>,
    /// normalized team name → identity key, for the name fallback
    names: BTreeMap<String, String>,
}

impl SeasonMerger {
    /// Establish the base set from the regular-season standings
    pub fn from_regular(
        season: impl Into<String>,
        rows: &[RegularRow],
        snippet: impl FnOnce() -> String,
    ) -> Result<Self> {
        let season = season.into();
        let mut records = BTreeMap::new();
        let mut names = BTreeMap::new();

        for row in rows {
            let Some(key) = row.team.key() else {
                log::debug!("season {}: skipping regular row with no id and no name", season);
                continue;
            };
            if records.contains_key(&key) {
                log::warn!("season {}: duplicate team key '{}' in regular standings", season, key);
            }
            names
                .entry(row.team.name_key())
                .or_insert_with(|| key.clone());
            records.insert(key, TeamSeasonRecord::from_regular(row));
        }

        if records.is_empty() {
            return Err(LeagueError::NoTeams {
                season,
                snippet: snippet(),
            });
        }

        Ok(SeasonMerger {
            season,
            records,
            names,
        })
    }

    pub fn season(&self) -> &str {
        &self.season
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Base key for a reference: its id if the base set has it, else its name
    fn locate(&self, team: &TeamRef) -> Option<String> {
        if let Some(id) = team.team_id() {
            if self.records.contains_key(&id) {
                return Some(id);
            }
        }
        let by_name = name_key(&team.name);
        if by_name.is_empty() {
            return None;
        }
        if self.records.contains_key(&by_name) {
            return Some(by_name);
        }
        self.names.get(&by_name).cloned()
    }

    fn apply<R: EnrichmentRow>(
        &mut self,
        page: &'static str,
        rows: &[R],
        mut enrich: impl FnMut(&mut TeamSeasonRecord, &R),
    ) -> MergeReport {
        let mut report = MergeReport {
            page,
            applied: 0,
            dropped: 0,
        };

        for row in rows {
            let team = row.team();
            let record = self
                .locate(team)
                .and_then(|key| self.records.get_mut(&key));
            match record {
                Some(record) => {
                    enrich(record, row);
                    report.applied += 1;
                }
                None => {
                    log::warn!(
                        "season {}: dropping {} row for unknown team '{}'",
                        self.season,
                        page,
                        team.name
                    );
                    report.dropped += 1;
                }
            }
        }

        report
    }

    pub fn apply_playoffs(&mut self, rows: &[PlayoffRow]) -> MergeReport {
        self.apply("playoff", rows, |record, row: &PlayoffRow| {
            record.playoff_rank = row.playoff_rank().unwrap_or_default()
        })
    }

    pub fn apply_owners(&mut self, rows: &[OwnerRow]) -> MergeReport {
        self.apply("owner", rows, |record, row: &OwnerRow| {
            record.manager_name = row.manager.clone();
            record.moves = row.moves.trim().replace(',', "").parse().ok();
            record.trades = row.trades.trim().replace(',', "").parse().ok();
        })
    }

    pub fn into_records(self) -> Vec<TeamSeasonRecord> {
        self.records.into_values().collect()
    }
}

/// Rows from a page that enriches existing teams
pub trait EnrichmentRow {
    fn team(&self) -> &TeamRef;
}

impl EnrichmentRow for PlayoffRow {
    fn team(&self) -> &TeamRef {
        &self.team
    }
}

impl EnrichmentRow for OwnerRow {
    fn team(&self) -> &TeamRef {
        &self.team
    }
}

/// Merge all three pages for one season, enforcing the zero-match rule
pub fn merge_season(
    season: &str,
    regular: &[RegularRow],
    playoffs: &[PlayoffRow],
    owners: &[OwnerRow],
) -> Result<Vec<TeamSeasonRecord>> {
    let mut merger = SeasonMerger::from_regular(season, regular, String::new)?;
    merger.apply_playoffs(playoffs).ensure_applied(season, String::new)?;
    merger.apply_owners(owners).ensure_applied(season, String::new)?;
    Ok(merger.into_records())
}

// ============================================================================
// TESTS
// ============================================================================

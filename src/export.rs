// 🧾 JSON Projections - keyed views over the combined CSV artifacts
//
// Each projection reads a CSV the pipeline already wrote and re-keys it for a
// consumer that wants lookups instead of rows. Numbers go through the same
// lenient coercion as the aggregator. All maps are BTreeMaps, so key order is
// sorted and reruns write identical files.

use crate::error::{LeagueError, Result};
use crate::numeric::{coerce_float, coerce_int, parse_record};
use crate::schema::{ColumnIndex, ColumnUnion, CsvTable, MANAGER_NAME, OWNER, SEASON, TEAM_NAME, WEEK};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let text = serde_json::to_string_pretty(value)?;
    fs::write(path, text)?;
    log::info!("Wrote {}", path.display());
    Ok(())
}

/// Exact column name first, then a case-insensitive match
fn pick_column(index: &ColumnIndex, candidates: &[&str]) -> Result<String> {
    if let Some(found) = candidates.iter().find(|c| index.contains(c)) {
        return Ok(found.to_string());
    }
    for candidate in candidates {
        let lower = candidate.to_lowercase();
        if let Some(found) = index.names().iter().find(|n| n.to_lowercase() == lower) {
            return Ok(found.clone());
        }
    }
    Err(LeagueError::MissingColumns {
        file: index.file().to_path_buf(),
        missing: vec![candidates.join("|")],
    })
}

// ============================================================================
// AGGREGATE → MANAGER
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ManagerTotalsJson {
    pub manager_name: String,
    pub seasons: i64,
    pub wins: i64,
    pub losses: i64,
    pub ties: i64,
    pub points_for: f64,
    pub points_against: f64,
    pub moves: i64,
    pub trades: i64,
    pub playoffs: i64,
    pub championships: i64,
    pub toilet_bowls: i64,
}

pub fn aggregate_by_manager(table: &CsvTable) -> Result<BTreeMap<String, ManagerTotalsJson>> {
    let index = table.index();
    index.require(&[MANAGER_NAME])?;

    let mut out = BTreeMap::new();
    for record in &table.rows {
        let manager = index.get_or_empty(record, MANAGER_NAME).trim().to_string();
        if manager.is_empty() {
            continue;
        }
        let int = |column: &str| coerce_int(index.get_or_empty(record, column));
        let float = |column: &str| coerce_float(index.get_or_empty(record, column));
        let totals = ManagerTotalsJson {
            manager_name: manager.clone(),
            seasons: int("Seasons"),
            wins: int("Wins"),
            losses: int("Losses"),
            ties: int("Ties"),
            points_for: float("PointsFor"),
            points_against: float("PointsAgainst"),
            moves: int("Moves"),
            trades: int("Trades"),
            playoffs: int("Playoffs"),
            championships: int("Championships"),
            toilet_bowls: int("Toilet Bowl"),
        };
        out.insert(manager, totals);
    }
    Ok(out)
}

// ============================================================================
// LONG-FORMAT STANDINGS → SEASON / TEAM
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SeasonTeamJson {
    pub team_name: String,
    pub manager_name: String,
    pub wins: i64,
    pub losses: i64,
    pub ties: i64,
    pub points_for: f64,
    pub points_against: f64,
    pub regular_season_rank: i64,
    pub playoff_rank: i64,
    pub moves: i64,
    pub trades: i64,
}

pub fn standings_by_season_team(
    table: &CsvTable,
) -> Result<BTreeMap<String, BTreeMap<String, SeasonTeamJson>>> {
    let index = table.index();
    index.require(&[SEASON, TEAM_NAME])?;

    let mut out: BTreeMap<String, BTreeMap<String, SeasonTeamJson>> = BTreeMap::new();
    for record in &table.rows {
        let cell = |column: &str| index.get_or_empty(record, column).trim();
        let season = cell(SEASON);
        let team = cell(TEAM_NAME);
        if season.is_empty() || team.is_empty() {
            continue;
        }

        let (wins, losses, ties) = parse_record(cell("Record"));
        let entry = SeasonTeamJson {
            team_name: team.to_string(),
            manager_name: cell(MANAGER_NAME).to_string(),
            wins,
            losses,
            ties,
            points_for: coerce_float(cell("PointsFor")),
            points_against: coerce_float(cell("PointsAgainst")),
            regular_season_rank: coerce_int(cell("RegularSeasonRank")),
            playoff_rank: coerce_int(cell("PlayoffRank")),
            moves: coerce_int(cell("Moves")),
            trades: coerce_int(cell("Trades")),
        };
        out.entry(season.to_string())
            .or_default()
            .insert(team.to_string(), entry);
    }
    Ok(out)
}

// ============================================================================
// LONG-FORMAT STANDINGS → MANAGER HISTORY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerHistoryJson {
    pub manager_name: String,
    /// Team name from the manager's most recent season, "-" if none
    pub team_name: String,
    pub name_history: Vec<String>,
    pub active_seasons: Vec<i64>,
}

#[derive(Default)]
struct HistoryAcc {
    names: BTreeSet<String>,
    seasons: BTreeSet<i64>,
    latest: Option<(i64, String)>,
}

pub fn standings_by_manager(table: &CsvTable) -> Result<BTreeMap<String, ManagerHistoryJson>> {
    let index = table.index();
    let manager_col = pick_column(&index, &["managerName", MANAGER_NAME, "manager", OWNER, "owner"])?;
    let team_col = pick_column(&index, &["teamName", TEAM_NAME, "team", "Team"])?;
    let season_col = pick_column(&index, &[SEASON, "season", "Year", "year"])?;

    let mut acc: BTreeMap<String, HistoryAcc> = BTreeMap::new();
    for record in &table.rows {
        let manager = index.get_or_empty(record, &manager_col).trim();
        if manager.is_empty() {
            continue;
        }
        let team = index.get_or_empty(record, &team_col).trim();
        let season = index.get_or_empty(record, &season_col).trim().parse::<i64>().ok();

        let history = acc.entry(manager.to_string()).or_default();
        if !team.is_empty() {
            history.names.insert(team.to_string());
        }
        if let Some(season) = season {
            history.seasons.insert(season);
            let newer = history.latest.as_ref().map_or(true, |(s, _)| season > *s);
            if !team.is_empty() && newer {
                history.latest = Some((season, team.to_string()));
            }
        }
    }

    Ok(acc
        .into_iter()
        .map(|(manager, history)| {
            let team_name = history
                .latest
                .map(|(_, team)| team)
                .unwrap_or_else(|| "-".to_string());
            let json = ManagerHistoryJson {
                manager_name: manager.clone(),
                team_name,
                name_history: history.names.into_iter().collect(),
                active_seasons: history.seasons.into_iter().collect(),
            };
            (manager, json)
        })
        .collect())
}

// ============================================================================
// COMBINED WEEKS → SEASON / WEEK / OWNER
// ============================================================================

pub type WeekRowJson = BTreeMap<String, String>;

/// One owner's row for a week, or every row when the owner appears twice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OwnerWeekJson {
    One(WeekRowJson),
    Many(Vec<WeekRowJson>),
}

impl OwnerWeekJson {
    fn push(&mut self, row: WeekRowJson) {
        match self {
            OwnerWeekJson::One(first) => {
                let first = std::mem::take(first);
                *self = OwnerWeekJson::Many(vec![first, row]);
            }
            OwnerWeekJson::Many(rows) => rows.push(row),
        }
    }
}

pub type WeeksByOwner = BTreeMap<String, BTreeMap<String, BTreeMap<String, OwnerWeekJson>>>;

pub fn weeks_by_season_week_owner(table: &CsvTable) -> Result<WeeksByOwner> {
    let index = table.index();
    index.require(&[SEASON, WEEK, OWNER])?;

    // Repeated roster columns ("Points") get numbered keys
    let mut union = ColumnUnion::new();
    union.extend(&table.header_strings());
    let keys = union.unique_names();

    let mut out: WeeksByOwner = BTreeMap::new();
    for record in &table.rows {
        let season = index.get_or_empty(record, SEASON).trim();
        let week = index.get_or_empty(record, WEEK).trim();
        let owner = index.get_or_empty(record, OWNER).trim();
        if season.is_empty() || week.is_empty() || owner.is_empty() {
            continue;
        }

        let row: WeekRowJson = keys
            .iter()
            .cloned()
            .zip(record.iter().map(str::to_string))
            .collect();

        let week_bucket = out
            .entry(season.to_string())
            .or_default()
            .entry(week.to_string())
            .or_default();
        match week_bucket.get_mut(owner) {
            Some(existing) => existing.push(row),
            None => {
                week_bucket.insert(owner.to_string(), OwnerWeekJson::One(row));
            }
        }
    }
    Ok(out)
}

// ============================================================================
// TESTS
// ============================================================================

// 📊 Career Aggregator - one totals record per manager
//
// Folds season tables in season order. Counting stats add up row by row;
// seasons and awards count once per manager per season, so a manager with two
// teams in one year still gets one season and at most one title.
//
// Awards use that season's row count n:
// - championship: playoff rank 1
// - playoff berth: playoff rank in 1..=playoff_cutoff
// - toilet bowl: regular-season rank >= max(1, n - 3)

use crate::aliases::ManagerAliases;
use crate::combine::season_files;
use crate::error::{LeagueError, Result};
use crate::numeric::{coerce_float, coerce_int, digits_only, format_points, parse_record};
use crate::schema::{ColumnIndex, CsvTable, AGGREGATE_HEADER, AGGREGATE_INPUT_COLUMNS, MANAGER_NAME, SEASON};
use csv::StringRecord;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

pub const DEFAULT_PLAYOFF_CUTOFF: u32 = 6;

// ============================================================================
// MANAGER AGGREGATE
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManagerAggregate {
    pub manager_name: String,
    pub seasons: u32,
    pub wins: i64,
    pub losses: i64,
    pub ties: i64,
    pub points_for: f64,
    pub points_against: f64,
    pub moves: i64,
    pub trades: i64,
    pub playoffs: u32,
    pub championships: u32,
    pub toilet_bowls: u32,
}

impl ManagerAggregate {
    pub fn new(manager_name: impl Into<String>) -> Self {
        ManagerAggregate {
            manager_name: manager_name.into(),
            ..Default::default()
        }
    }

    /// Cells in AGGREGATE_HEADER order
    pub fn to_record(&self) -> Vec<String> {
        vec![
            self.manager_name.clone(),
            self.seasons.to_string(),
            self.wins.to_string(),
            self.losses.to_string(),
            self.ties.to_string(),
            format_points(self.points_for),
            format_points(self.points_against),
            self.moves.to_string(),
            self.trades.to_string(),
            self.playoffs.to_string(),
            self.championships.to_string(),
            self.toilet_bowls.to_string(),
        ]
    }
}

// ============================================================================
// SEASON ROW
// ============================================================================

/// The raw cells the aggregator reads from one season-table row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeasonRow {
    pub manager_name: String,
    pub regular_season_rank: String,
    pub record: String,
    pub points_for: String,
    pub points_against: String,
    pub playoff_rank: String,
    pub moves: String,
    pub trades: String,
}

impl SeasonRow {
    pub fn from_record(index: &ColumnIndex, record: &StringRecord) -> Self {
        let cell = |column: &str| index.get_or_empty(record, column).to_string();
        SeasonRow {
            manager_name: cell(MANAGER_NAME),
            regular_season_rank: cell("RegularSeasonRank"),
            record: cell("Record"),
            points_for: cell("PointsFor"),
            points_against: cell("PointsAgainst"),
            playoff_rank: cell("PlayoffRank"),
            moves: cell("Moves"),
            trades: cell("Trades"),
        }
    }
}

/// Lowest regular-season rank that lands in the toilet bowl
pub fn toilet_bowl_threshold(team_count: usize) -> u32 {
    let n = u32::try_from(team_count).unwrap_or(u32::MAX);
    n.saturating_sub(3).max(1)
}

// ============================================================================
// CAREER AGGREGATOR
// ============================================================================

pub struct CareerAggregator {
    playoff_cutoff: u32,
    aliases: ManagerAliases,
    managers: BTreeMap<String, ManagerAggregate>,
    seasons_folded: usize,
}

impl CareerAggregator {
    pub fn new(aliases: ManagerAliases) -> Self {
        CareerAggregator {
            playoff_cutoff: DEFAULT_PLAYOFF_CUTOFF,
            aliases,
            managers: BTreeMap::new(),
            seasons_folded: 0,
        }
    }

    /// Clamped to at least 1 so a champion always made the playoffs
    pub fn with_playoff_cutoff(mut self, cutoff: u32) -> Self {
        self.playoff_cutoff = cutoff.max(1);
        self
    }

    pub fn seasons_folded(&self) -> usize {
        self.seasons_folded
    }

    /// Add one season. n is the number of rows, blank managers included.
    pub fn fold_season(&mut self, season: &str, rows: &[SeasonRow]) {
        let threshold = toilet_bowl_threshold(rows.len());
        let mut seen: HashSet<String> = HashSet::new();
        let mut made_playoffs: HashSet<String> = HashSet::new();
        let mut champions: HashSet<String> = HashSet::new();
        let mut toilet: HashSet<String> = HashSet::new();

        for row in rows {
            let manager = self.aliases.canonicalize(&row.manager_name);
            if manager.is_empty() {
                log::debug!("season {}: row without a manager skipped", season);
                continue;
            }

            let agg = self
                .managers
                .entry(manager.clone())
                .or_insert_with(|| ManagerAggregate::new(manager.clone()));

            let (wins, losses, ties) = parse_record(&row.record);
            agg.wins += wins;
            agg.losses += losses;
            agg.ties += ties;
            agg.points_for += coerce_float(&row.points_for);
            agg.points_against += coerce_float(&row.points_against);
            agg.moves += coerce_int(&row.moves);
            agg.trades += coerce_int(&row.trades);

            if seen.insert(manager.clone()) {
                agg.seasons += 1;
            }

            let playoff_rank = digits_only(&row.playoff_rank);
            if playoff_rank >= 1 && playoff_rank <= self.playoff_cutoff && made_playoffs.insert(manager.clone()) {
                agg.playoffs += 1;
            }
            if playoff_rank == 1 && champions.insert(manager.clone()) {
                agg.championships += 1;
            }

            let regular_rank = digits_only(&row.regular_season_rank);
            if regular_rank >= threshold && toilet.insert(manager) {
                agg.toilet_bowls += 1;
            }
        }

        self.seasons_folded += 1;
        log::debug!("season {}: folded {} rows (toilet bowl from rank {})", season, rows.len(), threshold);
    }

    /// Validate a season table's columns, then fold its rows
    pub fn fold_table(&mut self, season: &str, table: &CsvTable) -> Result<()> {
        let index = table.index();
        index.require(&AGGREGATE_INPUT_COLUMNS)?;
        let rows: Vec<SeasonRow> = table
            .rows
            .iter()
            .map(|record| SeasonRow::from_record(&index, record))
            .collect();
        self.fold_season(season, &rows);
        Ok(())
    }

    /// Managers sorted case-insensitively by name
    pub fn finalize(self) -> Vec<ManagerAggregate> {
        let mut managers: Vec<ManagerAggregate> = self.managers.into_values().collect();
        managers.sort_by_key(|m| m.manager_name.to_lowercase());
        managers
    }
}

// ============================================================================
// INPUTS
// ============================================================================

/// Fold every `<season>.csv` in a directory, in filename order
pub fn aggregate_directory(dir: &Path, aggregator: &mut CareerAggregator) -> Result<usize> {
    let files = season_files(dir)?;
    if files.is_empty() {
        return Err(LeagueError::NoSeasonFiles {
            dir: dir.to_path_buf(),
        });
    }
    for (season, path) in &files {
        let table = CsvTable::read(path)?;
        aggregator.fold_table(season, &table)?;
        log::info!("Aggregated season {} from {}", season, path.display());
    }
    Ok(files.len())
}

/// Fold the long-format all-seasons table, grouped by its Season column
pub fn aggregate_long_format(path: &Path, aggregator: &mut CareerAggregator) -> Result<usize> {
    let table = CsvTable::read(path)?;
    let index = table.index();
    index.require(&[SEASON])?;
    index.require(&AGGREGATE_INPUT_COLUMNS)?;

    let mut by_season: BTreeMap<String, Vec<SeasonRow>> = BTreeMap::new();
    for record in &table.rows {
        let season = index.get_or_empty(record, SEASON).trim().to_string();
        if season.is_empty() {
            log::debug!("{}: row without a season skipped", path.display());
            continue;
        }
        by_season
            .entry(season)
            .or_default()
            .push(SeasonRow::from_record(&index, record));
    }

    if by_season.is_empty() {
        return Err(LeagueError::NoSeasonFiles {
            dir: path.to_path_buf(),
        });
    }

    for (season, rows) in &by_season {
        aggregator.fold_season(season, rows);
    }
    Ok(by_season.len())
}

// ============================================================================
// OUTPUT
// ============================================================================

pub fn write_aggregate_csv(path: &Path, managers: &[ManagerAggregate]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(AGGREGATE_HEADER)?;
    for manager in managers {
        writer.write_record(manager.to_record())?;
    }
    writer.flush()?;
    log::info!("Wrote {} managers to {}", managers.len(), path.display());
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

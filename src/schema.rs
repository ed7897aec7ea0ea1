// 📐 Shape Layer - column contracts for every CSV we read or write
//
// Files are validated by header before any row is touched. "First file sets
// the header" is two explicit phases here: HeaderGuard establishes, then
// validates. Roster tables have repeating column names ("Points" after every
// slot), so their union is keyed by (name, occurrence).

use crate::error::{LeagueError, Result};
use csv::StringRecord;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

// ============================================================================
// COLUMN SETS
// ============================================================================

pub const SEASON: &str = "Season";
pub const WEEK: &str = "Week";
pub const OWNER: &str = "Owner";
pub const MANAGER_NAME: &str = "ManagerName";
pub const TEAM_NAME: &str = "TeamName";

/// Per-season standings, in output order
pub const STANDINGS_HEADER: [&str; 10] = [
    "TeamID",
    "TeamName",
    "RegularSeasonRank",
    "Record",
    "PointsFor",
    "PointsAgainst",
    "PlayoffRank",
    MANAGER_NAME,
    "Moves",
    "Trades",
];

/// Columns the career aggregator reads from a season file
pub const AGGREGATE_INPUT_COLUMNS: [&str; 8] = [
    MANAGER_NAME,
    "RegularSeasonRank",
    "Record",
    "PointsFor",
    "PointsAgainst",
    "PlayoffRank",
    "Moves",
    "Trades",
];

pub const AGGREGATE_HEADER: [&str; 12] = [
    MANAGER_NAME,
    "Seasons",
    "Wins",
    "Losses",
    "Ties",
    "PointsFor",
    "PointsAgainst",
    "Moves",
    "Trades",
    "Playoffs",
    "Championships",
    "Toilet Bowl",
];

pub fn header_strings(columns: &[&str]) -> Vec<String> {
    columns.iter().map(|c| c.to_string()).collect()
}

// ============================================================================
// CSV TABLE
// ============================================================================

/// A whole CSV file: header plus data rows
#[derive(Debug, Clone)]
pub struct CsvTable {
    pub file: PathBuf,
    pub header: StringRecord,
    pub rows: Vec<StringRecord>,
}

impl CsvTable {
    pub fn read(path: &Path) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)?;

        let header = reader.headers()?.clone();
        let mut rows = Vec::new();
        for result in reader.records() {
            rows.push(result?);
        }

        Ok(CsvTable {
            file: path.to_path_buf(),
            header,
            rows,
        })
    }

    /// A file with no header line at all
    pub fn is_blank(&self) -> bool {
        self.header.is_empty()
    }

    pub fn header_strings(&self) -> Vec<String> {
        self.header.iter().map(str::to_string).collect()
    }

    pub fn index(&self) -> ColumnIndex {
        ColumnIndex::new(&self.file, &self.header)
    }
}

pub fn record_strings(record: &StringRecord) -> Vec<String> {
    record.iter().map(str::to_string).collect()
}

// ============================================================================
// COLUMN INDEX
// ============================================================================

/// Name → position lookup over one file's header (first occurrence wins)
#[derive(Debug, Clone)]
pub struct ColumnIndex {
    file: PathBuf,
    names: Vec<String>,
    positions: HashMap<String, usize>,
}

impl ColumnIndex {
    pub fn new(file: &Path, header: &StringRecord) -> Self {
        let names: Vec<String> = header.iter().map(|h| h.trim().to_string()).collect();
        let mut positions = HashMap::new();
        for (i, name) in names.iter().enumerate() {
            positions.entry(name.clone()).or_insert(i);
        }
        ColumnIndex {
            file: file.to_path_buf(),
            names,
            positions,
        }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, column: &str) -> bool {
        self.positions.contains_key(column)
    }

    pub fn position(&self, column: &str) -> Option<usize> {
        self.positions.get(column).copied()
    }

    /// Every listed column must be present
    pub fn require(&self, columns: &[&str]) -> Result<()> {
        let missing: Vec<String> = columns
            .iter()
            .filter(|c| !self.contains(c))
            .map(|c| c.to_string())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(LeagueError::MissingColumns {
                file: self.file.clone(),
                missing,
            })
        }
    }

    /// Cell text by column name; None when the column or the cell is absent
    pub fn get<'r>(&self, record: &'r StringRecord, column: &str) -> Option<&'r str> {
        self.position(column).and_then(|i| record.get(i))
    }

    pub fn get_or_empty<'r>(&self, record: &'r StringRecord, column: &str) -> &'r str {
        self.get(record, column).unwrap_or("")
    }
}

// ============================================================================
// HEADER GUARD
// ============================================================================

/// The first header seen becomes the contract for every later file
#[derive(Debug, Default)]
pub struct HeaderGuard {
    expected: Option<Vec<String>>,
}

impl HeaderGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expected(&self) -> Option<&[String]> {
        self.expected.as_deref()
    }

    pub fn check(&mut self, file: &Path, header: &[String]) -> Result<()> {
        match &self.expected {
            None => {
                self.expected = Some(header.to_vec());
                Ok(())
            }
            Some(expected) if expected.as_slice() == header => Ok(()),
            Some(expected) => Err(LeagueError::HeaderMismatch {
                file: file.to_path_buf(),
                expected: expected.clone(),
                got: header.to_vec(),
            }),
        }
    }
}

// ============================================================================
// COLUMN UNION
// ============================================================================

/// A column identified by its name and how many times that name came before
pub type ColumnKey = (String, usize);

fn keyed(header: &[String]) -> Vec<ColumnKey> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    header
        .iter()
        .map(|name| {
            let count = seen.entry(name.as_str()).or_insert(0);
            let key = (name.clone(), *count);
            *count += 1;
            key
        })
        .collect()
}

/// Union of headers in first-seen order
#[derive(Debug, Default)]
pub struct ColumnUnion {
    keys: Vec<ColumnKey>,
    slots: HashMap<ColumnKey, usize>,
}

impl ColumnUnion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, header: &[String]) {
        for key in keyed(header) {
            if !self.slots.contains_key(&key) {
                self.slots.insert(key.clone(), self.keys.len());
                self.keys.push(key);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Output header: plain names, repeats included
    pub fn header(&self) -> Vec<String> {
        self.keys.iter().map(|(name, _)| name.clone()).collect()
    }

    /// Unique names for keyed outputs: "Points", "Points_2", ...
    pub fn unique_names(&self) -> Vec<String> {
        self.keys
            .iter()
            .map(|(name, n)| {
                if *n == 0 {
                    name.clone()
                } else {
                    format!("{}_{}", name, n + 1)
                }
            })
            .collect()
    }

    /// Place a row written under `header` into union order, "" where absent
    pub fn project(&self, header: &[String], row: &[String]) -> Vec<String> {
        let mut out = vec![String::new(); self.keys.len()];
        for (key, value) in keyed(header).into_iter().zip(row) {
            if let Some(&slot) = self.slots.get(&key) {
                out[slot] = value.clone();
            }
        }
        out
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_header(names: &[&str]) -> StringRecord {
        StringRecord::from(names.to_vec())
    }

    fn strings(names: &[&str]) -> Vec<String> {
        header_strings(names)
    }

    #[test]
    fn test_require_reports_every_missing_column() {
        let index = ColumnIndex::new(Path::new("2019.csv"), &create_test_header(&["ManagerName", "Record"]));
        let err = index.require(&AGGREGATE_INPUT_COLUMNS).unwrap_err();

        match err {
            LeagueError::MissingColumns { file, missing } => {
                assert_eq!(file, PathBuf::from("2019.csv"));
                assert_eq!(missing.len(), 6);
                assert!(missing.contains(&"PlayoffRank".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_get_by_name_trims_header() {
        let index = ColumnIndex::new(Path::new("x.csv"), &create_test_header(&[" ManagerName ", "Moves"]));
        let record = StringRecord::from(vec!["Dana", "12"]);

        assert_eq!(index.get(&record, "ManagerName"), Some("Dana"));
        assert_eq!(index.get_or_empty(&record, "Trades"), "");
    }

    #[test]
    fn test_header_guard_two_phases() {
        let mut guard = HeaderGuard::new();
        let header = strings(&STANDINGS_HEADER);

        guard.check(Path::new("2012.csv"), &header).unwrap();
        guard.check(Path::new("2013.csv"), &header).unwrap();

        let mut reordered = header.clone();
        reordered.swap(0, 1);
        let err = guard.check(Path::new("2014.csv"), &reordered).unwrap_err();
        assert!(err.to_string().contains("2014.csv"));
    }

    #[test]
    fn test_union_keeps_repeated_columns() {
        let mut union = ColumnUnion::new();
        let week_one = strings(&["Owner", "QB", "Points", "RB", "Points", "Total"]);
        let week_two = strings(&["Owner", "QB", "Points", "RB", "Points", "BN1", "Points", "Total"]);
        union.extend(&week_one);
        union.extend(&week_two);

        assert_eq!(
            union.header(),
            strings(&["Owner", "QB", "Points", "RB", "Points", "Total", "BN1", "Points"])
        );

        let row = strings(&["Dana", "Allen", "20.00", "Henry", "9.10", "29.10"]);
        assert_eq!(
            union.project(&week_one, &row),
            strings(&["Dana", "Allen", "20.00", "Henry", "9.10", "29.10", "", ""])
        );
    }

    #[test]
    fn test_unique_names_suffix_repeats() {
        let mut union = ColumnUnion::new();
        union.extend(&strings(&["QB", "Points", "RB", "Points"]));
        assert_eq!(union.unique_names(), strings(&["QB", "Points", "RB", "Points_2"]));
    }
}

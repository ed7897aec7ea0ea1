// 🔗 Cross-Season Combiner - long-format standings and roster tables
//
// Standings: the first season file fixes the header and every other file must
// match it exactly. Rosters: week layouts differ (bench length, slots), so the
// combined header is the union of all week headers in first-seen order.
//
// This is a cross-season seam: manager names are canonicalized here.

use crate::aliases::ManagerAliases;
use crate::error::{LeagueError, Result};
use crate::schema::{record_strings, ColumnUnion, CsvTable, HeaderGuard, MANAGER_NAME, OWNER, SEASON, WEEK};
use std::fs;
use std::path::{Path, PathBuf};

/// What a combine pass read and wrote
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CombineReport {
    pub files: usize,
    pub rows: usize,
    pub skipped: Vec<PathBuf>,
}

impl CombineReport {
    pub fn summary(&self) -> String {
        format!(
            "{} files, {} rows ({} skipped)",
            self.files,
            self.rows,
            self.skipped.len()
        )
    }
}

fn csv_stem(path: &Path) -> Option<&str> {
    if path.extension().and_then(|e| e.to_str()) != Some("csv") {
        return None;
    }
    path.file_stem().and_then(|s| s.to_str())
}

fn is_all_digits(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_ascii_digit())
}

// ============================================================================
// SEASON FILES
// ============================================================================

/// `<season>.csv` files in lexical filename order
pub fn season_files(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        match csv_stem(&path) {
            Some(stem) if is_all_digits(stem) => files.push((stem.to_string(), path.clone())),
            _ => log::debug!("Not a season file: {}", path.display()),
        }
    }
    files.sort_by(|a, b| a.1.file_name().cmp(&b.1.file_name()));
    Ok(files)
}

/// Concatenate season files into one table with a leading Season column
pub fn combine_standings(dir: &Path, out: &Path, aliases: &ManagerAliases) -> Result<CombineReport> {
    let files = season_files(dir)?;
    if files.is_empty() {
        return Err(LeagueError::NoSeasonFiles {
            dir: dir.to_path_buf(),
        });
    }

    let mut guard = HeaderGuard::new();
    let mut output: Vec<Vec<String>> = Vec::new();
    let mut report = CombineReport::default();

    for (season, path) in &files {
        let table = CsvTable::read(path)?;
        if table.is_blank() {
            report.skipped.push(path.clone());
            continue;
        }
        let header = table.header_strings();
        guard.check(path, &header)?;

        let manager_col = table.index().position(MANAGER_NAME);
        for record in &table.rows {
            let mut row = Vec::with_capacity(header.len() + 1);
            row.push(season.clone());
            row.extend(record_strings(record));
            if let Some(i) = manager_col {
                if let Some(cell) = row.get_mut(i + 1) {
                    *cell = aliases.canonicalize(cell);
                }
            }
            output.push(row);
        }
        report.files += 1;
    }

    let Some(expected) = guard.expected() else {
        return Err(LeagueError::NoSeasonFiles {
            dir: dir.to_path_buf(),
        });
    };

    let mut header = vec![SEASON.to_string()];
    header.extend(expected.iter().cloned());
    report.rows = output.len();
    write_rows(out, &header, &output)?;

    log::info!("Combined standings -> {} ({})", out.display(), report.summary());
    Ok(report)
}

// ============================================================================
// WEEK FILES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekFile {
    pub season: u16,
    pub week: u16,
    pub path: PathBuf,
}

/// "2023-7" → (2023, 7)
pub fn parse_week_stem(stem: &str) -> Option<(u16, u16)> {
    let (season, week) = stem.split_once('-')?;
    if !is_all_digits(season) || !is_all_digits(week) {
        return None;
    }
    Some((season.parse().ok()?, week.parse().ok()?))
}

/// Every `<season>/<season>-<week>.csv` under the game-center root, by (season, week)
pub fn week_files(root: &Path) -> Result<Vec<WeekFile>> {
    let mut files = Vec::new();
    for season_dir in fs::read_dir(root)? {
        let season_dir = season_dir?.path();
        if !season_dir.is_dir() {
            continue;
        }
        for entry in fs::read_dir(&season_dir)? {
            let path = entry?.path();
            match csv_stem(&path).and_then(parse_week_stem) {
                Some((season, week)) => files.push(WeekFile { season, week, path }),
                None => log::debug!("Not a week file: {}", path.display()),
            }
        }
    }
    files.sort_by_key(|f| (f.season, f.week));
    Ok(files)
}

/// Union all week tables into one, with leading Season and Week columns
pub fn combine_weeks(root: &Path, out: &Path, aliases: &ManagerAliases) -> Result<CombineReport> {
    let mut report = CombineReport::default();
    let mut union = ColumnUnion::new();
    let mut tables = Vec::new();

    for file in week_files(root)? {
        let table = CsvTable::read(&file.path)?;
        if table.is_blank() {
            report.skipped.push(file.path.clone());
            continue;
        }
        let header = table.header_strings();
        union.extend(&header);
        tables.push((file, header, table));
    }

    // Owner, else a manager-name column, is the canonicalized one
    let columns = union.header();
    let name_col = columns
        .iter()
        .position(|c| c == OWNER)
        .or_else(|| columns.iter().position(|c| c == MANAGER_NAME));

    let mut output = Vec::new();
    for (file, header, table) in &tables {
        for record in &table.rows {
            let mut cells = union.project(header, &record_strings(record));
            if let Some(i) = name_col {
                cells[i] = aliases.canonicalize(&cells[i]);
            }
            let mut row = vec![file.season.to_string(), file.week.to_string()];
            row.extend(cells);
            output.push(row);
        }
        report.files += 1;
    }

    let mut header = vec![SEASON.to_string(), WEEK.to_string()];
    header.extend(columns);
    report.rows = output.len();
    write_rows(out, &header, &output)?;

    log::info!("Combined weeks -> {} ({})", out.display(), report.summary());
    Ok(report)
}

fn write_rows(out: &Path, header: &[String], rows: &[Vec<String>]) -> Result<()> {
    if let Some(parent) = out.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(out)?;
    writer.write_record(header)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_file(path: &Path, text: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, text).unwrap();
    }

    const HEADER: &str = "TeamID,TeamName,RegularSeasonRank,Record,PointsFor,PointsAgainst,PlayoffRank,ManagerName,Moves,Trades\n";

    #[test]
    fn test_season_files_only_digit_stems() {
        let dir = tempfile::tempdir().unwrap();
        create_test_file(&dir.path().join("2013.csv"), HEADER);
        create_test_file(&dir.path().join("2012.csv"), HEADER);
        create_test_file(&dir.path().join("all_seasons_standings.csv"), HEADER);
        create_test_file(&dir.path().join("notes.txt"), "x");

        let seasons: Vec<String> = season_files(dir.path()).unwrap().into_iter().map(|(s, _)| s).collect();
        assert_eq!(seasons, vec!["2012", "2013"]);
    }

    #[test]
    fn test_combine_standings_canonicalizes_managers() {
        let dir = tempfile::tempdir().unwrap();
        create_test_file(
            &dir.path().join("2012.csv"),
            &format!("{HEADER}1,Gurus,1,10-3-0,1400.00,1200.00,1,Matt,20,1\n"),
        );
        create_test_file(
            &dir.path().join("2013.csv"),
            &format!("{HEADER}1,Gurus,2,9-4-0,1300.00,1250.00,,Matt Van,12,0\n"),
        );
        let out = dir.path().join("all_seasons_standings.csv");

        let report = combine_standings(dir.path(), &out, &ManagerAliases::league_defaults()).unwrap();
        assert_eq!(report.files, 2);
        assert_eq!(report.rows, 2);

        let text = fs::read_to_string(&out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("Season,TeamID,"));
        assert!(lines[1].starts_with("2012,1,Gurus"));
        assert!(lines[1].contains(",Matt Van,"));
        assert!(lines[2].contains(",Matt Van,"));

        // Per-season file keeps the scraped name
        assert!(fs::read_to_string(dir.path().join("2012.csv")).unwrap().contains(",Matt,"));
    }

    #[test]
    fn test_combine_standings_rejects_header_drift() {
        let dir = tempfile::tempdir().unwrap();
        create_test_file(&dir.path().join("2012.csv"), HEADER);
        create_test_file(&dir.path().join("2013.csv"), "TeamID,TeamName\n1,A\n");

        let err = combine_standings(dir.path(), &dir.path().join("out.csv"), &ManagerAliases::new()).unwrap_err();
        assert!(matches!(err, LeagueError::HeaderMismatch { .. }));
    }

    #[test]
    fn test_combine_standings_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        let err = combine_standings(dir.path(), &dir.path().join("out.csv"), &ManagerAliases::new()).unwrap_err();
        assert!(matches!(err, LeagueError::NoSeasonFiles { .. }));
    }

    #[test]
    fn test_parse_week_stem() {
        assert_eq!(parse_week_stem("2023-7"), Some((2023, 7)));
        assert_eq!(parse_week_stem("2023-7-old"), None);
        assert_eq!(parse_week_stem("2023"), None);
        assert_eq!(parse_week_stem("all_seasons_combined"), None);
    }

    #[test]
    fn test_combine_weeks_union_and_numeric_order() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        create_test_file(
            &root.join("2023").join("2023-10.csv"),
            "Owner,QB,Points,BN1,Points,Total\nMatt,Allen,20.00,Pacheco,4.00,20.00\n",
        );
        create_test_file(
            &root.join("2023").join("2023-2.csv"),
            "Owner,QB,Points,Total\nDana,Burrow,18.50,18.50\n",
        );
        create_test_file(&root.join("2023").join("scratch.csv"), "Owner\nNobody\n");
        let out = root.join("all_seasons_combined.csv");

        let report = combine_weeks(root, &out, &ManagerAliases::league_defaults()).unwrap();
        assert_eq!(report.files, 2);
        assert_eq!(report.rows, 2);

        let text = fs::read_to_string(&out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Season,Week,Owner,QB,Points,Total,BN1,Points");
        assert_eq!(lines[1], "2023,2,Dana,Burrow,18.50,18.50,,");
        assert_eq!(lines[2], "2023,10,Matt Van,Allen,20.00,20.00,Pacheco,4.00");
    }

    #[test]
    fn test_combine_weeks_falls_back_to_manager_name() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        create_test_file(
            &root.join("2021").join("2021-1.csv"),
            "ManagerName,Total\nFancett,101.00\nDana,95.50\n",
        );
        create_test_file(
            &root.join("2021").join("2021-2.csv"),
            "ManagerName,Total\nMatt,88.25\n",
        );
        let out = root.join("all_seasons_combined.csv");

        let report = combine_weeks(root, &out, &ManagerAliases::league_defaults()).unwrap();
        assert_eq!(report.rows, 3);

        let text = fs::read_to_string(&out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Season,Week,ManagerName,Total");
        assert_eq!(lines[1], "2021,1,Big Dog,101.00");
        assert_eq!(lines[2], "2021,1,Dana,95.50");
        assert_eq!(lines[3], "2021,2,Matt Van,88.25");
    }
}

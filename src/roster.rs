// 📋 Roster Row Builder - one rectangular box-score row per team-week
//
// Teams in the same league-week can carry different bench sizes (IR slots and
// the like). The week's header is built once from the team with the longest
// bench; every other team is padded with "-" so all rows share that width.
//
// Padding happens BEFORE names and points are paired by position. A team
// one slot short would otherwise shift every column after it.

use crate::error::{LeagueError, Result};
use crate::numeric::{first_number, format_points, parse_decimal, to_cents};
use std::path::Path;

/// Placeholder for any cell the page did not provide
pub const SENTINEL: &str = "-";

// ============================================================================
// INPUT: ONE TEAM'S WEEK PAGE
// ============================================================================

/// Raw values read from one team's game-center page for one week
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamWeek {
    pub owner: String,
    /// Numeric standings rank, or "-"
    pub rank: String,
    pub team_name: String,
    /// Non-bench slot labels in page order (QB, RB, RB, WR, ...)
    pub starter_slots: Vec<String>,
    pub starter_names: Vec<String>,
    pub bench_names: Vec<String>,
    /// Every point cell of the team's side: starters first, then bench
    pub points: Vec<String>,
    pub total: String,
    pub projected_total: String,
    pub opponent: String,
    pub opponent_total: String,
}

impl TeamWeek {
    pub fn bench_len(&self) -> usize {
        self.bench_names.len()
    }
}

// ============================================================================
// DERIVED FIELDS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    Win,
    Loss,
    Tie,
    Bye,
    /// Opponent exists but a total did not parse (cancelled / unscored)
    Unknown,
}

impl GameResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameResult::Win => "Win",
            GameResult::Loss => "Loss",
            GameResult::Tie => "Tie",
            GameResult::Bye => "Bye",
            GameResult::Unknown => "Unknown",
        }
    }

    pub fn is_determinate(&self) -> bool {
        matches!(self, GameResult::Win | GameResult::Loss | GameResult::Tie)
    }
}

fn has_opponent(opponent: &str) -> bool {
    let opponent = opponent.trim();
    !opponent.is_empty() && opponent != SENTINEL
}

/// Totals compared at two-decimal precision, the precision they are written at
pub fn compute_result(total: &str, opponent_total: &str, opponent: &str) -> GameResult {
    if !has_opponent(opponent) {
        return GameResult::Bye;
    }

    match diff_cents(total, opponent_total).map(|cents| cents.cmp(&0)) {
        Some(std::cmp::Ordering::Greater) => GameResult::Win,
        Some(std::cmp::Ordering::Less) => GameResult::Loss,
        Some(std::cmp::Ordering::Equal) => GameResult::Tie,
        None => GameResult::Unknown,
    }
}

/// Team total minus opponent total, two decimals, or "-"
pub fn compute_diff(total: &str, opponent_total: &str) -> String {
    match diff_cents(total, opponent_total) {
        Some(cents) => format_points(cents as f64 / 100.0),
        None => SENTINEL.to_string(),
    }
}

/// None when either total is missing or out of range
fn diff_cents(total: &str, opponent_total: &str) -> Option<i64> {
    let ours = to_cents(first_number(total)?)?;
    let theirs = to_cents(first_number(opponent_total)?)?;
    ours.checked_sub(theirs)
}

/// The result and the sign of the differential must tell the same story
pub fn result_agrees_with_diff(result: GameResult, diff: &str) -> bool {
    if !result.is_determinate() {
        return true;
    }
    let Some(d) = parse_decimal(diff) else {
        return true;
    };
    match result {
        GameResult::Win => d > 0.0,
        GameResult::Loss => d < 0.0,
        GameResult::Tie => d == 0.0,
        GameResult::Bye | GameResult::Unknown => true,
    }
}

/// A starter's name and points as written to the row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StarterScore {
    pub name: String,
    pub points: String,
}

impl StarterScore {
    pub fn sentinel() -> Self {
        StarterScore {
            name: SENTINEL.to_string(),
            points: SENTINEL.to_string(),
        }
    }
}

/// Highest and lowest scoring starter. Bench slots never count; neither do
/// empty slots or unparseable points. Earliest slot wins ties.
pub fn compute_starter_extremes(
    names: &[String],
    points: &[String],
    starter_count: usize,
) -> (StarterScore, StarterScore) {
    let mut top: Option<(f64, &str)> = None;
    let mut low: Option<(f64, &str)> = None;

    let limit = starter_count.min(names.len()).min(points.len());
    for i in 0..limit {
        let name = names[i].trim();
        if name.is_empty() || name == SENTINEL {
            continue;
        }
        let Some(pts) = first_number(&points[i]) else {
            continue;
        };

        if top.map_or(true, |(best, _)| pts > best) {
            top = Some((pts, name));
        }
        if low.map_or(true, |(worst, _)| pts < worst) {
            low = Some((pts, name));
        }
    }

    match (top, low) {
        (Some((top_pts, top_name)), Some((low_pts, low_name))) => (
            StarterScore {
                name: top_name.to_string(),
                points: format_points(top_pts),
            },
            StarterScore {
                name: low_name.to_string(),
                points: format_points(low_pts),
            },
        ),
        _ => (StarterScore::sentinel(), StarterScore::sentinel()),
    }
}

/// Extend with the sentinel (or cut) to exactly `target` entries
fn pad_to(mut items: Vec<String>, target: usize) -> Vec<String> {
    items.resize(target, SENTINEL.to_string());
    items
}

// ============================================================================
// WEEK LAYOUT (HEADER)
// ============================================================================

/// Shape shared by every row of one league-week
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekLayout {
    pub season: u16,
    pub week: u16,
    pub starter_slots: Vec<String>,
    pub longest_bench: usize,
}

impl WeekLayout {
    /// Anchor the layout on the team with the longest bench (first one wins ties)
    pub fn from_teams(season: u16, week: u16, teams: &[(String, TeamWeek)]) -> Result<Self> {
        let mut anchor: Option<&TeamWeek> = None;
        for (_, team) in teams {
            if anchor.map_or(true, |best| team.bench_len() > best.bench_len()) {
                anchor = Some(team);
            }
        }
        let anchor = anchor.ok_or(LeagueError::EmptyWeek { season, week })?;

        Ok(WeekLayout {
            season,
            week,
            starter_slots: anchor.starter_slots.clone(),
            longest_bench: anchor.bench_len(),
        })
    }

    pub fn roster_len(&self) -> usize {
        self.starter_slots.len() + self.longest_bench
    }

    pub fn header(&self) -> Vec<String> {
        let mut header: Vec<String> = [
            "Owner",
            "Rank",
            "Result",
            "Diff",
            "Top Starter",
            "Top Starter Points",
            "Low Starter",
            "Low Starter Points",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        for slot in &self.starter_slots {
            header.push(slot.clone());
            header.push("Points".to_string());
        }
        for i in 1..=self.longest_bench {
            header.push(format!("BN{}", i));
            header.push("Points".to_string());
        }

        header.extend(
            ["Total", "Projected Total", "Opponent", "Opponent Total"]
                .iter()
                .map(|s| s.to_string()),
        );
        header
    }
}

// ============================================================================
// ROW
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct RosterWeekRow {
    pub owner: String,
    pub rank: String,
    pub result: GameResult,
    pub diff: String,
    pub top_starter: StarterScore,
    pub low_starter: StarterScore,
    /// (name, points) per starter slot, in header order
    pub starters: Vec<(String, String)>,
    /// (name, points) per bench slot, padded to the week's longest bench
    pub bench: Vec<(String, String)>,
    pub total: String,
    pub projected_total: String,
    pub opponent: String,
    pub opponent_total: String,
}

impl RosterWeekRow {
    pub fn to_record(&self) -> Vec<String> {
        let mut record = vec![
            self.owner.clone(),
            self.rank.clone(),
            self.result.as_str().to_string(),
            self.diff.clone(),
            self.top_starter.name.clone(),
            self.top_starter.points.clone(),
            self.low_starter.name.clone(),
            self.low_starter.points.clone(),
        ];
        for (name, points) in self.starters.iter().chain(self.bench.iter()) {
            record.push(name.clone());
            record.push(points.clone());
        }
        record.extend([
            self.total.clone(),
            self.projected_total.clone(),
            self.opponent.clone(),
            self.opponent_total.clone(),
        ]);
        record
    }
}

/// Never emit an empty cell: blanks become the sentinel
fn cell(value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        SENTINEL.to_string()
    } else {
        value.to_string()
    }
}

pub struct RosterRowBuilder<'a> {
    layout: &'a WeekLayout,
}

impl<'a> RosterRowBuilder<'a> {
    pub fn new(layout: &'a WeekLayout) -> Self {
        RosterRowBuilder { layout }
    }

    /// Postcondition on a built row: Win needs a positive diff, Loss a
    /// negative one, Tie zero
    fn check_consistency(&self, team_id: &str, team: &TeamWeek, result: GameResult, diff: &str) -> Result<()> {
        if result_agrees_with_diff(result, diff) {
            return Ok(());
        }
        Err(LeagueError::Inconsistent {
            season: self.layout.season,
            week: self.layout.week,
            team: team_id.to_string(),
            result: result.as_str().to_string(),
            diff: diff.to_string(),
            total: team.total.clone(),
            opp_total: team.opponent_total.clone(),
        })
    }

    pub fn build(&self, team_id: &str, team: &TeamWeek) -> Result<RosterWeekRow> {
        let starter_count = self.layout.starter_slots.len();
        let roster_len = self.layout.roster_len();

        // Starters, then bench padded to the longest bench, then the whole
        // roster forced to the header's slot count
        let mut names: Vec<String> = team.starter_names.iter().map(|n| cell(n)).collect();
        names.extend(pad_to(
            team.bench_names.iter().map(|n| cell(n)).collect(),
            self.layout.longest_bench,
        ));
        let names = pad_to(names, roster_len);
        let points = pad_to(team.points.iter().map(|p| cell(p)).collect(), roster_len);

        let (top_starter, low_starter) = compute_starter_extremes(&names, &points, starter_count);

        let mut pairs = names.into_iter().zip(points);
        let starters: Vec<(String, String)> = pairs.by_ref().take(starter_count).collect();
        let bench: Vec<(String, String)> = pairs.collect();

        let result = compute_result(&team.total, &team.opponent_total, &team.opponent);
        let diff = compute_diff(&team.total, &team.opponent_total);

        self.check_consistency(team_id, team, result, &diff)?;

        Ok(RosterWeekRow {
            owner: cell(&team.owner),
            rank: cell(&team.rank),
            result,
            diff,
            top_starter,
            low_starter,
            starters,
            bench,
            total: cell(&team.total),
            projected_total: cell(&team.projected_total),
            opponent: cell(&team.opponent),
            opponent_total: cell(&team.opponent_total),
        })
    }
}

// ============================================================================
// WEEK TABLE
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct WeekTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

fn check_width(layout: &WeekLayout, team_id: &str, row: &[String], header: usize) -> Result<()> {
    if row.len() == header {
        return Ok(());
    }
    Err(LeagueError::WidthMismatch {
        season: layout.season,
        week: layout.week,
        team: team_id.to_string(),
        row: row.len(),
        header,
    })
}

/// Header + one row per team, in the order given. Any row whose width
/// differs from the header aborts the week.
pub fn build_week_table(season: u16, week: u16, teams: &[(String, TeamWeek)]) -> Result<WeekTable> {
    let layout = WeekLayout::from_teams(season, week, teams)?;
    let header = layout.header();
    let builder = RosterRowBuilder::new(&layout);

    let mut rows = Vec::with_capacity(teams.len());
    for (team_id, team) in teams {
        let row = builder.build(team_id, team)?.to_record();
        check_width(&layout, team_id, &row, header.len())?;
        rows.push(row);
    }

    log::debug!(
        "season {} week {}: {} rows, {} columns (longest bench {})",
        season,
        week,
        rows.len(),
        header.len(),
        layout.longest_bench
    );

    Ok(WeekTable { header, rows })
}

pub fn write_week_csv(path: &Path, table: &WeekTable) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&table.header)?;
    for row in &table.rows {
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

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn create_test_team(owner: &str, bench: &[&str], total: &str, opp_total: &str) -> TeamWeek {
        let mut points = strings(&["22.10", "15.40", "9.80"]);
        points.extend(bench.iter().map(|_| "4.00".to_string()));
        TeamWeek {
            owner: owner.to_string(),
            rank: "3".to_string(),
            team_name: format!("{} Team", owner),
            starter_slots: strings(&["QB", "RB", "WR"]),
            starter_names: strings(&["Josh Allen QB - BUF", "Derrick Henry RB - BAL", "Puka Nacua WR - LAR"]),
            bench_names: strings(bench),
            points,
            total: total.to_string(),
            projected_total: "101.20".to_string(),
            opponent: "Sackville".to_string(),
            opponent_total: opp_total.to_string(),
        }
    }

    #[test]
    fn test_compute_result() {
        assert_eq!(compute_result("110.5", "98.2", "Sackville"), GameResult::Win);
        assert_eq!(compute_result("88.00", "98.2", "Sackville"), GameResult::Loss);
        assert_eq!(compute_result("98.20", "98.2", "Sackville"), GameResult::Tie);
        assert_eq!(compute_result("98.20", "-", "Sackville"), GameResult::Unknown);
        assert_eq!(compute_result("98.20", "90.00", "-"), GameResult::Bye);
        assert_eq!(compute_result("98.20", "90.00", "  "), GameResult::Bye);
    }

    #[test]
    fn test_compute_diff() {
        assert_eq!(compute_diff("110.50", "98.25"), "12.25");
        assert_eq!(compute_diff("88", "98.2"), "-10.20");
        assert_eq!(compute_diff("98.2", "98.20"), "0.00");
        assert_eq!(compute_diff("", "98.20"), "-");
    }

    #[test]
    fn test_result_diff_agreement() {
        assert!(result_agrees_with_diff(GameResult::Win, "3.00"));
        assert!(!result_agrees_with_diff(GameResult::Win, "-3.00"));
        assert!(!result_agrees_with_diff(GameResult::Tie, "0.01"));
        assert!(result_agrees_with_diff(GameResult::Loss, "-0.01"));
        assert!(result_agrees_with_diff(GameResult::Bye, "12.00"));
        assert!(result_agrees_with_diff(GameResult::Win, "-"));
    }

    #[test]
    fn test_sign_always_matches_result() {
        let totals = ["0", "0.004", "99.995", "100", "100.01", "87.6", "-"];
        for a in totals {
            for b in totals {
                let result = compute_result(a, b, "Opp");
                let diff = compute_diff(a, b);
                assert!(result_agrees_with_diff(result, &diff), "{a} vs {b}: {result:?} {diff}");
            }
        }
    }

    #[test]
    fn test_absurd_totals_are_unknown() {
        let huge = "99999999999999999";
        let negative_huge = "-99999999999999999";
        assert_eq!(compute_diff(huge, negative_huge), "-");
        assert_eq!(compute_result(huge, negative_huge, "Sackville"), GameResult::Unknown);

        let team = create_test_team("Dana", &[], huge, negative_huge);
        let table = build_week_table(2023, 6, &[("1".to_string(), team)]).unwrap();
        assert_eq!(table.rows[0][2], "Unknown");
        assert_eq!(table.rows[0][3], "-");
    }

    #[test]
    fn test_disagreeing_result_is_rejected() {
        let team = create_test_team("Dana", &[], "100", "90");
        let layout = WeekLayout::from_teams(2023, 7, &[("4".to_string(), team.clone())]).unwrap();
        let builder = RosterRowBuilder::new(&layout);

        assert!(builder.check_consistency("4", &team, GameResult::Win, "10.00").is_ok());
        let err = builder.check_consistency("4", &team, GameResult::Loss, "10.00").unwrap_err();
        assert!(matches!(
            err,
            LeagueError::Inconsistent { season: 2023, week: 7, ref team, ref result, .. }
                if team == "4" && result == "Loss"
        ));
    }

    #[test]
    fn test_short_row_is_rejected() {
        let team = create_test_team("Dana", &["B1"], "100", "90");
        let layout = WeekLayout::from_teams(2023, 8, &[("2".to_string(), team)]).unwrap();
        let row = strings(&["Dana", "3"]);

        assert!(check_width(&layout, "2", &row, 2).is_ok());
        assert!(matches!(
            check_width(&layout, "2", &row, layout.header().len()),
            Err(LeagueError::WidthMismatch { season: 2023, week: 8, row: 2, .. })
        ));
    }

    #[test]
    fn test_starter_extremes_ignore_bench_and_blanks() {
        let names = strings(&["A", "-", "C", "D", "Bench Guy"]);
        let points = strings(&["10.5", "40.0", "abc", "2", "99"]);
        let (top, low) = compute_starter_extremes(&names, &points, 4);
        assert_eq!(top, StarterScore { name: "A".into(), points: "10.50".into() });
        assert_eq!(low, StarterScore { name: "D".into(), points: "2.00".into() });
    }

    #[test]
    fn test_starter_extremes_none_qualify() {
        let names = strings(&["-", "B"]);
        let points = strings(&["10", "--"]);
        let (top, low) = compute_starter_extremes(&names, &points, 2);
        assert_eq!(top, StarterScore::sentinel());
        assert_eq!(low, StarterScore::sentinel());
    }

    #[test]
    fn test_layout_anchors_on_longest_bench() {
        let teams = vec![
            ("1".to_string(), create_test_team("Dana", &["B1"], "100", "90")),
            ("2".to_string(), create_test_team("Matt", &["B1", "B2", "IR"], "90", "100")),
            ("3".to_string(), create_test_team("Kim", &["B1", "B2", "B3"], "90", "100")),
        ];
        let layout = WeekLayout::from_teams(2023, 1, &teams).unwrap();
        assert_eq!(layout.longest_bench, 3);
        assert_eq!(layout.roster_len(), 6);

        let header = layout.header();
        assert_eq!(header.len(), 8 + 2 * 6 + 4);
        assert_eq!(&header[8..10], &["QB".to_string(), "Points".to_string()]);
        assert_eq!(header[14], "BN1");
        assert_eq!(header.last().unwrap(), "Opponent Total");
    }

    #[test]
    fn test_empty_week_is_error() {
        assert!(matches!(
            WeekLayout::from_teams(2023, 4, &[]),
            Err(LeagueError::EmptyWeek { season: 2023, week: 4 })
        ));
    }

    #[test]
    fn test_short_bench_is_padded_not_shifted() {
        let teams = vec![
            ("1".to_string(), create_test_team("Dana", &["Bench One"], "120.00", "100.00")),
            ("2".to_string(), create_test_team("Matt", &["B1", "B2", "B3"], "100.00", "120.00")),
        ];
        let table = build_week_table(2023, 1, &teams).unwrap();

        for row in &table.rows {
            assert_eq!(row.len(), table.header.len());
        }

        let dana = &table.rows[0];
        assert_eq!(dana[0], "Dana");
        assert_eq!(dana[2], "Win");
        assert_eq!(dana[3], "20.00");
        assert_eq!(dana[4], "Josh Allen QB - BUF");
        // BN1 filled, BN2 and BN3 padded with the sentinel
        assert_eq!(&dana[14..20], &strings(&["Bench One", "4.00", "-", "-", "-", "-"])[..]);
        // Totals still land under their own columns
        let total_idx = table.header.iter().position(|h| h == "Total").unwrap();
        assert_eq!(dana[total_idx], "120.00");
        assert_eq!(table.rows[1][2], "Loss");
        assert_eq!(table.rows[1][3], "-20.00");
    }

    #[test]
    fn test_missing_points_are_padded() {
        let mut team = create_test_team("Dana", &["B1"], "100", "100");
        team.points.truncate(2);
        let teams = vec![("7".to_string(), team)];
        let table = build_week_table(2023, 2, &teams).unwrap();
        let row = &table.rows[0];

        assert_eq!(row.len(), table.header.len());
        assert_eq!(row[2], "Tie");
        assert_eq!(row[3], "0.00");
        // WR had no points cell
        assert_eq!(&row[12..14], &strings(&["Puka Nacua WR - LAR", "-"])[..]);
    }

    #[test]
    fn test_bye_week_row() {
        let mut team = create_test_team("Dana", &[], "100", "-");
        team.opponent = "-".to_string();
        let layout = WeekLayout::from_teams(2023, 3, &[("1".to_string(), team.clone())]).unwrap();
        let row = RosterRowBuilder::new(&layout).build("1", &team).unwrap();

        assert_eq!(row.result, GameResult::Bye);
        assert_eq!(row.diff, "-");
        assert_eq!(row.opponent, "-");
        assert!(row.bench.is_empty());
    }

    #[test]
    fn test_blank_cells_become_sentinel() {
        let mut team = create_test_team("", &[], "", "");
        team.projected_total = String::new();
        let layout = WeekLayout::from_teams(2023, 3, &[("1".to_string(), team.clone())]).unwrap();
        let record = RosterRowBuilder::new(&layout).build("1", &team).unwrap().to_record();

        assert!(record.iter().all(|c| !c.is_empty()));
        assert_eq!(record[0], "-");
        assert_eq!(record[2], "Unknown");
    }

    #[test]
    fn test_write_week_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("2023").join("2023-1.csv");
        let teams = vec![("1".to_string(), create_test_team("Dana", &["B1"], "100", "90"))];
        let table = build_week_table(2023, 1, &teams).unwrap();
        write_week_csv(&path, &table).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("Owner,Rank,Result,Diff,"));
        assert_eq!(text.lines().count(), 2);
    }
}

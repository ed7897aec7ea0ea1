// 📝 Season Writer - one standings table per season
//
// Column order is fixed (schema::STANDINGS_HEADER). Rows sort by numeric
// regular-season rank, non-numeric ranks last, then by team name, so reruns
// over the same pages give byte-identical files.

use crate::error::Result;
use crate::numeric::{format_points, parse_rank};
use crate::reconciliation::TeamSeasonRecord;
use crate::schema::STANDINGS_HEADER;
use std::fs;
use std::path::Path;

fn optional_points(value: Option<f64>) -> String {
    value.map(format_points).unwrap_or_default()
}

fn optional_count(value: Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Cells in STANDINGS_HEADER order
pub fn standings_row(record: &TeamSeasonRecord) -> Vec<String> {
    vec![
        record.team_id.clone(),
        record.team_name.clone(),
        record.regular_season_rank.clone(),
        record.record(),
        optional_points(record.points_for),
        optional_points(record.points_against),
        record.playoff_rank.clone(),
        record.manager_name.clone(),
        optional_count(record.moves),
        optional_count(record.trades),
    ]
}

pub fn sort_for_output(records: &mut [TeamSeasonRecord]) {
    records.sort_by(|a, b| {
        let rank_a = parse_rank(&a.regular_season_rank).unwrap_or(u32::MAX);
        let rank_b = parse_rank(&b.regular_season_rank).unwrap_or(u32::MAX);
        rank_a
            .cmp(&rank_b)
            .then_with(|| a.team_name.cmp(&b.team_name))
    });
}

/// Write one season's table, replacing any previous file
pub fn write_season_csv(path: &Path, records: &[TeamSeasonRecord]) -> Result<usize> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut sorted = records.to_vec();
    sort_for_output(&mut sorted);

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(STANDINGS_HEADER)?;
    for record in &sorted {
        writer.write_record(standings_row(record))?;
    }
    writer.flush()?;

    log::info!("Wrote {} teams to {}", sorted.len(), path.display());
    Ok(sorted.len())
}

// ============================================================================
// TESTS
// ============================================================================

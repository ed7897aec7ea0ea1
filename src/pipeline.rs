// 🚚 Pipeline - season and week orchestration over a PageSource
//
// Library modules return typed LeagueErrors; this layer adds run context
// with anyhow and decides what a failure stops. A failed season in a batch
// is logged and reported, and the batch moves on. Everything else stops the
// command that hit it.

use crate::aggregate::{aggregate_directory, aggregate_long_format, write_aggregate_csv, CareerAggregator, ManagerAggregate};
use crate::combine::{combine_standings, combine_weeks, CombineReport};
use crate::config::LeagueConfig;
use crate::export::{
    aggregate_by_manager, standings_by_manager, standings_by_season_team, weeks_by_season_week_owner, write_json,
};
use crate::pages::gamecenter::{extract_team_week, parse_season_length, GAMECENTER_MARKERS, SEASON_LENGTH_MARKERS};
use crate::pages::standings::{
    count_owners, extract_owners, extract_playoffs, extract_regular_standings, FINAL_MARKERS, OWNERS_MARKERS,
    REGULAR_MARKERS,
};
use crate::pages::PageSource;
use crate::reconciliation::SeasonMerger;
use crate::roster::{build_week_table, write_week_csv};
use crate::schema::CsvTable;
use crate::writer::write_season_csv;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

// ============================================================================
// STANDINGS
// ============================================================================

/// Fetch the three standings pages, merge them, write `<season>.csv`
pub fn scrape_season_standings(source: &dyn PageSource, config: &LeagueConfig, season: u16) -> Result<usize> {
    let label = season.to_string();

    let regular_page = source
        .fetch(&config.regular_standings_url(season), REGULAR_MARKERS)
        .with_context(|| format!("season {}: regular standings", season))?;
    let regular = extract_regular_standings(&regular_page)?;
    let mut merger = SeasonMerger::from_regular(label.as_str(), &regular, || regular_page.snippet())?;

    let final_page = source
        .fetch(&config.final_standings_url(season), FINAL_MARKERS)
        .with_context(|| format!("season {}: final standings", season))?;
    let playoffs = extract_playoffs(&final_page)?;
    let report = merger.apply_playoffs(&playoffs);
    report.ensure_applied(&label, || final_page.snippet())?;
    log::debug!("season {}: playoffs applied={} dropped={}", season, report.applied, report.dropped);

    let owners_page = source
        .fetch(&config.owners_url(season), OWNERS_MARKERS)
        .with_context(|| format!("season {}: owners", season))?;
    let owners = extract_owners(&owners_page)?;
    let report = merger.apply_owners(&owners);
    report.ensure_applied(&label, || owners_page.snippet())?;
    log::debug!("season {}: owners applied={} dropped={}", season, report.applied, report.dropped);

    let path = config.paths().season_standings_csv(season);
    let written = write_season_csv(&path, &merger.into_records())
        .with_context(|| format!("season {}: writing {}", season, path.display()))?;
    Ok(written)
}

/// Outcome of a multi-season standings run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    /// (season, teams written)
    pub succeeded: Vec<(u16, usize)>,
    /// (season, error chain)
    pub failed: Vec<(u16, String)>,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn summary(&self) -> String {
        let mut lines = vec![format!(
            "{} seasons written, {} failed",
            self.succeeded.len(),
            self.failed.len()
        )];
        for (season, error) in &self.failed {
            lines.push(format!("  ❌ {}: {}", season, error));
        }
        lines.join("\n")
    }
}

pub fn run_standings_batch(
    source: &dyn PageSource,
    config: &LeagueConfig,
    seasons: impl IntoIterator<Item = u16>,
) -> BatchReport {
    let mut report = BatchReport::default();
    let delay = Duration::from_millis(config.request_delay_ms);

    for (i, season) in seasons.into_iter().enumerate() {
        if i > 0 && !delay.is_zero() {
            thread::sleep(delay);
        }
        match scrape_season_standings(source, config, season) {
            Ok(teams) => {
                log::info!("Season {}: {} teams", season, teams);
                report.succeeded.push((season, teams));
            }
            Err(e) => {
                log::error!("Season {} failed: {:#}", season, e);
                report.failed.push((season, format!("{:#}", e)));
            }
        }
    }

    report
}

// ============================================================================
// WEEKS
// ============================================================================

/// Fetch every team's game-center page for a week and write `<season>-<week>.csv`
pub fn scrape_week(
    source: &dyn PageSource,
    config: &LeagueConfig,
    season: u16,
    week: u16,
    team_count: u32,
) -> Result<PathBuf> {
    let mut teams = Vec::with_capacity(team_count as usize);
    for team_id in 1..=team_count {
        let url = config.gamecenter_url(season, team_id, week);
        let page = source
            .fetch(&url, GAMECENTER_MARKERS)
            .with_context(|| format!("season {} week {} team {}", season, week, team_id))?;
        teams.push((team_id.to_string(), extract_team_week(&page)?));
    }

    let table = build_week_table(season, week, &teams)?;
    let path = config.paths().week_csv(season, week);
    write_week_csv(&path, &table).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeeksReport {
    pub team_count: u32,
    pub season_length: u16,
    pub written: Vec<u16>,
    /// Weeks already on disk
    pub skipped: Vec<u16>,
}

/// Every week of a season; weeks already written are left alone
pub fn scrape_season_weeks(source: &dyn PageSource, config: &LeagueConfig, season: u16) -> Result<WeeksReport> {
    let owners_page = source
        .fetch(&config.owners_url(season), OWNERS_MARKERS)
        .with_context(|| format!("season {}: owners", season))?;
    let team_count = count_owners(&owners_page)?;

    let first_week = source
        .fetch(&config.gamecenter_url(season, 1, 1), SEASON_LENGTH_MARKERS)
        .with_context(|| format!("season {}: season length", season))?;
    let season_length = parse_season_length(&first_week)?;

    log::info!("Season {}: owners={}, weeks={}", season, team_count, season_length);

    let mut report = WeeksReport {
        team_count,
        season_length,
        ..Default::default()
    };
    for week in 1..=season_length {
        let path = config.paths().week_csv(season, week);
        if path.exists() {
            log::info!("Week {}: already exists, skipping -> {}", week, path.display());
            report.skipped.push(week);
            continue;
        }
        scrape_week(source, config, season, week, team_count)?;
        log::info!("Week {}: wrote {}", week, path.display());
        report.written.push(week);
    }

    Ok(report)
}

// ============================================================================
// CROSS-SEASON
// ============================================================================

pub fn combine_all_standings(config: &LeagueConfig) -> Result<CombineReport> {
    let paths = config.paths();
    let out = paths.all_seasons_standings_csv();
    combine_standings(&paths.standings_dir, &out, &config.aliases)
        .with_context(|| format!("combining standings in {}", paths.standings_dir.display()))
}

pub fn combine_all_weeks(config: &LeagueConfig) -> Result<CombineReport> {
    let paths = config.paths();
    let out = paths.all_weeks_csv();
    combine_weeks(&paths.gamecenter_dir, &out, &config.aliases)
        .with_context(|| format!("combining weeks in {}", paths.gamecenter_dir.display()))
}

/// Which standings artifact the aggregator reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AggregateInput {
    #[default]
    SeasonFiles,
    LongFormat,
}

pub fn aggregate(config: &LeagueConfig, input: AggregateInput) -> Result<Vec<ManagerAggregate>> {
    let paths = config.paths();
    let mut aggregator = CareerAggregator::new(config.aliases.clone()).with_playoff_cutoff(config.playoff_cutoff);

    let seasons = match input {
        AggregateInput::SeasonFiles => aggregate_directory(&paths.standings_dir, &mut aggregator)
            .with_context(|| format!("aggregating {}", paths.standings_dir.display()))?,
        AggregateInput::LongFormat => {
            let path = paths.all_seasons_standings_csv();
            aggregate_long_format(&path, &mut aggregator)
                .with_context(|| format!("aggregating {}", path.display()))?
        }
    };

    let managers = aggregator.finalize();
    write_aggregate_csv(&paths.aggregate_csv(), &managers)?;
    log::info!("Aggregated {} seasons into {} managers", seasons, managers.len());
    Ok(managers)
}

/// Write every JSON projection whose source CSV exists; returns files written
pub fn export_json(config: &LeagueConfig) -> Result<Vec<PathBuf>> {
    let paths = config.paths();
    let mut written = Vec::new();

    let aggregate_csv = paths.aggregate_csv();
    if aggregate_csv.exists() {
        let table = CsvTable::read(&aggregate_csv)?;
        write_json(&paths.aggregate_json(), &aggregate_by_manager(&table)?)?;
        written.push(paths.aggregate_json());
    } else {
        log::warn!("No aggregate at {}, skipping", aggregate_csv.display());
    }

    let standings_csv = paths.all_seasons_standings_csv();
    if standings_csv.exists() {
        let table = CsvTable::read(&standings_csv)?;
        write_json(&paths.standings_by_season_team_json(), &standings_by_season_team(&table)?)?;
        write_json(&paths.standings_by_manager_json(), &standings_by_manager(&table)?)?;
        written.push(paths.standings_by_season_team_json());
        written.push(paths.standings_by_manager_json());
    } else {
        log::warn!("No combined standings at {}, skipping", standings_csv.display());
    }

    let weeks_csv = paths.all_weeks_csv();
    if weeks_csv.exists() {
        let table = CsvTable::read(&weeks_csv)?;
        write_json(&paths.weeks_by_owner_json(), &weeks_by_season_week_owner(&table)?)?;
        written.push(paths.weeks_by_owner_json());
    } else {
        log::debug!("No combined weeks at {}, skipping", weeks_csv.display());
    }

    Ok(written)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub batch: BatchReport,
    pub combined: CombineReport,
    pub managers: usize,
    pub json_files: usize,
}

/// Standings batch, combine, aggregate, export
pub fn run_all(source: &dyn PageSource, config: &LeagueConfig) -> Result<RunSummary> {
    config.paths().ensure()?;
    let batch = run_standings_batch(source, config, config.seasons());
    let combined = combine_all_standings(config)?;
    let managers = aggregate(config, AggregateInput::SeasonFiles)?.len();
    let json_files = export_json(config)?.len();

    Ok(RunSummary {
        batch,
        combined,
        managers,
        json_files,
    })
}

// ============================================================================
// TESTS
// ============================================================================

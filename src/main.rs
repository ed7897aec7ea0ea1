use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use league_history::config::LeagueConfig;
use league_history::pages::DirectoryPageSource;
use league_history::pipeline::{self, AggregateInput};

#[derive(Parser)]
#[command(name = "league-history", version, about = "Fantasy league history: standings, rosters, career totals")]
struct Cli {
    /// League config (TOML); defaults are used when the file is absent
    #[arg(long, global = true, default_value = "league.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build per-season standings tables
    Standings {
        /// Only this season (default: every configured season)
        #[arg(long)]
        season: Option<u16>,
    },
    /// Build per-week roster tables for one season
    Weeks {
        #[arg(long)]
        season: u16,
    },
    /// Concatenate season tables into the long-format file
    CombineStandings,
    /// Union every week table into one file
    CombineWeeks,
    /// Career totals per manager
    Aggregate {
        /// Read the long-format file instead of the season files
        #[arg(long)]
        long_format: bool,
    },
    /// Write the JSON projections
    ExportJson,
    /// Standings, combine, aggregate, export
    All,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = LeagueConfig::load_or_default(&cli.config)?;
    let source = DirectoryPageSource::new(&config.pages_dir);

    match cli.command {
        Command::Standings { season } => run_standings(&source, &config, season),
        Command::Weeks { season } => run_weeks(&source, &config, season),
        Command::CombineStandings => {
            let report = pipeline::combine_all_standings(&config)?;
            println!("✓ Combined standings: {}", report.summary());
            Ok(())
        }
        Command::CombineWeeks => {
            let report = pipeline::combine_all_weeks(&config)?;
            println!("✓ Combined weeks: {}", report.summary());
            Ok(())
        }
        Command::Aggregate { long_format } => {
            let input = if long_format {
                AggregateInput::LongFormat
            } else {
                AggregateInput::SeasonFiles
            };
            let managers = pipeline::aggregate(&config, input)?;
            println!("✓ Wrote {} managers -> {}", managers.len(), config.paths().aggregate_csv().display());
            Ok(())
        }
        Command::ExportJson => {
            for path in pipeline::export_json(&config)? {
                println!("✓ Wrote {}", path.display());
            }
            Ok(())
        }
        Command::All => {
            let summary = pipeline::run_all(&source, &config)?;
            println!("📅 {}", summary.batch.summary());
            println!("🔗 Combined: {}", summary.combined.summary());
            println!("📊 Managers: {}", summary.managers);
            println!("🧾 JSON files: {}", summary.json_files);
            Ok(())
        }
    }
}

fn run_standings(source: &DirectoryPageSource, config: &LeagueConfig, season: Option<u16>) -> Result<()> {
    config.paths().ensure()?;
    let report = match season {
        Some(season) => pipeline::run_standings_batch(source, config, [season]),
        None => pipeline::run_standings_batch(source, config, config.seasons()),
    };

    println!("{}", report.summary());
    if !report.is_clean() {
        bail!("{} season(s) failed", report.failed.len());
    }
    Ok(())
}

fn run_weeks(source: &DirectoryPageSource, config: &LeagueConfig, season: u16) -> Result<()> {
    let report = pipeline::scrape_season_weeks(source, config, season)?;
    println!(
        "✓ Season {}: {} weeks written, {} already on disk",
        season,
        report.written.len(),
        report.skipped.len()
    );
    Ok(())
}

// League History - Core Library
// Exposes all modules for use in the CLI and tests

pub mod error;
pub mod numeric;
pub mod identity;       // Identity Resolver - team keys
pub mod aliases;        // Manager Name Canonicalizer
pub mod config;
pub mod pages;          // Page sources + extractors
pub mod reconciliation; // Season Merger
pub mod writer;         // Season Writer
pub mod schema;         // Column contracts
pub mod roster;         // Roster Row Builder
pub mod combine;        // Cross-Season / Cross-Week Combiner
pub mod aggregate;      // Career Aggregator
pub mod export;         // JSON projections
pub mod pipeline;

// Re-export commonly used types
pub use error::{LeagueError, Result};
pub use identity::{extract_team_id, name_key, resolve_key, TeamRef};
pub use aliases::ManagerAliases;
pub use config::{LeagueConfig, OutputPaths};
pub use pages::{DirectoryPageSource, Page, PageSource};
pub use reconciliation::{merge_season, MergeReport, SeasonMerger, TeamSeasonRecord};
pub use writer::write_season_csv;
pub use roster::{
    build_week_table, compute_diff, compute_result, GameResult, RosterRowBuilder, RosterWeekRow,
    TeamWeek, WeekLayout, WeekTable,
};
pub use combine::{combine_standings, combine_weeks, CombineReport};
pub use aggregate::{CareerAggregator, ManagerAggregate, SeasonRow};
pub use pipeline::{AggregateInput, BatchReport, RunSummary, WeeksReport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 🚨 Error Taxonomy - structural failures that stop a page, season or team-week
//
// Noisy numeric text never reaches this type: it is coerced to zero where it
// is read (see numeric.rs). Everything here is unrecoverable for the unit it
// names.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum LeagueError {
    // ========================================================================
    // SOURCE / PAGE
    // ========================================================================
    /// Required markers were absent from fetched content
    #[error("page unusable: {url} (missing markers: {missing:?}{blocked})")]
    PageUnusable {
        url: String,
        missing: Vec<String>,
        blocked: String,
    },

    /// Page was never saved to the local page directory
    #[error("page not available: {url} (expected at {})", path.display())]
    PageMissing { url: String, path: PathBuf },

    #[error("invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    // ========================================================================
    // MERGE
    // ========================================================================
    /// Regular standings produced zero usable team keys
    #[error("season {season}: parsed 0 teams from regular standings. Page snippet: {snippet}")]
    NoTeams { season: String, snippet: String },

    /// A playoff or owners page matched zero rows against the base set
    #[error("season {season}: applied 0 {page} rows. Page snippet: {snippet}")]
    ZeroMatch {
        season: String,
        page: &'static str,
        snippet: String,
    },

    // ========================================================================
    // SCHEMA
    // ========================================================================
    #[error("{}: missing required columns {missing:?}", file.display())]
    MissingColumns { file: PathBuf, missing: Vec<String> },

    #[error("header mismatch in {}.\nExpected: {expected:?}\nGot:      {got:?}", file.display())]
    HeaderMismatch {
        file: PathBuf,
        expected: Vec<String>,
        got: Vec<String>,
    },

    #[error("no season files found in {}", dir.display())]
    NoSeasonFiles { dir: PathBuf },

    // ========================================================================
    // ROSTER
    // ========================================================================
    #[error("season {season} week {week}: no team pages to build a header from")]
    EmptyWeek { season: u16, week: u16 },

    #[error("row/header mismatch season={season} week={week} team_id={team}: row={row} header={header}")]
    WidthMismatch {
        season: u16,
        week: u16,
        team: String,
        row: usize,
        header: usize,
    },

    #[error("inconsistent result/diff season={season} week={week} team_id={team}: result={result}, diff={diff}, total={total}, opp_total={opp_total}")]
    Inconsistent {
        season: u16,
        week: u16,
        team: String,
        result: String,
        diff: String,
        total: String,
        opp_total: String,
    },

    // ========================================================================
    // WRAPPED
    // ========================================================================
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("invalid config: {field} = {value} ({reason})")]
    InvalidConfig {
        field: &'static str,
        value: String,
        reason: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, LeagueError>;

// ⚙️ League Configuration - league identity, season range, output layout
//
// Loaded from a TOML file; every field has a default so an empty file (or no
// file at all) describes the home league.

use crate::aliases::ManagerAliases;
use crate::error::{LeagueError, Result};
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const SOURCE_BASE_URL: &str = "https://fantasy.nfl.com";

// ============================================================================
// LEAGUE CONFIG
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LeagueConfig {
    pub league_id: String,

    /// First season to process
    pub start_year: u16,

    /// Last season to process (inclusive)
    pub end_year: u16,

    /// Playoff ranks 1..=cutoff count as a playoff berth
    pub playoff_cutoff: u32,

    /// Root of every generated artifact
    pub output_dir: PathBuf,

    /// Where saved HTML pages are read from
    pub pages_dir: PathBuf,

    /// Pause between seasons in batch runs
    pub request_delay_ms: u64,

    /// Raw manager display name → canonical name
    pub aliases: ManagerAliases,
}

impl Default for LeagueConfig {
    fn default() -> Self {
        LeagueConfig {
            league_id: "879846".to_string(),
            start_year: 2012,
            end_year: current_year(),
            playoff_cutoff: 6,
            output_dir: PathBuf::from("output"),
            pages_dir: PathBuf::from("pages"),
            request_delay_ms: 500,
            aliases: ManagerAliases::league_defaults(),
        }
    }
}

fn current_year() -> u16 {
    u16::try_from(chrono::Local::now().year()).unwrap_or(u16::MAX)
}

impl LeagueConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: LeagueConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Playoff rank 1 must always be a playoff berth
    pub fn validate(&self) -> Result<()> {
        if self.playoff_cutoff < 1 {
            return Err(LeagueError::InvalidConfig {
                field: "playoff_cutoff",
                value: self.playoff_cutoff.to_string(),
                reason: "must be at least 1",
            });
        }
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Load the file if it exists, otherwise fall back to defaults
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            log::info!("No config at {}, using league defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn seasons(&self) -> impl Iterator<Item = u16> {
        self.start_year..=self.end_year
    }

    pub fn paths(&self) -> OutputPaths {
        OutputPaths::new(&self.output_dir, &self.league_id)
    }

    // ========================================================================
    // SOURCE URLS
    // ========================================================================

    pub fn regular_standings_url(&self, season: u16) -> String {
        format!(
            "{}/league/{}/history/{}/standings?historyStandingsType=regular",
            SOURCE_BASE_URL, self.league_id, season
        )
    }

    pub fn final_standings_url(&self, season: u16) -> String {
        format!(
            "{}/league/{}/history/{}/standings?historyStandingsType=final",
            SOURCE_BASE_URL, self.league_id, season
        )
    }

    pub fn owners_url(&self, season: u16) -> String {
        format!(
            "{}/league/{}/history/{}/owners",
            SOURCE_BASE_URL, self.league_id, season
        )
    }

    pub fn gamecenter_url(&self, season: u16, team_id: u32, week: u16) -> String {
        format!(
            "{}/league/{}/history/{}/teamgamecenter?teamId={}&week={}",
            SOURCE_BASE_URL, self.league_id, season, team_id, week
        )
    }
}

// ============================================================================
// OUTPUT PATHS
// ============================================================================

/// Every location the pipeline writes to for one league
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub base_dir: PathBuf,
    pub standings_dir: PathBuf,
    pub gamecenter_dir: PathBuf,
}

impl OutputPaths {
    pub fn new(base_dir: &Path, league_id: &str) -> Self {
        OutputPaths {
            base_dir: base_dir.to_path_buf(),
            standings_dir: base_dir.join(format!("{}-history-standings", league_id)),
            gamecenter_dir: base_dir.join(format!("{}-history-teamgamecenter", league_id)),
        }
    }

    /// Create the standings and game-center roots
    pub fn ensure(&self) -> Result<()> {
        fs::create_dir_all(&self.standings_dir)?;
        fs::create_dir_all(&self.gamecenter_dir)?;
        Ok(())
    }

    pub fn season_standings_csv(&self, season: u16) -> PathBuf {
        self.standings_dir.join(format!("{}.csv", season))
    }

    pub fn all_seasons_standings_csv(&self) -> PathBuf {
        self.standings_dir.join("all_seasons_standings.csv")
    }

    pub fn season_gamecenter_dir(&self, season: u16) -> PathBuf {
        self.gamecenter_dir.join(season.to_string())
    }

    pub fn week_csv(&self, season: u16, week: u16) -> PathBuf {
        self.season_gamecenter_dir(season)
            .join(format!("{}-{}.csv", season, week))
    }

    pub fn all_weeks_csv(&self) -> PathBuf {
        self.gamecenter_dir.join("all_seasons_combined.csv")
    }

    pub fn aggregate_csv(&self) -> PathBuf {
        self.base_dir.join("aggregated_standings_data.csv")
    }

    pub fn aggregate_json(&self) -> PathBuf {
        self.base_dir.join("aggregated_standings_data.json")
    }

    pub fn standings_by_season_team_json(&self) -> PathBuf {
        self.base_dir.join("all_seasons_standings_by_season_team.json")
    }

    pub fn standings_by_manager_json(&self) -> PathBuf {
        self.base_dir.join("all_seasons_standings_by_manager.json")
    }

    pub fn weeks_by_owner_json(&self) -> PathBuf {
        self.base_dir.join("all_seasons_combined_by_season_week_owner.json")
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = LeagueConfig::from_toml_str("").unwrap();
        assert_eq!(config.league_id, "879846");
        assert_eq!(config.start_year, 2012);
        assert_eq!(config.playoff_cutoff, 6);
        assert_eq!(config.aliases.canonicalize("Fancett"), "Big Dog");
    }

    #[test]
    fn test_toml_overrides() {
        let config = LeagueConfig::from_toml_str(
            r#"
            league_id = "123"
            start_year = 2020
            end_year = 2022
            playoff_cutoff = 4
            output_dir = "out"

            [aliases]
            "Bobby" = "Rob"
            "#,
        )
        .unwrap();

        assert_eq!(config.league_id, "123");
        assert_eq!(config.seasons().collect::<Vec<_>>(), vec![2020, 2021, 2022]);
        assert_eq!(config.playoff_cutoff, 4);
        assert_eq!(config.aliases.canonicalize("Bobby"), "Rob");
        // A supplied table replaces the defaults
        assert_eq!(config.aliases.canonicalize("Matt"), "Matt");
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = LeagueConfig::from_toml_str("playoff_cutoff = \"six\"").unwrap_err();
        assert!(matches!(err, crate::error::LeagueError::Config(_)));
    }

    #[test]
    fn test_zero_playoff_cutoff_is_rejected() {
        let err = LeagueConfig::from_toml_str("playoff_cutoff = 0").unwrap_err();
        assert!(matches!(
            err,
            LeagueError::InvalidConfig { field: "playoff_cutoff", .. }
        ));
        assert!(LeagueConfig::from_toml_str("playoff_cutoff = 1").is_ok());
    }

    #[test]
    fn test_urls() {
        let config = LeagueConfig::default();
        assert_eq!(
            config.regular_standings_url(2023),
            "https://fantasy.nfl.com/league/879846/history/2023/standings?historyStandingsType=regular"
        );
        assert_eq!(
            config.gamecenter_url(2023, 4, 11),
            "https://fantasy.nfl.com/league/879846/history/2023/teamgamecenter?teamId=4&week=11"
        );
    }

    #[test]
    fn test_output_layout() {
        let paths = OutputPaths::new(Path::new("output"), "879846");
        assert_eq!(
            paths.season_standings_csv(2023),
            PathBuf::from("output/879846-history-standings/2023.csv")
        );
        assert_eq!(
            paths.week_csv(2023, 7),
            PathBuf::from("output/879846-history-teamgamecenter/2023/2023-7.csv")
        );
    }
}

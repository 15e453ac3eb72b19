use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::builder::BoolishValueParser;
use clap::Parser;
use std::path::{Path, PathBuf};

/// Multiplier applied to every raw model margin
pub const DEFAULT_DAMPING_FACTOR: f64 = 0.8;

/// Largest |model - market| gap still treated as no edge (inclusive)
pub const DEFAULT_NO_EDGE_THRESHOLD: f64 = 2.5;

/// Monday of week 1 for the 2025 season
pub const DEFAULT_WEEK1_START: &str = "2025-08-25";

pub const DEFAULT_SEASON: u32 = 2025;

/// Tunable numbers of the edge calculation. Both were fit to a single season
/// and should be revisited before being reused elsewhere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgePolicy {
    pub damping_factor: f64,
    pub no_edge_threshold: f64,
}

impl Default for EdgePolicy {
    fn default() -> Self {
        Self {
            damping_factor: DEFAULT_DAMPING_FACTOR,
            no_edge_threshold: DEFAULT_NO_EDGE_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Parser)]
#[command(
    name = "cfb-edge",
    about = "Weekly college football spread predictions and market edges"
)]
pub struct Config {
    /// The Odds API key. Without it every game is reported with no line.
    #[arg(long, env = "ODDS_API_KEY", hide_env_values = true)]
    pub odds_api_key: Option<String>,

    /// Two-column CSV mapping schedule names to model names
    #[arg(long, env = "MAPPING_CSV", default_value = "data/team_mapping.csv")]
    pub mapping_csv: PathBuf,

    /// College Football Data API key, used to refresh the weekly stats snapshot
    #[arg(long, env = "CFBD_API_KEY", hide_env_values = true)]
    pub cfbd_api_key: Option<String>,

    /// Season advanced stats, CSV or CFBD JSON. Overrides the weekly snapshot.
    #[arg(long, env = "STATS_FILE")]
    pub stats_file: Option<PathBuf>,

    /// Where weekly stat snapshots are written
    #[arg(long, env = "DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    #[arg(long, env = "SEASON_YEAR", default_value_t = DEFAULT_SEASON)]
    pub season: u32,

    /// Trained margin model (JSON)
    #[arg(long, env = "MODEL_FILE", default_value = "models/margin_model.json")]
    pub model_file: PathBuf,

    /// Use this schedule CSV instead of scraping ESPN
    #[arg(long, env = "SCHEDULE_FILE")]
    pub schedule_file: Option<PathBuf>,

    #[arg(long, env = "OUTPUT_CSV", default_value = "output/weekly_predictions.csv")]
    pub output_csv: PathBuf,

    #[arg(long, env = "ANALYSIS_CSV", default_value = "output/weekly_analysis.csv")]
    pub analysis_csv: PathBuf,

    #[arg(long, env = "CACHE_DIR", default_value = "cache")]
    pub cache_dir: PathBuf,

    /// Reuse cached schedule and odds instead of hitting the network
    #[arg(long, env = "USE_CACHE", value_parser = BoolishValueParser::new())]
    pub use_cache: bool,

    #[arg(long, env = "DAMPING_FACTOR", default_value_t = DEFAULT_DAMPING_FACTOR)]
    pub damping_factor: f64,

    #[arg(long, env = "NO_EDGE_THRESHOLD", default_value_t = DEFAULT_NO_EDGE_THRESHOLD)]
    pub no_edge_threshold: f64,

    #[arg(long, env = "SEASON_WEEK1_START", default_value = DEFAULT_WEEK1_START)]
    pub season_week1_start: NaiveDate,

    /// Force the week label instead of deriving it from today's date
    #[arg(long, env = "SEASON_WEEK")]
    pub week: Option<u32>,

    /// How many recommended bets to print
    #[arg(long, default_value_t = 10)]
    pub top: usize,
}

impl Config {
    pub fn edge_policy(&self) -> EdgePolicy {
        EdgePolicy {
            damping_factor: self.damping_factor,
            no_edge_threshold: self.no_edge_threshold,
        }
    }

    pub fn odds_cache_file(&self) -> PathBuf {
        self.cache_dir.join("odds_cache.json")
    }

    pub fn schedule_cache_file(&self) -> PathBuf {
        self.cache_dir.join("schedule_cache.json")
    }

    /// Advanced-stats snapshot for one week of the configured season
    pub fn stats_snapshot_file(&self, week: u32) -> PathBuf {
        self.data_dir
            .join(format!("cfbd_team_stats_{}_week{}.json", self.season, week))
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if !self.damping_factor.is_finite() || self.damping_factor <= 0.0 {
            bail!(
                "DAMPING_FACTOR must be a positive number, got {}",
                self.damping_factor
            );
        }
        if !self.no_edge_threshold.is_finite() || self.no_edge_threshold < 0.0 {
            bail!(
                "NO_EDGE_THRESHOLD must be zero or greater, got {}",
                self.no_edge_threshold
            );
        }

        require_file("mapping table", &self.mapping_csv)?;
        if let Some(stats) = &self.stats_file {
            require_file("stats file", stats)?;
        }
        require_file("model file", &self.model_file)?;
        if let Some(schedule) = &self.schedule_file {
            require_file("schedule file", schedule)?;
        }
        Ok(())
    }
}

fn require_file(what: &str, path: &Path) -> Result<()> {
    if !path.is_file() {
        bail!("{} not found: {}", what, path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        let mut argv = vec!["cfb-edge"];
        argv.extend_from_slice(args);
        Config::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_default_policy() {
        let policy = EdgePolicy::default();
        assert_eq!(policy.damping_factor, 0.8);
        assert_eq!(policy.no_edge_threshold, 2.5);
    }

    #[test]
    fn test_policy_from_args() {
        let config = parse(&["--damping-factor", "0.75", "--no-edge-threshold", "3"]);
        let policy = config.edge_policy();
        assert_eq!(policy.damping_factor, 0.75);
        assert_eq!(policy.no_edge_threshold, 3.0);
        assert_eq!(
            config.season_week1_start,
            NaiveDate::from_ymd_opt(2025, 8, 25).unwrap()
        );
    }

    #[test]
    fn test_validate_rejects_bad_policy() {
        let config = parse(&["--damping-factor", "0"]);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("DAMPING_FACTOR"));

        let config = parse(&["--no-edge-threshold=-1"]);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("NO_EDGE_THRESHOLD"));
    }

    #[test]
    fn test_stats_snapshot_named_by_season_and_week() {
        let config = parse(&["--season", "2024", "--data-dir", "snapshots"]);
        assert_eq!(config.stats_file, None);
        assert_eq!(
            config.stats_snapshot_file(7),
            PathBuf::from("snapshots/cfbd_team_stats_2024_week7.json")
        );
    }

    #[test]
    fn test_validate_requires_inputs() {
        let config = parse(&["--mapping-csv", "does/not/exist.csv"]);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("mapping table not found"));
    }
}

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod scrapers;
pub mod utils;

pub use api::*;
pub use models::*;
pub use scrapers::*;
pub use utils::*;

use anyhow::{bail, Context, Result};
use api::cfbd_api::{parse_advanced_stats, CfbdApiClient};
use api::odds_api::{fetch_odds_index, OddsApiClient};
use chrono::Local;
use config::Config;
use scrapers::espn_schedule::EspnScheduleScraper;
use tracing::{info, warn};
use utils::data::{
    load_from_cache, load_schedule_csv, load_team_mapping, load_team_stats, save_analysis_csv,
    save_sheet_csv, save_stats_snapshot, save_to_cache,
};
use utils::features::TeamStatTable;
use utils::matchup::OddsIndex;
use utils::pipeline::{PipelineOutput, PredictionPipeline, RunSnapshot};
use utils::predictor::load_model;
use utils::season::current_week;
use utils::team_mapper::TeamMapper;

/// Everything one weekly run produced
#[derive(Debug, Clone)]
pub struct WeeklyRun {
    pub week: u32,
    pub schedule_len: usize,
    pub output: PipelineOutput,
}

/// Load the run snapshot (mapping, stats, odds) once
pub async fn load_snapshot(config: &Config, week: u32) -> Result<RunSnapshot> {
    let mapping = load_team_mapping(&config.mapping_csv)?;
    info!(rows = mapping.len(), "loaded team mapping");
    let stats = load_stats(config, week).await?;
    info!(teams = stats.len(), "loaded team stats");

    Ok(RunSnapshot {
        mapper: TeamMapper::new(mapping),
        stats: TeamStatTable::new(stats),
        odds: load_odds(config).await?,
    })
}

/// Season stats for `week`: an explicit stats file, the week's snapshot when
/// caching, a fresh CFBD pull saved as the snapshot, or a stale snapshot
/// when no key is configured.
pub async fn load_stats(config: &Config, week: u32) -> Result<Vec<TeamStatRecord>> {
    if let Some(path) = &config.stats_file {
        return load_team_stats(path);
    }

    let snapshot = config.stats_snapshot_file(week);
    if config.use_cache && snapshot.exists() {
        info!(path = %snapshot.display(), "loading stats snapshot");
        return load_team_stats(&snapshot);
    }

    match &config.cfbd_api_key {
        Some(key) => {
            let body = CfbdApiClient::new(key.clone())
                .fetch_advanced_stats_json(config.season)
                .await?;
            let records = parse_advanced_stats(&body)?;
            save_stats_snapshot(&body, &snapshot)?;
            info!(path = %snapshot.display(), week, "saved stats snapshot");
            Ok(records)
        }
        None if snapshot.exists() => {
            warn!(path = %snapshot.display(), "CFBD_API_KEY not set, reusing existing stats snapshot");
            load_team_stats(&snapshot)
        }
        None => bail!(
            "no stats available: set STATS_FILE, or CFBD_API_KEY to create {}",
            snapshot.display()
        ),
    }
}

async fn load_odds(config: &Config) -> Result<OddsIndex> {
    let cache_file = config.odds_cache_file();
    if config.use_cache && cache_file.exists() {
        info!(path = %cache_file.display(), "loading odds from cache");
        let lines: Vec<OddsLine> = load_from_cache(&cache_file)?;
        return Ok(lines.into_iter().collect());
    }

    let client = config.odds_api_key.clone().map(OddsApiClient::new);
    let index = fetch_odds_index(client.as_ref()).await;
    if !index.is_empty() {
        let lines: Vec<&OddsLine> = index.lines().collect();
        save_to_cache(&lines, &cache_file)?;
        info!(path = %cache_file.display(), "saved odds to cache");
    }
    Ok(index)
}

/// The week's schedule: a given CSV, the cache, or a fresh ESPN scrape
pub async fn load_schedule(config: &Config) -> Result<Vec<ScheduleEntry>> {
    if let Some(path) = &config.schedule_file {
        return load_schedule_csv(path);
    }

    let cache_file = config.schedule_cache_file();
    if config.use_cache && cache_file.exists() {
        info!(path = %cache_file.display(), "loading schedule from cache");
        return load_from_cache(&cache_file);
    }

    let schedule = EspnScheduleScraper::new()?
        .fetch_schedule()
        .await
        .context("Failed to fetch schedule")?;
    save_to_cache(&schedule, &cache_file)?;
    Ok(schedule)
}

/// Run the full weekly flow and write both CSV outputs
pub async fn run_weekly_predictions(config: &Config) -> Result<WeeklyRun> {
    let week = config
        .week
        .unwrap_or_else(|| current_week(Local::now().date_naive(), config.season_week1_start));
    info!(week, "starting weekly run");

    let model = load_model(&config.model_file)?;
    let snapshot = load_snapshot(config, week).await?;
    let schedule = load_schedule(config).await?;
    info!(games = schedule.len(), "schedule ready");

    let pipeline = PredictionPipeline::new(&snapshot, &model, config.edge_policy());
    let output = pipeline
        .run(&schedule)
        .context("Prediction run aborted")?;

    save_sheet_csv(&output.records, &config.output_csv)?;
    save_analysis_csv(&output.records, &config.analysis_csv)?;
    info!(
        sheet = %config.output_csv.display(),
        analysis = %config.analysis_csv.display(),
        "wrote outputs"
    );

    Ok(WeeklyRun {
        week,
        schedule_len: schedule.len(),
        output,
    })
}

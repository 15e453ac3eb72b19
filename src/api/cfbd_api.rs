use crate::models::TeamStatRecord;
use crate::utils::data::read_team_stats_json;
use anyhow::{Context, Result};
use reqwest::Client;
use tracing::info;

const CFBD_BASE_URL: &str = "https://api.collegefootballdata.com";

/// College Football Data API client for the season advanced-stats table
pub struct CfbdApiClient {
    client: Client,
    api_key: String,
}

impl CfbdApiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
        }
    }

    /// Raw `/stats/season/advanced` body for `year`, garbage time excluded.
    /// The body is what gets written as the weekly snapshot.
    pub async fn fetch_advanced_stats_json(&self, year: u32) -> Result<String> {
        let url = format!("{}/stats/season/advanced", CFBD_BASE_URL);

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .query(&[
                ("year", year.to_string()),
                ("excludeGarbageTime", "true".to_string()),
            ])
            .send()
            .await
            .context("Failed to fetch advanced stats from CFBD")?;

        if !response.status().is_success() {
            anyhow::bail!("CFBD API returned error: {}", response.status());
        }

        response
            .text()
            .await
            .context("Failed to read CFBD response")
    }

    /// Fetch and parse the advanced-stats table
    pub async fn fetch_advanced_stats(&self, year: u32) -> Result<Vec<TeamStatRecord>> {
        let body = self.fetch_advanced_stats_json(year).await?;
        let records = parse_advanced_stats(&body)?;
        info!(year, teams = records.len(), "fetched advanced stats");
        Ok(records)
    }
}

pub fn parse_advanced_stats(body: &str) -> Result<Vec<TeamStatRecord>> {
    read_team_stats_json(body).context("Failed to parse CFBD advanced stats")
}

use crate::models::OddsLine;
use crate::utils::matchup::OddsIndex;
use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{info, warn};

const ODDS_API_BASE_URL: &str = "https://api.the-odds-api.com/v4";
const SPORT_KEY: &str = "americanfootball_ncaaf"; // College football

/// Response from The Odds API for a single game
#[derive(Debug, Deserialize)]
struct OddsApiGame {
    home_team: String,
    away_team: String,
    #[serde(default)]
    bookmakers: Vec<OddsApiBookmaker>,
}

/// Bookmaker data from The Odds API
#[derive(Debug, Deserialize)]
struct OddsApiBookmaker {
    title: String,
    #[serde(default)]
    markets: Vec<OddsApiMarket>,
}

/// Market data from The Odds API
#[derive(Debug, Deserialize)]
struct OddsApiMarket {
    #[serde(default)]
    outcomes: Vec<OddsApiOutcome>,
}

/// Outcome data for a specific team
#[derive(Debug, Deserialize)]
struct OddsApiOutcome {
    name: String,
    point: Option<f64>,
}

pub struct OddsApiClient {
    api_key: String,
    client: reqwest::Client,
}

impl OddsApiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            client: reqwest::Client::new(),
        }
    }

    /// Fetch college football point spreads, one line per game
    pub async fn fetch_spread_lines(&self) -> Result<Vec<OddsLine>> {
        let url = format!("{}/sports/{}/odds", ODDS_API_BASE_URL, SPORT_KEY);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("apiKey", self.api_key.as_str()),
                ("regions", "us"),
                ("markets", "spreads"),
                ("dateFormat", "iso"),
                ("oddsFormat", "american"),
            ])
            .send()
            .await
            .context("Failed to fetch odds from The Odds API")?;

        if !response.status().is_success() {
            anyhow::bail!("Odds API returned error: {}", response.status());
        }

        let body = response
            .text()
            .await
            .context("Failed to read Odds API response")?;
        let lines = parse_spread_lines(&body)?;
        info!(lines = lines.len(), "fetched spread lines");
        Ok(lines)
    }

    /// Check how many API requests you have remaining
    pub async fn check_usage(&self) -> Result<()> {
        let url = format!("{}/sports", ODDS_API_BASE_URL);

        let response = self
            .client
            .get(&url)
            .query(&[("apiKey", self.api_key.as_str())])
            .send()
            .await
            .context("Failed to query Odds API usage")?;

        let header = |name: &str| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("unknown")
                .to_string()
        };
        info!(
            remaining = %header("x-requests-remaining"),
            used = %header("x-requests-used"),
            "Odds API usage"
        );

        Ok(())
    }
}

/// Turn an odds response body into home-relative lines.
///
/// Only the first bookmaker's first market is read, and the spread is the
/// `point` of the outcome named after the home team. Games without such an
/// outcome are left out.
pub fn parse_spread_lines(body: &str) -> Result<Vec<OddsLine>> {
    let games: Vec<OddsApiGame> =
        serde_json::from_str(body).context("Failed to parse Odds API response")?;

    let lines = games
        .into_iter()
        .filter_map(|game| {
            let bookmaker = game.bookmakers.into_iter().next()?;
            let market = bookmaker.markets.into_iter().next()?;
            if market.outcomes.len() < 2 {
                return None;
            }
            let home = market
                .outcomes
                .iter()
                .find(|outcome| outcome.name == game.home_team)?;
            Some(OddsLine {
                home_spread: home.point.unwrap_or(0.0),
                home_team: game.home_team.into(),
                away_team: game.away_team.into(),
                bookmaker: Some(bookmaker.title),
            })
        })
        .collect();
    Ok(lines)
}

/// Fetch lines and index them, falling back to an empty index when the feed
/// is unavailable. Every game then reports no line instead of failing.
pub async fn fetch_odds_index(client: Option<&OddsApiClient>) -> OddsIndex {
    let Some(client) = client else {
        warn!("ODDS_API_KEY not set, continuing without market lines");
        return OddsIndex::new();
    };
    match client.fetch_spread_lines().await {
        Ok(lines) => lines.into_iter().collect(),
        Err(err) => {
            warn!(error = %format!("{:#}", err), "odds feed unavailable, continuing without market lines");
            OddsIndex::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"[
        {
            "id": "a1",
            "commence_time": "2025-09-06T16:00:00Z",
            "home_team": "Kansas Jayhawks",
            "away_team": "Kansas State Wildcats",
            "bookmakers": [
                {
                    "key": "draftkings",
                    "title": "DraftKings",
                    "markets": [
                        {
                            "key": "spreads",
                            "outcomes": [
                                {"name": "Kansas State Wildcats", "price": -110, "point": -3.5},
                                {"name": "Kansas Jayhawks", "price": -110, "point": 3.5}
                            ]
                        }
                    ]
                },
                {
                    "key": "fanduel",
                    "title": "FanDuel",
                    "markets": [
                        {"key": "spreads", "outcomes": [
                            {"name": "Kansas Jayhawks", "price": -110, "point": 4.0},
                            {"name": "Kansas State Wildcats", "price": -110, "point": -4.0}
                        ]}
                    ]
                }
            ]
        },
        {
            "id": "b2",
            "commence_time": "2025-09-06T19:30:00Z",
            "home_team": "Iowa Hawkeyes",
            "away_team": "UAlbany Great Danes",
            "bookmakers": []
        }
    ]"#;

    #[test]
    fn test_parse_uses_first_bookmaker_home_outcome() {
        let lines = parse_spread_lines(FIXTURE).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].home_team.as_str(), "Kansas Jayhawks");
        assert_eq!(lines[0].home_spread, 3.5);
        assert_eq!(lines[0].bookmaker.as_deref(), Some("DraftKings"));
    }

    #[test]
    fn test_index_keys() {
        let index: OddsIndex = parse_spread_lines(FIXTURE).unwrap().into_iter().collect();
        let keys: Vec<&str> = index.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["Kansas Jayhawks_vs_Kansas State Wildcats"]);
    }

    #[test]
    fn test_bad_body_is_error() {
        assert!(parse_spread_lines("{\"message\": \"quota\"}").is_err());
    }

    #[tokio::test]
    async fn test_missing_key_gives_empty_index() {
        assert!(fetch_odds_index(None).await.is_empty());
    }

    #[tokio::test]
    #[ignore]
    async fn test_fetch_spread_lines() {
        dotenv::dotenv().ok();
        let api_key = std::env::var("ODDS_API_KEY").expect("ODDS_API_KEY not set");
        let client = OddsApiClient::new(api_key);

        let lines = client.fetch_spread_lines().await.unwrap();
        assert!(!lines.is_empty());
    }
}

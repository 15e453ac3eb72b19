use crate::models::ScheduleEntry;
use crate::utils::normalize::normalize_team_name;
use anyhow::{Context, Result};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use tracing::{debug, info};

const ESPN_SCHEDULE_URL: &str = "https://www.espn.com/college-football/schedule";

/// Slugs whose title-cased form would not survive normalization intact
const SLUG_NAMES: &[(&str, &str)] = &[
    ("iowa-state", "Iowa State"),
    ("app-state", "Appalachian State"),
    ("nc-state", "NC State"),
    ("ohio-state", "Ohio State"),
];

pub struct EspnScheduleScraper {
    client: reqwest::Client,
}

impl EspnScheduleScraper {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }

    /// Scrape this week's games from the ESPN schedule page
    pub async fn fetch_schedule(&self) -> Result<Vec<ScheduleEntry>> {
        let html = self
            .client
            .get(ESPN_SCHEDULE_URL)
            .send()
            .await
            .context("Failed to fetch ESPN schedule page")?
            .error_for_status()
            .context("ESPN schedule page returned an error")?
            .text()
            .await?;

        let games = parse_schedule_html(&html)?;
        info!(games = games.len(), "scraped ESPN schedule");
        Ok(games)
    }
}

/// Extract games from schedule HTML. Every table row holding at least two
/// team links is a game, away team first.
pub fn parse_schedule_html(html: &str) -> Result<Vec<ScheduleEntry>> {
    let document = Html::parse_document(html);
    let row_selector = Selector::parse("tr").ok().context("Invalid row selector")?;
    let link_selector = Selector::parse(r#"a[href*="/college-football/team/"]"#)
        .ok()
        .context("Invalid team link selector")?;

    let mut seen = HashSet::new();
    let mut games = Vec::new();

    for row in document.select(&row_selector) {
        let links: Vec<ElementRef> = row.select(&link_selector).collect();
        if links.len() < 2 {
            continue;
        }

        let away = team_name(&links[0]);
        let home = team_name(&links[1]);
        if home == away || home.len() <= 2 || away.len() <= 2 {
            debug!(%home, %away, "skipping schedule row");
            continue;
        }

        let forward = (home.clone(), away.clone());
        let reverse = (away.clone(), home.clone());
        if seen.contains(&forward) || seen.contains(&reverse) {
            continue;
        }
        seen.insert(forward);
        games.push(ScheduleEntry::new(home, away));
    }

    Ok(games)
}

/// Team name for a link: the URL slug when the href is a full team URL,
/// otherwise the link text, normalized either way
fn team_name(link: &ElementRef) -> String {
    let from_slug = link.value().attr("href").and_then(name_from_href);
    let raw = match from_slug {
        Some(name) if name.len() >= 3 => name,
        _ => link.text().collect::<String>().trim().to_string(),
    };
    normalize_team_name(&raw)
}

// "/college-football/team/_/id/2305/kansas-jayhawks" -> "Kansas Jayhawks"
fn name_from_href(href: &str) -> Option<String> {
    let parts: Vec<&str> = href.split('/').collect();
    if parts.len() <= 5 {
        return None;
    }
    let slug = parts.last()?.to_lowercase();
    if let Some((_, name)) = SLUG_NAMES.iter().find(|(key, _)| slug.contains(key)) {
        return Some(name.to_string());
    }
    Some(
        slug.split('-')
            .filter(|word| !word.is_empty())
            .map(title_case)
            .collect::<Vec<_>>()
            .join(" "),
    )
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"
        <html><body><table>
          <tr><th>matchup</th><th></th></tr>
          <tr>
            <td><a href="/college-football/team/_/id/2306/kansas-state-wildcats">Kansas State</a></td>
            <td>@ <a href="/college-football/team/_/id/2305/kansas-jayhawks">Kansas</a></td>
          </tr>
          <tr>
            <td><a href="/college-football/team/x">12 Iowa State Cyclones</a></td>
            <td><a href="/college-football/team/_/id/66/iowa-state-cyclones">ISU</a></td>
          </tr>
          <tr>
            <td><a href="/college-football/team/_/id/2305/kansas-jayhawks">Kansas</a></td>
            <td><a href="/college-football/team/_/id/2306/kansas-state-wildcats">Kansas State</a></td>
          </tr>
          <tr>
            <td><a href="/college-football/team/_/id/399/ualbany-great-danes">UAlbany</a></td>
            <td><a href="/college-football/team/_/id/2294/iowa-hawkeyes">Iowa</a></td>
          </tr>
          <tr><td><a href="/college-football/team/_/id/52/florida-state-seminoles">FSU</a></td></tr>
        </table></body></html>
    "#;

    #[test]
    fn test_parse_schedule_html() {
        let games = parse_schedule_html(FIXTURE).unwrap();
        assert_eq!(
            games,
            vec![
                ScheduleEntry::new("Kansas", "Kansas State"),
                ScheduleEntry::new("Iowa", "UAlbany"),
            ]
        );
    }

    #[test]
    fn test_name_from_href() {
        assert_eq!(
            name_from_href("/college-football/team/_/id/2305/kansas-jayhawks").as_deref(),
            Some("Kansas Jayhawks")
        );
        assert_eq!(
            name_from_href("/college-football/team/_/id/2026/app-state-mountaineers").as_deref(),
            Some("Appalachian State")
        );
        assert_eq!(name_from_href("/college-football/team/x"), None);
    }

    #[tokio::test]
    #[ignore]
    async fn test_fetch_schedule() {
        let scraper = EspnScheduleScraper::new().unwrap();
        let games = scraper.fetch_schedule().await.unwrap();
        assert!(!games.is_empty());
    }
}

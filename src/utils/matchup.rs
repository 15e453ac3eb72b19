use crate::models::{MarketLine, OddsLine, ScheduleName};
use crate::utils::normalize::match_key;

/// Odds entries in feed order. Lookups scan in this order and stop at the
/// first hit, so insertion order decides between ambiguous entries.
#[derive(Debug, Clone, Default)]
pub struct OddsIndex {
    entries: Vec<(String, OddsLine)>,
}

impl OddsIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry under the provider key. A repeated key replaces the
    /// earlier line in place, keeping its original position.
    pub fn insert(&mut self, key: impl Into<String>, line: OddsLine) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = line,
            None => self.entries.push((key, line)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OddsLine)> {
        self.entries.iter().map(|(k, line)| (k.as_str(), line))
    }

    pub fn lines(&self) -> impl Iterator<Item = &OddsLine> {
        self.entries.iter().map(|(_, line)| line)
    }
}

impl FromIterator<OddsLine> for OddsIndex {
    fn from_iter<T: IntoIterator<Item = OddsLine>>(iter: T) -> Self {
        let mut index = OddsIndex::new();
        for line in iter {
            index.insert(odds_key(&line), line);
        }
        index
    }
}

/// Provider key for a line, `"{home}_vs_{away}"`
pub fn odds_key(line: &OddsLine) -> String {
    format!("{}_vs_{}", line.home_team, line.away_team)
}

/// Look up the market line for a scheduled game.
///
/// Returns the home-relative line and whether the odds entry listed the
/// teams the other way round (in which case the spread has already been
/// negated). `(None, false)` means no entry matched.
pub fn find_line(
    home: &ScheduleName,
    away: &ScheduleName,
    odds: &OddsIndex,
) -> (Option<MarketLine>, bool) {
    let home_key = match_key(home.as_str());
    let away_key = match_key(away.as_str());
    // An empty key is a substring of everything
    if home_key.is_empty() || away_key.is_empty() {
        return (None, false);
    }

    for line in odds.lines() {
        let odds_home = match_key(line.home_team.as_str());
        let odds_away = match_key(line.away_team.as_str());

        if odds_home.contains(&home_key) && odds_away.contains(&away_key) {
            return (Some(MarketLine::new(line.home_spread)), false);
        }
        if odds_away.contains(&home_key) && odds_home.contains(&away_key) {
            return (Some(MarketLine::new(line.home_spread).negated()), true);
        }
    }

    (None, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(home: &str, away: &str, spread: f64) -> OddsLine {
        OddsLine {
            home_team: home.into(),
            away_team: away.into(),
            home_spread: spread,
            bookmaker: None,
        }
    }

    fn lookup(home: &str, away: &str, odds: &OddsIndex) -> (Option<MarketLine>, bool) {
        find_line(&home.into(), &away.into(), odds)
    }

    #[test]
    fn test_kansas_direct_match() {
        let odds: OddsIndex = vec![line("Kansas Jayhawks", "Kansas State Wildcats", 3.5)]
            .into_iter()
            .collect();
        assert_eq!(
            lookup("Kansas", "Kansas State", &odds),
            (Some(MarketLine::new(3.5)), false)
        );
    }

    #[test]
    fn test_flipped_match_negates_spread() {
        let odds: OddsIndex = vec![line("Georgia Bulldogs", "Auburn Tigers", -10.5)]
            .into_iter()
            .collect();

        let (direct, flipped) = lookup("Georgia", "Auburn", &odds);
        assert!(!flipped);
        let (crossed, was_flipped) = lookup("Auburn", "Georgia", &odds);
        assert!(was_flipped);

        let direct = direct.unwrap();
        let crossed = crossed.unwrap();
        assert_eq!(direct.home_spread, -10.5);
        assert_eq!(crossed.home_spread, -direct.home_spread);
    }

    #[test]
    fn test_no_match_is_none() {
        let odds: OddsIndex = vec![line("Ohio State Buckeyes", "Michigan Wolverines", -7.0)]
            .into_iter()
            .collect();
        assert_eq!(lookup("Iowa", "UAlbany", &odds), (None, false));
        assert_eq!(lookup("Iowa", "UAlbany", &OddsIndex::new()), (None, false));
    }

    #[test]
    fn test_empty_schedule_name_never_matches() {
        let odds: OddsIndex = vec![line("Texas Longhorns", "Rice Owls", -30.0)]
            .into_iter()
            .collect();
        assert_eq!(lookup("", "Rice", &odds), (None, false));
    }

    #[test]
    fn test_first_match_wins_in_feed_order() {
        // "Miami" is a substring of both entries; the first one in the feed is taken
        let odds: OddsIndex = vec![
            line("Miami (OH) RedHawks", "Ohio Bobcats", -1.5),
            line("Miami Hurricanes", "Ohio Bobcats", -20.0),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            lookup("Miami", "Ohio", &odds),
            (Some(MarketLine::new(-1.5)), false)
        );
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut odds = OddsIndex::new();
        odds.insert("a", line("A", "B", 1.0));
        odds.insert("b", line("C", "D", 2.0));
        odds.insert("a", line("A", "B", 3.0));
        let spreads: Vec<f64> = odds.lines().map(|l| l.home_spread).collect();
        assert_eq!(spreads, vec![3.0, 2.0]);
        assert_eq!(odds.len(), 2);
        assert_eq!(odds.iter().next().map(|(k, _)| k), Some("a"));
    }
}

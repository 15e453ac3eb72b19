use serde::{Deserialize, Serialize};
use std::fmt;

/// Declares a team-name newtype tied to one naming vocabulary.
///
/// Names from different vocabularies are different types, so comparing a
/// schedule name to an odds name has to go through normalization or the
/// mapping table instead of `==`.
macro_rules! team_name {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(name: impl Into<String>) -> Self {
                Self(name.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(name: &str) -> Self {
                Self(name.to_string())
            }
        }

        impl From<String> for $name {
            fn from(name: String) -> Self {
                Self(name)
            }
        }
    };
}

team_name!(
    /// Team name as used by the stat snapshot and the trained model
    ModelName
);
team_name!(
    /// Team name as produced by the schedule source (ESPN)
    ScheduleName
);
team_name!(
    /// Team name as returned by the odds feed
    OddsName
);

/// A single scheduled game, in schedule vocabulary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub home: ScheduleName,
    pub away: ScheduleName,
}

impl ScheduleEntry {
    pub fn new(home: impl Into<ScheduleName>, away: impl Into<ScheduleName>) -> Self {
        Self {
            home: home.into(),
            away: away.into(),
        }
    }

    /// "Away @ Home", the matchup label every output row starts with
    pub fn matchup(&self) -> String {
        format!("{} @ {}", self.away, self.home)
    }
}

/// One odds-feed entry. `home_spread` is negative when the home team is favored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OddsLine {
    pub home_team: OddsName,
    pub away_team: OddsName,
    pub home_spread: f64,
    #[serde(default)]
    pub bookmaker: Option<String>,
}

/// A market spread resolved for a scheduled game, home-relative:
/// negative = home favored by that many points, positive = home underdog.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketLine {
    pub home_spread: f64,
}

impl MarketLine {
    pub fn new(home_spread: f64) -> Self {
        Self { home_spread }
    }

    /// The same line seen from the other team's side. A pick'em stays +0.0.
    pub fn negated(self) -> Self {
        Self {
            home_spread: -self.home_spread + 0.0,
        }
    }

    pub fn abs(self) -> f64 {
        self.home_spread.abs()
    }
}

impl fmt::Display for MarketLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:+.1}", self.home_spread)
    }
}

/// Offensive or defensive advanced metrics. A metric missing from the
/// snapshot stays `None` here and reads as `0.0` when features are built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SideMetrics {
    pub ppa: Option<f64>,
    pub success_rate: Option<f64>,
    pub explosiveness: Option<f64>,
}

impl SideMetrics {
    /// Pull the three metrics out of a nested stat object. Fields that are
    /// absent or not numeric are left unset.
    pub fn from_value(value: &serde_json::Value) -> Self {
        let metric = |key: &str| value.get(key).and_then(numeric);
        Self {
            ppa: metric("ppa"),
            success_rate: metric("successRate"),
            explosiveness: metric("explosiveness"),
        }
    }

    pub fn ppa_or_zero(&self) -> f64 {
        self.ppa.unwrap_or(0.0)
    }

    pub fn success_rate_or_zero(&self) -> f64 {
        self.success_rate.unwrap_or(0.0)
    }

    pub fn explosiveness_or_zero(&self) -> f64 {
        self.explosiveness.unwrap_or(0.0)
    }
}

// Snapshots written by other tools sometimes store numbers as strings
fn numeric(value: &serde_json::Value) -> Option<f64> {
    let parsed = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// One team's season of advanced stats, keyed by model-vocabulary name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamStatRecord {
    pub season: Option<i32>,
    pub team: ModelName,
    pub conference: Option<String>,
    pub offense: SideMetrics,
    pub defense: SideMetrics,
}

/// Outcome of resolving one schedule name against the mapping table
#[derive(Debug, Clone, PartialEq)]
pub enum TeamResolution {
    Resolved {
        model: ModelName,
        strategy: MatchStrategy,
    },
    Unresolved {
        schedule_name: ScheduleName,
        normalized: String,
    },
}

impl TeamResolution {
    pub fn model(&self) -> Option<&ModelName> {
        match self {
            TeamResolution::Resolved { model, .. } => Some(model),
            TeamResolution::Unresolved { .. } => None,
        }
    }
}

/// Which mapping lookup produced a hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    Exact,
    Normalized,
    CaseInsensitive,
    CaseInsensitiveNormalized,
}

/// A scheduled game with both sides run through the team mapper
#[derive(Debug, Clone, PartialEq)]
pub struct MappedGame {
    pub entry: ScheduleEntry,
    pub home: TeamResolution,
    pub away: TeamResolution,
}

impl MappedGame {
    /// Both model names, or `None` if either side failed to map
    pub fn model_pair(&self) -> Option<(&ModelName, &ModelName)> {
        Some((self.home.model()?, self.away.model()?))
    }

    /// Schedule names that could not be mapped, home first
    pub fn unresolved_names(&self) -> Vec<&ScheduleName> {
        [&self.home, &self.away]
            .into_iter()
            .filter_map(|side| match side {
                TeamResolution::Unresolved { schedule_name, .. } => Some(schedule_name),
                TeamResolution::Resolved { .. } => None,
            })
            .collect()
    }
}

/// Model output for one game, before and after damping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub matchup: String,
    pub raw_margin: f64,
    pub damped_margin: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_matchup_label_is_away_at_home() {
        let game = ScheduleEntry::new("Iowa", "UAlbany");
        assert_eq!(game.matchup(), "UAlbany @ Iowa");
    }

    #[test]
    fn test_market_line_negation() {
        let line = MarketLine::new(-3.5);
        assert_eq!(line.negated().home_spread, 3.5);
        assert_eq!(line.to_string(), "-3.5");
        assert_eq!(line.negated().to_string(), "+3.5");
    }

    #[test]
    fn test_flipped_pickem_prints_positive_zero() {
        let flipped = MarketLine::new(0.0).negated();
        assert!(flipped.home_spread.is_sign_positive());
        assert_eq!(flipped.to_string(), "+0.0");
    }

    #[test]
    fn test_side_metrics_from_value() {
        let value = json!({"ppa": 0.31, "successRate": "0.45", "explosiveness": null});
        let metrics = SideMetrics::from_value(&value);
        assert_eq!(metrics.ppa, Some(0.31));
        assert_eq!(metrics.success_rate, Some(0.45));
        assert_eq!(metrics.explosiveness, None);
        assert_eq!(metrics.explosiveness_or_zero(), 0.0);
    }

    #[test]
    fn test_unresolved_names() {
        let game = MappedGame {
            entry: ScheduleEntry::new("Iowa", "UAlbany"),
            home: TeamResolution::Resolved {
                model: ModelName::from("Iowa"),
                strategy: MatchStrategy::Exact,
            },
            away: TeamResolution::Unresolved {
                schedule_name: ScheduleName::from("UAlbany"),
                normalized: "UAlbany".to_string(),
            },
        };
        assert!(game.model_pair().is_none());
        assert_eq!(game.unresolved_names(), vec![&ScheduleName::from("UAlbany")]);
    }
}

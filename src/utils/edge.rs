use crate::config::EdgePolicy;
use crate::models::{MarketLine, ScheduleEntry, ScheduleName};
use crate::utils::predictor::Margin;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Column order of the predictions sheet. Downstream dashboards read these
/// by name, so they must not change.
pub const SHEET_HEADERS: [&str; 8] = [
    "Matchup",
    "Favorite",
    "Underdog",
    "Predicted Difference",
    "Line",
    "Edge",
    "My Prediction",
    "Favored Team",
];

const NOT_AVAILABLE: &str = "N/A";
const NO_LINE: &str = "No Line Available";
const NO_TEAM_DATA: &str = "Team Data Unavailable";

/// What to do with a game. `BetHome`/`BetAway` carry the edge in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Recommendation {
    NoEdge { difference: f64 },
    BetHome { edge: f64 },
    BetAway { edge: f64 },
    NoLineAvailable,
    TeamDataUnavailable,
}

impl Recommendation {
    pub fn label(&self) -> String {
        match self {
            Recommendation::NoEdge { .. } => "No Edge".to_string(),
            Recommendation::BetHome { edge } => format!("Bet Home (+{:.1})", edge),
            Recommendation::BetAway { edge } => format!("Bet Away (+{:.1})", edge),
            Recommendation::NoLineAvailable => NO_LINE.to_string(),
            Recommendation::TeamDataUnavailable => NO_TEAM_DATA.to_string(),
        }
    }

    pub fn is_bet(&self) -> bool {
        matches!(
            self,
            Recommendation::BetHome { .. } | Recommendation::BetAway { .. }
        )
    }

    pub fn edge(&self) -> Option<f64> {
        match self {
            Recommendation::BetHome { edge } | Recommendation::BetAway { edge } => Some(*edge),
            _ => None,
        }
    }
}

/// Compare the damped model margin to the market.
///
/// Both numbers are home-relative. A gap within the threshold (inclusive)
/// is no edge; a positive gap means the model likes the home side less than
/// the market does, so the value is on the away team.
pub fn recommend(
    damped_margin: f64,
    market_line: Option<MarketLine>,
    no_edge_threshold: f64,
) -> Recommendation {
    let Some(line) = market_line else {
        return Recommendation::NoLineAvailable;
    };
    let difference = damped_margin - line.home_spread;
    if difference.abs() <= no_edge_threshold {
        Recommendation::NoEdge { difference }
    } else if difference > 0.0 {
        Recommendation::BetAway { edge: difference }
    } else {
        Recommendation::BetHome {
            edge: difference.abs(),
        }
    }
}

/// Size bucket of a model/market gap, with last season's record for it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeBand {
    Red,
    Yellow,
    Green,
    Fire,
    Diamond,
    Crown,
}

impl EdgeBand {
    pub fn from_edge(edge: f64) -> Self {
        let edge = edge.abs();
        if edge < 2.0 {
            EdgeBand::Red
        } else if edge < 5.0 {
            EdgeBand::Yellow
        } else if edge < 7.0 {
            EdgeBand::Green
        } else if edge < 9.0 {
            EdgeBand::Fire
        } else if edge < 12.0 {
            EdgeBand::Diamond
        } else {
            EdgeBand::Crown
        }
    }

    pub fn range(&self) -> &'static str {
        match self {
            EdgeBand::Red => "0-2",
            EdgeBand::Yellow => "2-5",
            EdgeBand::Green => "5-7",
            EdgeBand::Fire => "7-9",
            EdgeBand::Diamond => "9-12",
            EdgeBand::Crown => "12+",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            EdgeBand::Red => "🔴",
            EdgeBand::Yellow => "🟡",
            EdgeBand::Green => "🟢",
            EdgeBand::Fire => "🔥",
            EdgeBand::Diamond => "💎",
            EdgeBand::Crown => "👑",
        }
    }

    pub fn rating(&self) -> &'static str {
        match self {
            EdgeBand::Red => "Avoid",
            EdgeBand::Yellow => "Weak",
            EdgeBand::Green => "Good",
            EdgeBand::Fire => "Excellent",
            EdgeBand::Diamond => "Strong",
            EdgeBand::Crown => "Elite",
        }
    }

    /// Won-lost record of bets in this band, 2024 season
    pub fn historical_record(&self) -> &'static str {
        match self {
            EdgeBand::Red => "2-3 (40%)",
            EdgeBand::Yellow => "3-5 (37%)",
            EdgeBand::Green => "3-1 (75%)",
            EdgeBand::Fire => "2-0 (100%)",
            EdgeBand::Diamond => "3-2 (60%)",
            EdgeBand::Crown => "9-5 (64%)",
        }
    }

    pub fn win_rate(&self) -> u8 {
        match self {
            EdgeBand::Red => 40,
            EdgeBand::Yellow => 37,
            EdgeBand::Green => 75,
            EdgeBand::Fire => 100,
            EdgeBand::Diamond => 60,
            EdgeBand::Crown => 64,
        }
    }

    /// e.g. "Good (75%)"
    pub fn confidence_label(&self) -> String {
        format!("{} ({}%)", self.rating(), self.win_rate())
    }
}

impl fmt::Display for EdgeBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} pts", self.emoji(), self.range())
    }
}

/// Final per-game result. Favorite/underdog come from the sign of the damped
/// margin only; the recommendation is a separate question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub matchup: String,
    pub home_team: ScheduleName,
    pub away_team: ScheduleName,
    pub favorite: Option<ScheduleName>,
    pub underdog: Option<ScheduleName>,
    pub raw_margin: Option<f64>,
    pub damped_margin: Option<f64>,
    pub predicted_margin_abs: Option<f64>,
    pub market_line: Option<MarketLine>,
    pub market_line_abs: Option<f64>,
    pub edge_abs: Option<f64>,
    pub recommendation: Recommendation,
    pub edge_band: Option<EdgeBand>,
    pub confidence_label: Option<String>,
}

impl EdgeRecord {
    pub fn classify(
        entry: &ScheduleEntry,
        margin: Margin,
        market_line: Option<MarketLine>,
        policy: &EdgePolicy,
    ) -> Self {
        let damped = margin.damped;
        let (favorite, underdog) = if damped > 0.0 {
            (&entry.home, &entry.away)
        } else {
            (&entry.away, &entry.home)
        };
        let predicted_abs = damped.abs();
        let recommendation = recommend(damped, market_line, policy.no_edge_threshold);
        let edge_band = market_line.map(|line| EdgeBand::from_edge(damped - line.home_spread));

        Self {
            matchup: entry.matchup(),
            home_team: entry.home.clone(),
            away_team: entry.away.clone(),
            favorite: Some(favorite.clone()),
            underdog: Some(underdog.clone()),
            raw_margin: Some(margin.raw),
            damped_margin: Some(damped),
            predicted_margin_abs: Some(predicted_abs),
            market_line,
            market_line_abs: market_line.map(MarketLine::abs),
            edge_abs: market_line.map(|line| (predicted_abs - line.abs()).abs()),
            recommendation,
            edge_band,
            confidence_label: edge_band.map(|band| band.confidence_label()),
        }
    }

    /// Row for a game that could not be scored
    pub fn unavailable(entry: &ScheduleEntry) -> Self {
        Self {
            matchup: entry.matchup(),
            home_team: entry.home.clone(),
            away_team: entry.away.clone(),
            favorite: None,
            underdog: None,
            raw_margin: None,
            damped_margin: None,
            predicted_margin_abs: None,
            market_line: None,
            market_line_abs: None,
            edge_abs: None,
            recommendation: Recommendation::TeamDataUnavailable,
            edge_band: None,
            confidence_label: None,
        }
    }

    /// Gap between model and market, home-relative
    pub fn difference(&self) -> Option<f64> {
        Some(self.damped_margin? - self.market_line?.home_spread)
    }

    /// The eight sheet columns, formatted exactly as the dashboards expect
    pub fn to_sheet_row(&self) -> [String; 8] {
        let (Some(favorite), Some(underdog), Some(damped), Some(predicted)) = (
            &self.favorite,
            &self.underdog,
            self.damped_margin,
            self.predicted_margin_abs,
        ) else {
            return [
                self.matchup.clone(),
                NOT_AVAILABLE.to_string(),
                NOT_AVAILABLE.to_string(),
                NOT_AVAILABLE.to_string(),
                NOT_AVAILABLE.to_string(),
                NO_TEAM_DATA.to_string(),
                NOT_AVAILABLE.to_string(),
                NO_TEAM_DATA.to_string(),
            ];
        };

        let line = self
            .market_line_abs
            .map_or_else(|| NOT_AVAILABLE.to_string(), |l| format!("{:.1}", l));
        let edge = self
            .edge_abs
            .map_or_else(|| NO_LINE.to_string(), |e| format!("{:.1}", e));

        [
            self.matchup.clone(),
            favorite.to_string(),
            underdog.to_string(),
            format!("{:.1}", predicted),
            line,
            edge,
            format!("{:.1}", damped),
            format!("{} -{:.1}", favorite, predicted),
        ]
    }

    /// Format the record as a readable console line
    pub fn format(&self) -> String {
        let line = self
            .market_line
            .map_or_else(|| NOT_AVAILABLE.to_string(), |l| l.to_string());
        let model = self
            .damped_margin
            .map_or_else(|| NOT_AVAILABLE.to_string(), |m| format!("{:+.1}", m));
        let band = match (&self.edge_band, &self.confidence_label) {
            (Some(band), Some(confidence)) => format!(" | {} {}", band, confidence),
            _ => String::new(),
        };
        format!(
            "{} | {} | Model: {} | Line: {}{}",
            self.matchup,
            self.recommendation.label(),
            model,
            line,
            band
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const THRESHOLD: f64 = 2.5;

    fn margin(damped: f64) -> Margin {
        Margin {
            raw: damped / 0.8,
            damped,
        }
    }

    fn game() -> ScheduleEntry {
        ScheduleEntry::new("Kansas", "Kansas State")
    }

    #[test]
    fn test_home_favored_by_more_than_market() {
        // Model has home by 7, market by 2
        let rec = recommend(-7.0, Some(MarketLine::new(-2.0)), THRESHOLD);
        match rec {
            Recommendation::BetHome { edge } => assert_relative_eq!(edge, 5.0),
            other => panic!("expected BetHome, got {other:?}"),
        }
        assert_eq!(rec.label(), "Bet Home (+5.0)");
    }

    #[test]
    fn test_small_gap_is_no_edge() {
        assert_eq!(
            recommend(2.0, Some(MarketLine::new(0.0)), THRESHOLD),
            Recommendation::NoEdge { difference: 2.0 }
        );
    }

    #[test]
    fn test_threshold_is_inclusive() {
        assert!(matches!(
            recommend(2.5, Some(MarketLine::new(0.0)), THRESHOLD),
            Recommendation::NoEdge { .. }
        ));
        assert!(matches!(
            recommend(-2.5, Some(MarketLine::new(0.0)), THRESHOLD),
            Recommendation::NoEdge { .. }
        ));
        assert!(matches!(
            recommend(2.6, Some(MarketLine::new(0.0)), THRESHOLD),
            Recommendation::BetAway { .. }
        ));
    }

    #[test]
    fn test_recommendation_side_follows_difference_sign() {
        let cases = [(-10.0, 3.0), (4.0, -3.5), (0.0, 6.0), (-1.0, -9.5), (8.0, 1.0)];
        for (damped, line) in cases {
            let difference: f64 = damped - line;
            let rec = recommend(damped, Some(MarketLine::new(line)), THRESHOLD);
            if difference.abs() <= THRESHOLD {
                assert!(matches!(rec, Recommendation::NoEdge { .. }));
            } else if difference > 0.0 {
                assert_eq!(rec, Recommendation::BetAway { edge: difference });
            } else {
                assert_eq!(rec, Recommendation::BetHome { edge: -difference });
            }
        }
    }

    #[test]
    fn test_no_line() {
        assert_eq!(recommend(5.0, None, THRESHOLD), Recommendation::NoLineAvailable);

        let record = EdgeRecord::classify(&game(), margin(5.0), None, &EdgePolicy::default());
        assert_eq!(record.recommendation, Recommendation::NoLineAvailable);
        assert_eq!(record.edge_abs, None);
        assert_eq!(record.edge_band, None);
        // Prediction is still reported
        assert_eq!(record.damped_margin, Some(5.0));
    }

    #[test]
    fn test_favorite_from_margin_sign_only() {
        let policy = EdgePolicy::default();

        let home_fav = EdgeRecord::classify(&game(), margin(6.0), None, &policy);
        assert_eq!(home_fav.favorite, Some("Kansas".into()));
        assert_eq!(home_fav.underdog, Some("Kansas State".into()));

        let away_fav =
            EdgeRecord::classify(&game(), margin(-6.0), Some(MarketLine::new(-14.0)), &policy);
        assert_eq!(away_fav.favorite, Some("Kansas State".into()));
        // Model and market disagree on size, not on the favorite
        assert!(matches!(away_fav.recommendation, Recommendation::BetAway { .. }));

        let pick_em = EdgeRecord::classify(&game(), margin(0.0), None, &policy);
        assert_eq!(pick_em.favorite, Some("Kansas State".into()));
    }

    #[test]
    fn test_edge_bands() {
        assert_eq!(EdgeBand::from_edge(0.0), EdgeBand::Red);
        assert_eq!(EdgeBand::from_edge(1.99), EdgeBand::Red);
        assert_eq!(EdgeBand::from_edge(2.0), EdgeBand::Yellow);
        assert_eq!(EdgeBand::from_edge(5.0), EdgeBand::Green);
        assert_eq!(EdgeBand::from_edge(-7.5), EdgeBand::Fire);
        assert_eq!(EdgeBand::from_edge(9.0), EdgeBand::Diamond);
        assert_eq!(EdgeBand::from_edge(12.0), EdgeBand::Crown);
        assert_eq!(EdgeBand::from_edge(40.0), EdgeBand::Crown);
        assert_eq!(EdgeBand::Green.confidence_label(), "Good (75%)");
        assert_eq!(EdgeBand::Crown.historical_record(), "9-5 (64%)");
        assert_eq!(EdgeBand::Diamond.to_string(), "💎 9-12 pts");
    }

    #[test]
    fn test_sheet_row_with_line() {
        let record = EdgeRecord::classify(
            &game(),
            margin(-7.04),
            Some(MarketLine::new(-2.0)),
            &EdgePolicy::default(),
        );
        assert_eq!(
            record.to_sheet_row(),
            [
                "Kansas State @ Kansas",
                "Kansas State",
                "Kansas",
                "7.0",
                "2.0",
                "5.0",
                "-7.0",
                "Kansas State -7.0",
            ]
            .map(String::from)
        );
        assert_eq!(record.edge_band, Some(EdgeBand::Green));
    }

    #[test]
    fn test_sheet_row_without_line() {
        let record =
            EdgeRecord::classify(&game(), margin(3.2), None, &EdgePolicy::default());
        let row = record.to_sheet_row();
        assert_eq!(row[4], "N/A");
        assert_eq!(row[5], "No Line Available");
        assert_eq!(row[6], "3.2");
        assert_eq!(row[7], "Kansas -3.2");
    }

    #[test]
    fn test_unavailable_row() {
        let record = EdgeRecord::unavailable(&ScheduleEntry::new("Iowa", "UAlbany"));
        assert_eq!(record.recommendation.label(), "Team Data Unavailable");
        assert_eq!(
            record.to_sheet_row(),
            [
                "UAlbany @ Iowa",
                "N/A",
                "N/A",
                "N/A",
                "N/A",
                "Team Data Unavailable",
                "N/A",
                "Team Data Unavailable",
            ]
            .map(String::from)
        );
    }
}

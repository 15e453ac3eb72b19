use crate::error::MissingTeamStats;
use crate::models::{ModelName, SideMetrics, TeamStatRecord};
use std::collections::HashMap;

/// Feature names in vector order. Models bind their coefficients to these.
pub const FEATURE_NAMES: [&str; 15] = [
    "off_ppa",
    "off_successRate",
    "off_explosiveness",
    "def_ppa",
    "def_successRate",
    "def_explosiveness",
    "off_ppa_away",
    "off_successRate_away",
    "off_explosiveness_away",
    "def_ppa_away",
    "def_successRate_away",
    "def_explosiveness_away",
    "off_eff_diff",
    "def_eff_diff",
    "home_advantage",
];

const HOME_FIELD: f64 = 1.0;

/// Season stat records, read-only once built
#[derive(Debug, Clone, Default)]
pub struct TeamStatTable {
    records: Vec<TeamStatRecord>,
    exact: HashMap<String, usize>,
    upper: HashMap<String, usize>,
}

impl TeamStatTable {
    /// Index the records. On duplicate team names the first record wins.
    pub fn new(records: Vec<TeamStatRecord>) -> Self {
        let mut exact = HashMap::new();
        let mut upper = HashMap::new();
        for (i, record) in records.iter().enumerate() {
            let name = record.team.as_str().trim();
            exact.entry(name.to_string()).or_insert(i);
            upper.entry(name.to_uppercase()).or_insert(i);
        }
        Self {
            records,
            exact,
            upper,
        }
    }

    /// Exact lookup, then case-insensitive
    pub fn get(&self, team: &ModelName) -> Option<&TeamStatRecord> {
        let name = team.as_str().trim();
        self.exact
            .get(name)
            .or_else(|| self.upper.get(&name.to_uppercase()))
            .and_then(|&i| self.records.get(i))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Model input for one game, in [`FEATURE_NAMES`] order
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: [f64; 15],
}

impl FeatureVector {
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|n| *n == name)
            .map(|i| self.values[i])
    }

    /// Values in the order a model was trained with.
    /// `None` if any name is not a known feature.
    pub fn select(&self, names: &[String]) -> Option<Vec<f64>> {
        names.iter().map(|name| self.get(name)).collect()
    }
}

fn side_values(side: &SideMetrics) -> [f64; 3] {
    [
        side.ppa_or_zero(),
        side.success_rate_or_zero(),
        side.explosiveness_or_zero(),
    ]
}

/// Assemble the feature vector for `home` vs `away`.
///
/// Both teams must have a stat record; a missing record is reported rather
/// than zero-filled. Individual metrics missing inside a record read as 0.0.
pub fn build_features(
    home: &ModelName,
    away: &ModelName,
    stats: &TeamStatTable,
) -> Result<FeatureVector, MissingTeamStats> {
    let (home_stats, away_stats) = match (stats.get(home), stats.get(away)) {
        (Some(h), Some(a)) => (h, a),
        (h, a) => {
            let missing = [(home, h.is_none()), (away, a.is_none())]
                .into_iter()
                .filter(|(_, absent)| *absent)
                .map(|(name, _)| name.clone())
                .collect();
            return Err(MissingTeamStats { missing });
        }
    };

    let [h_off_ppa, h_off_sr, h_off_ex] = side_values(&home_stats.offense);
    let [h_def_ppa, h_def_sr, h_def_ex] = side_values(&home_stats.defense);
    let [a_off_ppa, a_off_sr, a_off_ex] = side_values(&away_stats.offense);
    let [a_def_ppa, a_def_sr, a_def_ex] = side_values(&away_stats.defense);

    Ok(FeatureVector {
        values: [
            h_off_ppa,
            h_off_sr,
            h_off_ex,
            h_def_ppa,
            h_def_sr,
            h_def_ex,
            a_off_ppa,
            a_off_sr,
            a_off_ex,
            a_def_ppa,
            a_def_sr,
            a_def_ex,
            h_off_ppa - a_off_ppa,
            h_def_ppa - a_def_ppa,
            HOME_FIELD,
        ],
    })
}

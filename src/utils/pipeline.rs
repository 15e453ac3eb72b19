use crate::config::EdgePolicy;
use crate::error::{MissingTeamStats, PipelineError};
use crate::models::{
    MatchStrategy, PredictionRecord, ScheduleEntry, ScheduleName, TeamResolution,
};
use crate::utils::edge::EdgeRecord;
use crate::utils::features::{build_features, TeamStatTable};
use crate::utils::matchup::{find_line, OddsIndex};
use crate::utils::predictor::{predict_margin, MarginModel};
use crate::utils::team_mapper::TeamMapper;
use std::fmt;
use tracing::{debug, info, warn};

/// Everything a run reads, loaded once up front and never mutated
#[derive(Debug, Clone, Default)]
pub struct RunSnapshot {
    pub mapper: TeamMapper,
    pub stats: TeamStatTable,
    pub odds: OddsIndex,
}

/// A per-game problem. The game still gets a record; these are reported
/// next to the records rather than failing the run.
#[derive(Debug, Clone, PartialEq)]
pub enum GameIssue {
    UnresolvedTeams {
        matchup: String,
        names: Vec<ScheduleName>,
    },
    MissingStats {
        matchup: String,
        source: MissingTeamStats,
    },
    NoMarketLine {
        matchup: String,
    },
}

impl GameIssue {
    pub fn matchup(&self) -> &str {
        match self {
            GameIssue::UnresolvedTeams { matchup, .. }
            | GameIssue::MissingStats { matchup, .. }
            | GameIssue::NoMarketLine { matchup } => matchup,
        }
    }
}

impl fmt::Display for GameIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameIssue::UnresolvedTeams { matchup, names } => {
                let names: Vec<&str> = names.iter().map(ScheduleName::as_str).collect();
                write!(f, "{}: unmapped team name(s) {}", matchup, names.join(", "))
            }
            GameIssue::MissingStats { matchup, source } => write!(f, "{}: {}", matchup, source),
            GameIssue::NoMarketLine { matchup } => write!(f, "{}: no market line", matchup),
        }
    }
}

/// Result of one run: one record per scheduled game, in schedule order
#[derive(Debug, Clone, Default)]
pub struct PipelineOutput {
    pub records: Vec<EdgeRecord>,
    pub predictions: Vec<PredictionRecord>,
    pub issues: Vec<GameIssue>,
}

impl PipelineOutput {
    /// Recommended bets, largest edge first
    pub fn top_bets(&self, n: usize) -> Vec<&EdgeRecord> {
        let mut bets: Vec<&EdgeRecord> = self
            .records
            .iter()
            .filter(|r| r.recommendation.is_bet())
            .collect();
        bets.sort_by(|a, b| {
            let a = a.recommendation.edge().unwrap_or(0.0);
            let b = b.recommendation.edge().unwrap_or(0.0);
            b.partial_cmp(&a).unwrap_or(std::cmp::Ordering::Equal)
        });
        bets.into_iter().take(n).collect()
    }

    pub fn lines_found(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.market_line.is_some())
            .count()
    }
}

/// Runs schedule entries through map -> features -> model -> line -> edge
pub struct PredictionPipeline<'a, M: MarginModel + ?Sized> {
    snapshot: &'a RunSnapshot,
    model: &'a M,
    policy: EdgePolicy,
}

impl<'a, M: MarginModel + ?Sized> PredictionPipeline<'a, M> {
    pub fn new(snapshot: &'a RunSnapshot, model: &'a M, policy: EdgePolicy) -> Self {
        Self {
            snapshot,
            model,
            policy,
        }
    }

    /// Score every game. Unmapped teams and missing stats become
    /// `TeamDataUnavailable` records; a model failure aborts the run and
    /// nothing is returned.
    pub fn run(&self, schedule: &[ScheduleEntry]) -> Result<PipelineOutput, PipelineError> {
        let mut output = PipelineOutput::default();

        for entry in schedule {
            let matchup = entry.matchup();
            let mapped = self.snapshot.mapper.map_game(entry);
            log_fallbacks(&mapped.home);
            log_fallbacks(&mapped.away);

            let Some((home, away)) = mapped.model_pair() else {
                let names: Vec<ScheduleName> =
                    mapped.unresolved_names().into_iter().cloned().collect();
                warn!(%matchup, ?names, "team name not in mapping table");
                output.issues.push(GameIssue::UnresolvedTeams {
                    matchup,
                    names,
                });
                output.records.push(EdgeRecord::unavailable(entry));
                continue;
            };

            let features = match build_features(home, away, &self.snapshot.stats) {
                Ok(features) => features,
                Err(missing) => {
                    warn!(%matchup, "{}", missing);
                    output.issues.push(GameIssue::MissingStats {
                        matchup,
                        source: missing,
                    });
                    output.records.push(EdgeRecord::unavailable(entry));
                    continue;
                }
            };

            let margin = predict_margin(&features, self.model, &self.policy).map_err(|source| {
                PipelineError::PredictionUnavailable {
                    matchup: matchup.clone(),
                    source,
                }
            })?;

            let (line, flipped) = find_line(&entry.home, &entry.away, &self.snapshot.odds);
            match line {
                Some(line) => debug!(%matchup, %line, flipped, "matched market line"),
                None => {
                    debug!(%matchup, "no market line");
                    output.issues.push(GameIssue::NoMarketLine {
                        matchup: matchup.clone(),
                    });
                }
            }

            output.predictions.push(PredictionRecord {
                matchup,
                raw_margin: margin.raw,
                damped_margin: margin.damped,
            });
            output
                .records
                .push(EdgeRecord::classify(entry, margin, line, &self.policy));
        }

        info!(
            games = output.records.len(),
            predicted = output.predictions.len(),
            lines = output.lines_found(),
            issues = output.issues.len(),
            "pipeline run complete"
        );
        Ok(output)
    }
}

fn log_fallbacks(resolution: &TeamResolution) {
    if let TeamResolution::Resolved { model, strategy } = resolution {
        if *strategy != MatchStrategy::Exact {
            debug!(%model, ?strategy, "mapped team by fallback lookup");
        }
    }
}

use crate::models::{MappedGame, MatchStrategy, ModelName, ScheduleEntry, ScheduleName, TeamResolution};
use crate::utils::normalize::normalize_team_name;
use std::collections::HashMap;

/// Resolves schedule-vocabulary names to model-vocabulary names.
///
/// The mapping table is indexed four ways once, up front; lookups then try
/// exact, normalized, case-insensitive and case-insensitive normalized keys
/// in that order. When two table rows collide on a derived key the row that
/// appears first in the table wins.
#[derive(Debug, Clone, Default)]
pub struct TeamMapper {
    exact: HashMap<String, ModelName>,
    normalized: HashMap<String, ModelName>,
    case_insensitive: HashMap<String, ModelName>,
    case_insensitive_normalized: HashMap<String, ModelName>,
}

impl TeamMapper {
    pub fn new<I>(table: I) -> Self
    where
        I: IntoIterator<Item = (ScheduleName, ModelName)>,
    {
        let mut mapper = Self::default();
        for (schedule_name, model_name) in table {
            let key = schedule_name.as_str().trim();
            let normalized = normalize_team_name(key);

            mapper
                .exact
                .entry(key.to_string())
                .or_insert_with(|| model_name.clone());
            mapper
                .case_insensitive
                .entry(key.to_uppercase())
                .or_insert_with(|| model_name.clone());
            if !normalized.is_empty() {
                mapper
                    .case_insensitive_normalized
                    .entry(normalized.to_uppercase())
                    .or_insert_with(|| model_name.clone());
                mapper.normalized.entry(normalized).or_insert(model_name);
            }
        }
        mapper
    }

    pub fn len(&self) -> usize {
        self.exact.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty()
    }

    /// Map one schedule name. Pure: an unmapped name comes back as
    /// [`TeamResolution::Unresolved`] and the caller decides how to report it.
    pub fn map_to_model_vocab(&self, schedule_name: &ScheduleName) -> TeamResolution {
        let name = schedule_name.as_str().trim();
        let normalized = normalize_team_name(name);

        let attempts = [
            (MatchStrategy::Exact, self.exact.get(name)),
            (MatchStrategy::Normalized, self.normalized.get(&normalized)),
            (
                MatchStrategy::CaseInsensitive,
                self.case_insensitive.get(&name.to_uppercase()),
            ),
            (
                MatchStrategy::CaseInsensitiveNormalized,
                self.case_insensitive_normalized
                    .get(&normalized.to_uppercase()),
            ),
        ];

        for (strategy, hit) in attempts {
            if let Some(model) = hit {
                return TeamResolution::Resolved {
                    model: model.clone(),
                    strategy,
                };
            }
        }

        TeamResolution::Unresolved {
            schedule_name: schedule_name.clone(),
            normalized,
        }
    }

    /// Map both sides of a scheduled game
    pub fn map_game(&self, entry: &ScheduleEntry) -> MappedGame {
        MappedGame {
            entry: entry.clone(),
            home: self.map_to_model_vocab(&entry.home),
            away: self.map_to_model_vocab(&entry.away),
        }
    }
}

/// One-off lookup against a plain table. Builds the indexes on every call,
/// so batch callers should hold on to a [`TeamMapper`] instead.
pub fn map_to_model_vocab(
    schedule_name: &ScheduleName,
    table: &[(ScheduleName, ModelName)],
) -> TeamResolution {
    TeamMapper::new(table.iter().cloned()).map_to_model_vocab(schedule_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Vec<(ScheduleName, ModelName)> {
        vec![
            ("Kansas".into(), "Kansas".into()),
            ("Kansas State".into(), "Kansas State".into()),
            ("Miami".into(), "Miami".into()),
            ("Miami (OH)".into(), "Miami (OH)".into()),
            ("Hawaii".into(), "Hawai'i".into()),
            ("UConn".into(), "Connecticut".into()),
            ("San Jose State".into(), "San José State".into()),
        ]
    }

    fn resolve(mapper: &TeamMapper, name: &str) -> TeamResolution {
        mapper.map_to_model_vocab(&ScheduleName::from(name))
    }

    #[test]
    fn test_exact_lookup() {
        let mapper = TeamMapper::new(table());
        assert_eq!(
            resolve(&mapper, "UConn"),
            TeamResolution::Resolved {
                model: "Connecticut".into(),
                strategy: MatchStrategy::Exact,
            }
        );
    }

    #[test]
    fn test_normalized_lookup_strips_mascot() {
        let mapper = TeamMapper::new(table());
        assert_eq!(
            resolve(&mapper, "Kansas State Wildcats"),
            TeamResolution::Resolved {
                model: "Kansas State".into(),
                strategy: MatchStrategy::Normalized,
            }
        );
        assert_eq!(
            resolve(&mapper, "Hawai'i Rainbow Warriors").model(),
            Some(&ModelName::from("Hawai'i"))
        );
        assert_eq!(
            resolve(&mapper, "San José State Spartans").model(),
            Some(&ModelName::from("San José State"))
        );
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let mapper = TeamMapper::new(table());
        assert_eq!(
            resolve(&mapper, "UCONN"),
            TeamResolution::Resolved {
                model: "Connecticut".into(),
                strategy: MatchStrategy::CaseInsensitive,
            }
        );
        assert_eq!(
            resolve(&mapper, "kansas state wildcats"),
            TeamResolution::Resolved {
                model: "Kansas State".into(),
                strategy: MatchStrategy::CaseInsensitiveNormalized,
            }
        );
    }

    #[test]
    fn test_does_not_confuse_similar_schools() {
        let mapper = TeamMapper::new(table());
        assert_eq!(resolve(&mapper, "Kansas").model(), Some(&"Kansas".into()));
        assert_eq!(
            resolve(&mapper, "Miami (OH) RedHawks").model(),
            Some(&"Miami (OH)".into())
        );
        assert_eq!(
            resolve(&mapper, "Miami Hurricanes").model(),
            Some(&"Miami".into())
        );
    }

    #[test]
    fn test_unmapped_name_is_unresolved() {
        let mapper = TeamMapper::new(table());
        match resolve(&mapper, "UAlbany") {
            TeamResolution::Unresolved {
                schedule_name,
                normalized,
            } => {
                assert_eq!(schedule_name.as_str(), "UAlbany");
                assert_eq!(normalized, "UAlbany");
            }
            other => panic!("expected unresolved, got {other:?}"),
        }
        assert!(resolve(&mapper, "").model().is_none());
    }

    #[test]
    fn test_first_row_wins_on_collision() {
        let mapper = TeamMapper::new(vec![
            ("Texas Longhorns".into(), "Texas".into()),
            ("Texas".into(), "Texas (dup)".into()),
        ]);
        // Normalized key "Texas" was claimed by the first row
        assert_eq!(
            mapper.normalized.get("Texas"),
            Some(&ModelName::from("Texas"))
        );
        // The exact key still resolves to its own row
        assert_eq!(resolve(&mapper, "Texas").model(), Some(&"Texas (dup)".into()));
    }

    #[test]
    fn test_map_game_and_free_function() {
        let mapper = TeamMapper::new(table());
        let game = mapper.map_game(&ScheduleEntry::new("Kansas", "UAlbany"));
        assert!(game.model_pair().is_none());
        assert_eq!(game.unresolved_names().len(), 1);

        let resolved = map_to_model_vocab(&"Kansas Jayhawks".into(), &table());
        assert_eq!(resolved.model(), Some(&"Kansas".into()));
    }
}

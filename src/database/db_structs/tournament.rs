use crate::{
    database::{db_structs::PendingTournament, store::Document},
    model::{
        error::{require_text, ResolutionError, TournamentError, ValidationError},
        structures::{match_record::Match, source_type::SourceType}
    }
};
use bson::{oid::ObjectId, Bson};
use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

/// A finalized tournament whose participants are all resolved player ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: ObjectId,
    pub name: String,
    #[serde(rename = "type")]
    pub source_type: SourceType,
    #[serde(default, with = "bson::serde_helpers::chrono_datetime_as_bson_datetime_optional")]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub regions: Vec<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub raw: Option<String>,
    #[serde(default)]
    pub matches: Vec<Match>,
    #[serde(default)]
    pub players: Vec<ObjectId>,
    /// The player ids as they were when the tournament was finalized, before any merges
    #[serde(default)]
    pub orig_ids: Vec<ObjectId>,
    #[serde(default)]
    pub version: u64
}

/// Outcome of [`Tournament::replace_player`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Replacement {
    Replaced,
    NotParticipant
}

impl Tournament {
    pub fn contains_player(&self, player_id: ObjectId) -> bool {
        self.players.contains(&player_id)
    }

    pub fn in_region(&self, region: &str) -> bool {
        self.regions.iter().any(|r| r == region)
    }

    /// Substitutes `player_to_add` for `player_to_remove` in the player list and in every match.
    ///
    /// Nothing is changed when `player_to_remove` is not listed. Fails without
    /// changing anything if the two players met in any match.
    pub fn replace_player(
        &mut self,
        player_to_remove: ObjectId,
        player_to_add: ObjectId
    ) -> Result<Replacement, TournamentError> {
        if !self.contains_player(player_to_remove) {
            warn!(
                "Player with id {} is not in tournament {}. Ignoring.",
                player_to_remove, self.id
            );
            return Ok(Replacement::NotParticipant);
        }

        if player_to_remove == player_to_add {
            return Ok(Replacement::Replaced);
        }

        if self
            .matches
            .iter()
            .any(|m| m.contains_players(player_to_remove, player_to_add))
        {
            return Err(TournamentError::SelfMatch {
                remove: player_to_remove,
                add: player_to_add
            });
        }

        if self.contains_player(player_to_add) {
            self.players.retain(|p| *p != player_to_remove);
        } else {
            for p in self.players.iter_mut().filter(|p| **p == player_to_remove) {
                *p = player_to_add;
            }
        }

        for m in self.matches.iter_mut() {
            if m.winner == player_to_remove {
                m.winner = player_to_add;
            }

            if m.loser == player_to_remove {
                m.loser = player_to_add;
            }
        }

        debug!(
            "Replaced player {} with {} in tournament {}",
            player_to_remove, player_to_add, self.id
        );

        Ok(Replacement::Replaced)
    }

    /// Promotes a pending tournament once every alias it references maps to a player id.
    pub fn from_pending_tournament(pending_tournament: &PendingTournament) -> Result<Tournament, ResolutionError> {
        let alias_to_id_map: HashMap<&str, ObjectId> = pending_tournament
            .alias_to_id_map
            .iter()
            .flatten()
            .filter_map(|entry| entry.player_id.map(|id| (entry.player_alias.as_str(), id)))
            .collect();

        let unresolved = pending_tournament
            .players
            .iter()
            .chain(
                pending_tournament
                    .matches
                    .iter()
                    .flat_map(|m| [&m.winner, &m.loser])
            )
            .filter(|alias| !alias_to_id_map.contains_key(alias.as_str()))
            .cloned()
            .sorted()
            .dedup()
            .collect_vec();

        if !unresolved.is_empty() {
            return Err(ResolutionError::UnresolvedAliases(unresolved));
        }

        // Every lookup below is guaranteed to succeed
        let resolve = |alias: &String| alias_to_id_map[alias.as_str()];

        let players = pending_tournament.players.iter().map(resolve).collect_vec();
        let matches = pending_tournament
            .matches
            .iter()
            .map(|am| Match::new(resolve(&am.winner), resolve(&am.loser)))
            .collect_vec();

        let tournament = Tournament {
            id: pending_tournament.id,
            name: pending_tournament.name.clone(),
            source_type: pending_tournament.source_type,
            date: pending_tournament.date,
            regions: pending_tournament.regions.clone(),
            url: pending_tournament.url.clone(),
            raw: pending_tournament.raw.clone(),
            matches,
            orig_ids: players.clone(),
            players,
            version: 0
        };
        tournament.validate()?;

        Ok(tournament)
    }

    pub fn validate_at_creation(&self) -> Result<(), ValidationError> {
        if self.players.len() != self.orig_ids.len() {
            return Err(ValidationError::invalid(
                "Tournament",
                "orig_ids",
                format!(
                    "has {} entries but players has {}",
                    self.orig_ids.len(),
                    self.players.len()
                )
            ));
        }

        self.validate()
    }
}

impl Document for Tournament {
    const COLLECTION: &'static str = "tournaments";

    fn key(&self) -> Bson {
        Bson::ObjectId(self.id)
    }

    fn version(&self) -> Option<u64> {
        Some(self.version)
    }

    fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("Tournament", "name", &self.name)?;

        for m in &self.matches {
            m.validate()?;

            for participant in [m.winner, m.loser] {
                if !self.players.contains(&participant) {
                    return Err(ValidationError::invalid(
                        "Tournament",
                        "matches",
                        format!("match {} references player {} not in players", m, participant)
                    ));
                }
            }
        }

        Ok(())
    }
}

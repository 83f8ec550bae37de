use crate::{
    database::store::Document,
    model::{
        error::{require_text, ValidationError},
        scraper::Scraper,
        structures::{alias_mapping::AliasMapping, match_record::AliasMatch, source_type::SourceType}
    }
};
use bson::{oid::ObjectId, Bson};
use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// A scraped tournament whose participants are still alias strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingTournament {
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
    pub matches: Vec<AliasMatch>,
    #[serde(default)]
    pub players: Vec<String>,
    #[serde(default)]
    pub alias_to_id_map: Option<Vec<AliasMapping>>,
    #[serde(default)]
    pub version: u64
}

impl PendingTournament {
    pub fn from_scraper(
        source_type: SourceType,
        scraper: &impl Scraper,
        region_id: &str
    ) -> Result<PendingTournament, ValidationError> {
        let pending_tournament = PendingTournament {
            id: ObjectId::new(),
            name: scraper.get_name(),
            source_type,
            date: scraper.get_date(),
            regions: vec![region_id.to_string()],
            url: scraper.get_url(),
            raw: scraper.get_raw(),
            matches: scraper.get_matches(),
            players: scraper.get_players(),
            alias_to_id_map: None,
            version: 0
        };
        pending_tournament.validate()?;

        Ok(pending_tournament)
    }

    /// Points `alias` at `id`, overwriting an existing mapping for the same alias.
    pub fn set_alias_id_mapping(&mut self, alias: &str, id: ObjectId) {
        let mappings = self.alias_to_id_map.get_or_insert_with(Vec::new);

        match mappings.iter_mut().find(|m| m.player_alias == alias) {
            Some(mapping) => mapping.player_id = Some(id),
            None => mappings.push(AliasMapping::new(alias, Some(id)))
        }
    }

    pub fn delete_alias_id_mapping(&mut self, alias: &str) -> Option<AliasMapping> {
        let mappings = self.alias_to_id_map.get_or_insert_with(Vec::new);

        match mappings.iter().position(|m| m.player_alias == alias) {
            Some(index) => Some(mappings.remove(index)),
            None => {
                debug!("No alias mapping for {} in pending tournament {}", alias, self.id);
                None
            }
        }
    }

    pub fn mapped_id(&self, alias: &str) -> Option<ObjectId> {
        self.alias_to_id_map
            .iter()
            .flatten()
            .find(|m| m.player_alias == alias)
            .and_then(|m| m.player_id)
    }

    /// Aliases from the player list and the matches that have no player id yet, in first-seen order.
    pub fn unresolved_aliases(&self) -> Vec<&str> {
        self.players
            .iter()
            .chain(self.matches.iter().flat_map(|m| [&m.winner, &m.loser]))
            .map(String::as_str)
            .filter(|alias| self.mapped_id(alias).is_none())
            .unique()
            .collect_vec()
    }

    pub fn is_resolved(&self) -> bool {
        self.unresolved_aliases().is_empty()
    }
}

impl Document for PendingTournament {
    const COLLECTION: &'static str = "pending_tournaments";

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
        require_text("PendingTournament", "name", &self.name)?;

        for m in &self.matches {
            m.validate()?;
        }

        let mut seen = HashSet::new();
        for mapping in self.alias_to_id_map.iter().flatten() {
            mapping.validate()?;

            if !seen.insert(mapping.player_alias.as_str()) {
                return Err(ValidationError::invalid(
                    "PendingTournament",
                    "alias_to_id_map",
                    format!("alias {} is mapped more than once", mapping.player_alias)
                ));
            }
        }

        Ok(())
    }
}

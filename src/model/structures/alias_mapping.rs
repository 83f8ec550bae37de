use crate::model::error::{require_text, ValidationError};
use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Ties a scraped alias to a player. `player_id` stays empty until someone
/// has decided who the alias belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasMapping {
    #[serde(default)]
    pub player_id: Option<ObjectId>,
    pub player_alias: String
}

impl AliasMapping {
    pub fn new(player_alias: impl Into<String>, player_id: Option<ObjectId>) -> AliasMapping {
        AliasMapping {
            player_id,
            player_alias: player_alias.into()
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("AliasMapping", "player_alias", &self.player_alias)
    }
}

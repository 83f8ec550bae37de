use crate::{
    database::store::Document,
    model::{
        error::{require_text, ValidationError},
        structures::ranking_entry::RankingEntry
    }
};
use bson::{oid::ObjectId, Bson};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A ranked snapshot of one region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
    pub id: ObjectId,
    pub region: String,
    /// Tournaments considered when building the snapshot
    #[serde(default)]
    pub tournaments: Vec<ObjectId>,
    #[serde(default, with = "bson::serde_helpers::chrono_datetime_as_bson_datetime_optional")]
    pub time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ranking: Vec<RankingEntry>
}

impl Ranking {
    pub fn entry_for(&self, player_id: ObjectId) -> Option<&RankingEntry> {
        self.ranking.iter().find(|e| e.player == player_id)
    }
}

impl Document for Ranking {
    const COLLECTION: &'static str = "rankings";

    fn key(&self) -> Bson {
        Bson::ObjectId(self.id)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("Ranking", "region", &self.region)?;

        for (i, entry) in self.ranking.iter().enumerate() {
            let expected = i as u32 + 1;
            if entry.rank != expected {
                return Err(ValidationError::invalid(
                    "Ranking",
                    "ranking",
                    format!("entry {} has rank {}, expected {}", i, entry.rank, expected)
                ));
            }
        }

        Ok(())
    }
}

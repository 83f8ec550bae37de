use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// One player's position in a [`Ranking`](crate::database::db_structs::Ranking).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub player: ObjectId,
    pub rank: u32,
    pub rating: f64
}

use crate::{
    database::store::Document,
    model::{
        error::{require_text, ValidationError},
        leaderboard::RankingCriteria
    }
};
use bson::Bson;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub id: String,
    pub display_name: String,
    /// Minimum tournaments a player must have attended to be ranked
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ranking_num_tourneys_attended: Option<u32>,
    /// Only tournaments this many days before the ranking count towards attendance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ranking_activity_day_limit: Option<i64>
}

impl Region {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Region {
        Region {
            id: id.into(),
            display_name: display_name.into(),
            ranking_num_tourneys_attended: None,
            ranking_activity_day_limit: None
        }
    }

    pub fn ranking_criteria(&self) -> RankingCriteria {
        RankingCriteria {
            tournaments_attended: self.ranking_num_tourneys_attended,
            activity_day_limit: self.ranking_activity_day_limit
        }
    }
}

impl Document for Region {
    const COLLECTION: &'static str = "regions";

    fn key(&self) -> Bson {
        Bson::String(self.id.clone())
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("Region", "id", &self.id)?;
        require_text("Region", "display_name", &self.display_name)?;

        if matches!(self.ranking_activity_day_limit, Some(days) if days < 0) {
            return Err(ValidationError::invalid(
                "Region",
                "ranking_activity_day_limit",
                "cannot be negative"
            ));
        }

        Ok(())
    }
}

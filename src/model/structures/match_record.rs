use crate::model::error::{require_text, ValidationError};
use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single result between two resolved players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub winner: ObjectId,
    pub loser: ObjectId
}

impl Match {
    pub fn new(winner: ObjectId, loser: ObjectId) -> Match {
        Match { winner, loser }
    }

    /// True if `{winner, loser}` is the unordered pair `{player1, player2}`.
    pub fn contains_players(&self, player1: ObjectId, player2: ObjectId) -> bool {
        (self.winner == player1 && self.loser == player2) || (self.winner == player2 && self.loser == player1)
    }

    pub fn contains_player(&self, player_id: ObjectId) -> bool {
        self.winner == player_id || self.loser == player_id
    }

    /// `None` when the player did not take part in this match.
    pub fn did_player_win(&self, player_id: ObjectId) -> Option<bool> {
        if !self.contains_player(player_id) {
            return None;
        }

        Some(self.winner == player_id)
    }

    pub fn get_opposing_player_id(&self, player_id: ObjectId) -> Option<ObjectId> {
        if self.winner == player_id {
            Some(self.loser)
        } else if self.loser == player_id {
            Some(self.winner)
        } else {
            None
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.winner == self.loser {
            return Err(ValidationError::invalid(
                "Match",
                "loser",
                format!("{} cannot play themselves", self.winner)
            ));
        }

        Ok(())
    }
}

impl fmt::Display for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} > {}", self.winner, self.loser)
    }
}

/// A match result before identity resolution, keyed by scraped aliases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasMatch {
    pub winner: String,
    pub loser: String
}

impl AliasMatch {
    pub fn new(winner: impl Into<String>, loser: impl Into<String>) -> AliasMatch {
        AliasMatch {
            winner: winner.into(),
            loser: loser.into()
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("AliasMatch", "winner", &self.winner)?;
        require_text("AliasMatch", "loser", &self.loser)
    }
}

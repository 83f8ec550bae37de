use bson::oid::ObjectId;
use thiserror::Error;

/// Raised by the validation pass that runs at construction and at the store boundary.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{document}.{field} is required")]
    Required {
        document: &'static str,
        field: &'static str
    },

    #[error("{document}.{field} is invalid: {reason}")]
    Invalid {
        document: &'static str,
        field: &'static str,
        reason: String
    }
}

impl ValidationError {
    pub fn invalid(document: &'static str, field: &'static str, reason: impl Into<String>) -> Self {
        ValidationError::Invalid {
            document,
            field,
            reason: reason.into()
        }
    }
}

/// Fails a pending tournament promotion.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ResolutionError {
    #[error("Aliases have no ID in map: {}", .0.join(", "))]
    UnresolvedAliases(Vec<String>),

    #[error(transparent)]
    Invalid(#[from] ValidationError)
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TournamentError {
    #[error("Player {add} already plays {remove} in this tournament, replacing would create a self-match")]
    SelfMatch { remove: ObjectId, add: ObjectId }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MergeError {
    #[error("Cannot merge player {0} into itself")]
    SamePlayer(ObjectId),

    #[error("Player {0} has already been merged")]
    AlreadyMerged(ObjectId),

    #[error("User {user} is not an admin for any region of player {player}")]
    Unauthorized { user: String, player: ObjectId }
}

/// Shorthand for the `Required` check on strings, which are required to be non-empty.
pub(crate) fn require_text(document: &'static str, field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required { document, field });
    }

    Ok(())
}

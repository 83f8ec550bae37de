use crate::{
    database::store::Document,
    model::error::{require_text, ValidationError}
};
use bson::{oid::ObjectId, Bson};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub salt: String,
    pub hashed_password: String,
    #[serde(default)]
    pub admin_regions: Vec<String>
}

impl User {
    pub fn is_admin_for(&self, region: &str) -> bool {
        self.admin_regions.iter().any(|r| r == region)
    }
}

impl Document for User {
    const COLLECTION: &'static str = "users";

    fn key(&self) -> Bson {
        Bson::String(self.id.clone())
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("User", "id", &self.id)?;
        require_text("User", "username", &self.username)?;
        require_text("User", "salt", &self.salt)?;
        require_text("User", "hashed_password", &self.hashed_password)
    }
}

/// Keyed by its token rather than an `id` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
    pub user_id: String
}

impl Session {
    pub fn new(user_id: impl Into<String>) -> Session {
        Session {
            session_id: Uuid::new_v4().to_string(),
            user_id: user_id.into()
        }
    }
}

impl Document for Session {
    const COLLECTION: &'static str = "sessions";
    const ID_FIELD: &'static str = "session_id";

    fn key(&self) -> Bson {
        Bson::String(self.session_id.clone())
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("Session", "session_id", &self.session_id)?;
        require_text("Session", "user_id", &self.user_id)
    }
}

/// Audit record of one player being folded into another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Merge {
    pub id: ObjectId,
    pub requester_user_id: String,
    pub source_player_obj_id: ObjectId,
    pub target_player_obj_id: ObjectId,
    #[serde(default, with = "bson::serde_helpers::chrono_datetime_as_bson_datetime_optional")]
    pub time: Option<DateTime<Utc>>
}

impl Document for Merge {
    const COLLECTION: &'static str = "merges";

    fn key(&self) -> Bson {
        Bson::ObjectId(self.id)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("Merge", "requester_user_id", &self.requester_user_id)?;

        if self.source_player_obj_id == self.target_player_obj_id {
            return Err(ValidationError::invalid(
                "Merge",
                "target_player_obj_id",
                "source and target are the same player"
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::database::{
        db_structs::{Merge, Session, User},
        store::Document
    };
    use bson::oid::ObjectId;
    use chrono::Utc;

    fn user() -> User {
        User {
            id: "u1".to_string(),
            username: "admin".to_string(),
            salt: "salt".to_string(),
            hashed_password: "hash".to_string(),
            admin_regions: vec!["norcal".to_string()]
        }
    }

    #[test]
    fn test_is_admin_for() {
        let user = user();

        assert!(user.is_admin_for("norcal"));
        assert!(!user.is_admin_for("socal"));
    }

    #[test]
    fn test_user_requires_credentials() {
        let mut user = user();
        assert!(user.validate().is_ok());

        user.hashed_password = String::new();
        assert!(user.validate().is_err());
    }

    #[test]
    fn test_user_rejects_each_missing_field() {
        let blanks: [fn(&mut User); 4] = [
            |u| u.id.clear(),
            |u| u.username.clear(),
            |u| u.salt.clear(),
            |u| u.hashed_password.clear()
        ];

        for blank in blanks {
            let mut user = user();
            blank(&mut user);
            assert!(user.validate().is_err());
        }
    }

    #[test]
    fn test_session_requires_user() {
        let mut session = Session::new("u1");
        session.user_id.clear();
        assert!(session.validate().is_err());

        let mut session = Session::new("u1");
        session.session_id.clear();
        assert!(session.validate().is_err());
    }

    #[test]
    fn test_merge_validation() {
        let (source, target) = (ObjectId::new(), ObjectId::new());
        let mut merge = Merge {
            id: ObjectId::new(),
            requester_user_id: "u1".to_string(),
            source_player_obj_id: source,
            target_player_obj_id: target,
            time: Some(Utc::now())
        };
        assert!(merge.validate().is_ok());

        merge.target_player_obj_id = source;
        assert!(merge.validate().is_err());

        merge.target_player_obj_id = target;
        merge.requester_user_id.clear();
        assert!(merge.validate().is_err());
    }

    #[test]
    fn test_sessions_get_unique_tokens() {
        let first = Session::new("u1");
        let second = Session::new("u1");

        assert_ne!(first.session_id, second.session_id);
        assert!(first.validate().is_ok());
    }
}

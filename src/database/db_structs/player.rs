use crate::{
    database::store::Document,
    model::{
        error::{require_text, MergeError, ValidationError},
        structures::rating::Rating
    }
};
use bson::{oid::ObjectId, Bson};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: ObjectId,
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Region id -> rating in that region
    #[serde(default)]
    pub ratings: BTreeMap<String, Rating>,
    #[serde(default)]
    pub regions: Vec<String>,
    #[serde(default)]
    pub merged: bool,
    #[serde(default)]
    pub merge_parent: Option<ObjectId>,
    /// Every player id folded into this one, including its own
    #[serde(default)]
    pub merge_children: Vec<ObjectId>,
    #[serde(default)]
    pub version: u64
}

impl Player {
    pub fn new(id: ObjectId, name: impl Into<String>) -> Player {
        let mut player = Player {
            id,
            name: name.into(),
            aliases: Vec::new(),
            ratings: BTreeMap::new(),
            regions: Vec::new(),
            merged: false,
            merge_parent: None,
            merge_children: Vec::new(),
            version: 0
        };
        player.post_init();

        player
    }

    pub fn create_with_default_values(name: &str, region: &str) -> Player {
        let mut player = Player::new(ObjectId::new(), name);
        player.aliases = vec![name.to_lowercase()];
        player.regions = vec![region.to_string()];

        player
    }

    pub fn rating_for(&self, region: &str) -> Option<&Rating> {
        self.ratings.get(region)
    }

    pub fn in_region(&self, region: &str) -> bool {
        self.regions.iter().any(|r| r == region)
    }

    /// Folds `source` into this player.
    ///
    /// The source keeps its document but is flagged as merged and points at
    /// this player. Aliases, regions and merge children move over; ratings do
    /// not, they are recomputed from the rewritten tournaments.
    pub fn merge_from(&mut self, source: &mut Player) -> Result<(), MergeError> {
        if self.id == source.id {
            return Err(MergeError::SamePlayer(self.id));
        }

        if source.merged {
            return Err(MergeError::AlreadyMerged(source.id));
        }

        if self.merged {
            return Err(MergeError::AlreadyMerged(self.id));
        }

        source.merged = true;
        source.merge_parent = Some(self.id);

        extend_unique(&mut self.merge_children, &source.merge_children);
        extend_unique(&mut self.aliases, &source.aliases);
        extend_unique(&mut self.regions, &source.regions);

        Ok(())
    }
}

fn extend_unique<T: PartialEq + Clone>(target: &mut Vec<T>, items: &[T]) {
    for item in items {
        if !target.contains(item) {
            target.push(item.clone());
        }
    }
}

impl Document for Player {
    const COLLECTION: &'static str = "players";

    fn key(&self) -> Bson {
        Bson::ObjectId(self.id)
    }

    fn version(&self) -> Option<u64> {
        Some(self.version)
    }

    fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    fn post_init(&mut self) {
        if !self.merge_children.contains(&self.id) {
            self.merge_children.insert(0, self.id);
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("Player", "name", &self.name)?;

        for rating in self.ratings.values() {
            rating.validate()?;
        }

        if !self.merge_children.contains(&self.id) {
            return Err(ValidationError::invalid(
                "Player",
                "merge_children",
                format!("must contain the player's own id {}", self.id)
            ));
        }

        match (self.merged, self.merge_parent) {
            (true, None) => Err(ValidationError::Required {
                document: "Player",
                field: "merge_parent"
            }),
            (_, Some(parent)) if parent == self.id => Err(ValidationError::invalid(
                "Player",
                "merge_parent",
                "a player cannot be its own merge parent"
            )),
            _ => Ok(())
        }
    }
}

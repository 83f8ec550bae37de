use std::collections::HashMap;

use super::{
    db_structs::{Merge, PendingTournament, Player, Ranking, Region, Replacement, Session, Tournament, User},
    keys::DB_ID_KEY,
    query::Query,
    store::{DocumentStore, StoreError}
};
use crate::model::{
    error::{MergeError, ResolutionError, TournamentError},
    leaderboard::build_ranking,
    rating_model::RatingModel
};
use bson::{doc, oid::ObjectId, Bson};
use chrono::{DateTime, Utc};
use itertools::Itertools;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum DaoError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Tournament(#[from] TournamentError),

    #[error(transparent)]
    Merge(#[from] MergeError)
}

/// Multi-document workflows on top of a [`DocumentStore`].
///
/// Each write is a single-document compare-and-swap, so a concurrent writer
/// causes a `VersionConflict` rather than a lost update. Workflows do not roll
/// back writes that already succeeded.
pub struct Dao<S: DocumentStore> {
    store: S,
    rating_model: RatingModel
}

impl<S: DocumentStore> Dao<S> {
    pub fn new(store: S) -> Dao<S> {
        Dao {
            store,
            rating_model: RatingModel::new()
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn get_player(&self, id: ObjectId) -> Result<Player, StoreError> {
        self.store.fetch(&Bson::ObjectId(id)).await
    }

    pub async fn get_region(&self, id: &str) -> Result<Region, StoreError> {
        self.store.fetch(&Bson::String(id.to_string())).await
    }

    pub async fn get_players_for_region(&self, region: &str) -> Result<Vec<Player>, StoreError> {
        self.store.find(&Query::filter(doc! { "regions": region })).await
    }

    pub async fn get_players_by_id(&self, ids: &[ObjectId]) -> Result<Vec<Player>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut filter = bson::Document::new();
        filter.insert(DB_ID_KEY, doc! { "$in": ids.to_vec() });

        self.store.find(&Query::filter(filter)).await
    }

    pub async fn get_tournaments_for_region(&self, region: &str) -> Result<Vec<Tournament>, StoreError> {
        self.store.find(&Query::filter(doc! { "regions": region })).await
    }

    pub async fn get_tournaments_for_player(&self, player_id: ObjectId) -> Result<Vec<Tournament>, StoreError> {
        self.store.find(&Query::filter(doc! { "players": player_id })).await
    }

    pub async fn get_latest_ranking(&self, region: &str) -> Result<Option<Ranking>, StoreError> {
        self.store
            .find_first(Query::filter(doc! { "region": region }).sort_by("time", true))
            .await
    }

    pub async fn insert_pending_tournament(&self, pending_tournament: &PendingTournament) -> Result<(), StoreError> {
        self.store.insert(pending_tournament).await
    }

    /// Stores the alias mapping on the pending tournament, guarded by its version.
    pub async fn set_alias_id_mapping(
        &self,
        pending_id: ObjectId,
        alias: &str,
        player_id: ObjectId
    ) -> Result<PendingTournament, DaoError> {
        let mut pending: PendingTournament = self.store.fetch(&Bson::ObjectId(pending_id)).await?;
        pending.set_alias_id_mapping(alias, player_id);
        self.store.update(&mut pending).await?;

        Ok(pending)
    }

    /// Promotes a fully resolved pending tournament and removes it from the pending collection.
    ///
    /// If the pending tournament was edited after it was read, the new
    /// tournament is removed again and the call fails with a version conflict.
    pub async fn finalize_pending_tournament(&self, pending_id: ObjectId) -> Result<Tournament, DaoError> {
        let pending: PendingTournament = self.store.fetch(&Bson::ObjectId(pending_id)).await?;

        let tournament = Tournament::from_pending_tournament(&pending)?;
        tournament
            .validate_at_creation()
            .map_err(ResolutionError::from)?;

        self.store.insert(&tournament).await?;
        if let Err(e) = self.store.delete_versioned(&pending).await {
            warn!(
                "Pending tournament {} changed during finalization, discarding tournament",
                pending_id
            );
            self.store.delete::<Tournament>(&Bson::ObjectId(tournament.id)).await?;
            return Err(e.into());
        }

        info!(
            "Finalized tournament {} ({}) with {} players and {} matches",
            tournament.name,
            tournament.id,
            tournament.players.len(),
            tournament.matches.len()
        );

        Ok(tournament)
    }

    /// Folds `source_id` into `target_id`, rewriting every tournament the source played in.
    ///
    /// The requester must administer a region of each player, since the merge
    /// rewrites both players' documents. All substitutions are computed before
    /// anything is written, so a tournament where the two players met aborts
    /// the merge untouched.
    pub async fn merge_players(
        &self,
        requester: &User,
        source_id: ObjectId,
        target_id: ObjectId,
        now: DateTime<Utc>
    ) -> Result<Merge, DaoError> {
        let mut source = self.get_player(source_id).await?;
        let mut target = self.get_player(target_id).await?;

        for player in [&target, &source] {
            if !player.regions.iter().any(|r| requester.is_admin_for(r)) {
                return Err(MergeError::Unauthorized {
                    user: requester.id.clone(),
                    player: player.id
                }
                .into());
            }
        }

        target.merge_from(&mut source)?;

        let tournaments = self.get_tournaments_for_player(source_id).await?;
        let mut rewritten = Vec::new();
        for mut tournament in tournaments {
            if tournament.replace_player(source_id, target_id)? == Replacement::Replaced {
                rewritten.push(tournament);
            }
        }

        // Players first: a concurrent merge on either one stops here
        self.store.update(&mut source).await?;
        self.store.update(&mut target).await?;
        for tournament in rewritten.iter_mut() {
            self.store.update(tournament).await?;
        }

        let merge = Merge {
            id: ObjectId::new(),
            requester_user_id: requester.id.clone(),
            source_player_obj_id: source_id,
            target_player_obj_id: target_id,
            time: Some(now)
        };
        self.store.insert(&merge).await?;

        info!(
            "Merged player {} into {}, rewrote {} tournaments",
            source_id,
            target_id,
            rewritten.len()
        );

        Ok(merge)
    }

    /// Replays the region's tournaments, stores the new ratings and a new ranking snapshot.
    pub async fn regenerate_ranking(&self, region_id: &str, now: DateTime<Utc>) -> Result<Ranking, DaoError> {
        let region = self.get_region(region_id).await?;
        let tournaments = self.get_tournaments_for_region(region_id).await?;

        let mut players: HashMap<ObjectId, Player> = self
            .get_players_for_region(region_id)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        // Visitors from other regions still carry a rating for this one
        let visitors = tournaments
            .iter()
            .flat_map(|t| t.players.iter().copied())
            .unique()
            .filter(|id| !players.contains_key(id))
            .collect_vec();
        for player in self.get_players_by_id(&visitors).await? {
            players.insert(player.id, player);
        }

        self.rating_model.process(region_id, &tournaments, &mut players);

        for player in players.values_mut() {
            self.store.update(player).await?;
        }

        let players = players.into_values().collect_vec();
        let ranking = build_ranking(region_id, &tournaments, &players, &region.ranking_criteria(), now);
        self.store.insert(&ranking).await?;

        info!(
            "Generated {} ranking with {} players from {} tournaments",
            region.display_name,
            ranking.ranking.len(),
            ranking.tournaments.len()
        );

        Ok(ranking)
    }

    pub async fn create_session(&self, user: &User) -> Result<Session, StoreError> {
        let session = Session::new(user.id.clone());
        self.store.insert(&session).await?;

        Ok(session)
    }

    pub async fn get_user_for_session(&self, session_id: &str) -> Result<Option<User>, StoreError> {
        let Some(session) = self
            .store
            .get::<Session>(&Bson::String(session_id.to_string()))
            .await?
        else {
            return Ok(None);
        };

        self.store.get(&Bson::String(session.user_id)).await
    }

    pub async fn delete_session(&self, session_id: &str) -> Result<bool, StoreError> {
        self.store
            .delete::<Session>(&Bson::String(session_id.to_string()))
            .await
    }
}

use std::collections::HashMap;

use crate::{
    database::db_structs::{Player, Tournament},
    model::{
        constants::{BETA, KAPPA, LOSER_PLACEMENT, WINNER_PLACEMENT},
        structures::{match_record::Match, rating::Rating}
    },
    utils::progress_utils::progress_bar
};
use bson::oid::ObjectId;
use itertools::Itertools;
use openskill::{
    model::{model::Model, plackett_luce::PlackettLuce},
    rating::default_gamma
};
use tracing::{info, warn};

/// Replays finalized tournaments through the rating library.
///
/// No rating math happens here: each match is handed to the model as a
/// two-team game and the returned (mu, sigma) pairs are stored on the players.
pub struct RatingModel {
    pub model: PlackettLuce
}

impl Default for RatingModel {
    fn default() -> Self {
        Self::new()
    }
}

impl RatingModel {
    pub fn new() -> RatingModel {
        RatingModel {
            model: PlackettLuce::new(BETA, KAPPA, default_gamma)
        }
    }

    /// Returns the updated (winner, loser) ratings.
    pub fn rate_match(&self, winner: &Rating, loser: &Rating) -> (Rating, Rating) {
        let teams = vec![vec![winner.to_external()], vec![loser.to_external()]];
        let mut results = self
            .model
            .rate(teams, vec![WINNER_PLACEMENT, LOSER_PLACEMENT])
            .into_iter()
            .flatten();

        match (results.next(), results.next()) {
            (Some(w), Some(l)) => (Rating::from(w), Rating::from(l)),
            _ => {
                warn!("Rating model returned an incomplete result, keeping previous ratings");
                (*winner, *loser)
            }
        }
    }

    /// Recomputes every supplied player's rating for `region` from scratch.
    ///
    /// Tournaments are replayed oldest first (undated ones before dated ones).
    /// Returns the number of matches rated.
    pub fn process(&self, region: &str, tournaments: &[Tournament], players: &mut HashMap<ObjectId, Player>) -> usize {
        for player in players.values_mut() {
            player.ratings.insert(region.to_string(), Rating::default());
        }

        let ordered = tournaments.iter().sorted_by_key(|t| (t.date, t.id)).collect_vec();
        let bar = progress_bar(ordered.len() as u64, format!("Rating {} tournaments", region));

        let mut rated = 0;
        for tournament in ordered {
            for m in &tournament.matches {
                if self.process_match(region, tournament, m, players) {
                    rated += 1;
                }
            }
            bar.inc(1);
        }
        bar.finish_and_clear();

        info!("Rated {} matches across {} tournaments in {}", rated, tournaments.len(), region);
        rated
    }

    fn process_match(
        &self,
        region: &str,
        tournament: &Tournament,
        m: &Match,
        players: &mut HashMap<ObjectId, Player>
    ) -> bool {
        let current = |id: &ObjectId| players.get(id).and_then(|p| p.rating_for(region)).copied();

        let (Some(winner), Some(loser)) = (current(&m.winner), current(&m.loser)) else {
            warn!(
                "Skipping match {} in tournament {}: player not loaded for {}",
                m, tournament.id, region
            );
            return false;
        };

        let (new_winner, new_loser) = self.rate_match(&winner, &loser);

        for (id, rating) in [(m.winner, new_winner), (m.loser, new_loser)] {
            if let Some(player) = players.get_mut(&id) {
                player.ratings.insert(region.to_string(), rating);
            }
        }

        true
    }
}

use std::cmp::Ordering;

use crate::{
    database::db_structs::{Player, Ranking, Tournament},
    model::structures::{rating::Rating, ranking_entry::RankingEntry}
};
use bson::oid::ObjectId;
use chrono::{DateTime, Duration, Utc};
use itertools::Itertools;
use tracing::debug;

/// Who makes it onto a region's ranking besides having a rating there.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RankingCriteria {
    /// Minimum number of counted tournaments attended. `None` disables the activity check.
    pub tournaments_attended: Option<u32>,
    /// Only tournaments at most this many days before the ranking count. `None` counts all of them.
    pub activity_day_limit: Option<i64>
}

impl RankingCriteria {
    fn counts(&self, tournament: &Tournament, now: DateTime<Utc>) -> bool {
        match (tournament.date, self.activity_day_limit) {
            (None, _) => false,
            (Some(date), None) => date <= now,
            (Some(date), Some(days)) => date <= now && now - date <= Duration::days(days)
        }
    }

    pub fn is_active(&self, player_id: ObjectId, tournaments: &[&Tournament], now: DateTime<Utc>) -> bool {
        let Some(required) = self.tournaments_attended else {
            return true;
        };

        let attended = tournaments
            .iter()
            .filter(|t| self.counts(t, now) && t.contains_player(player_id))
            .count();

        attended >= required as usize
    }
}

/// Builds a ranking snapshot for `region` from ratings already computed by
/// [`RatingModel::process`](crate::model::rating_model::RatingModel::process).
///
/// Players are ordered by [`Rating::exposure`], highest first, with ties
/// broken by name and then id. Ranks start at 1.
pub fn build_ranking(
    region: &str,
    tournaments: &[Tournament],
    players: &[Player],
    criteria: &RankingCriteria,
    now: DateTime<Utc>
) -> Ranking {
    let region_tournaments = tournaments.iter().filter(|t| t.in_region(region)).collect_vec();

    let ranked: Vec<(&Player, Rating)> = players
        .iter()
        .filter(|p| !p.merged && p.in_region(region))
        .filter_map(|p| p.rating_for(region).map(|r| (p, *r)))
        .filter(|(p, _)| criteria.is_active(p.id, &region_tournaments, now))
        .sorted_by(|(p1, r1), (p2, r2)| compare(p1, r1, p2, r2))
        .collect();

    debug!(
        "{} of {} players qualify for the {} ranking",
        ranked.len(),
        players.len(),
        region
    );

    let ranking = ranked
        .into_iter()
        .enumerate()
        .map(|(i, (player, rating))| RankingEntry {
            player: player.id,
            rank: i as u32 + 1,
            rating: rating.exposure()
        })
        .collect();

    Ranking {
        id: ObjectId::new(),
        region: region.to_string(),
        tournaments: region_tournaments.iter().map(|t| t.id).collect(),
        time: Some(now),
        ranking
    }
}

fn compare(p1: &Player, r1: &Rating, p2: &Player, r2: &Rating) -> Ordering {
    r2.exposure()
        .total_cmp(&r1.exposure())
        .then_with(|| p1.name.cmp(&p2.name))
        .then_with(|| p1.id.cmp(&p2.id))
}

#[cfg(test)]
mod tests {
    use crate::{
        database::{db_structs::Player, store::Document},
        model::{
            leaderboard::{build_ranking, RankingCriteria},
            structures::rating::Rating
        },
        utils::test_utils::{generate_player, generate_tournament_on}
    };
    use approx::assert_abs_diff_eq;
    use chrono::{Duration, TimeZone, Utc};

    fn rated(name: &str, mu: f64, sigma: f64) -> Player {
        let mut player = generate_player(name, "norcal");
        player.ratings.insert("norcal".to_string(), Rating { mu, sigma });

        player
    }

    #[test]
    fn test_build_ranking_orders_by_exposure() {
        // Higher mu but much higher sigma ranks below
        let players = vec![
            rated("gar", 30.0, 8.0),
            rated("pr", 28.0, 1.0),
            rated("ssbm", 20.0, 2.0),
        ];
        let now = Utc::now();

        let ranking = build_ranking("norcal", &[], &players, &RankingCriteria::default(), now);

        let order = ranking.ranking.iter().map(|e| e.player).collect::<Vec<_>>();
        assert_eq!(order, vec![players[1].id, players[2].id, players[0].id]);
        assert_eq!(ranking.ranking.iter().map(|e| e.rank).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_abs_diff_eq!(ranking.ranking[0].rating, 25.0);
        assert_eq!(ranking.region, "norcal");
        assert_eq!(ranking.time, Some(now));
        assert!(ranking.validate().is_ok());
    }

    #[test]
    fn test_build_ranking_breaks_ties_by_name() {
        let players = vec![rated("zeta", 25.0, 2.0), rated("alpha", 25.0, 2.0)];

        let ranking = build_ranking("norcal", &[], &players, &RankingCriteria::default(), Utc::now());

        assert_eq!(ranking.ranking[0].player, players[1].id);
        assert_eq!(ranking.ranking[1].player, players[0].id);
    }

    #[test]
    fn test_build_ranking_excludes_ineligible_players() {
        let mut merged = rated("merged", 40.0, 1.0);
        merged.merged = true;
        let unrated = generate_player("unrated", "norcal");
        let mut elsewhere = rated("elsewhere", 40.0, 1.0);
        elsewhere.regions = vec!["socal".to_string()];
        let ranked = rated("gar", 25.0, 1.0);

        let players = vec![merged, unrated, elsewhere, ranked.clone()];
        let ranking = build_ranking("norcal", &[], &players, &RankingCriteria::default(), Utc::now());

        assert_eq!(ranking.ranking.len(), 1);
        assert_eq!(ranking.ranking[0].player, ranked.id);
    }

    #[test]
    fn test_build_ranking_applies_activity_criteria() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let active = rated("active", 20.0, 1.0);
        let lapsed = rated("lapsed", 30.0, 1.0);
        let (a, l) = (active.id, lapsed.id);

        let tournaments = vec![
            generate_tournament_on(now - Duration::days(10), &[a, l], &[]),
            generate_tournament_on(now - Duration::days(20), &[a], &[]),
            generate_tournament_on(now - Duration::days(200), &[l], &[]),
        ];
        let criteria = RankingCriteria {
            tournaments_attended: Some(2),
            activity_day_limit: Some(60)
        };

        let ranking = build_ranking("norcal", &tournaments, &[active, lapsed], &criteria, now);

        assert_eq!(ranking.ranking.len(), 1);
        assert_eq!(ranking.ranking[0].player, a);
        assert_eq!(ranking.tournaments, tournaments.iter().map(|t| t.id).collect::<Vec<_>>());
    }

    #[test]
    fn test_activity_without_day_limit_counts_all_past_tournaments() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let lapsed = rated("lapsed", 30.0, 1.0);
        let l = lapsed.id;

        let tournaments = vec![
            generate_tournament_on(now - Duration::days(10), &[l], &[]),
            generate_tournament_on(now - Duration::days(400), &[l], &[]),
            generate_tournament_on(now + Duration::days(5), &[l], &[]),
        ];
        let criteria = RankingCriteria {
            tournaments_attended: Some(2),
            activity_day_limit: None
        };

        let ranking = build_ranking("norcal", &tournaments, &[lapsed], &criteria, now);

        assert_eq!(ranking.ranking.len(), 1);
    }
}

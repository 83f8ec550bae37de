use bson::{doc, oid::ObjectId, Bson};
use chrono::{Duration, TimeZone, Utc};
use scene_rank::{
    database::{
        dao::Dao,
        db_structs::{PendingTournament, Player, Ranking, Region, Session, Tournament},
        query::Query,
        store::{DocumentStore, StoreError}
    },
    model::structures::{match_record::Match, ranking_entry::RankingEntry},
    utils::test_utils::{generate_pending_tournament, generate_tournament}
};
use serial_test::serial;

use super::test_helpers::TestDatabase;
use crate::common::init_test_env;

async fn setup() -> TestDatabase {
    init_test_env();
    TestDatabase::new().await.expect("Failed to create test database")
}

fn ranking_at(region: &str, days: i64) -> Ranking {
    Ranking {
        id: ObjectId::new(),
        region: region.to_string(),
        tournaments: Vec::new(),
        time: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(days)),
        ranking: vec![RankingEntry {
            player: ObjectId::new(),
            rank: 1,
            rating: 10.0
        }]
    }
}

#[tokio::test]
#[serial]
async fn test_insert_and_get() {
    let test_db = setup().await;
    let db_client = test_db.client().await;
    let (a, b) = (ObjectId::new(), ObjectId::new());
    let tournament = generate_tournament(&[a, b], &[Match::new(a, b)]);

    db_client.insert(&tournament).await.expect("Failed to insert");
    let loaded: Tournament = db_client.fetch(&Bson::ObjectId(tournament.id)).await.expect("Failed to fetch");

    assert_eq!(loaded, tournament);

    let raw = test_db
        .raw_collection("tournaments")
        .await
        .find_one(doc! { "_id": tournament.id }, None)
        .await
        .unwrap()
        .expect("Stored document missing");
    assert!(raw.get("id").is_none());
    assert!(matches!(raw.get("date"), Some(Bson::DateTime(_))));
}

#[tokio::test]
#[serial]
async fn test_insert_duplicate_fails() {
    let test_db = setup().await;
    let db_client = test_db.client().await;
    let region = Region::new("norcal", "Norcal");

    db_client.insert(&region).await.unwrap();
    let result = db_client.insert(&region).await;

    assert!(matches!(result, Err(StoreError::Duplicate { collection: "regions", .. })));
}

#[tokio::test]
#[serial]
async fn test_update_document_without_version_field() {
    let test_db = setup().await;
    let db_client = test_db.client().await;
    let id = ObjectId::new();
    test_db
        .raw_collection("players")
        .await
        .insert_one(doc! { "_id": id, "name": "gar", "regions": ["norcal"] }, None)
        .await
        .unwrap();

    let mut player: Player = db_client.fetch(&Bson::ObjectId(id)).await.unwrap();
    assert_eq!(player.version, 0);

    player.aliases.push("gar".to_string());
    db_client.update(&mut player).await.expect("Failed to update");

    assert_eq!(player.version, 1);
    let raw = test_db
        .raw_collection("players")
        .await
        .find_one(doc! { "_id": id }, None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(raw.get("version"), Some(&Bson::Int64(1)));
}

#[tokio::test]
#[serial]
async fn test_stale_update_conflicts() {
    let test_db = setup().await;
    let db_client = test_db.client().await;
    let player = Player::create_with_default_values("gar", "norcal");
    db_client.insert(&player).await.unwrap();

    let mut first = player.clone();
    let mut second = player.clone();
    first.name = "GaR".to_string();
    second.name = "renamed".to_string();

    db_client.update(&mut first).await.unwrap();
    let result = db_client.update(&mut second).await;

    assert!(matches!(result, Err(StoreError::VersionConflict { expected: 0, .. })));
    let loaded: Player = db_client.fetch(&Bson::ObjectId(player.id)).await.unwrap();
    assert_eq!(loaded, first);
}

#[tokio::test]
#[serial]
async fn test_update_missing_fails() {
    let test_db = setup().await;
    let db_client = test_db.client().await;

    let mut player = Player::create_with_default_values("gar", "norcal");
    let mut region = Region::new("norcal", "Norcal");

    assert!(matches!(db_client.update(&mut player).await, Err(StoreError::NotFound { .. })));
    assert!(matches!(db_client.update(&mut region).await, Err(StoreError::NotFound { .. })));
}

#[tokio::test]
#[serial]
async fn test_find_sorts_and_limits_on_server() {
    let test_db = setup().await;
    let db_client = test_db.client().await;
    for ranking in [ranking_at("norcal", 2), ranking_at("norcal", 9), ranking_at("socal", 20), ranking_at("norcal", 5)] {
        db_client.insert(&ranking).await.unwrap();
    }

    let query = Query::filter(doc! { "region": "norcal" }).sort_by("time", true);
    let found: Vec<Ranking> = db_client.find(&query).await.unwrap();
    let latest: Option<Ranking> = db_client.find_first(query).await.unwrap();

    assert_eq!(found.len(), 3);
    assert_eq!(found[0].time, ranking_at("norcal", 9).time);
    assert_eq!(latest.and_then(|r| r.time), ranking_at("norcal", 9).time);
}

#[tokio::test]
#[serial]
async fn test_delete_versioned() {
    let test_db = setup().await;
    let db_client = test_db.client().await;
    let mut pending = generate_pending_tournament(&["gar"], &[]);
    db_client.insert(&pending).await.unwrap();

    let stale = pending.clone();
    pending.set_alias_id_mapping("gar", ObjectId::new());
    db_client.update(&mut pending).await.unwrap();

    assert!(matches!(
        db_client.delete_versioned(&stale).await,
        Err(StoreError::VersionConflict { .. })
    ));

    db_client.delete_versioned(&pending).await.unwrap();
    assert!(db_client
        .get::<PendingTournament>(&Bson::ObjectId(pending.id))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
#[serial]
async fn test_sessions_keyed_by_token() {
    let test_db = setup().await;
    let db_client = test_db.client().await;
    let session = Session::new("u1");
    db_client.insert(&session).await.unwrap();

    let key = Bson::String(session.session_id.clone());
    assert_eq!(db_client.get::<Session>(&key).await.unwrap(), Some(session));
    assert!(db_client.delete::<Session>(&key).await.unwrap());
    assert!(!db_client.delete::<Session>(&key).await.unwrap());
}

#[tokio::test]
#[serial]
async fn test_regenerate_ranking_against_database() {
    let test_db = setup().await;
    let db_client = test_db.client().await;
    let region = Region::new("norcal", "Norcal");
    db_client.insert(&region).await.unwrap();

    let gar = Player::create_with_default_values("gar", "norcal");
    let pr = Player::create_with_default_values("pr", "norcal");
    db_client.insert(&gar).await.unwrap();
    db_client.insert(&pr).await.unwrap();
    db_client
        .insert(&generate_tournament(&[gar.id, pr.id], &[Match::new(gar.id, pr.id)]))
        .await
        .unwrap();

    let dao = Dao::new(db_client);
    let now = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
    let ranking = dao.regenerate_ranking("norcal", now).await.expect("Failed to regenerate");

    assert_eq!(ranking.ranking[0].player, gar.id);
    assert_eq!(dao.get_latest_ranking("norcal").await.unwrap(), Some(ranking));
    assert_eq!(dao.get_player(pr.id).await.unwrap().version, 1);
}

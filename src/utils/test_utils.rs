use crate::{
    database::db_structs::{PendingTournament, Player, Tournament},
    model::{
        scraper::Scraper,
        structures::{
            match_record::{AliasMatch, Match},
            source_type::SourceType
        }
    }
};
use bson::oid::ObjectId;
use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashMap;

pub const TEST_REGION: &str = "norcal";

pub fn generate_player(name: &str, region: &str) -> Player {
    Player::create_with_default_values(name, region)
}

pub fn player_map(players: Vec<Player>) -> HashMap<ObjectId, Player> {
    players.into_iter().map(|p| (p.id, p)).collect()
}

pub fn generate_tournament_on(date: DateTime<Utc>, players: &[ObjectId], matches: &[Match]) -> Tournament {
    Tournament {
        id: ObjectId::new(),
        name: "Test Tournament".to_string(),
        source_type: SourceType::Tio,
        date: Some(date),
        regions: vec![TEST_REGION.to_string()],
        url: None,
        raw: None,
        matches: matches.to_vec(),
        players: players.to_vec(),
        orig_ids: players.to_vec(),
        version: 0
    }
}

pub fn generate_tournament(players: &[ObjectId], matches: &[Match]) -> Tournament {
    generate_tournament_on(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(), players, matches)
}

pub fn generate_pending_tournament(players: &[&str], matches: &[AliasMatch]) -> PendingTournament {
    PendingTournament {
        id: ObjectId::new(),
        name: "Test Pending Tournament".to_string(),
        source_type: SourceType::Tio,
        date: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
        regions: vec![TEST_REGION.to_string()],
        url: None,
        raw: None,
        matches: matches.to_vec(),
        players: players.iter().map(|p| p.to_string()).collect(),
        alias_to_id_map: Some(Vec::new()),
        version: 0
    }
}

/// A scraper that returns values fixed at construction.
#[derive(Debug, Clone)]
pub struct FixedScraper {
    pub name: String,
    pub date: Option<DateTime<Utc>>,
    pub url: Option<String>,
    pub raw: Option<String>,
    pub players: Vec<String>,
    pub matches: Vec<AliasMatch>
}

impl FixedScraper {
    pub fn new(name: &str, players: &[&str], matches: &[AliasMatch]) -> FixedScraper {
        FixedScraper {
            name: name.to_string(),
            date: Some(Utc.with_ymd_and_hms(2024, 3, 2, 18, 0, 0).unwrap()),
            url: Some(format!("https://challonge.com/{}", name.to_lowercase().replace(' ', "_"))),
            raw: Some("{}".to_string()),
            players: players.iter().map(|p| p.to_string()).collect(),
            matches: matches.to_vec()
        }
    }
}

impl Scraper for FixedScraper {
    fn get_name(&self) -> String {
        self.name.clone()
    }

    fn get_date(&self) -> Option<DateTime<Utc>> {
        self.date
    }

    fn get_url(&self) -> Option<String> {
        self.url.clone()
    }

    fn get_raw(&self) -> Option<String> {
        self.raw.clone()
    }

    fn get_players(&self) -> Vec<String> {
        self.players.clone()
    }

    fn get_matches(&self) -> Vec<AliasMatch> {
        self.matches.clone()
    }
}

use crate::model::structures::match_record::AliasMatch;
use chrono::{DateTime, Utc};

/// A bracket scraper that has already fetched one tournament.
///
/// Implementations live outside this crate (tio files, challonge, smash.gg).
/// [`PendingTournament::from_scraper`](crate::database::db_structs::PendingTournament::from_scraper)
/// only pulls the parsed values out of it.
pub trait Scraper {
    fn get_name(&self) -> String;
    fn get_date(&self) -> Option<DateTime<Utc>>;
    fn get_url(&self) -> Option<String>;
    fn get_raw(&self) -> Option<String>;
    fn get_players(&self) -> Vec<String>;
    fn get_matches(&self) -> Vec<AliasMatch>;
}

pub mod constants;
pub mod error;
pub mod leaderboard;
pub mod rating_model;
pub mod scraper;
pub mod structures;

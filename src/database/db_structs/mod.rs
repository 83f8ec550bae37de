pub mod pending_tournament;
pub mod player;
pub mod ranking;
pub mod region;
pub mod tournament;
pub mod user;

pub use pending_tournament::PendingTournament;
pub use player::Player;
pub use ranking::Ranking;
pub use region::Region;
pub use tournament::{Replacement, Tournament};
pub use user::{Merge, Session, User};

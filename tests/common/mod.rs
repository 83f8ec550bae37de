use std::sync::Once;

use scene_rank::database::{
    dao::Dao,
    db_structs::{Player, Region, User},
    store::{DocumentStore, MemoryStore}
};

static INIT: Once = Once::new();

/// Initialize test environment with RUST_LOG=WARN
pub fn init_test_env() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::new("warn"))
            .with_test_writer()
            .try_init();
    });
}

pub fn admin(region: &str) -> User {
    User {
        id: "admin".to_string(),
        username: "admin".to_string(),
        salt: "salt".to_string(),
        hashed_password: "hashed".to_string(),
        admin_regions: vec![region.to_string()]
    }
}

/// A dao over an empty in-memory store seeded with one region and the given players.
pub async fn seeded_dao(region: &Region, names: &[&str]) -> (Dao<MemoryStore>, Vec<Player>) {
    init_test_env();
    let store = MemoryStore::new();
    store.insert(region).await.expect("Failed to insert region");

    let mut players = Vec::new();
    for name in names {
        let player = Player::create_with_default_values(name, &region.id);
        store.insert(&player).await.expect("Failed to insert player");
        players.push(player);
    }

    (Dao::new(store), players)
}

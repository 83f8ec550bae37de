use lazy_static::lazy_static;
use mongodb::{Client, Collection};
use scene_rank::database::db::DbClient;
use std::sync::Arc;
use testcontainers::{clients::Cli, Container};
use testcontainers_modules::mongo::Mongo;

pub const TEST_DATABASE: &str = "scene_rank_test";

pub struct TestDatabase {
    pub connection_string: String,
    _container: Container<'static, Mongo>
}

impl TestDatabase {
    pub async fn new() -> Result<Self, Box<dyn std::error::Error>> {
        // Create a static CLI instance
        lazy_static! {
            static ref DOCKER: Arc<Cli> = Arc::new(Cli::default());
        }

        // Start MongoDB container
        let container = DOCKER.run(Mongo::default());
        let port = container.get_host_port_ipv4(27017);

        Ok(TestDatabase {
            connection_string: format!("mongodb://localhost:{}", port),
            _container: container
        })
    }

    pub async fn client(&self) -> DbClient {
        DbClient::connect(&self.connection_string, TEST_DATABASE)
            .await
            .expect("Failed to connect")
    }

    /// Direct access to a collection, bypassing the key adapter and validation.
    pub async fn raw_collection(&self, name: &str) -> Collection<bson::Document> {
        Client::with_uri_str(&self.connection_string)
            .await
            .expect("Failed to create raw client")
            .database(TEST_DATABASE)
            .collection(name)
    }
}

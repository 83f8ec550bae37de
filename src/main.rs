use clap::Parser;
use scene_rank::{
    args::Args,
    database::{dao::Dao, db::DbClient}
};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&args.log_level))
        .init();

    let client = match DbClient::connect(&args.connection_string, &args.database).await {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            error!("Application cannot start without a valid database connection");
            return ExitCode::FAILURE;
        }
    };

    let dao = Dao::new(client);
    let now = chrono::Utc::now();
    let mut failed = false;

    for region in &args.regions {
        match dao.regenerate_ranking(region, now).await {
            Ok(ranking) => info!(
                "Stored ranking {} for {} ({} players)",
                ranking.id,
                region,
                ranking.ranking.len()
            ),
            Err(e) => {
                error!("Failed to regenerate ranking for {}: {}", region, e);
                failed = true;
            }
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

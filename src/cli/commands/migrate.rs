use serde_json::json;

use crate::cli::OutputFormat;
use crate::config::{self, StorageBackend};
use crate::database::DatabaseManager;

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let config = config::config();
    if config.database.backend != StorageBackend::Postgres {
        anyhow::bail!("migrations need the postgres backend; set DATABASE_URL");
    }

    let pool = DatabaseManager::connect(&config.database).await?;
    DatabaseManager::migrate(&pool).await?;

    match output_format {
        OutputFormat::Json => println!("{}", json!({ "success": true, "data": { "migrated": true } })),
        OutputFormat::Text => println!("Migrations applied"),
    }
    Ok(())
}

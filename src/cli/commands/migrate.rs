use anyhow::Context;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::config;
use crate::database::DatabaseManager;

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let manager = DatabaseManager::connect(&config().database)
        .await
        .context("failed to connect to Postgres (is DATABASE_URL set?)")?;

    let result = manager.migrate().await.context("failed to apply migrations");
    manager.close().await;
    result?;

    output_success(&output_format, "Migrations applied", None)
}

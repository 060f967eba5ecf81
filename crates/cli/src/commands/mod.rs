//! CLI command implementations.

pub mod indexes;
pub mod seed;

use mongodb::Database;
use secrecy::SecretString;

/// Connect to the marketplace database using the server's environment
/// variables.
pub(crate) async fn connect() -> Result<Database, Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("FARMGATE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| "FARMGATE_DATABASE_URL not set")?;

    let database_name =
        std::env::var("FARMGATE_DATABASE_NAME").unwrap_or_else(|_| "farmgate".to_owned());

    let db = farmgate_server::db::connect(&database_url, &database_name).await?;
    Ok(db)
}

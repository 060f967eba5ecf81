//! Index creation for the marketplace collections.
//!
//! The server never creates indexes on startup; this command owns them.
//! Re-running is safe, the store treats an existing identical index as a
//! no-op.

use mongodb::{Database, IndexModel, bson::Document, bson::doc};
use tracing::info;

/// Create every index the server's query paths rely on.
///
/// # Errors
///
/// Returns an error if the environment is missing the database URL or any
/// index creation fails.
pub async fn create_all() -> Result<(), Box<dyn std::error::Error>> {
    let db = super::connect().await?;

    products(&db).await?;
    orders(&db).await?;
    reviews(&db).await?;

    info!("All indexes created");
    Ok(())
}

/// Indexes behind the catalog's filters, sorts and proximity search.
async fn products(db: &Database) -> Result<(), Box<dyn std::error::Error>> {
    let models = vec![
        IndexModel::builder().keys(doc! { "category": 1 }).build(),
        IndexModel::builder().keys(doc! { "sellerId": 1 }).build(),
        IndexModel::builder()
            .keys(doc! { "availableFrom": 1 })
            .build(),
        IndexModel::builder().keys(doc! { "salePrice": 1 }).build(),
        IndexModel::builder()
            .keys(doc! { "collectionPoint": "2dsphere" })
            .build(),
    ];

    let created = db
        .collection::<Document>("products")
        .create_indexes(models, None)
        .await?;
    info!(indexes = created.index_names.len(), "products indexes created");
    Ok(())
}

/// Covers the buyer's order history, which reads newest first.
async fn orders(db: &Database) -> Result<(), Box<dyn std::error::Error>> {
    let models = vec![
        IndexModel::builder()
            .keys(doc! { "userId": 1, "placedAt": -1 })
            .build(),
    ];

    let created = db
        .collection::<Document>("orders")
        .create_indexes(models, None)
        .await?;
    info!(indexes = created.index_names.len(), "orders indexes created");
    Ok(())
}

/// Covers a product's review list plus the mean-rating aggregation.
async fn reviews(db: &Database) -> Result<(), Box<dyn std::error::Error>> {
    let models = vec![
        IndexModel::builder()
            .keys(doc! { "productId": 1, "postedAt": -1 })
            .build(),
    ];

    let created = db
        .collection::<Document>("reviews")
        .create_indexes(models, None)
        .await?;
    info!(indexes = created.index_names.len(), "reviews indexes created");
    Ok(())
}

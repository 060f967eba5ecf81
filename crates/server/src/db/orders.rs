//! Order repository.

use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument};
use mongodb::{Collection, Database};

use farmgate_core::types::{OrderId, OrderStatus, UserId};

use super::{RepositoryError, is_duplicate_key};
use crate::models::Order;

const COLLECTION: &str = "orders";

/// Repository for order operations.
pub struct OrderRepository<'a> {
    db: &'a Database,
}

impl<'a> OrderRepository<'a> {
    /// Create a new repository on the given database.
    #[must_use]
    pub const fn new(db: &'a Database) -> Self {
        Self { db }
    }

    fn collection(&self) -> Collection<Order> {
        self.db.collection(COLLECTION)
    }

    /// Insert a placed order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the order id is already taken.
    /// Returns `RepositoryError::Database` for other driver errors.
    pub async fn create(&self, order: &Order) -> Result<(), RepositoryError> {
        self.collection().insert_one(order, None).await.map_err(|e| {
            if is_duplicate_key(&e) {
                return RepositoryError::Conflict("order id already exists".to_string());
            }
            RepositoryError::Database(e)
        })?;
        Ok(())
    }

    /// Get an order by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: &OrderId) -> Result<Option<Order>, RepositoryError> {
        Ok(self
            .collection()
            .find_one(doc! { "_id": id.as_str() }, None)
            .await?)
    }

    /// All orders a buyer has placed, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn for_user(&self, user_id: &UserId) -> Result<Vec<Order>, RepositoryError> {
        let options = FindOptions::builder()
            .sort(doc! { "placedAt": -1 })
            .build();
        Ok(self
            .collection()
            .find(doc! { "userId": user_id.as_str() }, options)
            .await?
            .try_collect()
            .await?)
    }

    /// Overwrite an order's status and return the updated order.
    ///
    /// Any status can replace any other; the store records whatever the
    /// caller decided, plus a fresh `updatedAt` stamp.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn set_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        self.collection()
            .find_one_and_update(
                doc! { "_id": id.as_str() },
                doc! { "$set": {
                    "status": status.to_string(),
                    "updatedAt": mongodb::bson::DateTime::now(),
                } },
                options,
            )
            .await?
            .ok_or(RepositoryError::NotFound)
    }
}

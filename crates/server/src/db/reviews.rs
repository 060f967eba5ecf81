//! Review repository.
//!
//! Reviews are their own collection keyed by product, with likes and reply
//! threads mutated in place. The product's displayed rating is a derived
//! value; [`ReviewRepository::mean_rating`] recomputes it from scratch so it
//! never drifts from the reviews themselves.

use std::str::FromStr;

use futures::TryStreamExt;
use mongodb::bson::{Bson, doc};
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument};
use mongodb::{Collection, Database};
use rust_decimal::Decimal;

use farmgate_core::types::{ProductId, ReviewId, UserId};

use super::{RepositoryError, is_duplicate_key};
use crate::models::{Reply, Review};

const COLLECTION: &str = "reviews";

/// Repository for review operations.
pub struct ReviewRepository<'a> {
    db: &'a Database,
}

impl<'a> ReviewRepository<'a> {
    /// Create a new repository on the given database.
    #[must_use]
    pub const fn new(db: &'a Database) -> Self {
        Self { db }
    }

    fn collection(&self) -> Collection<Review> {
        self.db.collection(COLLECTION)
    }

    /// Insert a new review.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the review id is already taken.
    /// Returns `RepositoryError::Database` for other driver errors.
    pub async fn create(&self, review: &Review) -> Result<(), RepositoryError> {
        self.collection().insert_one(review, None).await.map_err(|e| {
            if is_duplicate_key(&e) {
                return RepositoryError::Conflict("review id already exists".to_string());
            }
            RepositoryError::Database(e)
        })?;
        Ok(())
    }

    /// All reviews for a product, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn for_product(&self, product_id: &ProductId) -> Result<Vec<Review>, RepositoryError> {
        let options = FindOptions::builder()
            .sort(doc! { "postedAt": -1 })
            .build();
        Ok(self
            .collection()
            .find(doc! { "productId": product_id.as_str() }, options)
            .await?
            .try_collect()
            .await?)
    }

    /// Count one more like and return the updated review.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the review does not exist.
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn like(&self, id: &ReviewId) -> Result<Review, RepositoryError> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        self.collection()
            .find_one_and_update(
                doc! { "_id": id.as_str() },
                doc! { "$inc": { "likes": 1_i64 } },
                options,
            )
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Append a reply to the review's thread and return the updated review.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the review does not exist.
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn reply(&self, id: &ReviewId, reply: &Reply) -> Result<Review, RepositoryError> {
        let encoded = mongodb::bson::to_bson(reply)
            .map_err(|e| RepositoryError::DataCorruption(format!("unencodable reply: {e}")))?;
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        self.collection()
            .find_one_and_update(
                doc! { "_id": id.as_str() },
                doc! { "$push": { "replies": encoded } },
                options,
            )
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Replace the author's review text and mark the review edited.
    ///
    /// The author rides in the filter, so nobody can edit someone else's
    /// review.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no review matches both the id
    /// and the author. Returns `RepositoryError::Database` if the update
    /// fails.
    pub async fn edit_text(
        &self,
        id: &ReviewId,
        author: &UserId,
        text: &str,
    ) -> Result<Review, RepositoryError> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        self.collection()
            .find_one_and_update(
                doc! { "_id": id.as_str(), "userId": author.as_str() },
                doc! { "$set": { "text": text, "edited": true } },
                options,
            )
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// The mean rating across a product's reviews, `None` when it has none.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the aggregation fails.
    /// Returns `RepositoryError::DataCorruption` if the store hands back a
    /// mean that cannot be read as a decimal.
    pub async fn mean_rating(
        &self,
        product_id: &ProductId,
    ) -> Result<Option<Decimal>, RepositoryError> {
        let mut cursor = self
            .collection()
            .aggregate(
                [
                    doc! { "$match": { "productId": product_id.as_str() } },
                    doc! { "$group": { "_id": Bson::Null, "rating": { "$avg": "$rating" } } },
                ],
                None,
            )
            .await?;

        let Some(group) = cursor.try_next().await? else {
            return Ok(None);
        };

        match group.get("rating") {
            None | Some(Bson::Null) => Ok(None),
            Some(Bson::Decimal128(value)) => {
                let text = value.to_string();
                Decimal::from_str(&text)
                    .or_else(|_| Decimal::from_scientific(&text))
                    .map(Some)
                    .map_err(|e| {
                        RepositoryError::DataCorruption(format!("unreadable mean rating: {e}"))
                    })
            }
            Some(Bson::Double(value)) => Decimal::from_f64_retain(*value)
                .map(Some)
                .ok_or_else(|| {
                    RepositoryError::DataCorruption(format!("non-finite mean rating: {value}"))
                }),
            Some(Bson::Int32(value)) => Ok(Some(Decimal::from(*value))),
            Some(Bson::Int64(value)) => Ok(Some(Decimal::from(*value))),
            Some(other) => Err(RepositoryError::DataCorruption(format!(
                "unexpected mean rating type: {other:?}"
            ))),
        }
    }
}

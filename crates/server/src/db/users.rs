//! User repository and cart mutations.
//!
//! The cart lives embedded in the user document, so every cart mutation is a
//! single update on `users`. The per-line quantity cap is enforced inside the
//! update filter itself: an increment only matches when the stored quantity
//! still has room for the requested amount, which keeps concurrent adds from
//! overshooting the cap.

use mongodb::bson::doc;
use mongodb::{Collection, Database};
use thiserror::Error;

use farmgate_core::types::{LineQuantity, ProductId, UserId};

use super::{RepositoryError, is_duplicate_key};
use crate::models::{CartLine, User};

const COLLECTION: &str = "users";

/// Errors from cart mutations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The cart's owner does not exist.
    #[error("user not found")]
    UserNotFound,

    /// The cart holds no line for the product.
    #[error("no cart line for product {product}")]
    LineNotFound { product: String },

    /// The line cannot absorb the requested amount without passing the cap.
    #[error("adding product {product} would push the line past {max} units", max = LineQuantity::MAX)]
    CapacityExceeded { product: String },

    /// Underlying store failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Repository for user and cart operations.
pub struct UserRepository<'a> {
    db: &'a Database,
}

impl<'a> UserRepository<'a> {
    /// Create a new repository on the given database.
    #[must_use]
    pub const fn new(db: &'a Database) -> Self {
        Self { db }
    }

    fn collection(&self) -> Collection<User> {
        self.db.collection(COLLECTION)
    }

    /// Insert a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user id is already taken.
    /// Returns `RepositoryError::Database` for other driver errors.
    pub async fn create(&self, user: &User) -> Result<(), RepositoryError> {
        self.collection().insert_one(user, None).await.map_err(|e| {
            if is_duplicate_key(&e) {
                return RepositoryError::Conflict("user id already exists".to_string());
            }
            RepositoryError::Database(e)
        })?;
        Ok(())
    }

    /// Get a user by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .collection()
            .find_one(doc! { "_id": id.as_str() }, None)
            .await?)
    }

    /// The user's current cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::UserNotFound` if the user does not exist.
    pub async fn cart(&self, user_id: &UserId) -> Result<Vec<CartLine>, CartError> {
        let user = self
            .collection()
            .find_one(doc! { "_id": user_id.as_str() }, None)
            .await
            .map_err(RepositoryError::from)?
            .ok_or(CartError::UserNotFound)?;
        Ok(user.cart)
    }

    /// Add a line to the cart, merging into an existing line for the same
    /// product.
    ///
    /// Whichever branch the current cart suggests, the write itself carries
    /// the guard: a merge only matches while the stored quantity can absorb
    /// the requested amount, and a fresh push only matches while no line for
    /// the product exists. If the first attempt loses a race the other
    /// branch is tried once before the add is rejected, so the stored plus
    /// requested quantities never exceed [`LineQuantity::MAX`].
    ///
    /// # Errors
    ///
    /// Returns `CartError::UserNotFound` if the user does not exist.
    /// Returns `CartError::CapacityExceeded` if the line cannot absorb the
    /// requested quantity.
    pub async fn add_to_cart(
        &self,
        user_id: &UserId,
        line: CartLine,
    ) -> Result<Vec<CartLine>, CartError> {
        let cart = self.cart(user_id).await?;
        let line_present = cart.iter().any(|l| l.product_id == line.product_id);

        let applied = if line_present {
            self.try_increment(user_id, &line).await? || self.try_push(user_id, &line).await?
        } else {
            self.try_push(user_id, &line).await? || self.try_increment(user_id, &line).await?
        };

        if !applied {
            return Err(CartError::CapacityExceeded {
                product: line.product_id.into_inner(),
            });
        }
        self.cart(user_id).await
    }

    /// Increment an existing line, guarded by the remaining headroom.
    async fn try_increment(&self, user_id: &UserId, line: &CartLine) -> Result<bool, CartError> {
        let result = self
            .collection()
            .update_one(
                doc! {
                    "_id": user_id.as_str(),
                    "cart": { "$elemMatch": {
                        "productId": line.product_id.as_str(),
                        "quantity": { "$lte": i64::from(line.quantity.headroom()) },
                    } },
                },
                doc! { "$inc": { "cart.$.quantity": i64::from(line.quantity.get()) } },
                None,
            )
            .await
            .map_err(RepositoryError::from)?;
        Ok(result.modified_count > 0)
    }

    /// Push a fresh line, guarded against a line for the product existing.
    async fn try_push(&self, user_id: &UserId, line: &CartLine) -> Result<bool, CartError> {
        let encoded = mongodb::bson::to_bson(line).map_err(|e| {
            RepositoryError::DataCorruption(format!("unencodable cart line: {e}"))
        })?;
        let result = self
            .collection()
            .update_one(
                doc! {
                    "_id": user_id.as_str(),
                    "cart.productId": { "$ne": line.product_id.as_str() },
                },
                doc! { "$push": { "cart": encoded } },
                None,
            )
            .await
            .map_err(RepositoryError::from)?;
        Ok(result.modified_count > 0)
    }

    /// Overwrite the quantity of an existing line.
    ///
    /// Unlike [`Self::add_to_cart`] this does not merge or guard against the
    /// previous value; the new quantity simply replaces the old one, bounded
    /// only by [`LineQuantity`] itself.
    ///
    /// # Errors
    ///
    /// Returns `CartError::UserNotFound` if the user does not exist.
    /// Returns `CartError::LineNotFound` if the cart has no line for the
    /// product.
    pub async fn set_cart_quantity(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
        quantity: LineQuantity,
    ) -> Result<Vec<CartLine>, CartError> {
        let result = self
            .collection()
            .update_one(
                doc! {
                    "_id": user_id.as_str(),
                    "cart.productId": product_id.as_str(),
                },
                doc! { "$set": { "cart.$.quantity": i64::from(quantity.get()) } },
                None,
            )
            .await
            .map_err(RepositoryError::from)?;

        if result.matched_count == 0 {
            // Distinguish a missing user from a missing line.
            let cart = self.cart(user_id).await?;
            if cart.iter().any(|l| &l.product_id == product_id) {
                // The line appeared between the update and the read; the
                // caller sees the current cart either way.
                return Ok(cart);
            }
            return Err(CartError::LineNotFound {
                product: product_id.as_str().to_string(),
            });
        }
        self.cart(user_id).await
    }

    /// Remove a product's line from the cart.
    ///
    /// Removing a line that is not there is a no-op; the current cart is
    /// returned either way.
    ///
    /// # Errors
    ///
    /// Returns `CartError::UserNotFound` if the user does not exist.
    pub async fn remove_from_cart(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
    ) -> Result<Vec<CartLine>, CartError> {
        let result = self
            .collection()
            .update_one(
                doc! { "_id": user_id.as_str() },
                doc! { "$pull": { "cart": { "productId": product_id.as_str() } } },
                None,
            )
            .await
            .map_err(RepositoryError::from)?;

        if result.matched_count == 0 {
            return Err(CartError::UserNotFound);
        }
        self.cart(user_id).await
    }

    /// Drop the cart lines for the given products.
    ///
    /// Used after checkout to clear exactly the purchased lines; anything
    /// added to the cart since stays put. A user deleted mid-checkout is
    /// treated as a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn clear_cart_lines(
        &self,
        user_id: &UserId,
        product_ids: &[ProductId],
    ) -> Result<(), RepositoryError> {
        let ids: Vec<&str> = product_ids.iter().map(ProductId::as_str).collect();
        self.collection()
            .update_one(
                doc! { "_id": user_id.as_str() },
                doc! { "$pull": { "cart": { "productId": { "$in": ids } } } },
                None,
            )
            .await?;
        Ok(())
    }
}

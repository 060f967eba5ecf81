//! Product repository.
//!
//! Executes composed catalog queries and the seller-scoped listing CRUD.
//! Updates and deletes always carry the seller in the filter, so a seller
//! can only ever touch their own listings.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::bson::{Bson, Decimal128, Document, doc};
use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument};
use mongodb::{Collection, Database};
use rust_decimal::Decimal;

use farmgate_core::types::{Category, ProductId, SellerId};

use super::{RepositoryError, is_duplicate_key};
use crate::catalog::CatalogQuery;
use crate::models::{GeoJsonPoint, Product};

const COLLECTION: &str = "products";

/// One page of catalog results.
#[derive(Debug)]
pub struct CatalogPage {
    pub products: Vec<Product>,
    /// Total page count for the active window, `None` when unlimited.
    pub total_pages: Option<u64>,
}

/// Partial update for a listing. Absent fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub sale_price: Option<Decimal>,
    pub market_price: Option<Decimal>,
    pub quantity: Option<i64>,
    pub image: Option<String>,
    pub catalogue: Option<Vec<String>>,
    pub available_from: Option<DateTime<Utc>>,
    pub collection_address: Option<String>,
    pub collection_point: Option<GeoJsonPoint>,
    pub category: Option<Category>,
    pub notes: Option<String>,
}

impl ProductPatch {
    /// Whether the patch carries no field at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.sale_price.is_none()
            && self.market_price.is_none()
            && self.quantity.is_none()
            && self.image.is_none()
            && self.catalogue.is_none()
            && self.available_from.is_none()
            && self.collection_address.is_none()
            && self.collection_point.is_none()
            && self.category.is_none()
            && self.notes.is_none()
    }

    /// Render the provided fields as a `$set` document.
    fn into_set_document(self) -> Result<Document, RepositoryError> {
        let mut set = Document::new();
        if let Some(name) = self.name {
            set.insert("name", name);
        }
        if let Some(description) = self.description {
            set.insert("description", description);
        }
        if let Some(price) = self.sale_price {
            set.insert("salePrice", decimal_bson(price)?);
        }
        if let Some(price) = self.market_price {
            set.insert("marketPrice", decimal_bson(price)?);
        }
        if let Some(quantity) = self.quantity {
            set.insert("quantity", quantity);
        }
        if let Some(image) = self.image {
            set.insert("image", image);
        }
        if let Some(catalogue) = self.catalogue {
            set.insert("catalogue", catalogue);
        }
        if let Some(available_from) = self.available_from {
            set.insert(
                "availableFrom",
                Bson::DateTime(mongodb::bson::DateTime::from_chrono(available_from)),
            );
        }
        if let Some(address) = self.collection_address {
            set.insert("collectionAddress", address);
        }
        if let Some(point) = self.collection_point {
            let value = mongodb::bson::to_bson(&point).map_err(|e| {
                RepositoryError::DataCorruption(format!("unencodable collection point: {e}"))
            })?;
            set.insert("collectionPoint", value);
        }
        if let Some(category) = self.category {
            set.insert("category", category.label());
        }
        if let Some(notes) = self.notes {
            set.insert("notes", notes);
        }
        Ok(set)
    }
}

fn decimal_bson(value: Decimal) -> Result<Bson, RepositoryError> {
    Decimal128::from_str(&value.to_string())
        .map(Bson::Decimal128)
        .map_err(|e| RepositoryError::DataCorruption(format!("unencodable decimal {value}: {e}")))
}

/// Repository for product listing operations.
pub struct ProductRepository<'a> {
    db: &'a Database,
}

impl<'a> ProductRepository<'a> {
    /// Create a new repository on the given database.
    #[must_use]
    pub const fn new(db: &'a Database) -> Self {
        Self { db }
    }

    fn collection(&self) -> Collection<Product> {
        self.db.collection(COLLECTION)
    }

    /// Execute a composed catalog query.
    ///
    /// Bounded windows count the matching documents first so the page count
    /// covers the whole result, then fetch the windowed slice. Unlimited
    /// windows skip the count entirely.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if either round trip fails.
    pub async fn catalog_page(&self, query: &CatalogQuery) -> Result<CatalogPage, RepositoryError> {
        let collection = self.collection();

        let total_pages = if query.window.is_bounded() {
            let matched = collection
                .count_documents(query.count_filter(), None)
                .await?;
            query.window.total_pages(matched)
        } else {
            None
        };

        let products = collection
            .find(query.find_filter(), query.find_options())
            .await?
            .try_collect()
            .await?;

        Ok(CatalogPage {
            products,
            total_pages,
        })
    }

    /// Get a single listing by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self
            .collection()
            .find_one(doc! { "_id": id.as_str() }, None)
            .await?)
    }

    /// Insert a new listing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the product id is already taken.
    /// Returns `RepositoryError::Database` for other driver errors.
    pub async fn create(&self, product: &Product) -> Result<(), RepositoryError> {
        self.collection().insert_one(product, None).await.map_err(|e| {
            if is_duplicate_key(&e) {
                return RepositoryError::Conflict("product id already exists".to_string());
            }
            RepositoryError::Database(e)
        })?;
        Ok(())
    }

    /// Apply a patch to a seller's own listing and return the updated state.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no listing matches both the id
    /// and the seller. Returns `RepositoryError::Database` if the update
    /// fails.
    pub async fn update(
        &self,
        id: &ProductId,
        seller_id: &SellerId,
        patch: ProductPatch,
    ) -> Result<Product, RepositoryError> {
        let set = patch.into_set_document()?;
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        self.collection()
            .find_one_and_update(
                doc! { "_id": id.as_str(), "sellerId": seller_id.as_str() },
                doc! { "$set": set },
                options,
            )
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Delete a seller's own listing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no listing matches both the id
    /// and the seller. Returns `RepositoryError::Database` if the delete
    /// fails.
    pub async fn delete(&self, id: &ProductId, seller_id: &SellerId) -> Result<(), RepositoryError> {
        let result = self
            .collection()
            .delete_one(
                doc! { "_id": id.as_str(), "sellerId": seller_id.as_str() },
                None,
            )
            .await?;

        if result.deleted_count == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Decrement stock after a purchase, clamping at zero.
    ///
    /// A guarded `$inc` takes the fast path when stock covers the purchase.
    /// When it does not, the remaining stock is set to zero instead of going
    /// negative. A listing deleted in the meantime is left alone.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if either update fails.
    pub async fn decrement_stock(
        &self,
        id: &ProductId,
        quantity: u32,
    ) -> Result<(), RepositoryError> {
        let quantity = i64::from(quantity);
        let guarded = self
            .collection()
            .update_one(
                doc! { "_id": id.as_str(), "quantity": { "$gte": quantity } },
                doc! { "$inc": { "quantity": -quantity } },
                None,
            )
            .await?;

        if guarded.matched_count == 0 {
            self.collection()
                .update_one(
                    doc! { "_id": id.as_str(), "quantity": { "$lt": quantity } },
                    doc! { "$set": { "quantity": 0_i64 } },
                    None,
                )
                .await?;
        }
        Ok(())
    }

    /// Store a freshly recomputed mean rating.
    ///
    /// A listing that no longer exists is ignored; reviews can outlive it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn set_rating(&self, id: &ProductId, rating: Decimal) -> Result<(), RepositoryError> {
        self.collection()
            .update_one(
                doc! { "_id": id.as_str() },
                doc! { "$set": { "rating": decimal_bson(rating)? } },
                None,
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_patch_produces_empty_set() {
        let patch = ProductPatch::default();
        assert!(patch.is_empty());
        assert!(patch.into_set_document().unwrap().is_empty());
    }

    #[test]
    fn test_patch_renders_store_field_names() {
        let patch = ProductPatch {
            name: Some("Bramley Apples".to_string()),
            sale_price: Some(Decimal::new(250, 2)),
            quantity: Some(40),
            category: Some(Category::FreshFruits),
            ..ProductPatch::default()
        };
        assert!(!patch.is_empty());

        let set = patch.into_set_document().unwrap();
        assert_eq!(set.get_str("name").unwrap(), "Bramley Apples");
        assert_eq!(set.get_str("category").unwrap(), "Fresh Fruits");
        assert_eq!(set.get_i64("quantity").unwrap(), 40);
        assert!(matches!(set.get("salePrice"), Some(Bson::Decimal128(_))));
        assert!(!set.contains_key("description"));
    }
}

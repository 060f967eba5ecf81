//! Seed the database from a YAML fixture file.
//!
//! This command reads users, products and reviews from a YAML file,
//! validates them, and inserts them through the server's repositories so
//! seeded documents are byte-for-byte what the server itself would write.
//!
//! # Fixture Format
//!
//! ```yaml
//! users:
//!   - id: u-demo-buyer
//!     name: Demo Buyer
//!     email: buyer@example.com
//!     address: 12 Harbour Road, Bristol
//!     phone: "07700 900123"
//!
//! products:
//!   - id: p-demo-apples
//!     sellerId: u-demo-seller
//!     name: Bramley apples
//!     description: Orchard-grown cooking apples.
//!     salePrice: "2.50"
//!     marketPrice: "3.10"
//!     quantity: 40
//!     category: Fresh Fruits
//!     collectionAddress: Hartcliffe Lane Farm, Bristol
//!     collectionPoint: [-2.59, 51.45]
//!
//! reviews:
//!   - productId: p-demo-apples
//!     userId: u-demo-buyer
//!     rating: "4.5"
//!     text: Sharp and excellent in a crumble.
//! ```
//!
//! Products referenced by reviews must appear in the same file or already
//! exist in the database. After inserting reviews, the affected products'
//! stored mean ratings are recomputed.

use std::collections::BTreeSet;
use std::path::Path;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{error, info};

use farmgate_core::{
    Category, Email, EmailError, GeoPoint, GeoPointError, ProductId, ReviewId, SellerId, UserId,
};
use farmgate_server::db::{ProductRepository, ReviewRepository, UserRepository};
use farmgate_server::models::{GeoJsonPoint, Product, Review, User};

/// A user as the fixture file describes one.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct SeedUser {
    id: Option<String>,
    name: String,
    email: String,
    address: String,
    phone: String,
}

impl SeedUser {
    fn into_user(self) -> Result<User, EmailError> {
        Ok(User {
            id: self.id.map_or_else(UserId::generate, UserId::new),
            name: self.name,
            email: Email::parse(&self.email)?,
            address: self.address,
            phone: self.phone,
            cart: Vec::new(),
            created_at: Utc::now(),
        })
    }
}

/// A product as the fixture file describes one.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct SeedProduct {
    id: Option<String>,
    seller_id: String,
    name: String,
    #[serde(default)]
    description: String,
    sale_price: Decimal,
    market_price: Decimal,
    quantity: i64,
    #[serde(default)]
    image: String,
    #[serde(default)]
    catalogue: Vec<String>,
    available_from: Option<DateTime<Utc>>,
    collection_address: String,
    /// `[longitude, latitude]`, matching the stored GeoJSON order.
    collection_point: Option<[f64; 2]>,
    category: Category,
    notes: Option<String>,
}

impl SeedProduct {
    fn into_product(self) -> Result<Product, GeoPointError> {
        let collection_point = self
            .collection_point
            .map(|[longitude, latitude]| GeoPoint::new(longitude, latitude))
            .transpose()?
            .map(GeoJsonPoint::from);

        let now = Utc::now();
        Ok(Product {
            id: self.id.map_or_else(ProductId::generate, ProductId::new),
            name: self.name,
            description: self.description,
            sale_price: self.sale_price,
            market_price: self.market_price,
            quantity: self.quantity,
            image: self.image,
            catalogue: self.catalogue,
            seller_id: SellerId::new(self.seller_id),
            available_from: self.available_from.unwrap_or(now),
            listed_at: now,
            collection_address: self.collection_address,
            collection_point,
            category: self.category,
            rating: Decimal::ZERO,
            notes: self.notes,
        })
    }
}

/// A review as the fixture file describes one.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct SeedReview {
    id: Option<String>,
    product_id: String,
    user_id: String,
    rating: Decimal,
    text: String,
}

impl SeedReview {
    fn into_review(self) -> Review {
        Review {
            id: self.id.map_or_else(ReviewId::generate, ReviewId::new),
            product_id: ProductId::new(self.product_id),
            user_id: UserId::new(self.user_id),
            rating: self.rating,
            text: self.text,
            likes: 0,
            replies: Vec::new(),
            edited: false,
            posted_at: Utc::now(),
        }
    }
}

/// The fixture file as a whole. Every section is optional.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SeedFile {
    #[serde(default)]
    users: Vec<SeedUser>,
    #[serde(default)]
    products: Vec<SeedProduct>,
    #[serde(default)]
    reviews: Vec<SeedReview>,
}

/// Seed the database from a YAML fixture file.
///
/// # Arguments
///
/// * `file_path` - Path to the YAML fixture file
/// * `drop_existing` - If true, drop the marketplace collections first
///
/// # Errors
///
/// Returns an error if environment variables are missing, the file cannot
/// be read or validated, or database operations fail.
pub async fn from_file(
    file_path: &str,
    drop_existing: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    // Verify file exists
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading fixture file");

    // Read and validate YAML before connecting to database
    let content = tokio::fs::read_to_string(path).await?;
    let fixture: SeedFile = serde_yaml::from_str(&content)?;

    info!(
        users = fixture.users.len(),
        products = fixture.products.len(),
        reviews = fixture.reviews.len(),
        "Parsed fixture"
    );

    let errors = validate(&fixture);
    if !errors.is_empty() {
        error!("Fixture validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(format!("{} validation errors found", errors.len()).into());
    }

    info!("Fixture validated successfully");

    // Connect to database
    let db = super::connect().await?;
    info!("Connected to database");

    if drop_existing {
        for name in ["products", "users", "orders", "reviews"] {
            db.collection::<mongodb::bson::Document>(name)
                .drop(None)
                .await?;
        }
        info!("Dropped existing collections");
    }

    let users = UserRepository::new(&db);
    for seed in fixture.users {
        users.create(&seed.into_user()?).await?;
    }

    let products = ProductRepository::new(&db);
    for seed in fixture.products {
        products.create(&seed.into_product()?).await?;
    }

    let reviews = ReviewRepository::new(&db);
    let mut rated: BTreeSet<ProductId> = BTreeSet::new();
    for seed in fixture.reviews {
        let review = seed.into_review();
        rated.insert(review.product_id.clone());
        reviews.create(&review).await?;
    }

    // Bring the stored mean ratings in line with the seeded reviews
    for product_id in rated {
        if let Some(mean) = reviews.mean_rating(&product_id).await? {
            products.set_rating(&product_id, mean.round_dp(2)).await?;
        }
    }

    info!("Seeding complete");
    Ok(())
}

/// Collect every problem in the fixture rather than stopping at the first.
fn validate(fixture: &SeedFile) -> Vec<String> {
    let mut errors = Vec::new();

    for (i, user) in fixture.users.iter().enumerate() {
        if user.name.trim().is_empty() {
            errors.push(format!("users[{i}]: name must not be empty"));
        }
        if let Err(e) = Email::parse(&user.email) {
            errors.push(format!("users[{i}]: {e}"));
        }
    }

    for (i, product) in fixture.products.iter().enumerate() {
        if product.name.trim().is_empty() {
            errors.push(format!("products[{i}]: name must not be empty"));
        }
        if product.seller_id.trim().is_empty() {
            errors.push(format!("products[{i}]: sellerId must not be empty"));
        }
        if product.sale_price <= Decimal::ZERO {
            errors.push(format!("products[{i}]: salePrice must be positive"));
        }
        if product.market_price <= Decimal::ZERO {
            errors.push(format!("products[{i}]: marketPrice must be positive"));
        }
        if product.quantity < 0 {
            errors.push(format!("products[{i}]: quantity must not be negative"));
        }
        if let Some([longitude, latitude]) = product.collection_point {
            if let Err(e) = GeoPoint::new(longitude, latitude) {
                errors.push(format!("products[{i}]: {e}"));
            }
        }
    }

    for (i, review) in fixture.reviews.iter().enumerate() {
        if review.rating < Decimal::ONE || review.rating > Decimal::from(5) {
            errors.push(format!("reviews[{i}]: rating must be between 1 and 5"));
        }
        if review.text.trim().is_empty() {
            errors.push(format!("reviews[{i}]: text must not be empty"));
        }
    }

    errors
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"
users:
  - id: u-demo-buyer
    name: Demo Buyer
    email: buyer@example.com
    address: 12 Harbour Road, Bristol
    phone: "07700 900123"

products:
  - id: p-demo-apples
    sellerId: u-demo-seller
    name: Bramley apples
    description: Orchard-grown cooking apples.
    salePrice: "2.50"
    marketPrice: "3.10"
    quantity: 40
    category: Fresh Fruits
    collectionAddress: Hartcliffe Lane Farm, Bristol
    collectionPoint: [-2.59, 51.45]

reviews:
  - productId: p-demo-apples
    userId: u-demo-buyer
    rating: "4.5"
    text: Sharp and excellent in a crumble.
"#;

    #[test]
    fn test_fixture_parses_and_validates() {
        let fixture: SeedFile = serde_yaml::from_str(FIXTURE).unwrap();
        assert_eq!(fixture.users.len(), 1);
        assert_eq!(fixture.products.len(), 1);
        assert_eq!(fixture.reviews.len(), 1);
        assert!(validate(&fixture).is_empty());
    }

    #[test]
    fn test_validate_collects_every_error() {
        let broken = r#"
users:
  - name: ""
    email: not-an-email
    address: somewhere
    phone: "123"
reviews:
  - productId: p-1
    userId: u-1
    rating: "7"
    text: ""
"#;
        let fixture: SeedFile = serde_yaml::from_str(broken).unwrap();
        let errors = validate(&fixture);
        assert_eq!(errors.len(), 4);
        assert!(errors.iter().any(|e| e.contains("users[0]: name")));
        assert!(errors.iter().any(|e| e.contains("rating")));
    }

    #[test]
    fn test_product_conversion_defaults_availability_to_now() {
        let fixture: SeedFile = serde_yaml::from_str(FIXTURE).unwrap();
        let product = fixture
            .products
            .into_iter()
            .next()
            .unwrap()
            .into_product()
            .unwrap();

        assert_eq!(product.id.as_str(), "p-demo-apples");
        assert_eq!(product.available_from, product.listed_at);
        assert_eq!(product.rating, Decimal::ZERO);

        let point = product.collection_point.unwrap();
        assert_eq!(point.coordinates, [-2.59, 51.45]);
    }

    #[test]
    fn test_unknown_fixture_keys_are_rejected() {
        let result: Result<SeedFile, _> = serde_yaml::from_str("flavours: []");
        assert!(result.is_err());
    }
}

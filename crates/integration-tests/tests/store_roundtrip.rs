//! Integration tests for repository behavior against a live document store.
//!
//! These tests require:
//! - A running `MongoDB` instance (default `mongodb://localhost:27017`,
//!   override with `FARMGATE_TEST_DATABASE_URL`)
//!
//! They write to the `farmgate_test` database with fresh UUID keys, so they
//! tolerate pre-existing data and parallel runs. No index setup is assumed,
//! which is also why nothing here exercises proximity search.
//!
//! Run with: cargo test -p farmgate-integration-tests -- --ignored

use std::str::FromStr;

use chrono::{Duration, Utc};
use mongodb::Database;
use rust_decimal::Decimal;
use secrecy::SecretString;
use uuid::Uuid;

use farmgate_core::{
    Category, Email, LineQuantity, OrderId, OrderStatus, ProductId, ReviewId, SellerId, UserId,
};
use farmgate_server::catalog::CatalogQuery;
use farmgate_server::db::{
    CartError, OrderRepository, ProductRepository, ReviewRepository, UserRepository,
};
use farmgate_server::models::{CartLine, Order, OrderItem, Product, Review, User};

const TEST_DATABASE: &str = "farmgate_test";

fn store_url() -> String {
    std::env::var("FARMGATE_TEST_DATABASE_URL")
        .unwrap_or_else(|_| "mongodb://localhost:27017".to_string())
}

async fn database() -> Database {
    farmgate_server::db::connect(&SecretString::from(store_url()), TEST_DATABASE)
        .await
        .expect("Failed to connect to test store")
}

fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4())
}

fn price(raw: &str) -> Decimal {
    Decimal::from_str(raw).expect("valid decimal")
}

fn product(id: &str, seller: &str) -> Product {
    Product {
        id: ProductId::new(id),
        name: "Bramley apples".to_owned(),
        description: "Cooking apples by the kilo".to_owned(),
        sale_price: price("2.50"),
        market_price: price("3.10"),
        quantity: 40,
        image: "apples.jpg".to_owned(),
        catalogue: Vec::new(),
        seller_id: SellerId::new(seller),
        available_from: Utc::now(),
        listed_at: Utc::now(),
        collection_address: "Hollow Farm, Wedmore".to_owned(),
        collection_point: None,
        category: Category::FreshFruits,
        rating: Decimal::ZERO,
        notes: None,
    }
}

fn user(id: &str) -> User {
    User {
        id: UserId::new(id),
        name: "Test Buyer".to_owned(),
        email: "buyer@example.com".parse::<Email>().expect("valid email"),
        address: "1 Test Lane".to_owned(),
        phone: "07700900000".to_owned(),
        cart: Vec::new(),
        created_at: Utc::now(),
    }
}

fn line_for(product: &Product, quantity: u32) -> CartLine {
    CartLine {
        product_id: product.id.clone(),
        seller_id: product.seller_id.clone(),
        quantity: LineQuantity::new(quantity).expect("valid quantity"),
        name: product.name.clone(),
        price: product.sale_price,
        image: product.image.clone(),
    }
}

fn review_of(product_id: &ProductId, rating: &str) -> Review {
    Review {
        id: ReviewId::new(unique("r")),
        product_id: product_id.clone(),
        user_id: UserId::new(unique("u")),
        rating: price(rating),
        text: "Wonky but delicious".to_owned(),
        likes: 0,
        replies: Vec::new(),
        edited: false,
        posted_at: Utc::now(),
    }
}

// =============================================================================
// Product Round Trips
// =============================================================================

#[tokio::test]
#[ignore = "Requires a running document store"]
async fn test_product_create_and_get_round_trip() {
    let db = database().await;
    let repo = ProductRepository::new(&db);

    let created = product(&unique("p"), &unique("s"));
    repo.create(&created).await.expect("create product");

    let read = repo
        .get(&created.id)
        .await
        .expect("get product")
        .expect("product exists");

    assert_eq!(read.name, created.name);
    assert_eq!(read.sale_price, created.sale_price);
    assert_eq!(read.category, created.category);
    assert_eq!(read.quantity, 40);
}

#[tokio::test]
#[ignore = "Requires a running document store"]
async fn test_catalog_page_scopes_and_counts() {
    let db = database().await;
    let repo = ProductRepository::new(&db);

    let seller = unique("s");
    for _ in 0..3 {
        repo.create(&product(&unique("p"), &seller))
            .await
            .expect("create product");
    }

    let pairs = vec![("seller_id".to_owned(), seller.clone())];
    let unlimited = CatalogQuery::from_pairs(&pairs).expect("valid query");
    let page = repo.catalog_page(&unlimited).await.expect("catalog page");
    assert_eq!(page.products.len(), 3);
    assert_eq!(page.total_pages, None);

    let pairs = vec![
        ("seller_id".to_owned(), seller),
        ("page".to_owned(), "1".to_owned()),
        ("limit".to_owned(), "2".to_owned()),
    ];
    let bounded = CatalogQuery::from_pairs(&pairs).expect("valid query");
    let page = repo.catalog_page(&bounded).await.expect("catalog page");
    assert_eq!(page.products.len(), 2);
    assert_eq!(page.total_pages, Some(2));
}

#[tokio::test]
#[ignore = "Requires a running document store"]
async fn test_decrement_stock_clamps_at_zero() {
    let db = database().await;
    let repo = ProductRepository::new(&db);

    let mut created = product(&unique("p"), &unique("s"));
    created.quantity = 5;
    repo.create(&created).await.expect("create product");

    repo.decrement_stock(&created.id, 3).await.expect("decrement");
    let read = repo.get(&created.id).await.expect("get").expect("exists");
    assert_eq!(read.quantity, 2);

    // Selling more than remains leaves zero, never a negative count.
    repo.decrement_stock(&created.id, 10).await.expect("decrement");
    let read = repo.get(&created.id).await.expect("get").expect("exists");
    assert_eq!(read.quantity, 0);
}

// =============================================================================
// Cart Mutations
// =============================================================================

#[tokio::test]
#[ignore = "Requires a running document store"]
async fn test_add_to_cart_merges_and_caps() {
    let db = database().await;
    let users = UserRepository::new(&db);

    let buyer = user(&unique("u"));
    users.create(&buyer).await.expect("create user");
    let item = product(&unique("p"), &unique("s"));

    let cart = users
        .add_to_cart(&buyer.id, line_for(&item, 12))
        .await
        .expect("first add");
    assert_eq!(cart.len(), 1);

    // 12 + 12 would land past the cap, so the merge is rejected outright.
    let err = users
        .add_to_cart(&buyer.id, line_for(&item, 12))
        .await
        .expect_err("over-cap add");
    assert!(matches!(err, CartError::CapacityExceeded { .. }));

    // 12 + 8 lands exactly on it.
    let cart = users
        .add_to_cart(&buyer.id, line_for(&item, 8))
        .await
        .expect("merge to cap");
    let merged = cart
        .iter()
        .find(|l| l.product_id == item.id)
        .expect("merged line");
    assert_eq!(merged.quantity.get(), LineQuantity::MAX);
}

#[tokio::test]
#[ignore = "Requires a running document store"]
async fn test_set_quantity_overwrites_without_merging() {
    let db = database().await;
    let users = UserRepository::new(&db);

    let buyer = user(&unique("u"));
    users.create(&buyer).await.expect("create user");
    let item = product(&unique("p"), &unique("s"));

    let absent = ProductId::new(unique("p"));
    let err = users
        .set_cart_quantity(&buyer.id, &absent, LineQuantity::new(5).expect("valid"))
        .await
        .expect_err("no line yet");
    assert!(matches!(err, CartError::LineNotFound { .. }));

    users
        .add_to_cart(&buyer.id, line_for(&item, 18))
        .await
        .expect("add");
    let cart = users
        .set_cart_quantity(&buyer.id, &item.id, LineQuantity::new(5).expect("valid"))
        .await
        .expect("set quantity");

    let set = cart
        .iter()
        .find(|l| l.product_id == item.id)
        .expect("line");
    assert_eq!(set.quantity.get(), 5);
}

#[tokio::test]
#[ignore = "Requires a running document store"]
async fn test_remove_missing_line_is_a_noop() {
    let db = database().await;
    let users = UserRepository::new(&db);

    let buyer = user(&unique("u"));
    users.create(&buyer).await.expect("create user");

    let cart = users
        .remove_from_cart(&buyer.id, &ProductId::new(unique("p")))
        .await
        .expect("remove on empty cart");
    assert!(cart.is_empty());

    let ghost = UserId::new(unique("u"));
    let err = users
        .remove_from_cart(&ghost, &ProductId::new(unique("p")))
        .await
        .expect_err("missing user");
    assert!(matches!(err, CartError::UserNotFound));
}

#[tokio::test]
#[ignore = "Requires a running document store"]
async fn test_clear_cart_lines_spares_unselected() {
    let db = database().await;
    let users = UserRepository::new(&db);

    let buyer = user(&unique("u"));
    users.create(&buyer).await.expect("create user");
    let bought = product(&unique("p"), &unique("s"));
    let kept = product(&unique("p"), &unique("s"));

    users
        .add_to_cart(&buyer.id, line_for(&bought, 2))
        .await
        .expect("add bought");
    users
        .add_to_cart(&buyer.id, line_for(&kept, 3))
        .await
        .expect("add kept");

    users
        .clear_cart_lines(&buyer.id, &[bought.id.clone()])
        .await
        .expect("clear purchased lines");

    let cart = users.cart(&buyer.id).await.expect("cart");
    assert_eq!(cart.len(), 1);
    assert_eq!(
        cart.first().expect("remaining line").product_id,
        kept.id
    );
}

// =============================================================================
// Orders
// =============================================================================

#[tokio::test]
#[ignore = "Requires a running document store"]
async fn test_order_history_is_newest_first_and_status_is_permissive() {
    let db = database().await;
    let orders = OrderRepository::new(&db);

    let buyer_id = UserId::new(unique("u"));
    let placed_at = Utc::now();
    let items = vec![OrderItem {
        product_id: ProductId::new(unique("p")),
        seller_id: SellerId::new(unique("s")),
        product_name: "Bramley apples".to_owned(),
        quantity: LineQuantity::new(2).expect("valid"),
        order_price: price("2.50"),
    }];

    let earlier = Order {
        id: OrderId::new(unique("o")),
        user_id: buyer_id.clone(),
        placed_at: placed_at - Duration::hours(1),
        updated_at: placed_at - Duration::hours(1),
        items: items.clone(),
        order_total: Order::total_of(&items),
        status: OrderStatus::default(),
    };
    let later = Order {
        id: OrderId::new(unique("o")),
        placed_at,
        updated_at: placed_at,
        ..earlier.clone()
    };
    orders.create(&earlier).await.expect("create earlier");
    orders.create(&later).await.expect("create later");

    let history = orders.for_user(&buyer_id).await.expect("history");
    assert_eq!(history.len(), 2);
    assert_eq!(history.first().expect("newest").id, later.id);

    // A terminal status does not lock the order; any status can follow.
    let completed = orders
        .set_status(&later.id, OrderStatus::Completed)
        .await
        .expect("complete");
    assert_eq!(completed.status, OrderStatus::Completed);

    let reopened = orders
        .set_status(&later.id, OrderStatus::Confirmed)
        .await
        .expect("reopen");
    assert_eq!(reopened.status, OrderStatus::Confirmed);
    assert!(reopened.updated_at >= reopened.placed_at);
}

#[tokio::test]
#[ignore = "Requires a running document store"]
async fn test_status_update_on_missing_order_reports_not_found() {
    let db = database().await;
    let orders = OrderRepository::new(&db);

    let ghost = OrderId::new(unique("o"));
    let err = orders
        .set_status(&ghost, OrderStatus::Confirmed)
        .await
        .expect_err("no such order");
    assert!(matches!(
        err,
        farmgate_server::db::RepositoryError::NotFound
    ));
    assert!(orders.get(&ghost).await.expect("get").is_none());
}

// =============================================================================
// Reviews
// =============================================================================

#[tokio::test]
#[ignore = "Requires a running document store"]
async fn test_mean_rating_tracks_reviews() {
    let db = database().await;
    let reviews = ReviewRepository::new(&db);

    let product_id = ProductId::new(unique("p"));
    assert_eq!(
        reviews.mean_rating(&product_id).await.expect("mean"),
        None,
        "no reviews yet"
    );

    reviews
        .create(&review_of(&product_id, "4"))
        .await
        .expect("create review");
    reviews
        .create(&review_of(&product_id, "5"))
        .await
        .expect("create review");

    let mean = reviews
        .mean_rating(&product_id)
        .await
        .expect("mean")
        .expect("has reviews");
    assert_eq!(mean, price("4.5"));
}

#[tokio::test]
#[ignore = "Requires a running document store"]
async fn test_review_interactions_accumulate() {
    let db = database().await;
    let reviews = ReviewRepository::new(&db);

    let created = review_of(&ProductId::new(unique("p")), "4");
    reviews.create(&created).await.expect("create review");

    let liked = reviews.like(&created.id).await.expect("like");
    let liked = reviews.like(&liked.id).await.expect("like again");
    assert_eq!(liked.likes, 2);

    let edited = reviews
        .edit_text(&created.id, &created.user_id, "Even better stewed")
        .await
        .expect("edit own review");
    assert!(edited.edited);
    assert_eq!(edited.text, "Even better stewed");

    // Someone else's id in the filter means the edit matches nothing.
    let err = reviews
        .edit_text(&created.id, &UserId::new(unique("u")), "Hijacked")
        .await
        .expect_err("edit by non-author");
    assert!(matches!(
        err,
        farmgate_server::db::RepositoryError::NotFound
    ));
}

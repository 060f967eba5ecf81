//! Catalog filter normalization.
//!
//! Raw query-string pairs arrive in whatever shape the client framework
//! produced (repeated keys, `category[]` brackets, serialized JSON array
//! fragments). This module flattens them into one canonical [`CatalogFilter`]
//! before any query document is built.

use std::collections::BTreeSet;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use farmgate_core::{Category, GeoPoint, ProductId, SellerId};

use crate::error::ValidationErrors;

/// Canonical catalog filter predicates, one field per dimension.
///
/// An empty `categories` set means no category restriction. Ambiguous
/// category input (the `All` sentinel, tokens outside the closed set,
/// unparseable array fragments) widens to that unrestricted state rather
/// than failing: a buyer who mangles the category picker must still see
/// products.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogFilter {
    /// Case-insensitive substring match on the product name.
    pub name: Option<String>,
    /// Exact product ID.
    pub id: Option<ProductId>,
    /// Exact owning seller.
    pub seller_id: Option<SellerId>,
    /// Category restriction; empty means all categories.
    pub categories: BTreeSet<Category>,
    /// Only products available on or after this instant. Also couples an
    /// ascending availability sort into the final ordering.
    pub available_from: Option<DateTime<Utc>>,
    /// Proximity origin; orders results nearest-first as a side effect.
    pub origin: Option<GeoPoint>,
}

impl CatalogFilter {
    /// Normalize raw query pairs into a filter.
    ///
    /// Pairs with keys this module does not know are ignored, so the same
    /// pair list can carry sort and pagination parameters for their own
    /// normalizers.
    ///
    /// # Errors
    ///
    /// Returns field-keyed [`ValidationErrors`] for unparseable values.
    /// Category tokens are the exception: they widen instead of failing.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self, ValidationErrors>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut filter = Self::default();
        let mut errors = ValidationErrors::new();
        let mut category_tokens: Vec<String> = Vec::new();

        for (key, value) in pairs {
            match key {
                "name" => {
                    let trimmed = value.trim();
                    if !trimmed.is_empty() {
                        filter.name = Some(trimmed.to_owned());
                    }
                }
                "id" => {
                    let trimmed = value.trim();
                    if !trimmed.is_empty() {
                        filter.id = Some(ProductId::from(trimmed));
                    }
                }
                "seller_id" => {
                    let trimmed = value.trim();
                    if !trimmed.is_empty() {
                        filter.seller_id = Some(SellerId::from(trimmed));
                    }
                }
                "category" | "category[]" => collect_category_tokens(value, &mut category_tokens),
                "available_from" => {
                    let trimmed = value.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    match parse_available_from(trimmed) {
                        Some(instant) => filter.available_from = Some(instant),
                        None => errors.add(
                            "available_from",
                            format!("expected an RFC 3339 date-time or YYYY-MM-DD date, got {trimmed:?}"),
                        ),
                    }
                }
                "origin" => {
                    let trimmed = value.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    match GeoPoint::from_str(trimmed) {
                        Ok(point) => filter.origin = Some(point),
                        Err(e) => errors.add("origin", e.to_string()),
                    }
                }
                _ => {}
            }
        }

        filter.categories = resolve_categories(&category_tokens);

        if errors.is_empty() {
            Ok(filter)
        } else {
            Err(errors)
        }
    }
}

/// Split one raw `category` value into individual tokens.
///
/// A value that looks like a JSON array (`["Fresh Fruits","Honey & Preserves"]`)
/// is unpacked; anything else is taken as a single token. A JSON-looking
/// value that fails to parse falls through as a single (unknown, therefore
/// widening) token.
fn collect_category_tokens(value: &str, tokens: &mut Vec<String>) {
    let trimmed = value.trim();
    if trimmed.starts_with('[') {
        if let Ok(parsed) = serde_json::from_str::<Vec<String>>(trimmed) {
            tokens.extend(parsed);
            return;
        }
    }
    tokens.push(trimmed.to_owned());
}

/// Reduce raw category tokens to the canonical set.
///
/// The `All` sentinel, an empty token list, or a list whose every token is
/// outside the closed set all produce the empty (unrestricted) set.
fn resolve_categories(tokens: &[String]) -> BTreeSet<Category> {
    let mut set = BTreeSet::new();
    for token in tokens {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        if token.eq_ignore_ascii_case("all") {
            return BTreeSet::new();
        }
        if let Ok(category) = Category::from_str(token) {
            set.insert(category);
        }
    }
    set
}

/// Parse the availability cutoff, RFC 3339 first, bare date second.
fn parse_available_from(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Some(instant.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
}

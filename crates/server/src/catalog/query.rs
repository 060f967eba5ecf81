//! Catalog query composition.
//!
//! [`CatalogQuery`] is the pure half of the catalog: it turns normalized
//! filter, sort and pagination state into the filter document, sort document
//! and find options the product repository executes. Nothing here touches
//! the database, which is what makes the composition rules testable.

use mongodb::bson::{DateTime as BsonDateTime, Document, doc};
use mongodb::options::FindOptions;

use super::filter::CatalogFilter;
use super::page::PageWindow;
use super::sort::{SortKey, SortSelector};
use crate::error::ValidationErrors;

/// A fully normalized catalog query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogQuery {
    pub filter: CatalogFilter,
    pub sort: SortSelector,
    pub window: PageWindow,
}

impl CatalogQuery {
    /// Normalize a full set of raw query pairs.
    ///
    /// Runs every normalizer even after one fails so the caller gets all
    /// field errors in a single response.
    ///
    /// # Errors
    ///
    /// Returns the merged field-keyed [`ValidationErrors`] of the filter,
    /// sort and pagination normalizers.
    pub fn from_pairs(pairs: &[(String, String)]) -> Result<Self, ValidationErrors> {
        let borrowed = || pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()));
        let mut errors = ValidationErrors::new();

        let filter = CatalogFilter::from_pairs(borrowed()).unwrap_or_else(|e| {
            errors.merge(e);
            CatalogFilter::default()
        });
        let sort = SortSelector::from_pairs(borrowed()).unwrap_or_else(|e| {
            errors.merge(e);
            SortSelector::default()
        });

        let last_of = |key: &str| {
            pairs
                .iter()
                .rev()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };
        let window = PageWindow::from_raw(last_of("page"), last_of("limit")).unwrap_or_else(|e| {
            errors.merge(e);
            PageWindow::Unlimited
        });

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Self {
            filter,
            sort,
            window,
        })
    }

    /// The filter document for the fetch round trip.
    ///
    /// All present predicates are conjoined into one document. With no
    /// predicates this is empty, which matches everything.
    #[must_use]
    pub fn find_filter(&self) -> Document {
        let mut query = self.base_filter();
        if let Some(origin) = self.filter.origin {
            query.insert(
                "collectionPoint",
                doc! {
                    "$near": {
                        "$geometry": {
                            "type": "Point",
                            "coordinates": [origin.longitude, origin.latitude],
                        }
                    }
                },
            );
        }
        query
    }

    /// The filter document for the count round trip.
    ///
    /// `count_documents` rejects `$near`, so the proximity clause is swapped
    /// for its match-equivalent presence test: `$near` returns exactly the
    /// documents that carry an indexed point.
    #[must_use]
    pub fn count_filter(&self) -> Document {
        let mut query = self.base_filter();
        if self.filter.origin.is_some() {
            query.insert("collectionPoint.type", "Point");
        }
        query
    }

    /// Every predicate except proximity.
    fn base_filter(&self) -> Document {
        let mut query = Document::new();
        if let Some(name) = &self.filter.name {
            query.insert(
                "name",
                doc! { "$regex": regex::escape(name), "$options": "i" },
            );
        }
        if let Some(id) = &self.filter.id {
            query.insert("_id", id.as_str());
        }
        if let Some(seller_id) = &self.filter.seller_id {
            query.insert("sellerId", seller_id.as_str());
        }
        if !self.filter.categories.is_empty() {
            let labels: Vec<&str> = self.filter.categories.iter().map(|c| c.label()).collect();
            query.insert("category", doc! { "$in": labels });
        }
        if let Some(cutoff) = self.filter.available_from {
            query.insert(
                "availableFrom",
                doc! { "$gte": BsonDateTime::from_chrono(cutoff) },
            );
        }
        query
    }

    /// The sort document: the requested criterion primary, the
    /// availability coupling (when the filter carries a cutoff) secondary.
    ///
    /// `None` leaves store order, or distance order when the filter has a
    /// proximity clause.
    #[must_use]
    pub fn sort_doc(&self) -> Option<Document> {
        let requested = self.sort.requested().map(|key| match key {
            SortKey::Price(direction) => ("salePrice", direction.as_order()),
            SortKey::Rating(direction) => ("rating", direction.as_order()),
        });
        let availability = self.filter.available_from.map(|_| ("availableFrom", 1));

        if requested.is_none() && availability.is_none() {
            return None;
        }

        let mut sort = Document::new();
        for (field, order) in [requested, availability].into_iter().flatten() {
            sort.insert(field, order);
        }
        Some(sort)
    }

    /// Find options for the fetch round trip: sort plus the pagination
    /// window.
    #[must_use]
    pub fn find_options(&self) -> FindOptions {
        FindOptions::builder()
            .sort(self.sort_doc())
            .skip(self.window.skip())
            .limit(self.window.limit())
            .build()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use mongodb::bson::Bson;

    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    fn query(raw: &[(&str, &str)]) -> CatalogQuery {
        CatalogQuery::from_pairs(&pairs(raw)).unwrap()
    }

    #[test]
    fn test_no_parameters_matches_everything() {
        let q = query(&[]);
        assert_eq!(q.find_filter(), Document::new());
        assert_eq!(q.sort_doc(), None);

        let options = q.find_options();
        assert_eq!(options.skip, None);
        assert_eq!(options.limit, None);
        assert_eq!(options.sort, None);
    }

    #[test]
    fn test_category_page_and_limit_compose() {
        // A first page of twelve fruit products out of fifteen matches.
        let q = query(&[("category", "Fresh Fruits"), ("page", "1"), ("limit", "12")]);

        assert_eq!(
            q.find_filter(),
            doc! { "category": { "$in": ["Fresh Fruits"] } }
        );
        let options = q.find_options();
        assert_eq!(options.skip, Some(0));
        assert_eq!(options.limit, Some(12));
        assert_eq!(q.window.total_pages(15), Some(2));
    }

    #[test]
    fn test_name_substring_is_escaped_and_case_insensitive() {
        let q = query(&[("name", "50% off (crate)")]);
        let filter = q.find_filter();
        let name = filter.get_document("name").unwrap();
        assert_eq!(
            name.get_str("$regex").unwrap(),
            regex::escape("50% off (crate)")
        );
        assert_eq!(name.get_str("$options").unwrap(), "i");
    }

    #[test]
    fn test_id_and_seller_predicates() {
        let q = query(&[("id", "p-3"), ("seller_id", "s-8")]);
        assert_eq!(q.find_filter(), doc! { "_id": "p-3", "sellerId": "s-8" });
    }

    #[test]
    fn test_availability_filter_couples_ascending_sort() {
        let q = query(&[("available_from", "2026-04-01")]);

        let filter = q.find_filter();
        let clause = filter.get_document("availableFrom").unwrap();
        assert!(matches!(clause.get("$gte"), Some(Bson::DateTime(_))));

        assert_eq!(q.sort_doc(), Some(doc! { "availableFrom": 1 }));
    }

    #[test]
    fn test_requested_sort_is_primary_availability_secondary() {
        let q = query(&[("sort_by_price", "desc"), ("available_from", "2026-04-01")]);
        let sort = q.sort_doc().unwrap();
        let keys: Vec<&str> = sort.keys().map(String::as_str).collect();
        assert_eq!(keys, ["salePrice", "availableFrom"]);
        assert_eq!(sort.get_i32("salePrice").unwrap(), -1);
        assert_eq!(sort.get_i32("availableFrom").unwrap(), 1);
    }

    #[test]
    fn test_rating_sort_alone() {
        let q = query(&[("sort_by_rating", "asc")]);
        assert_eq!(q.sort_doc(), Some(doc! { "rating": 1 }));
    }

    #[test]
    fn test_origin_builds_near_clause() {
        let q = query(&[("origin", "-2.59,51.45")]);
        let filter = q.find_filter();
        let geometry = filter
            .get_document("collectionPoint")
            .unwrap()
            .get_document("$near")
            .unwrap()
            .get_document("$geometry")
            .unwrap();
        assert_eq!(geometry.get_str("type").unwrap(), "Point");
        assert_eq!(
            geometry.get_array("coordinates").unwrap(),
            &vec![Bson::Double(-2.59), Bson::Double(51.45)]
        );
    }

    #[test]
    fn test_count_filter_swaps_near_for_presence() {
        let q = query(&[("origin", "-2.59,51.45"), ("category", "Fresh Fruits")]);
        let count = q.count_filter();
        assert!(!count.contains_key("collectionPoint"));
        assert_eq!(count.get_str("collectionPoint.type").unwrap(), "Point");
        assert!(count.contains_key("category"));
    }

    #[test]
    fn test_count_filter_matches_find_filter_without_origin() {
        let q = query(&[("name", "plums"), ("category", "Fresh Fruits")]);
        assert_eq!(q.count_filter(), q.find_filter());
    }

    #[test]
    fn test_last_page_and_limit_pairs_win() {
        let q = query(&[("page", "1"), ("page", "4"), ("limit", "10")]);
        assert_eq!(q.window, PageWindow::Bounded { page: 4, limit: 10 });
    }

    #[test]
    fn test_errors_merge_across_normalizers() {
        let raw = pairs(&[
            ("origin", "somewhere west"),
            ("sort_by_price", "upwards"),
            ("page", "first"),
        ]);
        let err = CatalogQuery::from_pairs(&raw).unwrap_err();
        let fields: Vec<&str> = err.fields().collect();
        assert!(fields.contains(&"origin"));
        assert!(fields.contains(&"sort_by_price"));
        assert!(fields.contains(&"page"));
    }
}

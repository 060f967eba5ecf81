//! Catalog query subsystem.
//!
//! Turning a raw catalog request into store round trips happens in three
//! pure stages, then one executing stage:
//!
//! 1. [`filter::CatalogFilter`] normalizes the filter dimensions.
//! 2. [`sort::SortSelector`] picks the single honored sort criterion.
//! 3. [`page::PageWindow`] validates and clamps the pagination window.
//! 4. [`query::CatalogQuery`] composes the three into filter/sort/options
//!    documents, which `db::products` executes.

pub mod filter;
pub mod page;
pub mod query;
pub mod sort;

pub use filter::CatalogFilter;
pub use page::PageWindow;
pub use query::CatalogQuery;
pub use sort::{SortDirection, SortKey, SortSelector};

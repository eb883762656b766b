pub mod client;
pub mod mapping;
pub mod search;

use crate::error::LookupError;
use crate::model::{LookupOutcome, Product};
use std::future::Future;

pub use client::CatalogClient;
pub use search::{SearchParams, SortKey};

/// Catalog search as seen by consumers that only need to query, not look up.
pub trait ProductSearch: Send + Sync {
    fn search(
        &self,
        params: &SearchParams,
    ) -> impl Future<Output = Result<Vec<Product>, LookupError>> + Send;
}

/// Lookup of a single product by barcode.
pub trait ProductLookup: Send + Sync {
    fn fetch_by_code(
        &self,
        code: &str,
    ) -> impl Future<Output = Result<LookupOutcome, LookupError>> + Send;
}

use super::mapping::{decode_lookup_body, decode_search_body};
use super::search::{build_product_url, build_search_url, SearchParams};
use super::{ProductLookup, ProductSearch};
use crate::error::LookupError;
use crate::model::{LookupOutcome, Product};
use reqwest::{Client, StatusCode};

pub const DEFAULT_CATALOG_URL: &str = "https://world.openfoodfacts.org";

#[derive(Debug, Clone)]
pub struct CatalogClient {
    base_url: String,
    client: Client,
}

impl CatalogClient {
    pub fn new(base_url: &str, user_agent: &str) -> Result<Self, LookupError> {
        let client = Client::builder().user_agent(user_agent).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Look up one product by its decoded barcode.
    pub async fn fetch_by_code(&self, code: &str) -> Result<LookupOutcome, LookupError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(LookupError::InvalidCode);
        }

        let url = build_product_url(&self.base_url, code)?;
        tracing::info!("Looking up product {}", code);

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();

        // Unknown codes come back as 404 with a regular JSON body (status: 0).
        if !status.is_success() && status != StatusCode::NOT_FOUND {
            return Err(LookupError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        let outcome = decode_lookup_body(&body, code)?;

        match &outcome {
            LookupOutcome::Found(product) => {
                tracing::debug!("Found {} ({})", product.name, product.code)
            }
            LookupOutcome::NotFound { code } => tracing::info!("Product {} not found", code),
        }
        Ok(outcome)
    }

    /// Run a catalog search. Results come back in server order; filtering is the
    /// classifier's job.
    pub async fn search(&self, params: &SearchParams) -> Result<Vec<Product>, LookupError> {
        let url = build_search_url(&self.base_url, params)?;
        tracing::info!("Searching catalog: {}", url);

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        let products = decode_search_body(&body)?;
        tracing::debug!("Search returned {} products", products.len());
        Ok(products)
    }
}

impl ProductLookup for CatalogClient {
    async fn fetch_by_code(&self, code: &str) -> Result<LookupOutcome, LookupError> {
        CatalogClient::fetch_by_code(self, code).await
    }
}

impl ProductSearch for CatalogClient {
    async fn search(&self, params: &SearchParams) -> Result<Vec<Product>, LookupError> {
        CatalogClient::search(self, params).await
    }
}

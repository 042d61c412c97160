//! HTTP implementation of the product repository.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, error, instrument};

use crate::config::CatalogApiConfig;
use crate::error::{ProductError, ProductResult};
use crate::models::{FinancialProduct, NewFinancialProduct, ProductFields, ProductsEnvelope};
use crate::repository::FinancialProductRepository;

/// Repository backed by the `/bp/products` REST endpoint
#[derive(Clone)]
pub struct HttpProductRepository {
    config: CatalogApiConfig,
    client: Client,
}

impl HttpProductRepository {
    pub fn new(config: CatalogApiConfig) -> ProductResult<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    /// Use a preconfigured client (shared connection pool, custom TLS, ...)
    pub fn with_client(config: CatalogApiConfig, client: Client) -> Self {
        Self { config, client }
    }

    pub fn config(&self) -> &CatalogApiConfig {
        &self.config
    }

    /// Turn non-2xx answers into transport errors, keeping the body for the log
    async fn check(response: Response) -> ProductResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        error!(status = %status, body = %body, "Catalog endpoint returned an error");

        Err(ProductError::Transport {
            status: Some(status.as_u16()),
            message: status
                .canonical_reason()
                .unwrap_or("Unexpected status")
                .to_string(),
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> ProductResult<T> {
        let bytes = Self::check(response).await?.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl FinancialProductRepository for HttpProductRepository {
    #[instrument(skip(self), fields(url = %self.config.products_url()))]
    async fn list(&self) -> ProductResult<Vec<FinancialProduct>> {
        let response = self.client.get(self.config.products_url()).send().await?;
        let envelope: ProductsEnvelope = Self::decode(response).await?;

        debug!(count = envelope.data.len(), "Fetched financial products");
        Ok(envelope.data)
    }

    #[instrument(skip(self, input), fields(product_id = %input.id))]
    async fn create(&self, input: NewFinancialProduct) -> ProductResult<FinancialProduct> {
        let response = self
            .client
            .post(self.config.products_url())
            .json(&input)
            .send()
            .await?;

        Self::decode(response).await
    }

    #[instrument(skip(self, fields))]
    async fn update(&self, id: &str, fields: ProductFields) -> ProductResult<FinancialProduct> {
        let response = self
            .client
            .put(self.config.product_url(id)?)
            .json(&fields)
            .send()
            .await?;

        Self::decode(response).await
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> ProductResult<()> {
        let response = self
            .client
            .delete(self.config.product_url(id)?)
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }
}

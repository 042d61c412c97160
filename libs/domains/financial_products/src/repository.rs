use async_trait::async_trait;

use crate::error::ProductResult;
use crate::models::{FinancialProduct, NewFinancialProduct, ProductFields};

/// Repository trait for the remote product catalog
///
/// The remote store is the authority on identity and uniqueness; implementations
/// only move records across the boundary.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FinancialProductRepository: Send + Sync {
    /// Fetch the whole catalog
    async fn list(&self) -> ProductResult<Vec<FinancialProduct>>;

    /// Create a product
    async fn create(&self, input: NewFinancialProduct) -> ProductResult<FinancialProduct>;

    /// Replace the editable fields of a product
    async fn update(&self, id: &str, fields: ProductFields) -> ProductResult<FinancialProduct>;

    /// Delete a product by ID
    async fn delete(&self, id: &str) -> ProductResult<()>;
}

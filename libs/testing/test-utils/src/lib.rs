//! Shared test utilities for the financial products domain
//!
//! This crate provides reusable test infrastructure:
//! - `TestDataBuilder`: Deterministic product and form fixtures
//! - `sample_catalog`: The three-product catalog used across scenarios
//! - `InMemoryProductRepository`: Repository with call counting and failure injection
//! - `GatedProductRepository`: Repository whose calls complete when the test says so
//! - `assertions::assert_ids`: Compare product ids with context on failure
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_financial_products::{FilterStore, ListProjectionEngine, PaginationStore};
//! use test_utils::{InMemoryProductRepository, TestDataBuilder};
//!
//! #[tokio::test]
//! async fn my_engine_test() {
//!     let builder = TestDataBuilder::from_test_name("my_engine_test");
//!     let repository = InMemoryProductRepository::with_products(builder.products(12));
//!     let engine = ListProjectionEngine::new(repository, FilterStore::new(), PaginationStore::new());
//!
//!     engine.reload().await;
//!     assert_eq!(engine.snapshot().displayed.len(), 5);
//! }
//! ```

mod repository;

pub use repository::{GatedProductRepository, InMemoryProductRepository};

use chrono::{Days, NaiveDate};
use domain_financial_products::dates;
use domain_financial_products::{FinancialProduct, ProductField, ProductForm};

/// Builder for test data with deterministic randomization
///
/// This ensures tests are reproducible by using seeded data.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    /// Create a new builder with a seed (for deterministic tests)
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Create from test name (generates seed from test name hash)
    ///
    /// This is the recommended way to create a builder for consistent test data.
    ///
    /// # Example
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::from_test_name("test_search_resets_page");
    /// ```
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// Product id that passes the form rules (3 to 10 characters)
    pub fn product_id(&self, index: usize) -> String {
        format!("t{:03}-{}", self.seed % 1000, index)
    }

    /// Release date derived from the seed, within 2025
    pub fn release_date(&self) -> NaiveDate {
        let base = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default();
        base.checked_add_days(Days::new(self.seed % 365))
            .unwrap_or(base)
    }

    pub fn product(&self, index: usize) -> FinancialProduct {
        let date_release = self.release_date();
        FinancialProduct {
            id: self.product_id(index),
            name: format!("Producto {}", index),
            description: format!("Producto financiero de prueba número {}", index),
            logo: format!("https://example.com/logos/{}.png", index),
            date_release,
            date_revision: dates::default_revision_date(date_release).unwrap_or(date_release),
        }
    }

    /// `count` products with ids `product_id(0)` to `product_id(count - 1)`
    pub fn products(&self, count: usize) -> Vec<FinancialProduct> {
        (0..count).map(|index| self.product(index)).collect()
    }

    /// A create form that passes validation
    pub fn form(&self, index: usize) -> ProductForm {
        let product = self.product(index);
        let mut form = ProductForm::new();
        form.set_value(ProductField::Id, product.id);
        form.set_value(ProductField::Name, product.name);
        form.set_value(ProductField::Description, product.description);
        form.set_value(ProductField::Logo, product.logo);
        form.on_release_date_change(dates::to_input(product.date_release));
        form
    }
}

/// The three-product catalog: a credit card, a savings account and a loan
pub fn sample_catalog() -> Vec<FinancialProduct> {
    let release = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default();
    let revision = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap_or_default();
    let product = |id: &str, name: &str, description: &str| FinancialProduct {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        logo: format!("https://example.com/logos/{}.png", id),
        date_release: release,
        date_revision: revision,
    };

    vec![
        product(
            "product-1",
            "Tarjeta de Crédito",
            "Tarjeta de consumo bajo la modalidad de crédito",
        ),
        product(
            "product-2",
            "Cuenta de Ahorros",
            "Cuenta con rendimiento mensual",
        ),
        product(
            "product-3",
            "Préstamo Personal",
            "Préstamo de libre inversión",
        ),
    ]
}

/// Test assertion helpers
pub mod assertions {
    use domain_financial_products::FinancialProduct;

    /// Assert the ids of `products`, in order, with a nice error message
    pub fn assert_ids(products: &[FinancialProduct], expected: &[&str], context: &str) {
        let actual: Vec<&str> = products.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(
            actual, expected,
            "{}: expected ids {:?}, got {:?}",
            context, expected, actual
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_builder_deterministic() {
        let builder1 = TestDataBuilder::new(42);
        let builder2 = TestDataBuilder::new(42);

        assert_eq!(builder1.products(3), builder2.products(3));
        assert_eq!(builder1.form(1), builder2.form(1));
    }

    #[test]
    fn test_data_builder_from_name() {
        let builder1 = TestDataBuilder::from_test_name("my_test");
        let builder2 = TestDataBuilder::from_test_name("my_test");

        assert_eq!(builder1.product_id(1), builder2.product_id(1));
    }

    #[test]
    fn test_data_builder_different_names() {
        let builder1 = TestDataBuilder::from_test_name("test1");
        let builder2 = TestDataBuilder::from_test_name("test2");

        // Different test names should generate different data
        assert_ne!(builder1.product(0), builder2.product(0));
    }

    #[test]
    fn test_built_forms_are_valid() {
        let builder = TestDataBuilder::new(u64::MAX);
        for index in [0, 9, 12345] {
            let form = builder.form(index);
            assert!(form.is_valid(), "form {}: {}", index, form.errors());
        }
    }

    #[test]
    fn test_sample_catalog_ids() {
        assertions::assert_ids(
            &sample_catalog(),
            &["product-1", "product-2", "product-3"],
            "sample catalog",
        );
    }
}

//! Financial Products Domain
//!
//! Reactive list state for a catalog of financial products: search, pagination,
//! the projected page to render, and single-flight mutations against a remote
//! catalog API.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐ ┌─────────────────┐
//! │ FilterStore │ │ PaginationStore │  ← Observable criteria / window
//! └──────┬──────┘ └────────┬────────┘
//!        │                 │
//! ┌──────▼─────────────────▼──────┐
//! │     ListProjectionEngine      │  ← filter → count → slice
//! └──────┬─────────────────▲──────┘
//!        │                 │ reload
//! ┌──────▼──────┐   ┌──────┴──────────────┐
//! │ Repository  │◄──│ MutationCoordinator │  ← single-flight create/update/delete
//! └──────┬──────┘   └─────────────────────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Products, criteria, windows
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_financial_products::{
//!     CatalogApiConfig, FilterStore, HttpProductRepository, ListProjectionEngine,
//!     PaginationStore,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let repository = HttpProductRepository::new(CatalogApiConfig::default())?;
//! let engine = ListProjectionEngine::new(repository, FilterStore::new(), PaginationStore::new());
//!
//! let _binding = engine.bind();
//! engine.reload().await;
//! engine.search("tarjeta");
//! println!("{}", engine.results_text());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dates;
pub mod error;
pub mod filter;
pub mod form;
pub mod http;
pub mod menu;
pub mod models;
pub mod mutation;
pub mod pagination;
pub mod projection;
pub mod repository;

// Re-export commonly used types
pub use config::CatalogApiConfig;
pub use error::{ProductError, ProductResult, LOAD_ERROR_MESSAGE};
pub use filter::FilterStore;
pub use form::{FieldError, FormErrors, ProductField, ProductForm, ValidatedProduct};
pub use http::HttpProductRepository;
pub use menu::ActionMenu;
pub use models::{
    FilterStats, FinancialProduct, MutationKind, MutationMode, NewFinancialProduct,
    PaginationPatch, PaginationWindow, PendingMutation, ProductFields, SearchCriteria,
    DEFAULT_ITEMS_PER_PAGE, ITEMS_PER_PAGE_OPTIONS,
};
pub use mutation::MutationCoordinator;
pub use pagination::PaginationStore;
pub use projection::{
    ListProjectionEngine, LoadStatus, ProjectionBinding, ProjectionResult, ProjectionState,
    ReloadOutcome,
};
pub use repository::FinancialProductRepository;

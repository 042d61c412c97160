//! Search criteria store and the matching rule.

use std::sync::Arc;

use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::trace;

use crate::models::{FilterStats, FinancialProduct, SearchCriteria};

/// Holds the current search criteria and publishes every change.
///
/// Clones share the same criteria.
#[derive(Clone)]
pub struct FilterStore {
    criteria: Arc<watch::Sender<SearchCriteria>>,
}

impl FilterStore {
    pub fn new() -> Self {
        let (criteria, _) = watch::channel(SearchCriteria::default());
        Self {
            criteria: Arc::new(criteria),
        }
    }

    /// Replace the search term and emit the new criteria
    pub fn update_search_term(&self, term: impl Into<String>) {
        let criteria = SearchCriteria::new(term);
        trace!(search_term = %criteria.search_term, "Search criteria updated");
        self.criteria.send_replace(criteria);
    }

    /// Reset to the empty term and emit
    pub fn clear(&self) {
        self.criteria.send_replace(SearchCriteria::default());
    }

    pub fn current(&self) -> SearchCriteria {
        self.criteria.borrow().clone()
    }

    /// Stream of criteria snapshots, starting with the current one
    pub fn changes(&self) -> WatchStream<SearchCriteria> {
        WatchStream::new(self.criteria.subscribe())
    }

    pub fn has_active_filters(&self) -> bool {
        self.criteria.borrow().is_active()
    }

    /// Filter `products` with `criteria`, or with the current criteria when `None`
    pub fn apply_filters(
        &self,
        products: &[FinancialProduct],
        criteria: Option<&SearchCriteria>,
    ) -> Vec<FinancialProduct> {
        match criteria {
            Some(criteria) => apply_filters(products, criteria),
            None => apply_filters(products, &self.current()),
        }
    }

    pub fn filter_stats(&self, original_count: usize, filtered_count: usize) -> FilterStats {
        FilterStats {
            original_count,
            filtered_count,
            is_filtered: original_count != filtered_count,
        }
    }
}

impl Default for FilterStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether `product` matches `criteria`.
///
/// An empty (or all-whitespace) term matches everything; otherwise the trimmed,
/// lower-cased term must occur in the name, the description or the id.
pub fn matches_search_term(product: &FinancialProduct, criteria: &SearchCriteria) -> bool {
    contains_term(product, &criteria.normalized_term())
}

pub fn apply_filters(
    products: &[FinancialProduct],
    criteria: &SearchCriteria,
) -> Vec<FinancialProduct> {
    let term = criteria.normalized_term();
    products
        .iter()
        .filter(|product| contains_term(product, &term))
        .cloned()
        .collect()
}

// `term` is already trimmed and lower-cased
fn contains_term(product: &FinancialProduct, term: &str) -> bool {
    term.is_empty()
        || [&product.name, &product.description, &product.id]
            .iter()
            .any(|field| field.to_lowercase().contains(term))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tokio_stream::StreamExt;

    fn product(id: &str, name: &str, description: &str) -> FinancialProduct {
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        FinancialProduct {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            logo: "logo.png".to_string(),
            date_release: date,
            date_revision: date,
        }
    }

    fn catalog() -> Vec<FinancialProduct> {
        vec![
            product("product-1", "Tarjeta de Crédito", "Tarjeta de consumo"),
            product("product-2", "Cuenta de Ahorros", "Cuenta con rendimiento"),
            product("product-3", "Préstamo Personal", "Crédito de libre inversión"),
        ]
    }

    fn ids(products: &[FinancialProduct]) -> Vec<&str> {
        products.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_term_is_case_insensitive() {
        let filtered = apply_filters(&catalog(), &SearchCriteria::new("TARJETA"));
        assert_eq!(ids(&filtered), vec!["product-1"]);
    }

    #[test]
    fn test_term_matches_description_and_id() {
        let by_description = apply_filters(&catalog(), &SearchCriteria::new("rendimiento"));
        assert_eq!(ids(&by_description), vec!["product-2"]);

        let by_id = apply_filters(&catalog(), &SearchCriteria::new("PRODUCT-3"));
        assert_eq!(ids(&by_id), vec!["product-3"]);

        // "crédito" appears in a name and in another description
        let shared = apply_filters(&catalog(), &SearchCriteria::new("crédito"));
        assert_eq!(ids(&shared), vec!["product-1", "product-3"]);
    }

    #[test]
    fn test_blank_term_matches_everything() {
        for term in ["", "   ", "\t"] {
            let filtered = apply_filters(&catalog(), &SearchCriteria::new(term));
            assert_eq!(filtered.len(), 3, "term {:?}", term);
        }
    }

    #[test]
    fn test_term_is_trimmed_at_match_time() {
        let filtered = apply_filters(&catalog(), &SearchCriteria::new("  ahorros  "));
        assert_eq!(ids(&filtered), vec!["product-2"]);
    }

    #[test]
    fn test_filtering_is_idempotent() {
        let criteria = SearchCriteria::new("cuenta");
        let once = apply_filters(&catalog(), &criteria);
        let twice = apply_filters(&once, &criteria);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_matches_agrees_with_apply() {
        let criteria = SearchCriteria::new("per");
        for product in catalog() {
            let kept = apply_filters(std::slice::from_ref(&product), &criteria);
            assert_eq!(matches_search_term(&product, &criteria), kept.len() == 1);
        }
    }

    #[test]
    fn test_store_keeps_original_casing() {
        let store = FilterStore::new();
        store.update_search_term("  TarJeta ");

        assert_eq!(store.current().search_term, "  TarJeta ");
        assert!(store.has_active_filters());

        store.clear();
        assert_eq!(store.current(), SearchCriteria::default());
        assert!(!store.has_active_filters());
    }

    #[test]
    fn test_whitespace_term_is_not_active() {
        let store = FilterStore::new();
        store.update_search_term("   ");
        assert!(!store.has_active_filters());
    }

    #[test]
    fn test_store_applies_current_criteria() {
        let store = FilterStore::new();
        store.update_search_term("préstamo");

        assert_eq!(ids(&store.apply_filters(&catalog(), None)), vec!["product-3"]);
        assert_eq!(
            store
                .apply_filters(&catalog(), Some(&SearchCriteria::default()))
                .len(),
            3
        );
    }

    #[test]
    fn test_filter_stats() {
        let store = FilterStore::new();
        assert_eq!(
            store.filter_stats(3, 1),
            FilterStats {
                original_count: 3,
                filtered_count: 1,
                is_filtered: true,
            }
        );
        assert!(!store.filter_stats(3, 3).is_filtered);
    }

    #[tokio::test]
    async fn test_changes_replay_current_value() {
        let store = FilterStore::new();
        store.update_search_term("cuenta");

        let mut changes = store.changes();
        assert_eq!(changes.next().await.unwrap().search_term, "cuenta");

        store.update_search_term("tarjeta");
        assert_eq!(changes.next().await.unwrap().search_term, "tarjeta");
    }

    #[tokio::test]
    async fn test_changes_are_restartable() {
        let store = FilterStore::new();
        let first = store.changes();
        drop(first);

        store.update_search_term("ahorros");
        let mut second = store.changes();
        assert_eq!(second.next().await.unwrap().search_term, "ahorros");
    }
}

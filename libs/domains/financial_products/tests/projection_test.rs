//! Engine behaviour across async boundaries: bindings and competing reloads.

use std::sync::Arc;
use std::time::Duration;

use domain_financial_products::{
    FilterStore, ListProjectionEngine, LoadStatus, PaginationPatch, PaginationStore,
    ProductError, ReloadOutcome,
};
use test_utils::assertions::assert_ids;
use test_utils::{sample_catalog, GatedProductRepository, InMemoryProductRepository, TestDataBuilder};
use tokio::time::timeout;

fn engine_over(
    repository: InMemoryProductRepository,
) -> ListProjectionEngine<InMemoryProductRepository> {
    ListProjectionEngine::new(repository, FilterStore::new(), PaginationStore::new())
}

/// Wait until the projection satisfies `done`
async fn settle<R, F>(engine: &ListProjectionEngine<R>, done: F)
where
    R: domain_financial_products::FinancialProductRepository,
    F: Fn(&domain_financial_products::ProjectionState) -> bool,
{
    let mut receiver = engine.subscribe();
    timeout(Duration::from_secs(2), receiver.wait_for(|state| done(state)))
        .await
        .expect("projection did not settle")
        .expect("engine dropped");
}

#[tokio::test]
async fn test_bound_engine_follows_store_writes() {
    let engine = engine_over(InMemoryProductRepository::with_products(sample_catalog()));
    let binding = engine.bind();
    engine.reload().await;

    // Written straight to the store, not through the engine
    engine.filters().update_search_term("TARJETA");
    settle(&engine, |state| state.filtered.len() == 1).await;

    assert_ids(&engine.snapshot().displayed, &["product-1"], "search");
    let window = engine.pagination().current();
    assert_eq!(window.total_items, 1);
    assert_eq!(window.current_page, 1);

    binding.release().await;
}

#[tokio::test]
async fn test_bound_engine_reslices_on_window_change() {
    let engine = engine_over(InMemoryProductRepository::with_products(sample_catalog()));
    let binding = engine.bind();
    engine.reload().await;

    engine
        .pagination()
        .update(PaginationPatch::page(2).with_items_per_page(2));
    settle(&engine, |state| state.displayed.len() == 1).await;

    assert_ids(&engine.snapshot().displayed, &["product-3"], "second page");
    // Navigation is not undone by the binding
    assert_eq!(engine.pagination().current().current_page, 2);

    drop(binding);
}

#[tokio::test]
async fn test_navigation_survives_redundant_criteria() {
    let builder = TestDataBuilder::from_test_name("test_navigation_survives_redundant_criteria");
    let engine = engine_over(InMemoryProductRepository::with_products(builder.products(12)));
    let binding = engine.bind();
    engine.reload().await;

    engine.search("producto");
    engine.next_page();
    engine.next_page();
    assert_eq!(engine.pagination().current().current_page, 3);

    // Same criteria again: no reset to page 1
    engine.filters().update_search_term("producto");
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(engine.pagination().current().current_page, 3);
    assert_eq!(engine.snapshot().displayed.len(), 2);

    binding.release().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_navigation_survives_binding_on_another_worker() {
    let builder = TestDataBuilder::from_test_name("test_navigation_survives_binding_on_another_worker");
    let catalog = builder.products(12);

    for round in 0..500 {
        let engine = engine_over(InMemoryProductRepository::with_products(catalog.clone()));
        let binding = engine.bind();
        engine.reload().await;

        // The binding task may handle this search concurrently on the other worker
        engine.search("producto");
        engine.next_page();
        engine.next_page();
        tokio::time::sleep(Duration::from_millis(2)).await;

        assert_eq!(engine.pagination().current().current_page, 3, "round {}", round);
        assert_eq!(engine.snapshot().displayed.len(), 2, "round {}", round);
        binding.release().await;
    }
}

#[tokio::test]
async fn test_released_binding_stops_recomputing() {
    let engine = engine_over(InMemoryProductRepository::with_products(sample_catalog()));
    let binding = engine.bind();
    engine.reload().await;
    assert!(binding.is_active());

    binding.release().await;

    engine.filters().update_search_term("préstamo");
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(engine.snapshot().filtered.len(), 3);
}

#[tokio::test]
async fn test_last_started_reload_wins() {
    let engine = ListProjectionEngine::new(
        GatedProductRepository::new(),
        FilterStore::new(),
        PaginationStore::new(),
    );
    let gate = engine.repository();
    let builder = TestDataBuilder::new(7);

    let first = tokio::spawn({
        let engine = engine.clone();
        async move { engine.reload().await }
    });
    gate.wait_for_list_calls(1).await;

    let second = tokio::spawn({
        let engine = engine.clone();
        async move { engine.reload().await }
    });
    gate.wait_for_list_calls(2).await;

    // Newer response first, older one last
    gate.resolve_list(1, Ok(sample_catalog()));
    assert_eq!(second.await.unwrap(), ReloadOutcome::Loaded { count: 3 });

    gate.resolve_list(0, Ok(builder.products(8)));
    assert_eq!(first.await.unwrap(), ReloadOutcome::Superseded);

    assert_eq!(engine.status(), LoadStatus::Ready);
    assert_eq!(engine.raw_records().as_slice(), sample_catalog().as_slice());
}

#[tokio::test]
async fn test_stale_failure_is_ignored() {
    let engine = ListProjectionEngine::new(
        GatedProductRepository::new(),
        FilterStore::new(),
        PaginationStore::new(),
    );
    let gate = engine.repository();

    let first = tokio::spawn({
        let engine = engine.clone();
        async move { engine.reload().await }
    });
    gate.wait_for_list_calls(1).await;
    let second = tokio::spawn({
        let engine = engine.clone();
        async move { engine.reload().await }
    });
    gate.wait_for_list_calls(2).await;

    gate.resolve_list(1, Ok(sample_catalog()));
    second.await.unwrap();
    gate.resolve_list(0, Err(ProductError::transport("timed out")));
    assert_eq!(first.await.unwrap(), ReloadOutcome::Superseded);

    assert_eq!(engine.status(), LoadStatus::Ready);
    assert_eq!(engine.snapshot().error_message, "");
}

#[tokio::test]
async fn test_teardown_discards_in_flight_reload() {
    let engine = ListProjectionEngine::new(
        GatedProductRepository::new(),
        FilterStore::new(),
        PaginationStore::new(),
    );
    let gate: Arc<GatedProductRepository> = engine.repository();
    let binding = engine.bind();

    let reload = tokio::spawn({
        let engine = engine.clone();
        async move { engine.reload().await }
    });
    gate.wait_for_list_calls(1).await;

    drop(binding);
    gate.resolve_list(0, Ok(sample_catalog()));

    assert_eq!(reload.await.unwrap(), ReloadOutcome::Superseded);
    assert!(engine.raw_records().is_empty());
}

#[tokio::test]
async fn test_reload_after_failure_recovers() {
    let repository = InMemoryProductRepository::with_products(sample_catalog());
    repository.fail_lists(true);
    let engine = engine_over(repository);

    assert_eq!(engine.reload().await, ReloadOutcome::Failed);
    assert!(engine.snapshot().displayed.is_empty());

    engine.repository().fail_lists(false);
    assert_eq!(engine.reload().await, ReloadOutcome::Loaded { count: 3 });
    assert_eq!(engine.snapshot().error_message, "");
    assert_eq!(engine.repository().list_calls(), 2);
}

#[tokio::test]
async fn test_page_size_change_keeps_page_in_range() {
    let builder = TestDataBuilder::from_test_name("test_page_size_change_keeps_page_in_range");
    let engine = engine_over(InMemoryProductRepository::with_products(builder.products(23)));
    engine.reload().await;

    for _ in 0..4 {
        engine.next_page();
    }
    assert_eq!(engine.pagination().current().current_page, 5);

    for size in [20, 10, 5] {
        engine.set_items_per_page(size);
        let window = engine.pagination().current();
        assert_eq!(window.current_page, 1, "size {}", size);
        assert!(window.current_page <= engine.total_pages());
        assert_eq!(engine.snapshot().displayed.len(), size.min(23));
    }
}

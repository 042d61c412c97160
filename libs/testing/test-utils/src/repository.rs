//! Repository doubles for engine and coordinator tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use domain_financial_products::{
    FinancialProduct, FinancialProductRepository, NewFinancialProduct, ProductError,
    ProductFields, ProductResult,
};
use tokio::sync::{oneshot, watch};
use tracing::debug;

fn server_error() -> ProductError {
    ProductError::Transport {
        status: Some(500),
        message: "Internal Server Error".to_string(),
    }
}

fn not_found(id: &str) -> ProductError {
    ProductError::Transport {
        status: Some(404),
        message: format!("Product {} not found", id),
    }
}

/// In-memory catalog that behaves like the remote API.
///
/// Counts every call, and fails on demand with a 500.
#[derive(Default)]
pub struct InMemoryProductRepository {
    products: Mutex<Vec<FinancialProduct>>,
    fail_lists: AtomicBool,
    fail_mutations: AtomicBool,
    list_calls: AtomicUsize,
    create_calls: AtomicUsize,
    update_calls: AtomicUsize,
    delete_calls: AtomicUsize,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(products: Vec<FinancialProduct>) -> Self {
        Self {
            products: Mutex::new(products),
            ..Default::default()
        }
    }

    pub fn set_products(&self, products: Vec<FinancialProduct>) {
        *self.products.lock().unwrap() = products;
    }

    pub fn products(&self) -> Vec<FinancialProduct> {
        self.products.lock().unwrap().clone()
    }

    /// Make every following `list` call fail (or succeed again)
    pub fn fail_lists(&self, fail: bool) {
        self.fail_lists.store(fail, Ordering::SeqCst);
    }

    /// Make every following create/update/delete fail (or succeed again)
    pub fn fail_mutations(&self, fail: bool) {
        self.fail_mutations.store(fail, Ordering::SeqCst);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    fn mutation_allowed(&self) -> ProductResult<()> {
        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(server_error());
        }
        Ok(())
    }
}

#[async_trait]
impl FinancialProductRepository for InMemoryProductRepository {
    async fn list(&self) -> ProductResult<Vec<FinancialProduct>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_lists.load(Ordering::SeqCst) {
            return Err(server_error());
        }
        Ok(self.products())
    }

    async fn create(&self, input: NewFinancialProduct) -> ProductResult<FinancialProduct> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.mutation_allowed()?;

        let mut products = self.products.lock().unwrap();
        if products.iter().any(|p| p.id == input.id) {
            return Err(ProductError::Transport {
                status: Some(400),
                message: format!("Product {} already exists", input.id),
            });
        }
        let product = FinancialProduct::from(input);
        products.push(product.clone());
        Ok(product)
    }

    async fn update(&self, id: &str, fields: ProductFields) -> ProductResult<FinancialProduct> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        self.mutation_allowed()?;

        let mut products = self.products.lock().unwrap();
        let product = products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| not_found(id))?;
        *product = FinancialProduct::from_parts(id, fields);
        Ok(product.clone())
    }

    async fn delete(&self, id: &str) -> ProductResult<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.mutation_allowed()?;

        let mut products = self.products.lock().unwrap();
        let before = products.len();
        products.retain(|p| p.id != id);
        if products.len() == before {
            return Err(not_found(id));
        }
        Ok(())
    }
}

/// Calls parked until the test resolves them
struct Gate<T> {
    pending: Mutex<Vec<Option<oneshot::Sender<ProductResult<T>>>>>,
    arrived: watch::Sender<usize>,
}

impl<T> Gate<T> {
    fn new() -> Self {
        let (arrived, _) = watch::channel(0);
        Self {
            pending: Mutex::new(Vec::new()),
            arrived,
        }
    }

    async fn enter(&self, operation: &str) -> ProductResult<T> {
        let (tx, rx) = oneshot::channel();
        let call = {
            let mut pending = self.pending.lock().unwrap();
            pending.push(Some(tx));
            pending.len() - 1
        };
        self.arrived.send_modify(|count| *count += 1);
        debug!(operation, call, "Gated call parked");

        rx.await
            .unwrap_or_else(|_| Err(ProductError::transport("gate dropped")))
    }

    async fn wait_for(&self, calls: usize) {
        let mut arrived = self.arrived.subscribe();
        let _ = arrived.wait_for(|count| *count >= calls).await;
    }

    fn resolve(&self, call: usize, result: ProductResult<T>) {
        let tx = self
            .pending
            .lock()
            .unwrap()
            .get_mut(call)
            .and_then(Option::take)
            .unwrap_or_else(|| panic!("no parked call #{}", call));
        // The caller may already be gone (dropped future)
        let _ = tx.send(result);
    }

    fn calls(&self) -> usize {
        *self.arrived.borrow()
    }
}

/// Repository whose `list` and `create` calls wait for the test to resolve
/// them, in any order. Calls are numbered from 0 in arrival order.
///
/// `update` and `delete` complete immediately.
pub struct GatedProductRepository {
    lists: Gate<Vec<FinancialProduct>>,
    creates: Gate<FinancialProduct>,
}

impl GatedProductRepository {
    pub fn new() -> Self {
        Self {
            lists: Gate::new(),
            creates: Gate::new(),
        }
    }

    pub fn list_calls(&self) -> usize {
        self.lists.calls()
    }

    pub fn create_calls(&self) -> usize {
        self.creates.calls()
    }

    /// Wait until at least `calls` list calls are parked
    pub async fn wait_for_list_calls(&self, calls: usize) {
        self.lists.wait_for(calls).await;
    }

    pub async fn wait_for_create_calls(&self, calls: usize) {
        self.creates.wait_for(calls).await;
    }

    /// Complete list call number `call` with `result`
    pub fn resolve_list(&self, call: usize, result: ProductResult<Vec<FinancialProduct>>) {
        self.lists.resolve(call, result);
    }

    pub fn resolve_create(&self, call: usize, result: ProductResult<FinancialProduct>) {
        self.creates.resolve(call, result);
    }
}

impl Default for GatedProductRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FinancialProductRepository for GatedProductRepository {
    async fn list(&self) -> ProductResult<Vec<FinancialProduct>> {
        self.lists.enter("list").await
    }

    async fn create(&self, _input: NewFinancialProduct) -> ProductResult<FinancialProduct> {
        self.creates.enter("create").await
    }

    async fn update(&self, id: &str, fields: ProductFields) -> ProductResult<FinancialProduct> {
        Ok(FinancialProduct::from_parts(id, fields))
    }

    async fn delete(&self, _id: &str) -> ProductResult<()> {
        Ok(())
    }
}

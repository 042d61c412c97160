//! Single-flight create, update and delete.

use std::sync::Arc;

use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, error, info, instrument, warn};

use crate::error::{ProductError, ProductResult};
use crate::form::ProductForm;
use crate::models::{FinancialProduct, MutationMode, PendingMutation};
use crate::projection::ListProjectionEngine;
use crate::repository::FinancialProductRepository;

/// Sends mutations to the repository, one at a time, and reloads the list
/// after each success.
pub struct MutationCoordinator<R: FinancialProductRepository> {
    engine: ListProjectionEngine<R>,
    pending: Arc<watch::Sender<Option<PendingMutation>>>,
}

impl<R: FinancialProductRepository> MutationCoordinator<R> {
    pub fn new(engine: ListProjectionEngine<R>) -> Self {
        let (pending, _) = watch::channel(None);
        Self {
            engine,
            pending: Arc::new(pending),
        }
    }

    pub fn engine(&self) -> &ListProjectionEngine<R> {
        &self.engine
    }

    /// Save the form as a new product or as an update of `mode`'s product.
    ///
    /// Fails without touching the network when the form is invalid or another
    /// mutation is still pending. Transport failures are returned as is and do
    /// not reload the list.
    #[instrument(skip(self, form), fields(mode = %mode))]
    pub async fn submit(
        &self,
        form: &ProductForm,
        mode: MutationMode,
    ) -> ProductResult<FinancialProduct> {
        let product = form.validate().map_err(|errors| {
            warn!(%errors, "Rejected invalid product form");
            ProductError::from(errors)
        })?;

        let _guard = self.acquire(PendingMutation::from(&mode))?;
        let repository = self.engine.repository();

        let result = match &mode {
            MutationMode::Create => repository.create(product.into()).await,
            MutationMode::Update(id) => repository.update(id, product.fields).await,
        };

        match result {
            Ok(saved) => {
                info!(id = %saved.id, "Financial product saved");
                self.engine.reload().await;
                Ok(saved)
            }
            Err(err) => {
                error!(error = %err, "Error saving financial product");
                Err(err)
            }
        }
    }

    #[instrument(skip(self, product), fields(id = %product.id))]
    pub async fn delete(&self, product: &FinancialProduct) -> ProductResult<()> {
        let _guard = self.acquire(PendingMutation::delete(product.id.clone()))?;

        match self.engine.repository().delete(&product.id).await {
            Ok(()) => {
                info!("Financial product deleted");
                self.engine.reload().await;
                Ok(())
            }
            Err(err) => {
                error!(error = %err, "Error deleting financial product");
                Err(err)
            }
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.pending.borrow().is_some()
    }

    pub fn pending(&self) -> Option<PendingMutation> {
        self.pending.borrow().clone()
    }

    /// Stream of the pending mutation, starting with the current one
    pub fn pending_changes(&self) -> WatchStream<Option<PendingMutation>> {
        WatchStream::new(self.pending.subscribe())
    }

    fn acquire(&self, mutation: PendingMutation) -> ProductResult<PendingGuard> {
        let mut slot = Some(mutation);
        let mut busy = None;

        self.pending.send_if_modified(|pending| match pending {
            Some(current) => {
                busy = Some(current.kind);
                false
            }
            None => {
                *pending = slot.take();
                true
            }
        });

        if let Some(kind) = busy {
            debug!(%kind, "Mutation already in flight");
            return Err(ProductError::MutationInFlight(kind));
        }

        Ok(PendingGuard {
            pending: Arc::clone(&self.pending),
        })
    }
}

impl<R: FinancialProductRepository> Clone for MutationCoordinator<R> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
            pending: Arc::clone(&self.pending),
        }
    }
}

/// Clears the pending flag when the mutation ends, however it ends
struct PendingGuard {
    pending: Arc<watch::Sender<Option<PendingMutation>>>,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.pending.send_replace(None);
    }
}

//! Persistence interface used by the invoice mutations.
//!
//! Every call performs exactly one write and reports failures as an
//! [`EngineError`] value. [`Engine`](crate::Engine) implements it on top of
//! the database.

use async_trait::async_trait;

use crate::{EngineError, Invoice, InvoiceChanges, NewInvoice};

#[async_trait]
pub trait InvoiceStore: Send + Sync {
    /// Inserts a new invoice. The store generates the id.
    async fn insert_invoice(&self, invoice: NewInvoice) -> Result<Invoice, EngineError>;

    /// Replaces customer, amount and status of the invoice `id`.
    ///
    /// Returns [`EngineError::KeyNotFound`] when no invoice has that id.
    async fn update_invoice(&self, id: &str, changes: InvoiceChanges) -> Result<(), EngineError>;

    /// Deletes the invoice `id`. Deleting a missing invoice is not an error.
    async fn delete_invoice(&self, id: &str) -> Result<(), EngineError>;
}

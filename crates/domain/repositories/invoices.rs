use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::entities::invoices::{InsertInvoiceEntity, InvoiceEntity, UpdateInvoiceEntity};

#[async_trait]
#[automock]
pub trait InvoiceRepository {
    async fn create_invoice(&self, invoice: InsertInvoiceEntity) -> Result<String>;
    /// Returns the number of rows changed.
    async fn update_invoice(&self, invoice_id: String, changes: UpdateInvoiceEntity)
    -> Result<usize>;
    /// Returns the number of rows removed.
    async fn delete_invoice(&self, invoice_id: String) -> Result<usize>;
    async fn list_invoices(&self) -> Result<Vec<InvoiceEntity>>;
}

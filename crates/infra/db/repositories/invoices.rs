use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, delete, insert_into, prelude::*, update};
use std::sync::Arc;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::invoices},
};
use domain::{
    entities::invoices::{InsertInvoiceEntity, InvoiceEntity, UpdateInvoiceEntity},
    repositories::invoices::InvoiceRepository,
};

pub struct InvoicePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl InvoicePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl InvoiceRepository for InvoicePostgres {
    async fn create_invoice(&self, invoice: InsertInvoiceEntity) -> Result<String> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let invoice_id = insert_into(invoices::table)
            .values(&invoice)
            .returning(invoices::id)
            .get_result::<String>(&mut conn)?;

        Ok(invoice_id)
    }

    async fn update_invoice(
        &self,
        invoice_id: String,
        changes: UpdateInvoiceEntity,
    ) -> Result<usize> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let updated = update(invoices::table.filter(invoices::id.eq(invoice_id)))
            .set(&changes)
            .execute(&mut conn)?;

        Ok(updated)
    }

    async fn delete_invoice(&self, invoice_id: String) -> Result<usize> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let deleted = delete(invoices::table.filter(invoices::id.eq(invoice_id)))
            .execute(&mut conn)?;

        Ok(deleted)
    }

    async fn list_invoices(&self) -> Result<Vec<InvoiceEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = invoices::table
            .select(InvoiceEntity::as_select())
            .order((invoices::date.desc(), invoices::id.asc()))
            .load::<InvoiceEntity>(&mut conn)?;

        Ok(rows)
    }
}

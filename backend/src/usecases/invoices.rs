use anyhow::Result;
use chrono::Utc;
use std::{collections::HashMap, sync::Arc};
use tracing::{error, info, warn};
use uuid::Uuid;

use invoicing::{
    domain::{
        entities::invoices::{InsertInvoiceEntity, InvoiceEntity, UpdateInvoiceEntity},
        repositories::invoices::InvoiceRepository,
        value_objects::invoices::{
            FormState, INVOICES_VIEW_PATH, InvoiceFormOutcome, InvoiceOperation,
            ValidatedInvoiceForm, validate_invoice_form,
        },
    },
    infra::view_cache::ViewCache,
};

pub type InvoiceListing = Vec<InvoiceEntity>;

pub struct InvoiceUseCase<T>
where
    T: InvoiceRepository + Send + Sync,
{
    invoice_repository: Arc<T>,
    view_cache: Arc<ViewCache<InvoiceListing>>,
}

impl<T> InvoiceUseCase<T>
where
    T: InvoiceRepository + Send + Sync,
{
    pub fn new(invoice_repository: Arc<T>, view_cache: Arc<ViewCache<InvoiceListing>>) -> Self {
        Self {
            invoice_repository,
            view_cache,
        }
    }

    pub async fn create_invoice(&self, fields: &HashMap<String, String>) -> InvoiceFormOutcome {
        let validated = match self.validate(InvoiceOperation::Create, fields) {
            Ok(validated) => validated,
            Err(state) => return InvoiceFormOutcome::Failure(state),
        };

        let amount = validated.amount_minor();
        let insert_invoice_entity = InsertInvoiceEntity {
            id: Uuid::new_v4().to_string(),
            customer_id: validated.customer_id,
            amount,
            status: validated.status.to_string(),
            date: Utc::now().date_naive(),
        };

        match self
            .invoice_repository
            .create_invoice(insert_invoice_entity)
            .await
        {
            Ok(invoice_id) => {
                info!(%invoice_id, "invoices: invoice created");
                self.revalidate_and_redirect().await
            }
            Err(err) => {
                error!(db_error = ?err, "invoices: failed to create invoice");
                InvoiceFormOutcome::Failure(FormState::database_error(InvoiceOperation::Create))
            }
        }
    }

    pub async fn update_invoice(
        &self,
        invoice_id: String,
        fields: &HashMap<String, String>,
    ) -> InvoiceFormOutcome {
        let validated = match self.validate(InvoiceOperation::Update, fields) {
            Ok(validated) => validated,
            Err(state) => return InvoiceFormOutcome::Failure(state),
        };

        if invoice_id.trim().is_empty() {
            error!("invoices: update requested without an invoice id");
            return InvoiceFormOutcome::Failure(FormState::database_error(
                InvoiceOperation::Update,
            ));
        }

        let amount = validated.amount_minor();
        let update_invoice_entity = UpdateInvoiceEntity {
            customer_id: validated.customer_id,
            amount,
            status: validated.status.to_string(),
        };

        match self
            .invoice_repository
            .update_invoice(invoice_id.clone(), update_invoice_entity)
            .await
        {
            Ok(0) => {
                warn!(%invoice_id, "invoices: update matched no invoice");
                self.revalidate_and_redirect().await
            }
            Ok(_) => {
                info!(%invoice_id, "invoices: invoice updated");
                self.revalidate_and_redirect().await
            }
            Err(err) => {
                error!(%invoice_id, db_error = ?err, "invoices: failed to update invoice");
                InvoiceFormOutcome::Failure(FormState::database_error(InvoiceOperation::Update))
            }
        }
    }

    /// Store errors are not turned into a form state here; they reach the caller as `Err`.
    pub async fn delete_invoice(&self, invoice_id: String) -> Result<()> {
        let deleted = self
            .invoice_repository
            .delete_invoice(invoice_id.clone())
            .await?;

        info!(%invoice_id, deleted, "invoices: invoice deleted");
        self.view_cache.revalidate(INVOICES_VIEW_PATH).await;

        Ok(())
    }

    pub async fn list_invoices(&self) -> Result<Arc<InvoiceListing>> {
        if let Some(cached) = self.view_cache.get(INVOICES_VIEW_PATH).await {
            return Ok(cached);
        }

        let generation = self.view_cache.generation(INVOICES_VIEW_PATH).await;
        let invoices = self.invoice_repository.list_invoices().await?;
        Ok(self
            .view_cache
            .put_if_fresh(INVOICES_VIEW_PATH, generation, invoices)
            .await)
    }

    fn validate(
        &self,
        operation: InvoiceOperation,
        fields: &HashMap<String, String>,
    ) -> std::result::Result<ValidatedInvoiceForm, FormState> {
        validate_invoice_form(fields).map_err(|errors| {
            warn!(
                operation = operation.verb(),
                ?errors,
                "invoices: form validation failed"
            );
            FormState::invalid(operation, errors)
        })
    }

    async fn revalidate_and_redirect(&self) -> InvoiceFormOutcome {
        self.view_cache.revalidate(INVOICES_VIEW_PATH).await;
        InvoiceFormOutcome::Success {
            redirect_to: INVOICES_VIEW_PATH.to_string(),
        }
    }
}

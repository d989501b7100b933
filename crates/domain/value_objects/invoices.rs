use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::enums::invoice_statuses::InvoiceStatus;

pub const CUSTOMER_ID_FIELD: &str = "customerId";
pub const AMOUNT_FIELD: &str = "amount";
pub const STATUS_FIELD: &str = "status";

pub const CUSTOMER_REQUIRED_MESSAGE: &str = "Please select a customer.";
pub const AMOUNT_INVALID_MESSAGE: &str = "Please enter an amount greater than $0.";
pub const STATUS_INVALID_MESSAGE: &str = "Please select an invoice status.";

/// Where the invoice listing lives; written invoices revalidate and redirect here.
pub const INVOICES_VIEW_PATH: &str = "/dashboard/invoices";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoiceOperation {
    Create,
    Update,
}

impl InvoiceOperation {
    pub fn verb(&self) -> &'static str {
        match self {
            InvoiceOperation::Create => "Create",
            InvoiceOperation::Update => "Update",
        }
    }

    pub fn missing_fields_message(&self) -> String {
        format!("Missing Fields. Failed to {} Invoice.", self.verb())
    }

    pub fn database_error_message(&self) -> String {
        format!("Database Error: Failed to {} Invoice.", self.verb())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedInvoiceForm {
    pub customer_id: String,
    /// Major currency units as submitted.
    pub amount: f64,
    pub status: InvoiceStatus,
}

impl ValidatedInvoiceForm {
    /// Amount in cents, rounded down. Validation guarantees the result is in `1..=i32::MAX`.
    pub fn amount_minor(&self) -> i32 {
        to_minor_units(self.amount).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldErrors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Vec<String>>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.customer_id.is_none() && self.amount.is_none() && self.status.is_none()
    }

    fn push(slot: &mut Option<Vec<String>>, message: &str) {
        slot.get_or_insert_with(Vec::new).push(message.to_string());
    }
}

/// What the form gets back when a submission does not go through.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
    pub message: Option<String>,
}

impl FormState {
    pub fn invalid(operation: InvoiceOperation, errors: FieldErrors) -> Self {
        Self {
            errors: Some(errors),
            message: Some(operation.missing_fields_message()),
        }
    }

    pub fn database_error(operation: InvoiceOperation) -> Self {
        Self {
            errors: None,
            message: Some(operation.database_error_message()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvoiceFormOutcome {
    /// The write went through and the listing was revalidated.
    Success { redirect_to: String },
    Failure(FormState),
}

pub fn validate_invoice_form(
    fields: &HashMap<String, String>,
) -> Result<ValidatedInvoiceForm, FieldErrors> {
    let mut errors = FieldErrors::default();

    let customer_id = fields
        .get(CUSTOMER_ID_FIELD)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty());
    if customer_id.is_none() {
        FieldErrors::push(&mut errors.customer_id, CUSTOMER_REQUIRED_MESSAGE);
    }

    let amount = coerce_amount(fields.get(AMOUNT_FIELD).map(String::as_str))
        .filter(|amount| to_minor_units(*amount).is_some());
    if amount.is_none() {
        FieldErrors::push(&mut errors.amount, AMOUNT_INVALID_MESSAGE);
    }

    let status = fields
        .get(STATUS_FIELD)
        .and_then(|value| InvoiceStatus::parse(value));
    if status.is_none() {
        FieldErrors::push(&mut errors.status, STATUS_INVALID_MESSAGE);
    }

    match (customer_id, amount, status) {
        (Some(customer_id), Some(amount), Some(status)) => Ok(ValidatedInvoiceForm {
            customer_id: customer_id.to_string(),
            amount,
            status,
        }),
        _ => Err(errors),
    }
}

/// Number coercion as form inputs expect it: absent or blank reads as zero.
fn coerce_amount(raw: Option<&str>) -> Option<f64> {
    let trimmed = raw.unwrap_or_default().trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }

    trimmed
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite())
}

fn to_minor_units(amount: f64) -> Option<i32> {
    if !(amount > 0.0) {
        return None;
    }

    let cents = (amount * 100.0).floor();
    if cents < 1.0 || cents > f64::from(i32::MAX) {
        return None;
    }

    Some(cents as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn valid_form_is_accepted() {
        let validated = validate_invoice_form(&form(&[
            ("customerId", "c1"),
            ("amount", "10.5"),
            ("status", "paid"),
        ]))
        .unwrap();

        assert_eq!(validated.customer_id, "c1");
        assert_eq!(validated.status, InvoiceStatus::Paid);
        assert_eq!(validated.amount_minor(), 1050);
    }

    #[test]
    fn non_positive_amounts_are_rejected() {
        for raw in ["0", "-1", "-0.01", "", "abc", "NaN", "inf"] {
            let errors = validate_invoice_form(&form(&[
                ("customerId", "c1"),
                ("amount", raw),
                ("status", "pending"),
            ]))
            .unwrap_err();

            assert_eq!(
                errors.amount,
                Some(vec![AMOUNT_INVALID_MESSAGE.to_string()]),
                "amount {raw:?} should be rejected"
            );
            assert!(errors.customer_id.is_none());
            assert!(errors.status.is_none());
        }
    }

    #[test]
    fn amounts_outside_the_cent_range_are_rejected() {
        for raw in ["0.001", "99999999999"] {
            let errors = validate_invoice_form(&form(&[
                ("customerId", "c1"),
                ("amount", raw),
                ("status", "paid"),
            ]))
            .unwrap_err();
            assert!(errors.amount.is_some(), "amount {raw:?} should be rejected");
        }
    }

    #[test]
    fn unknown_status_is_rejected() {
        for raw in ["overdue", "PAID", ""] {
            let errors = validate_invoice_form(&form(&[
                ("customerId", "c1"),
                ("amount", "5"),
                ("status", raw),
            ]))
            .unwrap_err();
            assert_eq!(errors.status, Some(vec![STATUS_INVALID_MESSAGE.to_string()]));
        }
    }

    #[test]
    fn missing_fields_accumulate_every_error() {
        let errors = validate_invoice_form(&HashMap::new()).unwrap_err();

        assert_eq!(
            errors.customer_id,
            Some(vec![CUSTOMER_REQUIRED_MESSAGE.to_string()])
        );
        assert_eq!(errors.amount, Some(vec![AMOUNT_INVALID_MESSAGE.to_string()]));
        assert_eq!(errors.status, Some(vec![STATUS_INVALID_MESSAGE.to_string()]));
    }

    #[test]
    fn blank_customer_is_treated_as_missing() {
        let errors = validate_invoice_form(&form(&[
            ("customerId", "   "),
            ("amount", "5"),
            ("status", "paid"),
        ]))
        .unwrap_err();

        assert!(errors.customer_id.is_some());
        assert!(errors.amount.is_none());
    }

    #[test]
    fn amount_is_floored_to_cents() {
        let validated = validate_invoice_form(&form(&[
            ("customerId", "c1"),
            ("amount", " 12.349 "),
            ("status", "pending"),
        ]))
        .unwrap();

        assert_eq!(validated.amount_minor(), 1234);
    }

    #[test]
    fn form_state_serializes_like_the_form_expects() {
        let state = FormState::invalid(
            InvoiceOperation::Update,
            FieldErrors {
                amount: Some(vec![AMOUNT_INVALID_MESSAGE.to_string()]),
                ..Default::default()
            },
        );

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "errors": { "amount": [AMOUNT_INVALID_MESSAGE] },
                "message": "Missing Fields. Failed to Update Invoice."
            })
        );

        let json = serde_json::to_value(FormState::database_error(InvoiceOperation::Create)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "message": "Database Error: Failed to Create Invoice." })
        );
    }
}

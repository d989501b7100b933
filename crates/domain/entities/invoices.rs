use chrono::NaiveDate;
use diesel::prelude::*;
use serde::Serialize;

use crate::infra::db::postgres::schema::invoices;

#[derive(Debug, Clone, PartialEq, Serialize, Identifiable, Selectable, Queryable)]
#[diesel(table_name = invoices)]
pub struct InvoiceEntity {
    pub id: String,
    pub customer_id: String,
    pub amount: i32,
    pub status: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = invoices)]
pub struct InsertInvoiceEntity {
    pub id: String,
    pub customer_id: String,
    pub amount: i32,
    pub status: String,
    pub date: NaiveDate,
}

/// Columns an edit may touch. `id` and `date` are fixed once the invoice exists.
#[derive(Debug, Clone, PartialEq, AsChangeset)]
#[diesel(table_name = invoices)]
pub struct UpdateInvoiceEntity {
    pub customer_id: String,
    pub amount: i32,
    pub status: String,
}

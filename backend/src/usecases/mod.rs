pub mod authentication;
pub mod invoices;

pub mod credentials;
pub mod enums;
pub mod invoices;

pub mod account;
pub mod extract;
pub mod health;
pub mod invoices;
pub mod reminders;
pub mod upload;

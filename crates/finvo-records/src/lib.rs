//! Finvo Records Library
//!
//! Typed repositories for the two per-user JSON documents: the append-only
//! invoice list (`uploads/{user_id}/data.json`) and the pending reminder
//! list (`uploads/{user_id}/reminders.json`). Records are strongly typed
//! internally; JSON appears only at the store boundary.
//!
//! Absence of a document is equivalent to an empty list, never an error.
//! Writes are whole-document read-modify-write cycles with no locking or
//! conditional-write check; concurrent writers against the same user are
//! last-writer-wins.

mod doc;
pub mod invoices;
pub mod reminders;

pub use invoices::InvoiceRepository;
pub use reminders::{CreateOutcome, DeleteOutcome, ReminderRepository};
